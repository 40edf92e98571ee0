//! In-memory view of a spreadsheet workbook.
//!
//! Sheets are stored as dense grids addressed by absolute spreadsheet
//! position, so `(0, 2)` is always cell `C1` regardless of where the used
//! range of the sheet starts. Lookups are content-based: callers find sheets
//! by name and rows by predicate rather than by fixed index.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use tracing::warn;

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Textual form used for label matching.
    ///
    /// Numbers use their shortest representation and booleans render as
    /// `True`/`False`.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Bool(true) => Cow::Borrowed("True"),
            Cell::Bool(false) => Cow::Borrowed("False"),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(n) => Cell::Number(*n),
            Data::Int(n) => Cell::Number(*n as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(format!("#{e:?}")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
}

/// One named sheet as a grid of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Cell at an absolute position; `None` past the end of the row.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Index of the first row at or after `start` satisfying `pred`.
    pub fn find_row<F>(&self, start: usize, pred: F) -> Option<usize>
    where
        F: Fn(&[Cell]) -> bool,
    {
        self.rows
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, row)| pred(row))
            .map(|(idx, _)| idx)
    }

    /// Position `(row, col)` of the first cell whose text contains `label`,
    /// scanning row by row.
    pub fn find_label(&self, label: &str) -> Option<(usize, usize)> {
        let row = self.find_row(0, |cells| {
            cells.iter().any(|c| c.text().contains(label))
        })?;
        let col = self.rows[row]
            .iter()
            .position(|c| c.text().contains(label))?;
        Some((row, col))
    }
}

/// A parsed workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    /// `(sheet name, error)` for sheets that failed to read.
    unreadable: Vec<(String, String)>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self {
            sheets,
            unreadable: Vec::new(),
        }
    }

    /// Record a sheet that exists but could not be read.
    pub fn with_unreadable(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.unreadable.push((name.into(), message.into()));
        self
    }

    /// Open and read a workbook (xlsx, xls, xlsb or ods).
    ///
    /// Only failing to open the file is an error. A sheet that cannot be
    /// read is remembered by name and reported by [`Workbook::sheet_error`].
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let mut workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let names: Vec<String> = workbook.sheet_names().to_vec();
        let mut parsed = Self::new(Vec::with_capacity(names.len()));
        for name in names {
            let range = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(e) => {
                    warn!(sheet = %name, error = %e, "Failed to read sheet");
                    parsed.unreadable.push((name, e.to_string()));
                    continue;
                }
            };

            // The used range may not begin at A1; pad so indices stay absolute.
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
            for data_row in range.rows() {
                let mut row = vec![Cell::Empty; start_col as usize];
                row.extend(data_row.iter().map(Cell::from_data));
                rows.push(row);
            }

            parsed.sheets.push(Sheet::new(name, rows));
        }

        Ok(parsed)
    }

    /// Why the named sheet could not be read, if it could not.
    pub fn sheet_error(&self, name: &str) -> Option<&str> {
        let wanted = normalize_sheet_name(name);
        self.unreadable
            .iter()
            .find(|(sheet, _)| normalize_sheet_name(sheet) == wanted)
            .map(|(_, message)| message.as_str())
    }

    /// Find a sheet by name, ignoring case and surrounding whitespace.
    pub fn find_sheet(&self, name: &str) -> Option<&Sheet> {
        let wanted = normalize_sheet_name(name);
        self.sheets
            .iter()
            .find(|sheet| normalize_sheet_name(sheet.name()) == wanted)
    }
}

fn normalize_sheet_name(name: &str) -> String {
    name.trim().to_lowercase()
}
