#![allow(dead_code, unused_imports)]

use std::path::Path;

use anyhow::Result;
use rust_xlsxwriter::Workbook;

/// One cell of a fixture row. `Skip` leaves the cell empty.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    Skip,
    Text(&'static str),
    Number(f64),
    Bool(bool),
}

pub use Value::{Bool, Number, Skip, Text};

/// Write an `.xlsx` file with the given sheets, each a list of rows.
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<Value>>)]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match value {
                    Skip => {}
                    Text(text) => {
                        worksheet.write_string(r, c, *text)?;
                    }
                    Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                }
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// Equities sheet with the anchor in A1, the header in row 2 and one line
/// per `(code, name, held, quantity, cost)`.
pub fn equities_sheet(lines: &[(&'static str, &'static str, bool, f64, f64)]) -> Vec<Vec<Value>> {
    let mut rows = vec![
        vec![Text("CODE GOOGLE")],
        vec![
            Text("Code"),
            Text("Nom"),
            Text("En portefeuille"),
            Text("Cours"),
            Text("Nb"),
            Text("PRU"),
        ],
    ];
    for (code, name, held, qty, cost) in lines {
        rows.push(vec![
            Text(*code),
            Text(*name),
            Bool(*held),
            Skip,
            Number(*qty),
            Number(*cost),
        ]);
    }
    rows
}

/// Summary sheet with labels in column B and values in column C.
pub fn summary_sheet(lines: &[(&'static str, Value)]) -> Vec<Vec<Value>> {
    lines
        .iter()
        .map(|(label, value)| vec![Skip, Text(*label), *value])
        .collect()
}

/// The workbook used across integration tests: one held equity
/// (10 × 50), one sold equity, and a summary of 300 000 real estate,
/// 20 000 liquidity and 50 000 debt.
pub fn write_reference_workbook(path: &Path) -> Result<()> {
    write_workbook(
        path,
        &[
            (
                "Portefeuille PEA",
                equities_sheet(&[
                    ("EPA:XYZ", "XYZ SA", true, 10.0, 50.0),
                    ("EPA:OLD", "Old Corp", false, 100.0, 10.0),
                ]),
            ),
            (
                "Mon Patrimoine",
                summary_sheet(&[
                    ("Résidence principale", Number(300_000.0)),
                    ("Comptes courant", Text("20 000 €")),
                    ("Passif (dettes)", Number(50_000.0)),
                ]),
            ),
        ],
    )
}

pub fn write_config(dir: &Path, body: &str) -> Result<std::path::PathBuf> {
    let path = dir.join("networth.toml");
    std::fs::write(&path, body)?;
    Ok(path)
}
