//! Reads the three workbook sections: equities, crypto and the static
//! net-worth summary.
//!
//! Each section is parsed on its own. A section that cannot be located or
//! read yields no data and a [`SectionError`]; the other sections are not
//! affected.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::amount::parse_amount;
use crate::models::{Bucket, HoldingRecord, StaticBucketMap};
use crate::symbols::SymbolTranslator;
use crate::workbook::{Cell, Sheet, Workbook};

// Equity column offsets, relative to the anchor cell's column.
const CODE_OFFSET: usize = 0;
const NAME_OFFSET: usize = 1;
const HELD_OFFSET: usize = 2;
const QUANTITY_OFFSET: usize = 4;
const COST_BASIS_OFFSET: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Equities,
    Crypto,
    Static,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Equities => "equities",
            Section::Crypto => "crypto",
            Section::Static => "net worth summary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SectionErrorKind {
    #[error("sheet '{0}' not found")]
    MissingSheet(String),
    #[error("sheet '{sheet}' could not be read: {message}")]
    UnreadableSheet { sheet: String, message: String },
    #[error("no row contains the anchor label '{0}'")]
    MissingAnchor(String),
    #[error("no header row after the anchor row")]
    MissingHeader,
    #[error("column '{0}' not found")]
    MissingColumn(String),
}

/// Failure to read one workbook section.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{section} section: {kind}")]
pub struct SectionError {
    pub section: Section,
    #[source]
    pub kind: SectionErrorKind,
}

impl SectionError {
    fn new(section: Section, kind: SectionErrorKind) -> Self {
        Self { section, kind }
    }
}

/// Synonym labels summed into each static bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticLabels {
    pub real_estate: Vec<String>,
    pub liquidity: Vec<String>,
    pub crowd: Vec<String>,
    pub gold: Vec<String>,
    pub life_insurance: Vec<String>,
    pub debt: Vec<String>,
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for StaticLabels {
    fn default() -> Self {
        Self {
            real_estate: labels(&["Résidence principale", "Immobilier Locatif"]),
            liquidity: labels(&["Comptes courant", "Epargne"]),
            crowd: labels(&["Crowfunding", "Crowlending"]),
            gold: labels(&["OR"]),
            life_insurance: labels(&["Assurance Vie"]),
            debt: labels(&["Passif (dettes)"]),
        }
    }
}

impl StaticLabels {
    pub fn for_bucket(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::RealEstate => &self.real_estate,
            Bucket::Liquidity => &self.liquidity,
            Bucket::Crowd => &self.crowd,
            Bucket::Gold => &self.gold,
            Bucket::LifeInsurance => &self.life_insurance,
            Bucket::Debt => &self.debt,
        }
    }
}

/// Where each section lives in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookLayout {
    pub equities_sheet: String,
    /// Text identifying the row just above the equities column header.
    pub equities_anchor: String,
    pub crypto_sheet: String,
    pub crypto_symbol_column: String,
    pub crypto_quantity_column: String,
    pub crypto_amount_column: String,
    pub static_sheet: String,
    /// Zero-based column holding the value of a labeled summary row.
    pub static_value_column: usize,
    pub static_labels: StaticLabels,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            equities_sheet: "Portefeuille PEA".to_string(),
            equities_anchor: "CODE GOOGLE".to_string(),
            crypto_sheet: "Crypto".to_string(),
            crypto_symbol_column: "Symbol crypto".to_string(),
            crypto_quantity_column: "Nombre possédés".to_string(),
            crypto_amount_column: "Montant".to_string(),
            static_sheet: "Mon Patrimoine".to_string(),
            static_value_column: 2,
            static_labels: StaticLabels::default(),
        }
    }
}

/// Everything read from the workbook for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedPortfolio {
    pub equities: Vec<HoldingRecord>,
    pub crypto: Vec<HoldingRecord>,
    pub buckets: StaticBucketMap,
    pub errors: Vec<SectionError>,
}

/// Parse all three sections. Never fails as a whole.
pub fn load(
    workbook: &Workbook,
    layout: &WorkbookLayout,
    translator: &SymbolTranslator,
) -> LoadedPortfolio {
    let mut loaded = LoadedPortfolio::default();

    match load_equities(workbook, layout, translator) {
        Ok(records) => loaded.equities = records,
        Err(err) => loaded.errors.push(err),
    }
    match load_crypto(workbook, layout, translator) {
        Ok(records) => loaded.crypto = records,
        Err(err) => loaded.errors.push(err),
    }
    match load_static(workbook, layout) {
        Ok(buckets) => loaded.buckets = buckets,
        Err(err) => loaded.errors.push(err),
    }

    for err in &loaded.errors {
        warn!(section = %err.section, error = %err.kind, "Skipping workbook section");
    }

    loaded
}

fn find_section_sheet<'a>(
    workbook: &'a Workbook,
    name: &str,
    section: Section,
) -> Result<&'a Sheet, SectionError> {
    if let Some(message) = workbook.sheet_error(name) {
        return Err(SectionError::new(
            section,
            SectionErrorKind::UnreadableSheet {
                sheet: name.to_string(),
                message: message.to_string(),
            },
        ));
    }
    workbook
        .find_sheet(name)
        .ok_or_else(|| SectionError::new(section, SectionErrorKind::MissingSheet(name.to_string())))
}

/// Held equity lines from the equities sheet.
pub fn load_equities(
    workbook: &Workbook,
    layout: &WorkbookLayout,
    translator: &SymbolTranslator,
) -> Result<Vec<HoldingRecord>, SectionError> {
    let section = Section::Equities;
    let sheet = find_section_sheet(workbook, &layout.equities_sheet, section)?;

    let (anchor_row, anchor_col) = sheet.find_label(&layout.equities_anchor).ok_or_else(|| {
        SectionError::new(
            section,
            SectionErrorKind::MissingAnchor(layout.equities_anchor.clone()),
        )
    })?;

    let header_row = anchor_row + 1;
    let header = sheet
        .row(header_row)
        .ok_or_else(|| SectionError::new(section, SectionErrorKind::MissingHeader))?;
    if header.len() <= anchor_col + COST_BASIS_OFFSET {
        return Err(SectionError::new(
            section,
            SectionErrorKind::MissingColumn(format!("#{}", COST_BASIS_OFFSET + 1)),
        ));
    }

    let cell = |row: usize, offset: usize| sheet.cell(row, anchor_col + offset);

    let records = (header_row + 1..sheet.rows().len())
        .filter(|row| matches!(cell(*row, HELD_OFFSET), Some(Cell::Bool(true))))
        .map(|row| {
            let code = cell(row, CODE_OFFSET);
            HoldingRecord::equity(
                text_of(code),
                text_of(cell(row, NAME_OFFSET)),
                parse_amount(cell(row, QUANTITY_OFFSET)),
                parse_amount(cell(row, COST_BASIS_OFFSET)),
            )
            .with_provider_symbol(translator.translate_cell(code))
        })
        .collect();

    Ok(records)
}

/// Crypto lines, including manually tracked (symbol-less) positions.
pub fn load_crypto(
    workbook: &Workbook,
    layout: &WorkbookLayout,
    translator: &SymbolTranslator,
) -> Result<Vec<HoldingRecord>, SectionError> {
    let section = Section::Crypto;
    let sheet = find_section_sheet(workbook, &layout.crypto_sheet, section)?;
    let header = sheet.row(0).unwrap_or_default();

    let required = |name: &str| {
        column_index(header, name).ok_or_else(|| {
            SectionError::new(section, SectionErrorKind::MissingColumn(name.to_string()))
        })
    };
    let symbol_col = required(&layout.crypto_symbol_column)?;
    let quantity_col = required(&layout.crypto_quantity_column)?;
    let amount_col = column_index(header, &layout.crypto_amount_column);

    let records = sheet
        .rows()
        .iter()
        .skip(1)
        .filter(|row| !row.iter().all(Cell::is_blank))
        .map(|row| {
            let symbol = row.get(symbol_col);
            let recorded_amount = amount_col
                .map(|col| parse_amount(row.get(col)))
                .unwrap_or(Decimal::ZERO);
            HoldingRecord::crypto(
                text_of(symbol),
                parse_amount(row.get(quantity_col)),
                recorded_amount,
            )
            .with_provider_symbol(translator.translate_cell(symbol))
        })
        .collect();

    Ok(records)
}

/// Static buckets from the labeled summary sheet.
pub fn load_static(
    workbook: &Workbook,
    layout: &WorkbookLayout,
) -> Result<StaticBucketMap, SectionError> {
    let sheet = find_section_sheet(workbook, &layout.static_sheet, Section::Static)?;

    let mut buckets = StaticBucketMap::new();
    for bucket in Bucket::ALL {
        let total = layout
            .static_labels
            .for_bucket(bucket)
            .iter()
            .map(|label| labeled_value(sheet, label, layout.static_value_column))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        buckets.insert(bucket, total);
    }

    Ok(buckets)
}

/// Value next to the first row mentioning `label`, or zero.
fn labeled_value(sheet: &Sheet, label: &str, value_col: usize) -> Decimal {
    match sheet.find_label(label) {
        Some((row, _)) => parse_amount(sheet.cell(row, value_col)),
        None => Decimal::ZERO,
    }
}

fn column_index(header: &[Cell], name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    header
        .iter()
        .position(|cell| cell.text().trim().to_lowercase() == wanted)
}

fn text_of(cell: Option<&Cell>) -> String {
    cell.map(|c| c.text().trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HoldingKind;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn row(cells: Vec<Cell>) -> Vec<Cell> {
        cells
    }

    fn equities_sheet() -> Sheet {
        Sheet::new(
            "Portefeuille PEA",
            vec![
                row(vec!["Mon PEA".into()]),
                row(vec![]),
                row(vec!["CODE GOOGLE".into(), "".into(), "".into()]),
                row(vec![
                    "Code".into(),
                    "Nom".into(),
                    "En portefeuille".into(),
                    "Secteur".into(),
                    "Nb parts".into(),
                    "PRU".into(),
                ]),
                row(vec![
                    "EPA:CW8-ETFP".into(),
                    "Amundi MSCI World".into(),
                    true.into(),
                    "ETF".into(),
                    10.0.into(),
                    "450,50 €".into(),
                ]),
                row(vec![
                    "EPA:AI".into(),
                    "Air Liquide".into(),
                    false.into(),
                    "Chimie".into(),
                    5.0.into(),
                    150.0.into(),
                ]),
                row(vec![
                    "EPA:MC".into(),
                    "LVMH".into(),
                    true.into(),
                    "Luxe".into(),
                    "2".into(),
                    "700".into(),
                ]),
                row(vec!["TOTAL".into(), Cell::Empty, "VRAI".into()]),
            ],
        )
    }

    fn crypto_sheet() -> Sheet {
        Sheet::new(
            "Crypto",
            vec![
                row(vec![
                    "Symbol crypto".into(),
                    "Nombre possédés".into(),
                    "Montant".into(),
                ]),
                row(vec!["BTCEUR".into(), "0,5".into(), "20 000 €".into()]),
                row(vec![Cell::Empty, Cell::Empty, "1 500 €".into()]),
                row(vec![Cell::Empty, Cell::Empty, Cell::Empty]),
                row(vec!["ETH-EUR".into(), 2.0.into()]),
            ],
        )
    }

    fn static_sheet() -> Sheet {
        Sheet::new(
            "Mon Patrimoine",
            vec![
                row(vec!["ACTIF".into()]),
                row(vec![Cell::Empty, "Résidence principale".into(), "250 000 €".into()]),
                row(vec![Cell::Empty, "Immobilier Locatif".into(), 50000.0.into()]),
                row(vec![Cell::Empty, "Comptes courant".into(), "5 000 €".into()]),
                row(vec![Cell::Empty, "Epargne (livrets)".into(), "15 000 €".into()]),
                row(vec![Cell::Empty, "Assurance Vie".into(), "30 000 €".into()]),
                row(vec![Cell::Empty, "OR".into(), "2 000 €".into()]),
                row(vec!["PASSIF".into()]),
                row(vec![Cell::Empty, "Passif (dettes)".into(), "50 000 €".into()]),
            ],
        )
    }

    fn workbook() -> Workbook {
        Workbook::new(vec![equities_sheet(), crypto_sheet(), static_sheet()])
    }

    #[test]
    fn test_equities_filters_held_rows() {
        let records =
            load_equities(&workbook(), &WorkbookLayout::default(), &SymbolTranslator::default())
                .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].internal_code, "EPA:CW8-ETFP");
        assert_eq!(records[0].display_name, "Amundi MSCI World");
        assert_eq!(records[0].quantity, dec(10));
        assert_eq!(records[0].cost_basis, Decimal::new(45050, 2));
        assert_eq!(records[0].provider_symbol.as_deref(), Some("CW8.PA"));
        assert_eq!(records[0].kind, HoldingKind::Equity);

        assert_eq!(records[1].internal_code, "EPA:MC");
        assert_eq!(records[1].quantity, dec(2));
        assert_eq!(records[1].cost_basis, dec(700));
        assert_eq!(records[1].provider_symbol.as_deref(), Some("MC.PA"));
    }

    #[test]
    fn test_equities_anchor_column_offset() {
        let sheet = Sheet::new(
            "PEA",
            vec![
                row(vec![Cell::Empty, "CODE GOOGLE".into()]),
                row(vec![Cell::Empty; 7]),
                row(vec![
                    Cell::Empty,
                    "EPA:AI".into(),
                    "Air Liquide".into(),
                    true.into(),
                    Cell::Empty,
                    3.0.into(),
                    160.0.into(),
                ]),
            ],
        );
        let layout = WorkbookLayout {
            equities_sheet: "pea".to_string(),
            ..Default::default()
        };
        let records = load_equities(
            &Workbook::new(vec![sheet]),
            &layout,
            &SymbolTranslator::default(),
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity, dec(3));
        assert_eq!(records[0].cost_basis, dec(160));
    }

    #[test]
    fn test_equities_missing_anchor() {
        let sheet = Sheet::new("Portefeuille PEA", vec![row(vec!["Code".into()])]);
        let err = load_equities(
            &Workbook::new(vec![sheet]),
            &WorkbookLayout::default(),
            &SymbolTranslator::default(),
        )
        .unwrap_err();

        assert_eq!(err.section, Section::Equities);
        assert_eq!(
            err.kind,
            SectionErrorKind::MissingAnchor("CODE GOOGLE".to_string())
        );
    }

    #[test]
    fn test_equities_missing_header_or_columns() {
        let translator = SymbolTranslator::default();
        let layout = WorkbookLayout::default();

        let only_anchor = Sheet::new("Portefeuille PEA", vec![row(vec!["CODE GOOGLE".into()])]);
        let err = load_equities(&Workbook::new(vec![only_anchor]), &layout, &translator)
            .unwrap_err();
        assert_eq!(err.kind, SectionErrorKind::MissingHeader);

        let narrow = Sheet::new(
            "Portefeuille PEA",
            vec![
                row(vec!["CODE GOOGLE".into()]),
                row(vec!["Code".into(), "Nom".into(), "En portefeuille".into()]),
            ],
        );
        let err =
            load_equities(&Workbook::new(vec![narrow]), &layout, &translator).unwrap_err();
        assert!(matches!(err.kind, SectionErrorKind::MissingColumn(_)));
    }

    #[test]
    fn test_crypto_rows() {
        let records =
            load_crypto(&workbook(), &WorkbookLayout::default(), &SymbolTranslator::default())
                .unwrap();

        // The fully blank row is skipped.
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].internal_code, "BTCEUR");
        assert_eq!(records[0].provider_symbol.as_deref(), Some("BTC-EUR"));
        assert_eq!(records[0].quantity, Decimal::new(5, 1));
        assert_eq!(records[0].recorded_amount, dec(20_000));

        assert!(records[1].is_manual());
        assert_eq!(records[1].internal_code, "");
        assert_eq!(records[1].recorded_amount, dec(1_500));

        assert_eq!(records[2].provider_symbol.as_deref(), Some("ETH-EUR"));
        assert_eq!(records[2].recorded_amount, Decimal::ZERO);
    }

    #[test]
    fn test_crypto_missing_required_column() {
        let sheet = Sheet::new(
            "Crypto",
            vec![row(vec!["Symbol crypto".into(), "Montant".into()])],
        );
        let err = load_crypto(
            &Workbook::new(vec![sheet]),
            &WorkbookLayout::default(),
            &SymbolTranslator::default(),
        )
        .unwrap_err();

        assert_eq!(err.section, Section::Crypto);
        assert_eq!(
            err.kind,
            SectionErrorKind::MissingColumn("Nombre possédés".to_string())
        );
    }

    #[test]
    fn test_crypto_amount_column_optional() {
        let sheet = Sheet::new(
            "crypto ",
            vec![
                row(vec![" symbol CRYPTO".into(), "nombre possédés".into()]),
                row(vec![Cell::Empty, 3.0.into()]),
            ],
        );
        let records = load_crypto(
            &Workbook::new(vec![sheet]),
            &WorkbookLayout::default(),
            &SymbolTranslator::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].recorded_amount, Decimal::ZERO);
    }

    #[test]
    fn test_static_buckets_sum_synonyms() {
        let buckets = load_static(&workbook(), &WorkbookLayout::default()).unwrap();

        assert_eq!(buckets.get(Bucket::RealEstate), dec(300_000));
        assert_eq!(buckets.get(Bucket::Liquidity), dec(20_000));
        assert_eq!(buckets.get(Bucket::LifeInsurance), dec(30_000));
        assert_eq!(buckets.get(Bucket::Gold), dec(2_000));
        assert_eq!(buckets.get(Bucket::Crowd), Decimal::ZERO);
        assert_eq!(buckets.get(Bucket::Debt), dec(50_000));
    }

    #[test]
    fn test_static_label_match_is_case_sensitive_substring() {
        let sheet = Sheet::new(
            "Mon Patrimoine",
            vec![
                row(vec![Cell::Empty, "Or physique".into(), "999".into()]),
                row(vec![Cell::Empty, "Lingots OR".into(), "1 234".into()]),
            ],
        );
        let buckets =
            load_static(&Workbook::new(vec![sheet]), &WorkbookLayout::default()).unwrap();
        assert_eq!(buckets.get(Bucket::Gold), dec(1_234));
    }

    #[test]
    fn test_one_failing_section_does_not_block_others() {
        let workbook = Workbook::new(vec![equities_sheet(), static_sheet()]);
        let loaded = load(&workbook, &WorkbookLayout::default(), &SymbolTranslator::default());

        assert_eq!(loaded.equities.len(), 2);
        assert!(loaded.crypto.is_empty());
        assert_eq!(loaded.buckets.get(Bucket::RealEstate), dec(300_000));
        assert_eq!(
            loaded.errors,
            vec![SectionError {
                section: Section::Crypto,
                kind: SectionErrorKind::MissingSheet("Crypto".to_string()),
            }]
        );
    }

    #[test]
    fn test_static_sum_saturates_instead_of_overflowing() {
        let sheet = Sheet::new(
            "Mon Patrimoine",
            vec![
                row(vec![
                    Cell::Empty,
                    "Résidence principale".into(),
                    "79228162514264337593543950335".into(),
                ]),
                row(vec![Cell::Empty, "Immobilier Locatif".into(), "1".into()]),
            ],
        );
        let loaded = load(
            &Workbook::new(vec![sheet]),
            &WorkbookLayout::default(),
            &SymbolTranslator::default(),
        );
        assert_eq!(loaded.buckets.get(Bucket::RealEstate), Decimal::MAX);
    }

    #[test]
    fn test_unreadable_sheet_fails_only_its_section() {
        let workbook = Workbook::new(vec![equities_sheet(), static_sheet()])
            .with_unreadable("Crypto", "corrupt sheet data");
        let loaded = load(&workbook, &WorkbookLayout::default(), &SymbolTranslator::default());

        assert_eq!(loaded.equities.len(), 2);
        assert_eq!(loaded.buckets.get(Bucket::RealEstate), dec(300_000));
        assert_eq!(
            loaded.errors,
            vec![SectionError {
                section: Section::Crypto,
                kind: SectionErrorKind::UnreadableSheet {
                    sheet: "Crypto".to_string(),
                    message: "corrupt sheet data".to_string(),
                },
            }]
        );
        assert_eq!(
            loaded.errors[0].to_string(),
            "crypto section: sheet 'Crypto' could not be read: corrupt sheet data"
        );
    }

    #[test]
    fn test_empty_workbook_reports_every_section() {
        let loaded = load(
            &Workbook::default(),
            &WorkbookLayout::default(),
            &SymbolTranslator::default(),
        );
        assert_eq!(loaded.errors.len(), 3);
        assert!(loaded.buckets.is_empty());
    }

    #[test]
    fn test_section_error_display() {
        let err = SectionError::new(
            Section::Static,
            SectionErrorKind::MissingSheet("Mon Patrimoine".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "net worth summary section: sheet 'Mon Patrimoine' not found"
        );
    }
}
