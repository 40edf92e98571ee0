use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use networth::config::ResolvedConfig;
use networth::dashboard::{Dashboard, Notice};
use networth::models::Bucket;
use networth::quotes::{NoopQuoteSource, QuoteSource, QuoteTable};
use networth::valuation::Category;
use rust_decimal::Decimal;
use tempfile::TempDir;

mod support;
use support::{equities_sheet, summary_sheet, write_reference_workbook, write_workbook};
use support::{Number, Skip, Text};

/// Answers every requested symbol with a fixed price and counts calls.
struct FixedPriceSource {
    price: Decimal,
    calls: AtomicUsize,
}

impl FixedPriceSource {
    fn new(price: Decimal) -> Self {
        Self {
            price,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QuoteSource for FixedPriceSource {
    async fn fetch_last_close(&self, symbols: &[String]) -> Result<QuoteTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(symbols.iter().map(|s| (s.as_str(), self.price)).collect())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

fn config_for(dir: &TempDir) -> Result<ResolvedConfig> {
    ResolvedConfig::load_or_default(&dir.path().join("networth.toml"))
}

#[tokio::test]
async fn end_to_end_offline_uses_cost_basis() -> Result<()> {
    let dir = TempDir::new()?;
    write_reference_workbook(&dir.path().join("patrimoine.xlsx"))?;
    let config = config_for(&dir)?;

    let mut dashboard = Dashboard::from_config(&config, Arc::new(NoopQuoteSource));
    let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let report = dashboard.run(&config.workbook_path, as_of).await?;
    let snapshot = &report.snapshot;

    assert_eq!(snapshot.total, dec(270_500));
    assert_eq!(snapshot.equities_total, dec(500));
    assert_eq!(snapshot.crypto_total, Decimal::ZERO);
    assert_eq!(snapshot.buckets.get(Bucket::Liquidity), dec(20_000));
    assert_eq!(snapshot.buckets.debt(), dec(50_000));
    assert_eq!(snapshot.as_of, as_of);

    // The sold line is not part of the portfolio.
    assert_eq!(snapshot.equities.len(), 1);
    assert_eq!(snapshot.equities[0].provider_symbol.as_deref(), Some("XYZ.PA"));
    assert_eq!(snapshot.top_holdings.len(), 1);
    assert_eq!(snapshot.top_holdings[0].name, "XYZ SA");

    // Only the crypto sheet is missing.
    assert_eq!(report.notices.len(), 1);
    assert!(matches!(&report.notices[0], Notice::Section(_)));

    let composition = snapshot.composition();
    assert_eq!(composition[0].category, Category::RealEstate);
    assert_eq!(composition[0].value, dec(300_000));
    assert_eq!(composition[1].category, Category::Equities);
    assert_eq!(composition[1].value, dec(500));

    Ok(())
}

#[tokio::test]
async fn live_quotes_replace_cost_basis_with_one_call() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("patrimoine.xlsx");
    write_workbook(
        &path,
        &[
            (
                "Portefeuille PEA",
                equities_sheet(&[
                    ("EPA:AAA", "Alpha", true, 10.0, 50.0),
                    ("EPA:BBB", "Beta", true, 2.0, 100.0),
                ]),
            ),
            (
                "Crypto",
                vec![
                    vec![Text("Symbol crypto"), Text("Nombre possédés"), Text("Montant")],
                    vec![Text("BTC-EUR"), Number(0.5), Skip],
                    vec![Skip, Skip, Text("1 500 €")],
                ],
            ),
            (
                "Mon Patrimoine",
                summary_sheet(&[("Résidence principale", Number(100_000.0))]),
            ),
        ],
    )?;
    let config = config_for(&dir)?;

    let source = Arc::new(FixedPriceSource::new(dec(60)));
    let mut dashboard = Dashboard::from_config(&config, source.clone());
    let report = dashboard.run(&config.workbook_path, Utc::now()).await?;
    let snapshot = &report.snapshot;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(report.notices.is_empty());
    // 10 × 60 + 2 × 60
    assert_eq!(snapshot.equities_total, dec(720));
    // 0.5 × 60 + 1 500 recorded for the symbol-less row
    assert_eq!(snapshot.crypto_total, dec(1_530));
    assert_eq!(snapshot.total, dec(100_000) + dec(720) + dec(1_530));
    assert_eq!(snapshot.top_holdings[0].name, "Alpha");

    Ok(())
}

#[tokio::test]
async fn unchanged_workbook_is_parsed_once_per_session() -> Result<()> {
    let dir = TempDir::new()?;
    write_reference_workbook(&dir.path().join("patrimoine.xlsx"))?;
    let config = config_for(&dir)?;

    let mut dashboard = Dashboard::from_config(&config, Arc::new(NoopQuoteSource));
    let first = dashboard.run(&config.workbook_path, Utc::now()).await?;
    let second = dashboard.run(&config.workbook_path, Utc::now()).await?;
    assert_eq!(first.snapshot.total, second.snapshot.total);

    std::fs::remove_file(&config.workbook_path)?;
    dashboard.invalidate_cache();
    assert!(dashboard.run(&config.workbook_path, Utc::now()).await.is_err());

    Ok(())
}

#[tokio::test]
async fn symbol_overrides_from_config_are_used() -> Result<()> {
    let dir = TempDir::new()?;
    write_reference_workbook(&dir.path().join("patrimoine.xlsx"))?;
    support::write_config(
        dir.path(),
        "[symbols.overrides]\n\"EPA:XYZ\" = \"XYZ.DE\"\n",
    )?;
    let config = ResolvedConfig::load(&dir.path().join("networth.toml"))?;

    let mut dashboard = Dashboard::from_config(&config, Arc::new(NoopQuoteSource));
    let report = dashboard.run(&config.workbook_path, Utc::now()).await?;

    assert_eq!(
        report.snapshot.equities[0].provider_symbol.as_deref(),
        Some("XYZ.DE")
    );

    Ok(())
}
