//! Output shapes for the CLI: JSON for scripts and a plain text dashboard.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::dashboard::DashboardReport;
use crate::format::{format_amount, format_share};
use crate::models::{Bucket, HoldingRecord, StaticBucketMap};
use crate::valuation::{CompositionSlice, TopHolding};

/// JSON output for a dashboard run
#[derive(Serialize)]
pub struct DashboardOutput<'a> {
    pub as_of: String,
    pub total: Decimal,
    pub total_display: String,
    pub equities_total: Decimal,
    pub crypto_total: Decimal,
    pub buckets: &'a StaticBucketMap,
    pub composition: Vec<CompositionSlice>,
    pub top_holdings: &'a [TopHolding],
    pub equities: &'a [HoldingRecord],
    pub crypto: &'a [HoldingRecord],
    pub notices: Vec<NoticeOutput>,
}

/// JSON output for a notice
#[derive(Serialize)]
pub struct NoticeOutput {
    pub kind: &'static str,
    pub message: String,
}

pub fn dashboard_output<'a>(
    report: &'a DashboardReport,
    display: &DisplayConfig,
) -> DashboardOutput<'a> {
    let snapshot = &report.snapshot;
    DashboardOutput {
        as_of: snapshot.as_of.to_rfc3339(),
        total: snapshot.total,
        total_display: format_amount(snapshot.total, display),
        equities_total: snapshot.equities_total,
        crypto_total: snapshot.crypto_total,
        buckets: &snapshot.buckets,
        composition: snapshot.composition(),
        top_holdings: &snapshot.top_holdings,
        equities: &snapshot.equities,
        crypto: &snapshot.crypto,
        notices: report
            .notices
            .iter()
            .map(|n| NoticeOutput {
                kind: n.kind(),
                message: n.to_string(),
            })
            .collect(),
    }
}

/// Human-readable dashboard.
pub fn render_text(report: &DashboardReport, display: &DisplayConfig) -> String {
    let snapshot = &report.snapshot;
    let amount = |v: Decimal| format_amount(v, display);
    let mut out = String::new();

    for notice in &report.notices {
        let _ = writeln!(out, "warning: {notice}");
    }
    if !report.notices.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "Net worth        {}", amount(snapshot.total));
    let _ = writeln!(out, "Equities (live)  {}", amount(snapshot.equities_total));
    let _ = writeln!(out, "Crypto (live)    {}", amount(snapshot.crypto_total));
    let gold = snapshot.buckets.get(Bucket::Gold);
    if !gold.is_zero() {
        let _ = writeln!(out, "Gold             {}", amount(gold));
    }
    let _ = writeln!(out, "Debt             {}", amount(snapshot.buckets.debt()));

    out.push_str("\nComposition\n");
    let shares = snapshot.composition_shares();
    for (slice, (_, share)) in snapshot.composition().iter().zip(shares) {
        let _ = writeln!(
            out,
            "  {:<16} {:>16}  {:>7}",
            slice.label,
            amount(slice.value),
            format_share(share)
        );
    }

    if !snapshot.top_holdings.is_empty() {
        out.push_str("\nTop holdings\n");
        for (rank, holding) in snapshot.top_holdings.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {:<30} {:>16}",
                rank + 1,
                holding.name,
                amount(holding.line_total)
            );
        }
    }

    out
}
