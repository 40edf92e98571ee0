//! Turns parsed holdings and a quote table into line totals, bucket totals
//! and the final net worth.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Bucket, HoldingRecord, StaticBucketMap};
use crate::quotes::QuoteTable;

/// Number of equity lines shown in the top holdings table.
pub const DEFAULT_TOP_HOLDINGS: usize = 5;

/// Valued copies of the input records plus their totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Valuation {
    pub equities: Vec<HoldingRecord>,
    pub crypto: Vec<HoldingRecord>,
    pub equities_total: Decimal,
    pub crypto_total: Decimal,
}

/// Value every record against `quotes`. Inputs are not modified, so running
/// this twice on the same data gives the same result.
pub fn value(
    equities: &[HoldingRecord],
    crypto: &[HoldingRecord],
    quotes: &QuoteTable,
) -> Valuation {
    let equities: Vec<HoldingRecord> = equities.iter().map(|r| value_equity(r, quotes)).collect();
    let crypto: Vec<HoldingRecord> = crypto.iter().map(|r| value_crypto(r, quotes)).collect();

    let equities_total = saturating_sum(equities.iter().map(|r| r.line_total));
    let manual_total = saturating_sum(
        crypto
            .iter()
            .filter(|r| r.is_manual())
            .map(|r| r.recorded_amount),
    );
    let crypto_total =
        saturating_sum(crypto.iter().map(|r| r.line_total)).saturating_add(manual_total);

    Valuation {
        equities,
        crypto,
        equities_total,
        crypto_total,
    }
}

/// Sum that stops at `Decimal::MAX` instead of panicking.
fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

fn live_price(record: &HoldingRecord, quotes: &QuoteTable) -> Option<Decimal> {
    record
        .provider_symbol
        .as_deref()
        .and_then(|symbol| quotes.get(symbol))
}

/// Quantity times the live price, or times the cost basis when there is no
/// positive live price.
pub fn value_equity(record: &HoldingRecord, quotes: &QuoteTable) -> HoldingRecord {
    let live = live_price(record, quotes);
    let effective = match live {
        Some(price) if price > Decimal::ZERO => price,
        _ => record.cost_basis,
    };

    HoldingRecord {
        live_price: live,
        line_total: record.quantity.saturating_mul(effective),
        ..record.clone()
    }
}

/// Quantity times the live price. No quote means a zero line; the manual
/// amount of symbol-less rows is accounted for in [`value`].
pub fn value_crypto(record: &HoldingRecord, quotes: &QuoteTable) -> HoldingRecord {
    let live = live_price(record, quotes);
    let price = live.unwrap_or(Decimal::ZERO);

    HoldingRecord {
        live_price: live,
        line_total: record.quantity.saturating_mul(price),
        ..record.clone()
    }
}

/// Assets minus debt.
pub fn net_worth(
    buckets: &StaticBucketMap,
    equities_total: Decimal,
    crypto_total: Decimal,
) -> Decimal {
    buckets
        .assets_total()
        .saturating_add(equities_total)
        .saturating_add(crypto_total)
        .saturating_sub(buckets.debt())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopHolding {
    pub name: String,
    pub line_total: Decimal,
}

/// Equity lines by value, highest first. Ties keep sheet order.
pub fn top_holdings(equities: &[HoldingRecord], limit: usize) -> Vec<TopHolding> {
    let mut ranked: Vec<&HoldingRecord> = equities.iter().collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.line_total.cmp(&a.line_total));
    ranked
        .into_iter()
        .take(limit)
        .map(|r| TopHolding {
            name: r.display_name.clone(),
            line_total: r.line_total,
        })
        .collect()
}

/// Slices of the composition chart, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    RealEstate,
    Equities,
    LifeInsurance,
    Crypto,
    Liquidity,
    Crowd,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::RealEstate,
        Category::Equities,
        Category::LifeInsurance,
        Category::Crypto,
        Category::Liquidity,
        Category::Crowd,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::RealEstate => "Real Estate",
            Category::Equities => "Equities",
            Category::LifeInsurance => "Life Insurance",
            Category::Crypto => "Crypto",
            Category::Liquidity => "Liquidity",
            Category::Crowd => "Crowd-investing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSlice {
    pub category: Category,
    pub label: String,
    pub value: Decimal,
}

/// The single output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSnapshot {
    pub as_of: DateTime<Utc>,
    pub total: Decimal,
    pub equities_total: Decimal,
    pub crypto_total: Decimal,
    pub buckets: StaticBucketMap,
    pub top_holdings: Vec<TopHolding>,
    pub equities: Vec<HoldingRecord>,
    pub crypto: Vec<HoldingRecord>,
}

impl NetWorthSnapshot {
    pub fn assemble(
        valuation: Valuation,
        buckets: StaticBucketMap,
        as_of: DateTime<Utc>,
        top_limit: usize,
    ) -> Self {
        let total = net_worth(&buckets, valuation.equities_total, valuation.crypto_total);
        let top_holdings = top_holdings(&valuation.equities, top_limit);

        Self {
            as_of,
            total,
            equities_total: valuation.equities_total,
            crypto_total: valuation.crypto_total,
            buckets,
            top_holdings,
            equities: valuation.equities,
            crypto: valuation.crypto,
        }
    }

    /// Chart data. Gold and debt are not charted.
    pub fn composition(&self) -> Vec<CompositionSlice> {
        Category::ALL
            .iter()
            .map(|category| {
                let value = match category {
                    Category::RealEstate => self.buckets.get(Bucket::RealEstate),
                    Category::Equities => self.equities_total,
                    Category::LifeInsurance => self.buckets.get(Bucket::LifeInsurance),
                    Category::Crypto => self.crypto_total,
                    Category::Liquidity => self.buckets.get(Bucket::Liquidity),
                    Category::Crowd => self.buckets.get(Bucket::Crowd),
                };
                CompositionSlice {
                    category: *category,
                    label: category.label().to_string(),
                    value,
                }
            })
            .collect()
    }

    /// Share of each slice in the charted total, as a fraction.
    pub fn composition_shares(&self) -> Vec<(Category, Decimal)> {
        let slices = self.composition();
        let charted = saturating_sum(slices.iter().map(|s| s.value));
        slices
            .into_iter()
            .map(|s| {
                let share = match charted.cmp(&Decimal::ZERO) {
                    Ordering::Greater => s.value / charted,
                    _ => Decimal::ZERO,
                };
                (s.category, share)
            })
            .collect()
    }
}
