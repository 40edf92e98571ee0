use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Static (non-quoted) category of net worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    RealEstate,
    Liquidity,
    Crowd,
    Gold,
    LifeInsurance,
    Debt,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::RealEstate,
        Bucket::Liquidity,
        Bucket::Crowd,
        Bucket::Gold,
        Bucket::LifeInsurance,
        Bucket::Debt,
    ];

    /// Buckets added to net worth; `Debt` is subtracted.
    pub const ASSETS: [Bucket; 5] = [
        Bucket::RealEstate,
        Bucket::Liquidity,
        Bucket::Crowd,
        Bucket::Gold,
        Bucket::LifeInsurance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::RealEstate => "Real Estate",
            Bucket::Liquidity => "Liquidity",
            Bucket::Crowd => "Crowd-investing",
            Bucket::Gold => "Gold",
            Bucket::LifeInsurance => "Life Insurance",
            Bucket::Debt => "Debt",
        }
    }
}

/// Amount per static bucket. Missing buckets read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticBucketMap(BTreeMap<Bucket, Decimal>);

impl StaticBucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: Bucket) -> Decimal {
        self.0.get(&bucket).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn insert(&mut self, bucket: Bucket, amount: Decimal) {
        self.0.insert(bucket, amount);
    }

    pub fn with(mut self, bucket: Bucket, amount: Decimal) -> Self {
        self.insert(bucket, amount);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every asset bucket (everything but debt).
    pub fn assets_total(&self) -> Decimal {
        Bucket::ASSETS
            .iter()
            .map(|b| self.get(*b))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn debt(&self) -> Decimal {
        self.get(Bucket::Debt)
    }
}
