use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Last close price per provider symbol. Symbols without a usable quote are
/// simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteTable(HashMap<String, Decimal>);

impl QuoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.0.get(symbol).copied()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, price: Decimal) {
        self.0.insert(symbol.into(), price);
    }

    pub fn with(mut self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.insert(symbol, price);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, Decimal) -> bool,
    {
        self.0.retain(|symbol, price| keep(symbol, *price));
    }
}

impl<S: Into<String>> FromIterator<(S, Decimal)> for QuoteTable {
    fn from_iter<I: IntoIterator<Item = (S, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(s, p)| (s.into(), p)).collect())
    }
}
