use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::{QuoteSource, QuoteTable};

/// The quote provider could not answer the batch at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub source: String,
    pub message: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quote provider {} failed: {}", self.source, self.message)
    }
}

/// The provider answered, but not for every requested symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingQuotes {
    pub source: String,
    /// Sorted provider symbols without a usable price.
    pub symbols: Vec<String>,
}

impl fmt::Display for MissingQuotes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quote provider {} has no price for {}",
            self.source,
            self.symbols.join(", ")
        )
    }
}

/// Outcome of one batched fetch. At most one of `failure` and `missing` is
/// set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteFetch {
    pub quotes: QuoteTable,
    pub failure: Option<ProviderFailure>,
    pub missing: Option<MissingQuotes>,
}

/// Sends every symbol of a run to the quote source in a single request and
/// turns provider errors into an empty table.
pub struct QuoteFetcher {
    source: Arc<dyn QuoteSource>,
}

impl QuoteFetcher {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn fetch<I, S>(&self, symbols: I) -> QuoteFetch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if unique.is_empty() {
            debug!("No symbols to quote, skipping price fetch");
            return QuoteFetch::default();
        }
        if self.source.is_offline() {
            debug!(source = self.source.name(), "Offline, skipping price fetch");
            return QuoteFetch::default();
        }

        let symbols: Vec<String> = unique.into_iter().collect();
        match self.source.fetch_last_close(&symbols).await {
            Ok(mut quotes) => {
                // `symbols` is sorted, it came out of a BTreeSet.
                quotes.retain(|symbol, price| {
                    price > Decimal::ZERO
                        && symbols
                            .binary_search_by(|s| s.as_str().cmp(symbol))
                            .is_ok()
                });
                let unresolved: Vec<String> = symbols
                    .iter()
                    .filter(|s| quotes.get(s).is_none())
                    .cloned()
                    .collect();
                let missing = if unresolved.is_empty() {
                    None
                } else {
                    warn!(
                        source = self.source.name(),
                        missing = unresolved.len(),
                        requested = symbols.len(),
                        "Some symbols have no quote"
                    );
                    Some(MissingQuotes {
                        source: self.source.name().to_string(),
                        symbols: unresolved,
                    })
                };
                QuoteFetch {
                    quotes,
                    failure: None,
                    missing,
                }
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "Failed to fetch quotes");
                QuoteFetch {
                    quotes: QuoteTable::new(),
                    failure: Some(ProviderFailure {
                        source: self.source.name().to_string(),
                        message: e.to_string(),
                    }),
                    missing: None,
                }
            }
        }
    }
}
