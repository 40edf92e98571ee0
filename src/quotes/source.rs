use anyhow::Result;

use super::QuoteTable;

/// A live quote provider answering many symbols in one round trip.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// Most recent close for each symbol. Unknown symbols are left out of
    /// the table; `Err` means the whole request failed.
    async fn fetch_last_close(&self, symbols: &[String]) -> Result<QuoteTable>;

    fn name(&self) -> &str;

    /// An offline source is never asked and its lack of prices is not
    /// reported.
    fn is_offline(&self) -> bool {
        false
    }
}

/// Source that never has prices, for offline runs.
pub struct NoopQuoteSource;

#[async_trait::async_trait]
impl QuoteSource for NoopQuoteSource {
    async fn fetch_last_close(&self, _symbols: &[String]) -> Result<QuoteTable> {
        Ok(QuoteTable::new())
    }

    fn name(&self) -> &str {
        "noop"
    }

    fn is_offline(&self) -> bool {
        true
    }
}
