mod fetcher;
mod models;
pub mod providers;
mod source;

pub use fetcher::{MissingQuotes, ProviderFailure, QuoteFetch, QuoteFetcher};
pub use models::QuoteTable;
pub use source::{NoopQuoteSource, QuoteSource};
