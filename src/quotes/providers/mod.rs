#[cfg(feature = "yahoo")]
pub mod yahoo;

#[cfg(feature = "yahoo")]
pub use yahoo::YahooQuoteSource;
