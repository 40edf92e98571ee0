pub mod amount;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod duration;
pub mod format;
pub mod loader;
pub mod models;
pub mod quotes;
pub mod report;
pub mod symbols;
pub mod valuation;
pub mod workbook;
