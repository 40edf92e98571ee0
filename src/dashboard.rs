//! One dashboard run: workbook → holdings → quotes → valuation → snapshot.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::cache::WorkbookCache;
use crate::config::ResolvedConfig;
use crate::loader::{self, SectionError, WorkbookLayout};
use crate::quotes::{MissingQuotes, ProviderFailure, QuoteFetcher, QuoteSource};
use crate::symbols::SymbolTranslator;
use crate::valuation::{self, NetWorthSnapshot, DEFAULT_TOP_HOLDINGS};
use crate::workbook::Workbook;

/// A non-fatal problem the user should see next to the results.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Section(SectionError),
    Provider(ProviderFailure),
    MissingQuotes(MissingQuotes),
}

impl Notice {
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Section(_) => "section",
            Notice::Provider(_) => "provider",
            Notice::MissingQuotes(_) => "missing_quotes",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Section(err) => write!(f, "{err}"),
            Notice::Provider(failure) => write!(f, "{failure}"),
            Notice::MissingQuotes(missing) => write!(f, "{missing}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub snapshot: NetWorthSnapshot,
    pub notices: Vec<Notice>,
}

pub struct Dashboard {
    layout: WorkbookLayout,
    translator: SymbolTranslator,
    fetcher: QuoteFetcher,
    cache: WorkbookCache,
    top_limit: usize,
}

impl Dashboard {
    pub fn new(layout: WorkbookLayout, translator: SymbolTranslator, fetcher: QuoteFetcher) -> Self {
        Self {
            layout,
            translator,
            fetcher,
            cache: WorkbookCache::new(),
            top_limit: DEFAULT_TOP_HOLDINGS,
        }
    }

    /// Build a dashboard from resolved config and a quote source.
    pub fn from_config(config: &ResolvedConfig, source: Arc<dyn QuoteSource>) -> Self {
        let translator = SymbolTranslator::default().with_overrides(&config.symbols.overrides);
        Self::new(config.layout.clone(), translator, QuoteFetcher::new(source))
            .with_top_holdings(config.display.top_holdings)
    }

    pub fn with_top_holdings(mut self, limit: usize) -> Self {
        self.top_limit = limit;
        self
    }

    /// Drop the cached workbook.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Run against the workbook at `path`. Failing to open the workbook is
    /// the only error; everything else degrades into notices.
    pub async fn run(&mut self, path: &Path, as_of: DateTime<Utc>) -> Result<DashboardReport> {
        let workbook = self
            .cache
            .get_or_load(path)
            .with_context(|| format!("Failed to load workbook: {}", path.display()))?;
        Ok(self.run_workbook(&workbook, as_of).await)
    }

    /// Run against an already parsed workbook.
    pub async fn run_workbook(&self, workbook: &Workbook, as_of: DateTime<Utc>) -> DashboardReport {
        let loaded = loader::load(workbook, &self.layout, &self.translator);
        let mut notices: Vec<Notice> = loaded.errors.into_iter().map(Notice::Section).collect();

        let symbols = loaded
            .equities
            .iter()
            .chain(loaded.crypto.iter())
            .filter_map(|r| r.provider_symbol.as_deref());
        let fetch = self.fetcher.fetch(symbols).await;
        if let Some(failure) = fetch.failure {
            notices.push(Notice::Provider(failure));
        }
        if let Some(missing) = fetch.missing {
            notices.push(Notice::MissingQuotes(missing));
        }

        let valuation = valuation::value(&loaded.equities, &loaded.crypto, &fetch.quotes);
        let snapshot =
            NetWorthSnapshot::assemble(valuation, loaded.buckets, as_of, self.top_limit);

        info!(
            total = %snapshot.total,
            equities = snapshot.equities.len(),
            crypto = snapshot.crypto.len(),
            quotes = fetch.quotes.len(),
            source = self.fetcher.source_name(),
            notices = notices.len(),
            "Computed net worth"
        );

        DashboardReport { snapshot, notices }
    }
}
