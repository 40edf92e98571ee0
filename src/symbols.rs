//! Translation of brokerage codes (`EPA:AI`, `BTCEUR`) into the symbols the
//! quote provider expects (`AI.PA`, `BTC-EUR`).

use std::collections::BTreeMap;

use crate::workbook::Cell;

/// Built-in special cases, checked verbatim.
const EXACT_RULES: &[(&str, &str)] = &[
    ("EPA:CW8-ETFP", "CW8.PA"),
    ("EPA:WPEA", "WPEA.PA"),
    ("EPA:PAEEM", "PAEEM.PA"),
    ("EPA:ETZ", "ETZ.PA"),
    ("BIT:1BAYN", "BAYN.DE"),
    ("BIT:RACE", "RACE.MI"),
    ("BTCEUR", "BTC-EUR"),
    ("ETHEUR", "ETH-EUR"),
    ("NQSOL", "SOL-EUR"),
    ("BNB", "BNB-EUR"),
];

/// Exchange prefixes (Google Finance style) and the matching market suffix.
const PREFIX_RULES: &[(&str, &str)] = &[
    ("EPA:", ".PA"),
    ("EBR:", ".BR"),
    ("AMS:", ".AS"),
    ("ETR:", ".DE"),
    ("FRA:", ".F"),
    ("BIT:", ".MI"),
    ("LON:", ".L"),
    ("SWX:", ".SW"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolRule {
    /// Replace `from` with `to` when the symbol equals `from` exactly.
    Exact { from: String, to: String },
    /// Strip `prefix` and append `suffix`.
    Prefix { prefix: String, suffix: String },
}

impl SymbolRule {
    pub fn exact(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Exact {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn prefix(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

/// Ordered rule list. Every exact rule is tried before any prefix rule;
/// within each kind, earlier rules win.
#[derive(Debug, Clone)]
pub struct SymbolTranslator {
    rules: Vec<SymbolRule>,
}

impl Default for SymbolTranslator {
    fn default() -> Self {
        let rules = EXACT_RULES
            .iter()
            .map(|(from, to)| SymbolRule::exact(*from, *to))
            .chain(
                PREFIX_RULES
                    .iter()
                    .map(|(prefix, suffix)| SymbolRule::prefix(*prefix, *suffix)),
            )
            .collect();
        Self { rules }
    }
}

impl SymbolTranslator {
    pub fn new(rules: Vec<SymbolRule>) -> Self {
        Self { rules }
    }

    /// Put user-supplied exact mappings ahead of the existing rules.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        let mut rules: Vec<SymbolRule> = overrides
            .iter()
            .map(|(from, to)| SymbolRule::exact(from.trim(), to.trim()))
            .collect();
        rules.append(&mut self.rules);
        self.rules = rules;
        self
    }

    /// Translate a raw code. `None` in (or a blank code) gives `None` out;
    /// unknown codes pass through unchanged.
    pub fn translate(&self, raw: Option<&str>) -> Option<String> {
        let symbol = raw?.trim();
        if symbol.is_empty() {
            return None;
        }

        let exact = self.rules.iter().find_map(|rule| match rule {
            SymbolRule::Exact { from, to } if from == symbol => Some(to.clone()),
            _ => None,
        });
        if exact.is_some() {
            return exact;
        }

        let prefixed = self.rules.iter().find_map(|rule| match rule {
            SymbolRule::Prefix { prefix, suffix } => symbol
                .strip_prefix(prefix.as_str())
                .filter(|rest| !rest.is_empty())
                .map(|rest| format!("{rest}{suffix}")),
            _ => None,
        });

        Some(prefixed.unwrap_or_else(|| symbol.to_string()))
    }

    /// Translate the code held in a spreadsheet cell.
    pub fn translate_cell(&self, cell: Option<&Cell>) -> Option<String> {
        let cell = cell?;
        if cell.is_blank() {
            return None;
        }
        let text = cell.text();
        self.translate(Some(text.as_ref()))
    }
}
