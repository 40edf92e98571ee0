use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingKind {
    Equity,
    Crypto,
}

/// One equity or crypto line read from the workbook.
///
/// `provider_symbol` is set at load time. `live_price` and `line_total` are
/// only meaningful on records returned by the valuation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub kind: HoldingKind,
    pub internal_code: String,
    pub display_name: String,
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    /// Amount typed into the sheet for manually tracked crypto positions.
    pub recorded_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_price: Option<Decimal>,
    pub line_total: Decimal,
}

impl HoldingRecord {
    pub fn equity(
        internal_code: impl Into<String>,
        display_name: impl Into<String>,
        quantity: Decimal,
        cost_basis: Decimal,
    ) -> Self {
        Self {
            kind: HoldingKind::Equity,
            internal_code: internal_code.into(),
            display_name: display_name.into(),
            quantity,
            cost_basis,
            recorded_amount: Decimal::ZERO,
            provider_symbol: None,
            live_price: None,
            line_total: Decimal::ZERO,
        }
    }

    /// Crypto lines are named after their code; cost basis is not tracked.
    pub fn crypto(
        internal_code: impl Into<String>,
        quantity: Decimal,
        recorded_amount: Decimal,
    ) -> Self {
        let internal_code = internal_code.into();
        Self {
            kind: HoldingKind::Crypto,
            display_name: internal_code.clone(),
            internal_code,
            quantity,
            cost_basis: Decimal::ZERO,
            recorded_amount,
            provider_symbol: None,
            live_price: None,
            line_total: Decimal::ZERO,
        }
    }

    pub fn with_provider_symbol(mut self, symbol: Option<String>) -> Self {
        self.provider_symbol = symbol;
        self
    }

    /// Manually tracked positions carry no provider symbol.
    pub fn is_manual(&self) -> bool {
        self.provider_symbol.is_none()
    }
}
