use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minor units per whole unit when no per-currency override exists
pub const DEFAULT_MINOR_UNITS_PER_UNIT: u64 = 10_000_000;

/// Conversion from user-typed whole units to ledger minor units.
///
/// Every amount sent to the ledger is an integer count of minor units. The
/// factor is `default_scale` unless `overrides` names the currency
/// (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AmountScale {
    pub default_scale: u64,
    #[serde(default)]
    pub overrides: HashMap<String, u64>,
}

impl Default for AmountScale {
    fn default() -> Self {
        Self {
            default_scale: DEFAULT_MINOR_UNITS_PER_UNIT,
            overrides: HashMap::new(),
        }
    }
}

impl AmountScale {
    pub fn with_override(mut self, currency: impl Into<String>, scale: u64) -> Self {
        self.overrides.insert(currency.into().to_uppercase(), scale);
        self
    }

    pub fn scale_for(&self, currency: &str) -> u64 {
        self.overrides
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(currency))
            .map(|(_, scale)| *scale)
            .unwrap_or(self.default_scale)
    }

    /// `None` on overflow
    pub fn to_minor(&self, whole_units: u64, currency: &str) -> Option<u64> {
        whole_units.checked_mul(self.scale_for(currency))
    }
}

/// Parse a user-typed whole-unit amount. Only plain non-negative integers are accepted.
pub fn parse_whole_units(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
