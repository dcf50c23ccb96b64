use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response from the currency service's `api/live` endpoint.
///
/// Rates are keyed by the concatenated pair, e.g. `"USDVND"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CurrencyQuote {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub privacy: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub quotes: HashMap<String, f64>,
    #[serde(default)]
    pub error: Option<CurrencyError>,
}

/// Error payload returned alongside `success: false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CurrencyError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub info: Option<String>,
}

impl CurrencyQuote {
    pub fn rate(&self, source: &str, target: &str) -> Option<f64> {
        let key = format!("{}{}", source.to_uppercase(), target.to_uppercase());
        self.quotes.get(&key).copied()
    }

    pub fn convert(&self, amount: f64, source: &str, target: &str) -> Option<f64> {
        self.rate(source, target).map(|rate| amount * rate)
    }
}
