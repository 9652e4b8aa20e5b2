//! Company metadata from the provider's quote summary.
//!
//! Every field is optional. A missing field renders as `"N/A"`; it never
//! fails the lookup.

use crate::format::{format_large_number, format_percentage, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl CompanyInfo {
    /// Display rows in a fixed order: (label, value-or-N/A).
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
        vec![
            ("Name", text(&self.name)),
            ("Sector", text(&self.sector)),
            ("Industry", text(&self.industry)),
            (
                "Market Cap",
                self.market_cap
                    .map(format_large_number)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            (
                "PE Ratio",
                self.pe_ratio
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            (
                "Dividend Yield",
                self.dividend_yield
                    .map(|v| format_percentage(v, 2))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
        ]
    }

    /// Number of fields the provider actually returned.
    pub fn known_fields(&self) -> usize {
        [
            self.name.is_some(),
            self.sector.is_some(),
            self.industry.is_some(),
            self.market_cap.is_some(),
            self.pe_ratio.is_some(),
            self.dividend_yield.is_some(),
        ]
        .iter()
        .filter(|known| **known)
        .count()
    }
}
