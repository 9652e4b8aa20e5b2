//! Built-in ticker lists: popular large caps and a fixed sector grouping.
//!
//! These are closed constant tables. Every entry passes ticker validation,
//! which is why share-class symbols such as `BRK-B` are not listed.

use crate::domain::Ticker;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const POPULAR_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "UNH", "JNJ", "V", "PG", "JPM", "MA",
    "HD", "CVX", "PFE", "ABBV", "BAC", "KO", "AVGO", "PEP", "TMO", "COST", "WMT", "DHR", "ABT",
    "VZ", "ADBE", "CRM", "ACN", "NFLX", "TXN", "NKE", "QCOM", "CMCSA", "AMD", "INTC", "HON",
    "AMGN", "PM", "UNP", "IBM", "SPGI", "LOW",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Technology,
    Healthcare,
    Finance,
    ConsumerDefensive,
    Industrials,
    Energy,
    ProfessionalServices,
    InformationTechnology,
}

impl Sector {
    pub const ALL: [Sector; 8] = [
        Sector::Technology,
        Sector::Healthcare,
        Sector::Finance,
        Sector::ConsumerDefensive,
        Sector::Industrials,
        Sector::Energy,
        Sector::ProfessionalServices,
        Sector::InformationTechnology,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Healthcare => "Healthcare",
            Sector::Finance => "Finance",
            Sector::ConsumerDefensive => "Consumer Defensive",
            Sector::Industrials => "Industrials",
            Sector::Energy => "Energy",
            Sector::ProfessionalServices => "Professional Services",
            Sector::InformationTechnology => "Information Technology",
        }
    }

    pub fn tickers(&self) -> &'static [&'static str] {
        match self {
            Sector::Technology => &[
                "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "ADBE", "CRM", "NFLX", "TXN",
                "QCOM", "CMCSA", "AMD", "INTC", "AVGO",
            ],
            Sector::Healthcare => &["UNH", "JNJ", "PFE", "ABBV", "TMO", "ABT", "AMGN", "DHR"],
            Sector::Finance => &["JPM", "V", "MA", "BAC", "SPGI"],
            Sector::ConsumerDefensive => &["PG", "KO", "PEP", "COST", "WMT"],
            Sector::Industrials => &["HON", "UNP"],
            Sector::Energy => &["CVX"],
            Sector::ProfessionalServices => &["ACN"],
            Sector::InformationTechnology => &["IBM"],
        }
    }

    /// The sector a ticker is grouped under, if any.
    pub fn of(ticker: &Ticker) -> Option<Sector> {
        Sector::ALL
            .into_iter()
            .find(|s| s.tickers().contains(&ticker.as_str()))
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Popular tickers as validated values.
pub fn popular_tickers() -> Vec<Ticker> {
    POPULAR_TICKERS
        .iter()
        .filter_map(|s| Ticker::parse(s).ok())
        .collect()
}
