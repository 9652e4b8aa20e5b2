//! Serializable feature column descriptions.

use crate::indicators::{DailyReturn, Ema, Indicator, Lag, Rsi, Sma, Volatility};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("feature {column}: {reason}")]
    InvalidSpec { column: String, reason: String },

    #[error("duplicate feature column: {0}")]
    DuplicateColumn(String),

    #[error("no features requested")]
    Empty,
}

/// One feature column. Serialized as `{ kind = "sma", window = 20 }` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    Sma { window: usize },
    DailyReturn,
    Lag { k: usize },
    Ema { span: usize },
    Rsi { period: usize },
    Volatility { window: usize },
}

impl FeatureSpec {
    pub fn column_name(&self) -> String {
        match self {
            FeatureSpec::Sma { window } => format!("sma_{window}"),
            FeatureSpec::DailyReturn => "daily_return".to_string(),
            FeatureSpec::Lag { k } => format!("lag_{k}"),
            FeatureSpec::Ema { span } => format!("ema_{span}"),
            FeatureSpec::Rsi { period } => format!("rsi_{period}"),
            FeatureSpec::Volatility { window } => format!("volatility_{window}"),
        }
    }

    /// Reject parameters the indicator constructors would refuse.
    pub fn validate(&self) -> Result<(), FeatureError> {
        let (param, min) = match *self {
            FeatureSpec::DailyReturn => return Ok(()),
            FeatureSpec::Sma { window } => (window, 1),
            FeatureSpec::Lag { k } => (k, 1),
            FeatureSpec::Ema { span } => (span, 1),
            FeatureSpec::Rsi { period } => (period, 1),
            FeatureSpec::Volatility { window } => (window, 2),
        };
        if param < min {
            return Err(FeatureError::InvalidSpec {
                column: self.column_name(),
                reason: format!("window must be at least {min}"),
            });
        }
        Ok(())
    }

    /// Build the indicator. Call `validate` first.
    pub fn indicator(&self) -> Box<dyn Indicator> {
        match *self {
            FeatureSpec::Sma { window } => Box::new(Sma::new(window)),
            FeatureSpec::DailyReturn => Box::new(DailyReturn),
            FeatureSpec::Lag { k } => Box::new(Lag::new(k)),
            FeatureSpec::Ema { span } => Box::new(Ema::new(span)),
            FeatureSpec::Rsi { period } => Box::new(Rsi::new(period)),
            FeatureSpec::Volatility { window } => Box::new(Volatility::new(window)),
        }
    }
}
