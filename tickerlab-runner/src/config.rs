//! Pipeline configuration, loaded from TOML or built from CLI flags.
//!
//! `PipelineConfig` holds raw, user-supplied values. `validate` turns it into
//! a `ValidatedConfig` whose ticker, window and feature set are already
//! checked, so no stage downstream needs to re-validate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use tickerlab_core::data::FetchSettings;
use tickerlab_core::domain::{DateRange, FetchWindow, Period, Ticker, ValidationError};
use tickerlab_core::features::{FeatureBuilder, FeatureError, FeatureSpec, Target};
use tickerlab_core::model::{ModelError, ModelKind, SplitPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse pipeline TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize pipeline config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("invalid model settings: {0}")]
    Model(#[from] ModelError),

    #[error("test ratio must be strictly between 0 and 1, got {0}")]
    InvalidTestRatio(f64),

    #[error("give either a period or a start/end range, not both")]
    ConflictingWindow,

    #[error("a date range needs both a start and an end date")]
    IncompleteRange,
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_features() -> Vec<FeatureSpec> {
    FeatureBuilder::default_specs()
}

/// Raw pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub ticker: String,

    /// Period code such as `1y` or `6mo`. Defaults to `1y` when no range is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,

    /// `YYYY-MM-DD`, paired with `end`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    #[serde(default)]
    pub target: Target,

    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    #[serde(default)]
    pub standardize: bool,

    #[serde(default = "default_features")]
    pub features: Vec<FeatureSpec>,

    #[serde(default)]
    pub model: ModelKind,

    #[serde(default)]
    pub split: SplitPolicy,

    #[serde(default)]
    pub fetch: FetchSettings,
}

impl PipelineConfig {
    /// Defaults for everything but the ticker.
    pub fn for_ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            period: None,
            start: None,
            end: None,
            target: Target::default(),
            test_ratio: default_test_ratio(),
            standardize: false,
            features: default_features(),
            model: ModelKind::default(),
            split: SplitPolicy::default(),
            fetch: FetchSettings::default(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against `today`. Ticker and dates are checked before
    /// anything else, and nothing here touches the network.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedConfig, ConfigError> {
        let ticker = Ticker::parse(&self.ticker)?;
        let window = self.window(today)?;

        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ConfigError::InvalidTestRatio(self.test_ratio));
        }
        let features = FeatureBuilder::new(self.features.clone())?;
        self.model.validate()?;

        Ok(ValidatedConfig {
            ticker,
            window,
            features,
            target: self.target,
            model: self.model,
            test_ratio: self.test_ratio,
            split: self.split,
            standardize: self.standardize,
            fetch: self.fetch.clone(),
        })
    }

    fn window(&self, today: NaiveDate) -> Result<FetchWindow, ConfigError> {
        match (&self.period, &self.start, &self.end) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ConfigError::ConflictingWindow),
            (_, Some(start), Some(end)) => {
                Ok(FetchWindow::Range(DateRange::parse(start, end, today)?))
            }
            (_, Some(_), None) | (_, None, Some(_)) => Err(ConfigError::IncompleteRange),
            (Some(code), None, None) => Ok(FetchWindow::Period(code.parse::<Period>()?)),
            (None, None, None) => Ok(FetchWindow::default()),
        }
    }
}

/// Settings that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub ticker: Ticker,
    pub window: FetchWindow,
    pub features: FeatureBuilder,
    pub target: Target,
    pub model: ModelKind,
    pub test_ratio: f64,
    pub split: SplitPolicy,
    pub standardize: bool,
    pub fetch: FetchSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerlab_core::domain::DateRangeIssue;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config = PipelineConfig::from_toml(r#"ticker = "aapl""#).unwrap();
        assert_eq!(config, PipelineConfig::for_ticker("aapl"));

        let validated = config.validate(today()).unwrap();
        assert_eq!(validated.ticker.as_str(), "AAPL");
        assert_eq!(validated.window, FetchWindow::Period(Period::OneYear));
        assert_eq!(validated.features.specs().len(), 3);
    }

    #[test]
    fn full_toml() {
        let toml = r#"
ticker = "MSFT"
start = "2023-01-01"
end = "2024-12-31"
target = "forward_return"
test_ratio = 0.25
standardize = true

[[features]]
kind = "sma"
window = 10

[[features]]
kind = "rsi"
period = 14

[model]
type = "random_forest"
n_trees = 50
max_depth = 8

[split]
policy = "shuffled"
seed = 7

[fetch]
timeout_secs = 10
"#;
        let validated = PipelineConfig::from_toml(toml).unwrap().validate(today()).unwrap();
        assert!(matches!(validated.window, FetchWindow::Range(_)));
        assert_eq!(validated.target, Target::ForwardReturn);
        assert_eq!(validated.split, SplitPolicy::Shuffled { seed: 7 });
        assert_eq!(
            validated.model,
            ModelKind::RandomForest {
                n_trees: 50,
                max_depth: Some(8),
                min_samples_split: 2,
                seed: 42
            }
        );
        assert_eq!(validated.fetch.timeout_secs, 10);
        assert_eq!(validated.fetch.max_retries, 3);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = PipelineConfig::for_ticker("IBM");
        config.period = Some("6mo".into());
        config.model = ModelKind::random_forest();
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn ticker_is_checked_first() {
        let mut config = PipelineConfig::for_ticker("TOOLONG");
        config.test_ratio = 5.0;
        assert!(matches!(
            config.validate(today()),
            Err(ConfigError::Validation(ValidationError::InvalidTicker(_)))
        ));
    }

    #[test]
    fn range_errors_surface_their_issue() {
        let mut config = PipelineConfig::for_ticker("AAPL");
        config.start = Some("2024-05-01".into());
        config.end = Some("2024-01-01".into());
        assert!(matches!(
            config.validate(today()),
            Err(ConfigError::Validation(ValidationError::InvalidDateRange(
                DateRangeIssue::StartNotBeforeEnd
            )))
        ));
    }

    #[test]
    fn window_combinations() {
        let mut config = PipelineConfig::for_ticker("AAPL");
        config.period = Some("1y".into());
        config.start = Some("2024-01-01".into());
        assert!(matches!(config.validate(today()), Err(ConfigError::ConflictingWindow)));

        config.period = None;
        assert!(matches!(config.validate(today()), Err(ConfigError::IncompleteRange)));

        config.start = None;
        config.period = Some("2w".into());
        assert!(matches!(
            config.validate(today()),
            Err(ConfigError::Validation(ValidationError::UnknownPeriod(_)))
        ));
    }

    #[test]
    fn bad_ratio_and_features() {
        let mut config = PipelineConfig::for_ticker("AAPL");
        config.test_ratio = 1.0;
        assert!(matches!(config.validate(today()), Err(ConfigError::InvalidTestRatio(_))));

        config.test_ratio = 0.2;
        config.features = vec![FeatureSpec::Sma { window: 0 }];
        assert!(matches!(config.validate(today()), Err(ConfigError::Feature(_))));
    }

    proptest::proptest! {
        #[test]
        fn test_ratio_accepted_only_inside_unit_interval(ratio in -1.0f64..2.0) {
            let mut config = PipelineConfig::for_ticker("AAPL");
            config.test_ratio = ratio;
            let accepted = config.validate(today()).is_ok();
            proptest::prop_assert_eq!(accepted, ratio > 0.0 && ratio < 1.0);
        }
    }
}
