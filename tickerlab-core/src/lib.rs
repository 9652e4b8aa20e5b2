//! TickerLab Core: domain types, data providers, indicators, features, models, metrics.
//!
//! The pieces of the prediction pipeline, in data-flow order:
//! - Domain types and validation (tickers, date ranges, periods, bars)
//! - Data providers behind the `DataProvider` trait (Yahoo, CSV, synthetic)
//! - Indicators and the feature builder
//! - Regression models behind the `Regressor` trait, wrapped by `Predictor`
//! - Evaluation metrics
//!
//! Sequencing the stages is the runner's job; nothing here holds shared state
//! beyond the provider circuit breaker.

pub mod data;
pub mod domain;
pub mod features;
pub mod format;
pub mod indicators;
pub mod metrics;
pub mod model;
pub mod rng;
pub mod universe;
