//! TickerLab Runner: pipeline orchestration, configuration, comparison, export.
//!
//! This crate builds on `tickerlab-core` to provide:
//! - TOML pipeline configuration with up-front validation
//! - The fetch → features → train → evaluate state machine
//! - Multi-ticker return and volatility comparison
//! - JSON / CSV / Parquet report export

pub mod compare;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod report;

pub use compare::{compare_tickers, Comparison, ComparisonEntry, ComparisonFailure};
pub use config::{ConfigError, PipelineConfig, ValidatedConfig};
pub use export::{
    export_comparison_csv, export_json, export_predictions_csv, import_json, save_artifacts,
    write_features_parquet,
};
pub use pipeline::{
    run_pipeline, ErrorKind, Pipeline, PipelineError, PipelineOutput, PipelineState, Stage,
};
pub use report::{Forecast, HeldOutPrediction, PipelineReport, SplitSummary, SCHEMA_VERSION};
