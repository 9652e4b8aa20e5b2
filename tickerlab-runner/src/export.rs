//! Report export: JSON, CSV and Parquet artifacts.
//!
//! - **JSON**: the full `PipelineReport`, with schema versioning
//! - **CSV**: held-out predictions for spreadsheets and plotting tools
//! - **Parquet**: the enriched price series (bars plus feature columns)
//!
//! Unknown schema versions are rejected on load.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::prelude::ParquetWriter;
use tickerlab_core::features::FeatureTable;

use crate::compare::Comparison;
use crate::report::{PipelineReport, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &PipelineReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize PipelineReport to JSON")
}

/// Deserialize a report, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<PipelineReport> {
    let report: PipelineReport =
        serde_json::from_str(json).context("failed to deserialize PipelineReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: date, actual, predicted, error
pub fn export_predictions_csv(report: &PipelineReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "actual", "predicted", "error"])?;
    for p in &report.predictions {
        wtr.write_record([
            p.date.to_string(),
            format!("{:.6}", p.actual),
            format!("{:.6}", p.predicted),
            format!("{:.6}", p.error()),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: ticker, total_return, annualized_volatility, bars
pub fn export_comparison_csv(comparison: &Comparison) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "total_return", "annualized_volatility", "bars"])?;
    for entry in comparison.ranked() {
        wtr.write_record([
            entry.ticker.to_string(),
            format!("{:.6}", entry.total_return),
            entry
                .annualized_volatility
                .map(|v| format!("{v:.6}"))
                .unwrap_or_default(),
            entry.normalized.len().to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Parquet ────────────────────────────────────────────────────────

pub fn write_features_parquet(table: &FeatureTable, path: &Path) -> Result<()> {
    let mut df = table
        .to_dataframe()
        .context("failed to build feature dataframe")?;
    let mut file = File::create(path)
        .with_context(|| format!("failed to create parquet file {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("failed to write feature parquet")?;
    Ok(())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save every artifact for one run.
///
/// Creates `{ticker}_{timestamp}/` under `output_dir` containing
/// `report.json`, `predictions.csv` and `features.parquet`, and returns its path.
pub fn save_artifacts(
    report: &PipelineReport,
    table: &FeatureTable,
    output_dir: &Path,
) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.ticker,
        report.generated_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)
        .context("failed to write report.json")?;
    std::fs::write(run_dir.join("predictions.csv"), export_predictions_csv(report)?)
        .context("failed to write predictions.csv")?;
    write_features_parquet(table, &run_dir.join("features.parquet"))?;

    Ok(run_dir)
}
