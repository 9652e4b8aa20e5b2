//! TickerLab CLI: price history, company info, next-day prediction, comparison.
//!
//! Commands:
//! - `fetch`: download history for one ticker and print recent bars
//! - `info`: company metadata, with `N/A` for anything the provider omits
//! - `predict`: fetch, build features, train, evaluate, forecast the next close
//! - `compare`: normalized performance of several tickers over one window
//! - `tickers`: the built-in popular and sector lists

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tickerlab_core::data::{
    CircuitBreaker, CsvProvider, DataProvider, FetchRequest, FetchSettings, SyntheticProvider,
    YahooProvider,
};
use tickerlab_core::domain::{DateRange, FetchWindow, Period, Ticker};
use tickerlab_core::format::{
    format_currency, format_large_number, format_percentage, NOT_AVAILABLE,
};
use tickerlab_core::model::{ModelKind, SplitPolicy};
use tickerlab_core::universe::{popular_tickers, Sector, POPULAR_TICKERS};
use tickerlab_runner::{
    compare_tickers, export_comparison_csv, save_artifacts, Pipeline, PipelineConfig,
};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickerlab",
    version,
    about = "TickerLab CLI: stock history, features and next-day price prediction"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Yahoo Finance over HTTP.
    #[default]
    Yahoo,
    /// Deterministic offline random walk.
    Synthetic,
    /// `{TICKER}.csv` files from --csv-dir.
    Csv,
}

/// Flags shared by every command that reads price history.
#[derive(clap::Args, Debug, Clone)]
struct SourceArgs {
    /// Where price history comes from.
    #[arg(long, value_enum, default_value_t = Source::Yahoo)]
    source: Source,

    /// Directory of CSV files (with --source csv).
    #[arg(long, default_value = "data")]
    csv_dir: PathBuf,
}

/// Either a named period or an explicit start/end pair.
#[derive(clap::Args, Debug, Clone)]
struct WindowArgs {
    /// Lookback period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    period: Option<String>,

    /// Start date (YYYY-MM-DD). Requires --end.
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Requires --start.
    #[arg(long, requires = "start")]
    end: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily price history and print the most recent bars.
    Fetch {
        /// Ticker symbol (e.g., AAPL).
        ticker: String,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Number of trailing bars to print.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Show company metadata.
    Info {
        /// Ticker symbol.
        ticker: String,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Train a model on engineered features and predict the next close.
    Predict {
        /// Ticker symbol. Ignored when --config is given.
        ticker: Option<String>,

        /// Path to a TOML pipeline config.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Model: linear or random_forest.
        #[arg(long)]
        model: Option<String>,

        /// Fraction of rows held out for evaluation.
        #[arg(long)]
        test_ratio: Option<f64>,

        /// Standardize features using training statistics.
        #[arg(long, default_value_t = false)]
        standardize: bool,

        /// Shuffle rows with this seed instead of a chronological split.
        #[arg(long)]
        shuffle_seed: Option<u64>,

        /// Save report.json, predictions.csv and features.parquet here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Compare normalized performance across tickers.
    Compare {
        /// Tickers to compare. Combined with --sector when both are given.
        tickers: Vec<String>,

        /// Add every ticker of a built-in sector.
        #[arg(long)]
        sector: Option<String>,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Also write the ranking to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List built-in tickers.
    Tickers {
        /// Only this sector.
        #[arg(long)]
        sector: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fetch {
            ticker,
            window,
            source,
            tail,
        } => run_fetch(&ticker, &window, &source, tail),
        Commands::Info { ticker, source } => run_info(&ticker, &source),
        Commands::Predict {
            ticker,
            config,
            window,
            source,
            model,
            test_ratio,
            standardize,
            shuffle_seed,
            output_dir,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => {
                    let Some(ticker) = ticker else {
                        bail!("predict needs a TICKER or --config");
                    };
                    let mut config = PipelineConfig::for_ticker(ticker);
                    config.period = window.period;
                    config.start = window.start;
                    config.end = window.end;
                    if let Some(model) = model {
                        config.model = model.parse::<ModelKind>()?;
                    }
                    if let Some(ratio) = test_ratio {
                        config.test_ratio = ratio;
                    }
                    config.standardize = standardize;
                    if let Some(seed) = shuffle_seed {
                        config.split = SplitPolicy::Shuffled { seed };
                    }
                    config
                }
            };
            run_predict(&config, &source, output_dir.as_deref())
        }
        Commands::Compare {
            tickers,
            sector,
            window,
            source,
            csv,
        } => run_compare(tickers, sector.as_deref(), &window, &source, csv.as_deref()),
        Commands::Tickers { sector } => run_tickers(sector.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    PipelineConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn build_provider(args: &SourceArgs, fetch: FetchSettings) -> Result<Box<dyn DataProvider>> {
    let provider: Box<dyn DataProvider> = match args.source {
        Source::Yahoo => Box::new(YahooProvider::new(
            fetch,
            Arc::new(CircuitBreaker::default_provider()),
        )?),
        Source::Synthetic => Box::new(SyntheticProvider::new(today())),
        Source::Csv => {
            if !args.csv_dir.is_dir() {
                bail!("CSV directory not found: {}", args.csv_dir.display());
            }
            Box::new(CsvProvider::new(&args.csv_dir))
        }
    };
    debug!(provider = provider.name(), "data provider ready");
    Ok(provider)
}

fn resolve_window(args: &WindowArgs) -> Result<FetchWindow> {
    match (&args.period, &args.start, &args.end) {
        (Some(code), _, _) => Ok(FetchWindow::Period(code.parse::<Period>()?)),
        (None, Some(start), Some(end)) => {
            Ok(FetchWindow::Range(DateRange::parse(start, end, today())?))
        }
        (None, None, None) => Ok(FetchWindow::default()),
        _ => bail!("--start and --end must be given together"),
    }
}

fn parse_sector(raw: &str) -> Result<Sector> {
    let wanted = normalize_sector(raw);
    match Sector::ALL
        .into_iter()
        .find(|s| normalize_sector(s.name()) == wanted)
    {
        Some(sector) => Ok(sector),
        None => {
            let known: Vec<&str> = Sector::ALL.iter().map(|s| s.name()).collect();
            bail!("unknown sector '{raw}'. Known sectors: {}", known.join(", "))
        }
    }
}

fn normalize_sector(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ─── fetch ──────────────────────────────────────────────────────────

fn run_fetch(ticker: &str, window: &WindowArgs, source: &SourceArgs, tail: usize) -> Result<()> {
    let ticker = Ticker::parse(ticker)?;
    let window = resolve_window(window)?;
    let provider = build_provider(source, FetchSettings::default())?;

    info!(ticker = %ticker, window = %window, "fetching history");
    let series = provider
        .fetch_history(&FetchRequest::new(ticker.clone(), window))?
        .into_result()?;

    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        bail!("no data for {ticker}");
    };
    println!("{ticker}: {} bars, {first} to {last} ({window})", series.len());
    println!();
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    let bars = series.bars();
    for bar in &bars[bars.len().saturating_sub(tail)..] {
        println!(
            "{:<12} {:>12} {:>12} {:>12} {:>12} {:>10}",
            bar.date,
            format_currency(bar.open, "USD"),
            format_currency(bar.high, "USD"),
            format_currency(bar.low, "USD"),
            format_currency(bar.close, "USD"),
            format_large_number(bar.volume as f64),
        );
    }

    let closes = series.closes();
    if let (Some(&first_close), Some(&last_close)) = (closes.first(), closes.last()) {
        if first_close > 0.0 {
            println!();
            println!(
                "Change over window: {}",
                format_percentage(last_close / first_close - 1.0, 2)
            );
        }
    }
    Ok(())
}

// ─── info ───────────────────────────────────────────────────────────

fn run_info(ticker: &str, source: &SourceArgs) -> Result<()> {
    let ticker = Ticker::parse(ticker)?;
    let provider = build_provider(source, FetchSettings::default())?;
    let company = provider.company_info(&ticker)?;

    println!("{ticker}");
    for (label, value) in company.display_rows() {
        println!("  {label:<16} {value}");
    }
    if let Some(sector) = Sector::of(&ticker) {
        println!("  {:<16} {sector}", "Group");
    }
    Ok(())
}

// ─── predict ────────────────────────────────────────────────────────

fn run_predict(
    config: &PipelineConfig,
    source: &SourceArgs,
    output_dir: Option<&Path>,
) -> Result<()> {
    let validated = config.validate(today())?;
    let provider = build_provider(source, validated.fetch.clone())?;

    let pipeline = Pipeline::new(validated, provider.as_ref());
    debug!(stage = %pipeline.stage(), "pipeline created");
    let output = pipeline.run()?;

    println!("{}", output.report.summary());

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&output.report, &output.table, dir)?;
        println!();
        println!("Artifacts saved to {}", run_dir.display());
    }
    Ok(())
}

// ─── compare ────────────────────────────────────────────────────────

fn run_compare(
    tickers: Vec<String>,
    sector: Option<&str>,
    window: &WindowArgs,
    source: &SourceArgs,
    csv: Option<&Path>,
) -> Result<()> {
    let mut symbols: Vec<Ticker> = tickers
        .iter()
        .map(|t| Ticker::parse(t))
        .collect::<Result<_, _>>()?;
    if let Some(name) = sector {
        for s in parse_sector(name)?.tickers() {
            let ticker = Ticker::parse(s)?;
            if !symbols.contains(&ticker) {
                symbols.push(ticker);
            }
        }
    }
    if symbols.is_empty() {
        bail!("nothing to compare: give tickers or --sector");
    }

    let window = resolve_window(window)?;
    let provider = build_provider(source, FetchSettings::default())?;
    let comparison = compare_tickers(provider.as_ref(), &symbols, window);

    println!("Performance over {window}");
    println!();
    println!("{:<4} {:<8} {:>12} {:>14}", "#", "Ticker", "Return", "Volatility");
    for (rank, entry) in comparison.ranked().into_iter().enumerate() {
        let volatility = entry
            .annualized_volatility
            .map(|v| format_percentage(v, 2))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        println!(
            "{:<4} {:<8} {:>12} {:>14}",
            rank + 1,
            entry.ticker,
            format_percentage(entry.total_return, 2),
            volatility
        );
    }
    for failure in &comparison.failures {
        println!("  skipped {}: {}", failure.ticker, failure.reason);
    }

    if let Some(path) = csv {
        std::fs::write(path, export_comparison_csv(&comparison)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!();
        println!("Ranking written to {}", path.display());
    }

    if comparison.entries.is_empty() {
        bail!("no ticker returned usable data");
    }
    Ok(())
}

// ─── tickers ────────────────────────────────────────────────────────

fn run_tickers(sector: Option<&str>) -> Result<()> {
    match sector {
        Some(name) => {
            let sector = parse_sector(name)?;
            println!("{sector}: {}", sector.tickers().join(" "));
        }
        None => {
            println!("Popular ({}):", POPULAR_TICKERS.len());
            let popular: Vec<String> = popular_tickers().iter().map(|t| t.to_string()).collect();
            for line in popular.chunks(12) {
                println!("  {}", line.join(" "));
            }
            println!();
            for sector in Sector::ALL {
                println!("{:<24} {}", sector.name(), sector.tickers().join(" "));
            }
        }
    }
    Ok(())
}
