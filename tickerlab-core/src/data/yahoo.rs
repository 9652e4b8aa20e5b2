//! Yahoo Finance data provider.
//!
//! Daily bars come from the v8 chart API, company metadata from the v10
//! quoteSummary API. Every request has an explicit timeout; connect errors,
//! timeouts, 429 and 5xx responses are retried with exponential backoff.
//! A shared circuit breaker stops all traffic after a 403 or a run of failures.
//!
//! Yahoo Finance has no official API and changes its response format without
//! notice. The CSV provider is the fallback when it is unavailable.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{
    DataError, DataProvider, DataSource, FetchOutcome, FetchRequest, FetchSettings,
};
use crate::domain::{Bar, CompanyInfo, FetchWindow, PriceSeries, Ticker};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ── Chart API response ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

// ── quoteSummary API response ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryModules>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SummaryModules {
    price: Option<PriceModule>,
    asset_profile: Option<AssetProfile>,
    summary_detail: Option<SummaryDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    market_cap: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNumber>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<RawNumber>,
    #[serde(rename = "marketCap")]
    market_cap: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNumber {
    raw: Option<f64>,
}

fn raw(value: Option<RawNumber>) -> Option<f64> {
    value.and_then(|v| v.raw).filter(|v| v.is_finite())
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    settings: FetchSettings,
    base_url: String,
}

impl YahooProvider {
    pub fn new(settings: FetchSettings, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::ResponseFormatChanged(format!("HTTP client setup: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            settings,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Send requests to another host, e.g. a mirror or a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Chart API URL for a ticker and window.
    fn chart_url(&self, ticker: &Ticker, window: &FetchWindow) -> String {
        let span = match window {
            FetchWindow::Period(period) => format!("range={}", period.code()),
            FetchWindow::Range(range) => {
                let start_ts = midnight_utc(range.start());
                // period2 is exclusive: stop at the midnight after `end`.
                let end_ts = midnight_utc(range.end() + ChronoDuration::days(1));
                format!("period1={start_ts}&period2={end_ts}")
            }
        };
        format!(
            "{}/v8/finance/chart/{ticker}?{span}&interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }

    fn summary_url(&self, ticker: &Ticker) -> String {
        format!(
            "{}/v10/finance/quoteSummary/{ticker}?modules=price,assetProfile,summaryDetail",
            self.base_url
        )
    }

    /// GET a JSON document with retry, backoff and circuit breaker handling.
    ///
    /// A 404 maps to `NoDataFound`; Yahoo answers unknown symbols that way.
    /// When the breaker opens between retries, the last transient error is
    /// returned rather than `CircuitBreakerTripped`. A 429 `Retry-After`
    /// header lengthens the next backoff delay.
    fn get_json<T: DeserializeOwned>(&self, url: &str, ticker: &Ticker) -> Result<T, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;
        let mut retry_after: Option<Duration> = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = match retry_after.take() {
                    Some(hint) => self.settings.backoff(attempt).max(hint),
                    None => self.settings.backoff(attempt),
                };
                debug!(%ticker, attempt, delay_ms = delay.as_millis() as u64, "retrying request");
                std::thread::sleep(delay);

                if !self.circuit_breaker.is_allowed() {
                    return Err(last_error.unwrap_or(DataError::CircuitBreakerTripped));
                }
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_timeout() => {
                    warn!(%ticker, attempt, "request timed out");
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::Timeout {
                        ticker: ticker.clone(),
                        attempts: attempt + 1,
                    });
                    continue;
                }
                Err(e) if e.is_connect() => {
                    warn!(%ticker, attempt, error = %e, "connection failed");
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::FetchFailed {
                        ticker: ticker.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    return Err(DataError::FetchFailed {
                        ticker: ticker.clone(),
                        reason: e.to_string(),
                    })
                }
            };

            let status = resp.status();

            if status == StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let header_secs = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok());
                retry_after = header_secs.map(Duration::from_secs);
                warn!(%ticker, attempt, retry_after_secs = ?header_secs, "rate limited");
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: header_secs.unwrap_or(0),
                });
                continue;
            }

            if status.is_server_error() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::FetchFailed {
                    ticker: ticker.clone(),
                    reason: format!("HTTP {status}"),
                });
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                self.circuit_breaker.record_success();
                return Err(DataError::NoDataFound {
                    ticker: ticker.clone(),
                });
            }

            if !status.is_success() {
                return Err(DataError::FetchFailed {
                    ticker: ticker.clone(),
                    reason: format!("HTTP {status}"),
                });
            }

            let body = resp.json::<T>().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
            })?;
            self.circuit_breaker.record_success();
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| DataError::FetchFailed {
            ticker: ticker.clone(),
            reason: "max retries exceeded".into(),
        }))
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Turn a chart response into a fetch outcome.
fn parse_chart(ticker: &Ticker, resp: ChartResponse) -> Result<FetchOutcome, DataError> {
    let no_data = || FetchOutcome::NoData {
        ticker: ticker.clone(),
    };

    let Some(results) = resp.chart.result else {
        return match resp.chart.error {
            Some(err) if err.code == "Not Found" => Ok(no_data()),
            Some(err) => Err(DataError::FetchFailed {
                ticker: ticker.clone(),
                reason: format!("{}: {}", err.code, err.description.unwrap_or_default()),
            }),
            None => Err(DataError::ResponseFormatChanged(
                "empty result with no error".into(),
            )),
        };
    };

    let Some(data) = results.into_iter().next() else {
        return Ok(no_data());
    };
    let Some(timestamps) = data.timestamp else {
        return Ok(no_data());
    };
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let field = |col: &[Option<f64>]| col.get(i).copied().flatten();
        // Rows with any missing price are holidays or halted sessions.
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    if bars.is_empty() {
        return Ok(no_data());
    }

    // The live session can appear twice at the tail of the response.
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    Ok(FetchOutcome::Data(PriceSeries::new(ticker.clone(), bars)?))
}

/// Turn a quoteSummary response into company metadata.
fn parse_summary(ticker: &Ticker, resp: QuoteSummaryResponse) -> Result<CompanyInfo, DataError> {
    let Some(results) = resp.quote_summary.result else {
        return match resp.quote_summary.error {
            Some(err) if err.code == "Not Found" => Err(DataError::NoDataFound {
                ticker: ticker.clone(),
            }),
            Some(err) => Err(DataError::FetchFailed {
                ticker: ticker.clone(),
                reason: format!("{}: {}", err.code, err.description.unwrap_or_default()),
            }),
            None => Ok(CompanyInfo::default()),
        };
    };

    let modules = results.into_iter().next().unwrap_or_default();
    let price = modules.price.unwrap_or_default();
    let profile = modules.asset_profile.unwrap_or_default();
    let detail = modules.summary_detail.unwrap_or_default();

    Ok(CompanyInfo {
        name: price.long_name.or(price.short_name),
        sector: profile.sector,
        industry: profile.industry,
        market_cap: raw(price.market_cap).or_else(|| raw(detail.market_cap)),
        pe_ratio: raw(detail.trailing_pe),
        dividend_yield: raw(detail.dividend_yield),
    })
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch_history(&self, request: &FetchRequest) -> Result<FetchOutcome, DataError> {
        let url = self.chart_url(&request.ticker, &request.window);
        info!(ticker = %request.ticker, window = %request.window, "fetching price history");

        let outcome = match self.get_json::<ChartResponse>(&url, &request.ticker) {
            Ok(chart) => parse_chart(&request.ticker, chart)?,
            Err(DataError::NoDataFound { ticker }) => FetchOutcome::NoData { ticker },
            Err(e) => return Err(e),
        };

        match &outcome {
            FetchOutcome::Data(series) => {
                debug!(ticker = %request.ticker, bars = series.len(), "price history received")
            }
            FetchOutcome::NoData { .. } => warn!(ticker = %request.ticker, "provider returned no bars"),
        }
        Ok(outcome)
    }

    fn company_info(&self, ticker: &Ticker) -> Result<CompanyInfo, DataError> {
        let url = self.summary_url(ticker);
        let summary = self.get_json::<QuoteSummaryResponse>(&url, ticker)?;
        parse_summary(ticker, summary)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
