//! Technical indicators used as model features.
//!
//! Indicators are pure functions: bar history in, numeric series out. Each
//! output has the same length as the input and is `NaN` wherever the window
//! reaching back from that row is not yet full. Windows count the rows that
//! are present in the series; calendar gaps are not filled.

pub mod ema;
pub mod lag;
pub mod returns;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use lag::Lag;
pub use returns::{DailyReturn, Volatility};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;

/// A named column computed from a bar series.
///
/// No value at row t may depend on bars after t. Every implementation is
/// checked against a truncated copy of its input in the tests below.
pub trait Indicator: Send + Sync {
    /// Column name (e.g. "sma_20", "daily_return").
    fn name(&self) -> &str;

    /// Number of leading rows that are always `NaN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high/low = max/min(open, close) +/- 1.0.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    fn all_indicators() -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Sma::new(5)),
            Box::new(Ema::new(5)),
            Box::new(Rsi::new(5)),
            Box::new(DailyReturn),
            Box::new(Volatility::new(5)),
            Box::new(Lag::new(3)),
        ]
    }

    #[test]
    fn no_lookahead() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let full = make_bars(&closes);
        let truncated = &full[..25];

        for ind in all_indicators() {
            let a = ind.compute(&full);
            let b = ind.compute(truncated);
            for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
                assert!(
                    (x.is_nan() && y.is_nan()) || x == y,
                    "{} differs at {i}: {x} vs {y}",
                    ind.name()
                );
            }
        }
    }

    #[test]
    fn warmup_matches_lookback() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        let bars = make_bars(&closes);
        for ind in all_indicators() {
            let values = ind.compute(&bars);
            assert_eq!(values.len(), bars.len());
            let lookback = ind.lookback();
            assert!(values[..lookback].iter().all(|v| v.is_nan()), "{}", ind.name());
            assert!(values[lookback..].iter().all(|v| v.is_finite()), "{}", ind.name());
        }
    }
}
