//! Return-based indicators: daily percent change and its rolling volatility.

use super::sma::rolling_mean;
use super::Indicator;
use crate::domain::Bar;

/// close[t] / close[t-1] - 1. The first row is undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyReturn;

pub(crate) fn pct_change(bars: &[Bar]) -> Vec<f64> {
    let mut result = vec![f64::NAN; bars.len()];
    for (slot, pair) in result.iter_mut().skip(1).zip(bars.windows(2)) {
        let (prev, curr) = (pair[0].close, pair[1].close);
        if prev != 0.0 {
            *slot = curr / prev - 1.0;
        }
    }
    result
}

impl Indicator for DailyReturn {
    fn name(&self) -> &str {
        "daily_return"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        pct_change(bars)
    }
}

/// Rolling sample standard deviation of daily returns. Lookback: window.
#[derive(Debug, Clone)]
pub struct Volatility {
    window: usize,
    name: String,
}

impl Volatility {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "volatility window must be >= 2");
        Self {
            window,
            name: format!("volatility_{window}"),
        }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let returns = pct_change(bars);
        let means = rolling_mean(&returns, self.window);
        let w = self.window;

        means
            .iter()
            .enumerate()
            .map(|(i, &mean)| {
                if mean.is_nan() {
                    return f64::NAN;
                }
                let ss: f64 = returns[i + 1 - w..=i].iter().map(|r| (r - mean).powi(2)).sum();
                (ss / (w - 1) as f64).sqrt()
            })
            .collect()
    }
}
