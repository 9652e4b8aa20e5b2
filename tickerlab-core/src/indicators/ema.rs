//! Exponential Moving Average (EMA).
//!
//! EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1),
//! seeded with the mean of the first `span` closes. Lookback: span - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }

    fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.span - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        if bars.len() < self.span {
            return result;
        }

        let seed_window = &bars[..self.span];
        if seed_window.iter().any(|b| b.close.is_nan()) {
            return result;
        }
        let mut prev = seed_window.iter().map(|b| b.close).sum::<f64>() / self.span as f64;
        result[self.span - 1] = prev;

        let alpha = self.alpha();
        for (slot, bar) in result.iter_mut().zip(bars).skip(self.span) {
            // A gap in the input ends the series; later values stay NaN.
            if bar.close.is_nan() {
                break;
            }
            prev = alpha * bar.close + (1.0 - alpha) * prev;
            *slot = prev;
        }
        result
    }
}
