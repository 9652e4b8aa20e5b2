//! Regression targets derived from a bar series.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the model learns to predict for row t.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// close[t+1]
    #[default]
    NextClose,
    /// close[t+1] / close[t] - 1
    ForwardReturn,
}

impl Target {
    /// Target value per row. The last row has no future and is `NaN`.
    pub fn values(&self, bars: &[Bar]) -> Vec<f64> {
        let mut values = vec![f64::NAN; bars.len()];
        for (slot, pair) in values.iter_mut().zip(bars.windows(2)) {
            let (today, tomorrow) = (pair[0].close, pair[1].close);
            *slot = match self {
                Target::NextClose => tomorrow,
                Target::ForwardReturn if today != 0.0 => tomorrow / today - 1.0,
                Target::ForwardReturn => f64::NAN,
            };
        }
        values
    }

    pub fn name(&self) -> &'static str {
        match self {
            Target::NextClose => "next_close",
            Target::ForwardReturn => "forward_return",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn next_close_shifts_forward() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let v = Target::NextClose.values(&bars);
        assert_eq!(&v[..2], &[11.0, 12.0]);
        assert!(v[2].is_nan());
    }

    #[test]
    fn forward_return() {
        let bars = make_bars(&[100.0, 105.0]);
        let v = Target::ForwardReturn.values(&bars);
        assert_approx(v[0], 0.05, 1e-12);
        assert!(v[1].is_nan());
    }
}
