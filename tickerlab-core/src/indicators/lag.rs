//! Lagged close: the close `k` rows earlier.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Lag {
    k: usize,
    name: String,
}

impl Lag {
    pub fn new(k: usize) -> Self {
        assert!(k >= 1, "lag must be >= 1");
        Self {
            k,
            name: format!("lag_{k}"),
        }
    }
}

impl Indicator for Lag {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.k
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        (0..bars.len())
            .map(|i| i.checked_sub(self.k).map_or(f64::NAN, |j| bars[j].close))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn shifts_closes_back() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let lagged = Lag::new(2).compute(&bars);
        assert!(lagged[0].is_nan() && lagged[1].is_nan());
        assert_eq!(&lagged[2..], &[1.0, 2.0]);
    }
}
