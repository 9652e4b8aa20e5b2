//! Regression metrics for held-out predictions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("got {predictions} prediction(s) for {actuals} actual value(s)")]
    MetricLengthMismatch { predictions: usize, actuals: usize },

    #[error("need at least 2 observations to evaluate, got {n}")]
    InsufficientData { n: usize },
}

/// Metric values for one evaluation. `mse`, `mae` and `r2` are always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub mse: f64,
    pub mae: f64,
    pub r2: f64,
    pub rmse: f64,
    pub n: usize,
}

impl EvaluationResult {
    pub const METRIC_NAMES: [&'static str; 4] = ["mse", "mae", "r2", "rmse"];

    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "mse" => Some(self.mse),
            "mae" => Some(self.mae),
            "r2" => Some(self.r2),
            "rmse" => Some(self.rmse),
            _ => None,
        }
    }

    /// `(name, value)` pairs in `METRIC_NAMES` order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Self::METRIC_NAMES
            .iter()
            .filter_map(move |name| self.get(name).map(|v| (*name, v)))
    }

    pub fn report(&self) -> String {
        let mut s = format!("Evaluation ({} observations)\n", self.n);
        s.push_str(&format!("  MSE:  {:.6}\n", self.mse));
        s.push_str(&format!("  RMSE: {:.6}\n", self.rmse));
        s.push_str(&format!("  MAE:  {:.6}\n", self.mae));
        s.push_str(&format!("  R²:   {:.6}\n", self.r2));
        s
    }
}

/// Compare predictions against actual values.
///
/// R² is 1 - SS_res / SS_tot. With constant actuals (SS_tot = 0) it is 1.0
/// for a perfect fit and 0.0 otherwise.
pub fn evaluate(predictions: &[f64], actuals: &[f64]) -> Result<EvaluationResult, MetricsError> {
    if predictions.len() != actuals.len() {
        return Err(MetricsError::MetricLengthMismatch {
            predictions: predictions.len(),
            actuals: actuals.len(),
        });
    }
    let n = actuals.len();
    if n < 2 {
        return Err(MetricsError::InsufficientData { n });
    }
    let nf = n as f64;

    let errors: Vec<f64> = predictions.iter().zip(actuals).map(|(p, a)| a - p).collect();
    let ss_res: f64 = errors.iter().map(|e| e * e).sum();
    let mse = ss_res / nf;
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / nf;

    let mean = actuals.iter().sum::<f64>() / nf;
    let ss_tot: f64 = actuals.iter().map(|a| (a - mean).powi(2)).sum();
    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(EvaluationResult {
        mse,
        mae,
        r2,
        rmse: mse.sqrt(),
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn perfect_predictions() {
        let r = evaluate(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(r.mse, 0.0);
        assert_eq!(r.mae, 0.0);
        assert_eq!(r.r2, 1.0);
    }

    #[test]
    fn known_values() {
        // errors: 1, -1, 0, 2
        let r = evaluate(&[0.0, 3.0, 3.0, 2.0], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((r.mse - 1.5).abs() < 1e-12);
        assert!((r.mae - 1.0).abs() < 1e-12);
        // SS_tot = 5, SS_res = 6
        assert!((r.r2 - (1.0 - 6.0 / 5.0)).abs() < 1e-12);
        assert!((r.rmse - 1.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn constant_actuals() {
        assert_eq!(evaluate(&[5.0, 5.0], &[5.0, 5.0]).unwrap().r2, 1.0);
        assert_eq!(evaluate(&[4.0, 6.0], &[5.0, 5.0]).unwrap().r2, 0.0);
    }

    #[test]
    fn length_mismatch() {
        assert_eq!(
            evaluate(&[1.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(MetricsError::MetricLengthMismatch {
                predictions: 2,
                actuals: 3
            })
        );
    }

    #[test]
    fn too_few_observations() {
        assert_eq!(evaluate(&[], &[]), Err(MetricsError::InsufficientData { n: 0 }));
        assert_eq!(evaluate(&[1.0], &[1.0]), Err(MetricsError::InsufficientData { n: 1 }));
    }

    #[test]
    fn lookup_and_order() {
        let r = evaluate(&[1.0, 2.0], &[1.0, 3.0]).unwrap();
        let names: Vec<_> = r.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["mse", "mae", "r2", "rmse"]);
        assert_eq!(r.get("mae"), Some(0.5));
        assert_eq!(r.get("mape"), None);
    }

    proptest! {
        #[test]
        fn identical_inputs_score_perfectly(values in prop::collection::vec(-1e6f64..1e6, 2..50)) {
            let r = evaluate(&values, &values).unwrap();
            prop_assert_eq!(r.mse, 0.0);
            prop_assert_eq!(r.mae, 0.0);
            prop_assert_eq!(r.r2, 1.0);
        }

        #[test]
        fn mae_never_exceeds_rmse(
            pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 2..50)
        ) {
            let (p, a): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let r = evaluate(&p, &a).unwrap();
            prop_assert!(r.mae <= r.rmse + 1e-9);
            prop_assert!(r.r2 <= 1.0);
        }
    }
}
