//! Least-squares trend projection over a trailing price window.
//!
//! The model is deliberately minimal: an ordinary linear fit by index
//! (not calendar time), projected a few steps forward, with no
//! clamping of the output. Predictions may be negative or otherwise
//! implausible; richer models are out of scope.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForecastError {
    #[error("insufficient data for regression: have {have} points, need at least 2")]
    InsufficientData { have: usize },
}

/// Fits `slope * i + intercept` against `values[i]` by the closed-form
/// normal equations.
///
/// Fewer than 2 points leave the slope undefined (the denominator of
/// the normal equations is 0), so the guard is explicit rather than
/// letting the division produce NaN.
pub fn linear_fit(values: &[f64]) -> Result<LinearFit, ForecastError> {
    let n = values.len();
    if n < 2 {
        return Err(ForecastError::InsufficientData { have: n });
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let n = n as f64;
    // Non-zero for n >= 2 since the indices are distinct.
    let denom = n * sum_x2 - sum_x * sum_x;

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    Ok(LinearFit { slope, intercept })
}

/// Projects `count` steps past the end of the series: the k-th
/// prediction is the fitted value at index `n - 1 + k`.
pub fn predict_next(values: &[f64], count: usize) -> Result<Vec<f64>, ForecastError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let fit = linear_fit(values)?;
    let last = values.len() as f64 - 1.0;

    Ok((1..=count)
        .map(|k| fit.slope * (last + k as f64) + fit.intercept)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn perfectly_linear_series_fits_exactly() {
        let fit = linear_fit(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_close(fit.slope, 1.0);
        assert_close(fit.intercept, 1.0);

        let preds = predict_next(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(preds.len(), 3);
        assert_close(preds[0], 5.0);
        assert_close(preds[1], 6.0);
        assert_close(preds[2], 7.0);
    }

    #[test]
    fn constant_series_projects_flat() {
        let preds = predict_next(&[4.2, 4.2, 4.2], 2).unwrap();
        for p in preds {
            assert_close(p, 4.2);
        }
    }

    #[test]
    fn fewer_than_two_points_is_insufficient() {
        assert_eq!(
            predict_next(&[], 1),
            Err(ForecastError::InsufficientData { have: 0 })
        );
        assert_eq!(
            predict_next(&[3.5], 5),
            Err(ForecastError::InsufficientData { have: 1 })
        );
        assert_eq!(
            linear_fit(&[3.5]),
            Err(ForecastError::InsufficientData { have: 1 })
        );
    }

    #[test]
    fn zero_count_is_empty_never_an_error() {
        assert_eq!(predict_next(&[1.0, 2.0, 3.0], 0), Ok(Vec::new()));
        assert_eq!(predict_next(&[3.5], 0), Ok(Vec::new()));
    }

    #[test]
    fn downward_trend_may_predict_below_zero() {
        // No clamping: implausible projections are passed through.
        let preds = predict_next(&[2.0, 1.0, 0.0], 2).unwrap();
        assert_close(preds[0], -1.0);
        assert_close(preds[1], -2.0);
    }

    proptest! {
        #[test]
        fn fit_recovers_affine_series(
            slope in -10.0f64..10.0,
            intercept in -100.0f64..100.0,
            n in 2usize..50,
        ) {
            let series: Vec<f64> = (0..n).map(|i| slope * i as f64 + intercept).collect();
            let fit = linear_fit(&series).unwrap();

            prop_assert!((fit.slope - slope).abs() < 1e-6);
            prop_assert!((fit.intercept - intercept).abs() < 1e-6);
        }
    }
}
