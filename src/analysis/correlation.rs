use statrs::distribution::{ContinuousCDF, Normal};

use crate::domain::FactorSeries;
use crate::errors::{AnalyticsError, Result};
use crate::models::CorrelationResult;
use crate::utils::stats;

// Keeps the t-statistic finite when |r| hits 1 on perfectly collinear input
const MAX_ABS_R: f64 = 0.999999;

/// Pearson correlation between two equal-length factor series, with an
/// approximate two-tailed p-value from a normal approximation of the
/// t-statistic t = r * sqrt((n-2) / (1-r^2)).
///
/// Fails with `InsufficientData` below 3 points (the t-statistic is
/// undefined) and `InvalidInput` on mismatched lengths. A zero-variance
/// input yields coefficient 0 and p-value 1.
pub fn correlate_pair(a: &FactorSeries, b: &FactorSeries) -> Result<CorrelationResult> {
    if a.values.len() != b.values.len() {
        return Err(AnalyticsError::invalid(
            format!("{}/{}", a.name, b.name),
            format!(
                "factor series lengths differ: {} vs {}",
                a.values.len(),
                b.values.len()
            ),
        ));
    }

    let n = a.values.len();
    if n < 3 {
        return Err(AnalyticsError::InsufficientData {
            operation: "correlation p-value",
            needed: 3,
            got: n,
        });
    }

    let coefficient = pearson(&a.values, &b.values);
    let p_value = if coefficient == 0.0 {
        1.0
    } else {
        two_tailed_p(coefficient, n)
    };

    Ok(CorrelationResult {
        factor_a: a.name.clone(),
        factor_b: b.name.clone(),
        coefficient,
        p_value,
    })
}

/// All C(k,2) pairwise correlations, outer index before inner, in the input
/// factor ordering. Pairs that cannot be computed are logged and skipped so
/// one short factor never sinks the batch.
pub fn correlate(factors: &[FactorSeries]) -> Vec<CorrelationResult> {
    let mut results = Vec::new();

    for i in 0..factors.len() {
        for j in (i + 1)..factors.len() {
            match correlate_pair(&factors[i], &factors[j]) {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::warn!(
                        "skipping correlation {} x {}: {}",
                        factors[i].name,
                        factors[j].name,
                        e
                    );
                }
            }
        }
    }

    results
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = stats::mean(x);
    let mean_y = stats::mean(y);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    (covariance / n) / ((var_x / n).sqrt() * (var_y / n).sqrt())
}

fn two_tailed_p(r: f64, n: usize) -> f64 {
    let r = r.clamp(-MAX_ABS_R, MAX_ABS_R);
    let t = r * ((n as f64 - 2.0) / (1.0 - r * r)).sqrt();

    let standard_normal =
        Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    (2.0 * (1.0 - standard_normal.cdf(t.abs()))).clamp(0.0, 1.0)
}
