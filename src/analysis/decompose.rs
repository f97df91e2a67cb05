use argminmax::ArgMinMax;

use crate::domain::PriceSeries;
use crate::models::Decomposition;
use crate::utils::stats;

const SPECTRUM_FLOOR: f64 = 1e-9;

/// Tricube kernel weights over a window of `length` points.
/// Endpoints get weight 0, the center weight 1.
fn tricube_weights(length: usize) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }
    (0..length)
        .map(|i| {
            let x = (2.0 * i as f64 / (length - 1) as f64) - 1.0;
            (1.0 - x.abs().powi(3)).powi(3)
        })
        .collect()
}

fn weighted_average(window: &[f64]) -> f64 {
    let weights = tricube_weights(window.len());
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum == 0.0 {
        // Two-point windows have zero weight at both ends; fall back to the mean
        return stats::mean(window);
    }
    window
        .iter()
        .zip(&weights)
        .map(|(v, w)| v * w)
        .sum::<f64>()
        / weight_sum
}

/// Local tricube-weighted smoothing with a window of ceil(n/4) on each side.
fn trend_component(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let window_size = (n as f64 / 4.0).ceil() as usize;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(window_size);
            let end = (i + window_size + 1).min(n);
            weighted_average(&values[start..end])
        })
        .collect()
}

/// Reconstruct the single dominant frequency of the detrended series, with
/// its true amplitude and phase. Returns zeros when the detrended spectrum
/// is flat (constant or near-constant input).
fn seasonal_component(detrended: &[f64]) -> Vec<f64> {
    let n = detrended.len();
    if n < 2 {
        return vec![0.0; n];
    }

    // One DFT pass keeping the complex parts; bins k = 1..=n/2
    let mut bins = Vec::with_capacity(n / 2);
    for k in 1..=(n / 2) {
        let mut re = 0.0;
        let mut im = 0.0;
        for (i, v) in detrended.iter().enumerate() {
            let angle = 2.0 * std::f64::consts::PI * k as f64 * i as f64 / n as f64;
            re += v * angle.cos();
            im -= v * angle.sin();
        }
        bins.push((re, im));
    }

    let magnitudes: Vec<f64> = bins
        .iter()
        .map(|(re, im)| (re * re + im * im).sqrt())
        .collect();
    if magnitudes.iter().sum::<f64>() < SPECTRUM_FLOOR {
        return vec![0.0; n];
    }

    let dominant = magnitudes.argmax();
    let k = dominant + 1;
    let (re, im) = bins[dominant];
    // The mirror bin doubles every component except the Nyquist bin
    let scale = if 2 * k == n { 1.0 / n as f64 } else { 2.0 / n as f64 };

    (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 * i as f64 / n as f64;
            scale * (re * angle.cos() - im * angle.sin())
        })
        .collect()
}

/// Split a series into trend + seasonal + residual.
///
/// The residual is defined as whatever the other two components leave
/// behind, so `trend[i] + seasonal[i] + residual[i]` reconstructs the
/// original value at every index by construction.
pub fn decompose(series: &PriceSeries) -> Decomposition {
    let values = series.values();

    let trend = trend_component(&values);
    let detrended: Vec<f64> = values.iter().zip(&trend).map(|(v, t)| v - t).collect();
    let seasonal = seasonal_component(&detrended);
    let residual: Vec<f64> = values
        .iter()
        .zip(trend.iter().zip(&seasonal))
        .map(|(v, (t, s))| v - t - s)
        .collect();

    Decomposition {
        trend,
        seasonal,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::{Duration, TimeZone, Utc};

    fn series_of(values: &[f64]) -> PriceSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                PricePoint::new(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + Duration::days(i as i64),
                    *v,
                )
            })
            .collect();
        PriceSeries::new("test-material", points).unwrap()
    }

    #[test]
    fn test_reconstruction_invariant() {
        // Trend + wave + kinks, all distinct positive values
        let values: Vec<f64> = (0..24)
            .map(|i| {
                120.0
                    + 0.7 * i as f64
                    + 8.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
                    + if i % 7 == 0 { 3.5 } else { 0.0 }
                    + i as f64 * 0.01
            })
            .collect();
        let series = series_of(&values);
        let d = decompose(&series);

        assert_eq!(d.trend.len(), values.len());
        for i in 0..values.len() {
            let rebuilt = d.trend[i] + d.seasonal[i] + d.residual[i];
            let tolerance = 1e-6 * values[i].abs().max(1.0);
            assert!(
                (rebuilt - values[i]).abs() < tolerance,
                "index {}: {} != {}",
                i,
                rebuilt,
                values[i]
            );
        }
    }

    #[test]
    fn test_constant_series_decomposes_to_trend_only() {
        let d = decompose(&series_of(&[42.0; 10]));
        for i in 0..10 {
            assert!((d.trend[i] - 42.0).abs() < 1e-9);
            assert!(d.seasonal[i].abs() < 1e-9);
            assert!(d.residual[i].abs() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(decompose(&series_of(&[])).trend.is_empty());

        let one = decompose(&series_of(&[7.0]));
        assert_eq!(one.trend, vec![7.0]);
        assert_eq!(one.seasonal, vec![0.0]);
        assert_eq!(one.residual, vec![0.0]);

        // Two points exercise the zero-weight window fallback
        let two = decompose(&series_of(&[5.0, 9.0]));
        for i in 0..2 {
            let rebuilt = two.trend[i] + two.seasonal[i] + two.residual[i];
            assert!((rebuilt - [5.0, 9.0][i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seasonal_component_recovers_sinusoid() {
        // Pure wave around a flat level: the seasonal part should carry
        // most of the oscillation once the flat trend is removed
        let values: Vec<f64> = (0..36)
            .map(|i| 100.0 + 10.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        let d = decompose(&series_of(&values));

        let seasonal_energy: f64 = d.seasonal.iter().map(|s| s * s).sum();
        let residual_energy: f64 = d.residual.iter().map(|r| r * r).sum();
        assert!(
            seasonal_energy > residual_energy,
            "seasonal {} should dominate residual {}",
            seasonal_energy,
            residual_energy
        );
    }
}
