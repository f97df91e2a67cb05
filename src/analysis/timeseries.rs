use argminmax::ArgMinMax;
use chrono::{Duration, Months};

use crate::config::ANALYSIS;
use crate::domain::{PricePoint, PriceSeries};
use crate::errors::{AnalyticsError, Result};
use crate::models::{ConfidenceInterval, SeasonalPattern, SeasonalityResult, SeriesAnalysis};
use crate::utils::stats;

// Spectral magnitudes below this total are numeric dust, not seasonality
const SPECTRUM_FLOOR: f64 = 1e-9;

// ============================================================================
// Seasonality: frequency-domain pattern detection
// ============================================================================

/// Magnitude spectrum of the value sequence over bins k = 1..=n/2.
/// Bin k corresponds to a cycle of period n/k observations. The DC bin is
/// skipped so the price level itself never counts as a "pattern".
fn magnitude_spectrum(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut magnitudes = Vec::with_capacity(n / 2);

    for k in 1..=(n / 2) {
        let mut re = 0.0;
        let mut im = 0.0;
        for (i, v) in values.iter().enumerate() {
            let angle = 2.0 * std::f64::consts::PI * k as f64 * i as f64 / n as f64;
            re += v * angle.cos();
            im -= v * angle.sin();
        }
        magnitudes.push((re * re + im * im).sqrt());
    }

    magnitudes
}

/// Detect the dominant seasonal cycle of a series.
///
/// The strongest spectral component's period (in observations) is mapped to
/// a named pattern via the configured windows; confidence is that
/// component's share of total spectral magnitude, so a clean sinusoid
/// scores near 1 and white noise scores near 1/(n/2).
pub fn detect_seasonality(values: &[f64]) -> SeasonalityResult {
    if values.len() < 2 {
        return SeasonalityResult::default();
    }

    let magnitudes = magnitude_spectrum(values);
    let total: f64 = magnitudes.iter().sum();
    if magnitudes.is_empty() || total < SPECTRUM_FLOOR {
        return SeasonalityResult::default();
    }

    let dominant_bin = magnitudes.argmax();
    let period = values.len() as f64 / (dominant_bin + 1) as f64;
    let confidence = magnitudes[dominant_bin] / total;

    let windows = &ANALYSIS.seasonality;
    let pattern = if period >= windows.monthly_period.0 && period <= windows.monthly_period.1 {
        SeasonalPattern::Monthly
    } else if period >= windows.quarterly_period.0 && period <= windows.quarterly_period.1 {
        SeasonalPattern::Quarterly
    } else if period >= windows.yearly_period.0 && period <= windows.yearly_period.1 {
        SeasonalPattern::Yearly
    } else {
        return SeasonalityResult::default();
    };

    SeasonalityResult {
        pattern,
        confidence,
    }
}

// ============================================================================
// Volatility, trend, anomalies
// ============================================================================

/// Population standard deviation of period-over-period relative returns.
/// 0 for series shorter than 2 points, and 0 whenever a previous value is 0
/// (the return would be undefined).
pub fn volatility(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    if values[..values.len() - 1].iter().any(|v| *v == 0.0) {
        return 0.0;
    }

    let returns: Vec<f64> = values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();

    stats::population_std_dev(&returns)
}

/// Mann-Kendall statistic normalized to [-1, 1].
///
/// S = sum over i<j of sign(v_j - v_i), divided by n(n-1)/2. Positive means
/// rising, negative falling; magnitude is monotonicity strength, independent
/// of scale. 0 for series shorter than 2 points.
pub fn trend_strength(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mut s = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            s += match values[j].partial_cmp(&values[i]) {
                Some(std::cmp::Ordering::Greater) => 1,
                Some(std::cmp::Ordering::Less) => -1,
                _ => 0,
            };
        }
    }

    s as f64 / ((n * (n - 1)) as f64 / 2.0)
}

/// IQR-rule outliers: quartiles by sorted index (no interpolation), fences
/// at Q1 - 1.5*IQR and Q3 + 1.5*IQR.
pub fn detect_anomalies(series: &PriceSeries) -> Vec<PricePoint> {
    if series.is_empty() {
        return Vec::new();
    }

    let values = series.values();
    let (q1, q3) = stats::quartiles(&values);
    let threshold = ANALYSIS.anomaly.iqr_multiplier * (q3 - q1);

    series
        .points()
        .iter()
        .filter(|p| p.price < q1 - threshold || p.price > q3 + threshold)
        .copied()
        .collect()
}

// ============================================================================
// Forecast
// ============================================================================

/// Linear extrapolation: the last observed value plus the average step trend
/// over the whole series, projected monthly for `horizon` steps. The band is
/// a flat +/- percentage of the point forecast (configured, not fitted).
pub fn forecast(
    series: &PriceSeries,
    horizon: usize,
) -> Result<(Vec<PricePoint>, ConfidenceInterval)> {
    let last = series.last().ok_or(AnalyticsError::InsufficientData {
        operation: "forecast",
        needed: 1,
        got: 0,
    })?;

    let values = series.values();
    let avg_step = (values[values.len() - 1] - values[0]) / values.len() as f64;
    let band = ANALYSIS.forecast.confidence_band_pct;

    let mut predictions = Vec::with_capacity(horizon);
    let mut upper = Vec::with_capacity(horizon);
    let mut lower = Vec::with_capacity(horizon);

    for step in 1..=horizon {
        let timestamp = last
            .timestamp
            .checked_add_months(Months::new(step as u32))
            .unwrap_or(last.timestamp + Duration::days(30 * step as i64));
        let predicted = last.price + avg_step * step as f64;

        predictions.push(PricePoint::new(timestamp, predicted));
        upper.push(PricePoint::new(timestamp, predicted * (1.0 + band)));
        lower.push(PricePoint::new(timestamp, predicted * (1.0 - band)));
    }

    Ok((predictions, ConfidenceInterval { upper, lower }))
}

// ============================================================================
// The bundle
// ============================================================================

/// Full statistical characterization of one price series.
///
/// Degenerate inputs produce zeroed statistics rather than errors, with one
/// exception: the forecast needs at least one observation, so an empty
/// series returns `InsufficientData`.
pub fn analyze_series(series: &PriceSeries, horizon_months: usize) -> Result<SeriesAnalysis> {
    let values = series.values();

    let (forecast_points, confidence_interval) = forecast(series, horizon_months)?;

    Ok(SeriesAnalysis {
        seasonality: detect_seasonality(&values),
        volatility: volatility(&values),
        trend_strength: trend_strength(&values),
        anomalies: detect_anomalies(series),
        forecast: forecast_points,
        confidence_interval,
    })
}
