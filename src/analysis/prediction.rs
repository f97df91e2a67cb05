use chrono::{Datelike, Months};

use crate::config::ANALYSIS;
use crate::data::MarketConditionProvider;
use crate::domain::PriceSeries;
use crate::errors::{AnalyticsError, Result};
use crate::models::{PriceTrend, TrendDirection};

// Moves inside +/-1% over the window read as noise, not a trend
const STABLE_BAND_PCT: f64 = 1.0;

/// Classify the recent price direction of a series.
///
/// Percentage is the absolute first-to-last change; confidence grows with
/// the number of observations and saturates at 100 from 10 points up.
pub fn price_trend(series: &PriceSeries) -> PriceTrend {
    let values = series.values();
    if values.len() < 2 || values[0] == 0.0 {
        return PriceTrend {
            direction: TrendDirection::Stable,
            percentage: 0.0,
            confidence: 0.0,
        };
    }

    let change = (values[values.len() - 1] - values[0]) / values[0] * 100.0;
    let direction = if change > STABLE_BAND_PCT {
        TrendDirection::Up
    } else if change < -STABLE_BAND_PCT {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    PriceTrend {
        direction,
        percentage: change.abs(),
        confidence: (values.len() as f64 / 10.0).min(1.0) * 100.0,
    }
}

/// Factor-based point prediction: the latest price scaled by quarterly
/// seasonality, compounded inflation, the observed market trend, and the
/// supplier-competition factor. Rounded to cents.
pub async fn predict_price(
    series: &PriceSeries,
    months_ahead: u32,
    market: &dyn MarketConditionProvider,
) -> Result<f64> {
    let last = series.last().ok_or(AnalyticsError::InsufficientData {
        operation: "price prediction",
        needed: 1,
        got: 0,
    })?;

    let target = last
        .timestamp
        .checked_add_months(Months::new(months_ahead))
        .unwrap_or(last.timestamp);

    let seasonality = quarter_factor(target.month());
    let inflation =
        (1.0 + ANALYSIS.cost_factors.inflation_rate).powf(months_ahead as f64 / 12.0);
    let trend = market_trend(&series.values());
    let competition = market.competition_factor().await?;

    let predicted = last.price * seasonality * inflation * trend * competition;
    Ok((predicted * 100.0).round() / 100.0)
}

/// 1 + the mean period-over-period relative change; 1 (flat) when there is
/// not enough history or a zero divisor shows up.
fn market_trend(values: &[f64]) -> f64 {
    if values.len() < 2 || values[..values.len() - 1].iter().any(|v| *v == 0.0) {
        return 1.0;
    }
    let changes: Vec<f64> = values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();
    1.0 + changes.iter().sum::<f64>() / changes.len() as f64
}

fn quarter_factor(month: u32) -> f64 {
    let quarter = ((month - 1) / 3) as usize;
    ANALYSIS.cost_factors.quarter_factors[quarter.min(3)]
}
