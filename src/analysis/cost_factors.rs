use chrono::{Datelike, Utc};
use std::collections::BTreeMap;

use crate::config::ANALYSIS;
use crate::data::{MarketConditionProvider, WeatherProvider};
use crate::domain::Quotation;
use crate::errors::Result;
use crate::models::CostFactors;
use crate::utils::stats;

/// Aggregate the cost-driving factors for a quotation batch.
///
/// This is a thin consumer of external severity/market estimates plus a few
/// business constants; the heavy statistics live in the series analyzers.
pub async fn construction_cost_factors(
    quotations: &[Quotation],
    location: &str,
    weather: &dyn WeatherProvider,
    market: &dyn MarketConditionProvider,
) -> Result<CostFactors> {
    let mut material_costs: BTreeMap<_, f64> = BTreeMap::new();
    for quotation in quotations {
        *material_costs.entry(quotation.category).or_default() += quotation.total_price;
    }
    let total_material_cost: f64 = material_costs.values().sum();

    let severities = weather.severity_forecast(location, 7).await?;
    let scores: Vec<f64> = severities.iter().map(|s| s.impact_score()).collect();
    let weather_impact = stats::mean(&scores);

    let inflation = market.inflation_rate().await?;
    let competition = market.competition_factor().await?;

    Ok(CostFactors {
        material_costs,
        labor_costs: total_material_cost * ANALYSIS.cost_factors.labor_rate,
        weather_impact,
        seasonality_factor: seasonal_factor_for_month(Utc::now().month()),
        // Distance-to-supplier and terrain surcharges are not modelled yet;
        // both stay neutral
        location_factor: 1.0,
        terrain_factor: 1.0,
        market_conditions: 1.0 + inflation - (1.0 - competition),
    })
}

/// Construction peaks in the dry season; prices follow.
fn seasonal_factor_for_month(month: u32) -> f64 {
    let (start, end) = ANALYSIS.cost_factors.dry_season_months;
    if month >= start && month <= end {
        ANALYSIS.cost_factors.dry_season_factor
    } else {
        ANALYSIS.cost_factors.wet_season_factor
    }
}
