use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{MaterialCategory, PricePoint};

/// Named seasonal cycle detected in a price history.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize, strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalPattern {
    Yearly,
    Quarterly,
    Monthly,
    #[default]
    None,
}

impl fmt::Display for SeasonalPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeasonalPattern::Yearly => write!(f, "yearly"),
            SeasonalPattern::Quarterly => write!(f, "quarterly"),
            SeasonalPattern::Monthly => write!(f, "monthly"),
            SeasonalPattern::None => write!(f, "none"),
        }
    }
}

/// Pattern + confidence in [0,1]. Confidence is the dominant spectral
/// component's share of total magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub pattern: SeasonalPattern,
    pub confidence: f64,
}

/// Upper/lower bands around a forecast, aligned index-for-index with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub upper: Vec<PricePoint>,
    pub lower: Vec<PricePoint>,
}

/// Everything `analyze_series` knows about one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesAnalysis {
    pub seasonality: SeasonalityResult,
    pub volatility: f64,
    pub trend_strength: f64,
    pub anomalies: Vec<PricePoint>,
    pub forecast: Vec<PricePoint>,
    pub confidence_interval: ConfidenceInterval,
}

/// Material-level analysis bundle: `SeriesAnalysis` plus identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialPriceAnalytics {
    pub material_id: String,
    pub material_name: String,
    pub analysis: SeriesAnalysis,
}

/// Trend / seasonal / residual split of a series.
/// Invariant: trend[i] + seasonal[i] + residual[i] == value[i]
/// within floating tolerance, for every i.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

/// Pearson correlation between two named factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub factor_a: String,
    pub factor_b: String,
    pub coefficient: f64,
    pub p_value: f64,
}

/// Direction of a recent price move.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Recent trend classification with magnitude and data-volume confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceTrend {
    pub direction: TrendDirection,
    pub percentage: f64,
    pub confidence: f64,
}

/// Aggregated construction cost factors for a quotation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostFactors {
    pub material_costs: BTreeMap<MaterialCategory, f64>,
    pub labor_costs: f64,
    pub weather_impact: f64,
    pub seasonality_factor: f64,
    pub location_factor: f64,
    pub terrain_factor: f64,
    pub market_conditions: f64,
}
