use serde::{Deserialize, Serialize};

use crate::domain::MaterialCategory;

/// One price/behavior group produced by a clustering run.
///
/// Created fresh on every run; the centroid is reported in original
/// (de-normalized) feature units: [price_per_unit, volatility,
/// trend_strength, seasonality_confidence, category_ordinal].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: usize,
    pub centroid: Vec<f64>,
    pub members: Vec<String>,
    pub average_price: f64,
    pub price_volatility: f64,
    pub dominant_category: MaterialCategory,
}
