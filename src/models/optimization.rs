use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A cheaper same-category alternative worth at least the configured
/// savings threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substitution {
    pub original: String,
    pub substitute: String,
    pub savings_percent: f64,
}

/// A category group whose combined volume clears a discount tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDiscount {
    pub materials: Vec<String>,
    pub quantity: f64,
    pub discount_percent: f64,
}

/// One volume-discount tier: buy at least `minimum_volume` units of a
/// category, get `discount_percent` off (true percent, 5.0 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub minimum_volume: f64,
    pub discount_percent: f64,
}

/// The full purchase recommendation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub recommended_quantities: BTreeMap<String, f64>,
    pub expected_savings: f64,
    pub substitution_suggestions: Vec<Substitution>,
    pub bulk_discount_opportunities: Vec<BulkDiscount>,
}
