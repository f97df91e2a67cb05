use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Material, MaterialCategory, PriceSeries};
use crate::errors::Result;
use crate::models::DiscountTier;

/// Read-only access to the material catalog. The engine never writes.
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Resolve one material. `NotFound` for unknown ids.
    async fn material(&self, id: &str) -> Result<Material>;

    async fn materials_in_category(&self, category: MaterialCategory) -> Result<Vec<Material>>;

    async fn all_materials(&self) -> Result<Vec<Material>>;
}

/// Historical prices for a material over a trailing window of months.
/// Always ascending by timestamp; may be empty.
#[async_trait]
pub trait PriceHistoryRepository: Send + Sync {
    async fn price_history(&self, material_id: &str, months: u32) -> Result<PriceSeries>;
}

/// Volume-discount tiers applicable to a category at a given total quantity.
#[async_trait]
pub trait DiscountSchedule: Send + Sync {
    async fn volume_discounts(
        &self,
        category: MaterialCategory,
        quantity: f64,
    ) -> Result<Vec<DiscountTier>>;
}

/// Qualitative weather severity for one forecast day.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSeverity {
    Low,
    Medium,
    High,
}

impl WeatherSeverity {
    /// Construction-cost impact contribution of one forecast day.
    pub fn impact_score(&self) -> f64 {
        match self {
            WeatherSeverity::Low => 0.1,
            WeatherSeverity::Medium => 0.2,
            WeatherSeverity::High => 0.3,
        }
    }
}

/// External weather severity estimates. Only the severity scale enters the
/// cost-factor math; fetching and modelling live elsewhere.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn severity_forecast(&self, location: &str, days: u32) -> Result<Vec<WeatherSeverity>>;
}

/// External market condition estimates, inputs to cost factors and price
/// prediction.
#[async_trait]
pub trait MarketConditionProvider: Send + Sync {
    /// Annual inflation estimate (fractional, 0.05 = 5%).
    async fn inflation_rate(&self) -> Result<f64>;

    /// Supplier competition factor; 1.0 is neutral, below 1.0 pushes
    /// prices down.
    async fn competition_factor(&self) -> Result<f64>;
}
