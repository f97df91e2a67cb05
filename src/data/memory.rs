use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;

use crate::config::ANALYSIS;
use crate::domain::{Material, MaterialCategory, PriceSeries};
use crate::errors::{AnalyticsError, Result};
use crate::models::DiscountTier;

use super::repository::{
    DiscountSchedule, MarketConditionProvider, MaterialRepository, PriceHistoryRepository,
    WeatherProvider, WeatherSeverity,
};

// ============================================================================
// In-memory material catalog
// ============================================================================

#[derive(Default)]
pub struct InMemoryMaterials {
    by_id: HashMap<String, Material>,
}

impl InMemoryMaterials {
    pub fn new(materials: Vec<Material>) -> Self {
        let by_id = materials.into_iter().map(|m| (m.id.clone(), m)).collect();
        InMemoryMaterials { by_id }
    }
}

#[async_trait]
impl MaterialRepository for InMemoryMaterials {
    async fn material(&self, id: &str) -> Result<Material> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| AnalyticsError::NotFound { id: id.to_string() })
    }

    async fn materials_in_category(&self, category: MaterialCategory) -> Result<Vec<Material>> {
        let mut materials: Vec<Material> = self
            .by_id
            .values()
            .filter(|m| m.category == category)
            .cloned()
            .collect();
        // Stable output regardless of hash order
        materials.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(materials)
    }

    async fn all_materials(&self) -> Result<Vec<Material>> {
        let mut materials: Vec<Material> = self.by_id.values().cloned().collect();
        materials.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(materials)
    }
}

// ============================================================================
// In-memory price history
// ============================================================================

#[derive(Default)]
pub struct InMemoryPriceHistory {
    by_material: HashMap<String, PriceSeries>,
}

impl InMemoryPriceHistory {
    pub fn new(histories: Vec<PriceSeries>) -> Self {
        let by_material = histories
            .into_iter()
            .map(|s| (s.entity_id().to_string(), s))
            .collect();
        InMemoryPriceHistory { by_material }
    }
}

#[async_trait]
impl PriceHistoryRepository for InMemoryPriceHistory {
    /// Returns the trailing `months` window, anchored at the stored series'
    /// last observation so test fixtures stay deterministic.
    async fn price_history(&self, material_id: &str, months: u32) -> Result<PriceSeries> {
        let series = self
            .by_material
            .get(material_id)
            .ok_or_else(|| AnalyticsError::NotFound {
                id: material_id.to_string(),
            })?;

        let Some(last) = series.last() else {
            return PriceSeries::new(material_id, Vec::new());
        };

        let cutoff = last.timestamp - Duration::days(30 * months as i64);
        let window: Vec<_> = series
            .points()
            .iter()
            .filter(|p| p.timestamp >= cutoff)
            .copied()
            .collect();
        PriceSeries::new(material_id, window)
    }
}

// ============================================================================
// Static discount schedule / providers
// ============================================================================

/// The same tier table for every category; fine for demos and tests.
pub struct StaticDiscountSchedule {
    tiers: Vec<DiscountTier>,
}

impl Default for StaticDiscountSchedule {
    fn default() -> Self {
        StaticDiscountSchedule {
            tiers: ANALYSIS.optimizer.default_discount_tiers.to_vec(),
        }
    }
}

impl StaticDiscountSchedule {
    pub fn new(tiers: Vec<DiscountTier>) -> Self {
        StaticDiscountSchedule { tiers }
    }
}

#[async_trait]
impl DiscountSchedule for StaticDiscountSchedule {
    async fn volume_discounts(
        &self,
        _category: MaterialCategory,
        quantity: f64,
    ) -> Result<Vec<DiscountTier>> {
        Ok(self
            .tiers
            .iter()
            .filter(|t| quantity >= t.minimum_volume)
            .copied()
            .collect())
    }
}

/// Fixed severity sequence, cycled over the requested window.
pub struct StaticWeather {
    pub pattern: Vec<WeatherSeverity>,
}

impl Default for StaticWeather {
    fn default() -> Self {
        StaticWeather {
            pattern: vec![
                WeatherSeverity::Low,
                WeatherSeverity::Low,
                WeatherSeverity::Medium,
                WeatherSeverity::Low,
                WeatherSeverity::High,
                WeatherSeverity::Low,
                WeatherSeverity::Medium,
            ],
        }
    }
}

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn severity_forecast(&self, _location: &str, days: u32) -> Result<Vec<WeatherSeverity>> {
        Ok((0..days as usize)
            .map(|i| self.pattern[i % self.pattern.len()])
            .collect())
    }
}

/// Fixed market conditions.
pub struct StaticMarketConditions {
    pub inflation: f64,
    pub competition: f64,
}

impl Default for StaticMarketConditions {
    fn default() -> Self {
        StaticMarketConditions {
            inflation: 0.05,
            competition: 0.95,
        }
    }
}

#[async_trait]
impl MarketConditionProvider for StaticMarketConditions {
    async fn inflation_rate(&self) -> Result<f64> {
        Ok(self.inflation)
    }

    async fn competition_factor(&self) -> Result<f64> {
        Ok(self.competition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_unknown_material_is_not_found() {
        let repo = InMemoryMaterials::default();
        let err = repo.material("ghost").await.unwrap_err();
        assert!(matches!(err, AnalyticsError::NotFound { ref id } if id == "ghost"));
    }

    #[tokio::test]
    async fn test_price_history_window_is_anchored_at_last_point() {
        let points: Vec<PricePoint> = (0..400)
            .map(|i| {
                PricePoint::new(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i),
                    100.0 + i as f64,
                )
            })
            .collect();
        let repo =
            InMemoryPriceHistory::new(vec![PriceSeries::new("brick-01", points).unwrap()]);

        // 3 months = 90 days back from the last point, inclusive
        let window = repo.price_history("brick-01", 3).await.unwrap();
        assert_eq!(window.len(), 91);
    }

    #[tokio::test]
    async fn test_discount_tiers_filter_by_volume() {
        let schedule = StaticDiscountSchedule::default();
        let tiers = schedule
            .volume_discounts(MaterialCategory::Structural, 600.0)
            .await
            .unwrap();
        assert_eq!(tiers.len(), 2, "600 units clears the 100 and 500 tiers");
        assert!(tiers.iter().all(|t| t.minimum_volume <= 600.0));
    }
}
