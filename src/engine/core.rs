use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis;
use crate::cluster;
use crate::config::DEFAULT_FEATURE_HISTORY_MONTHS;
use crate::data::{
    guarded, DiscountSchedule, MarketConditionProvider, MaterialRepository,
    PriceHistoryRepository, WeatherProvider,
};
use crate::domain::{FactorSeries, Material, PriceSeries, Quotation};
use crate::errors::Result;
use crate::models::{
    Cluster, CorrelationResult, CostFactors, Decomposition, MaterialPriceAnalytics,
    OptimizationResult, PriceTrend, SeriesAnalysis,
};
use crate::optimize;

/// The analytics engine. Stateless between calls: every operation is a pure
/// function of its inputs plus read-only repository lookups, so callers may
/// run any number of requests concurrently.
pub struct AnalyticsEngine {
    materials: Arc<dyn MaterialRepository>,
    prices: Arc<dyn PriceHistoryRepository>,
    discounts: Arc<dyn DiscountSchedule>,
    weather: Arc<dyn WeatherProvider>,
    market: Arc<dyn MarketConditionProvider>,
    /// Site location passed through to the weather provider
    location: String,
}

impl AnalyticsEngine {
    pub fn new(
        materials: Arc<dyn MaterialRepository>,
        prices: Arc<dyn PriceHistoryRepository>,
        discounts: Arc<dyn DiscountSchedule>,
        weather: Arc<dyn WeatherProvider>,
        market: Arc<dyn MarketConditionProvider>,
        location: impl Into<String>,
    ) -> Self {
        AnalyticsEngine {
            materials,
            prices,
            discounts,
            weather,
            market,
            location: location.into(),
        }
    }

    // --- Pure series operations, exposed for dashboard callers ---

    pub fn analyze_series(
        &self,
        series: &PriceSeries,
        horizon_months: usize,
    ) -> Result<SeriesAnalysis> {
        analysis::analyze_series(series, horizon_months)
    }

    pub fn decompose(&self, series: &PriceSeries) -> Decomposition {
        analysis::decompose(series)
    }

    pub fn correlate(&self, factors: &[FactorSeries]) -> Vec<CorrelationResult> {
        analysis::correlate(factors)
    }

    // --- Material-level operations ---

    /// Fetch a material's history and run the full statistical bundle on it.
    pub async fn analyze_material_prices(
        &self,
        material_id: &str,
        months: u32,
        horizon_months: usize,
    ) -> Result<MaterialPriceAnalytics> {
        let material = guarded(material_id, || self.materials.material(material_id)).await?;
        let history = guarded(material_id, || {
            self.prices.price_history(material_id, months)
        })
        .await?;

        let analysis = analysis::analyze_series(&history, horizon_months)?;
        Ok(MaterialPriceAnalytics {
            material_id: material.id,
            material_name: material.name,
            analysis,
        })
    }

    /// Group materials into price/behavior clusters.
    ///
    /// History lookups fan out concurrently (timeout + one retry each) and
    /// join before the clustering pass; materials whose history cannot be
    /// fetched are logged and left out rather than sinking the whole run.
    pub async fn cluster_materials(&self, materials: &[Material]) -> Vec<Cluster> {
        self.cluster_with_rng(materials, &mut StdRng::from_entropy())
            .await
    }

    /// Same as [`cluster_materials`](Self::cluster_materials) with a fixed
    /// seed, for reproducible runs.
    pub async fn cluster_materials_seeded(
        &self,
        materials: &[Material],
        seed: u64,
    ) -> Vec<Cluster> {
        self.cluster_with_rng(materials, &mut StdRng::seed_from_u64(seed))
            .await
    }

    async fn cluster_with_rng<R: rand::Rng>(
        &self,
        materials: &[Material],
        rng: &mut R,
    ) -> Vec<Cluster> {
        let lookups = join_all(materials.iter().map(|material| async move {
            match guarded(&material.id, || {
                self.prices
                    .price_history(&material.id, DEFAULT_FEATURE_HISTORY_MONTHS)
            })
            .await
            {
                Ok(history) => Some((material.clone(), history)),
                Err(e) => {
                    log::warn!("clustering skips {}: {}", material.id, e);
                    None
                }
            }
        }))
        .await;

        // Join barrier passed; everything below is CPU-bound and pure
        let items: Vec<(Material, PriceSeries)> = lookups.into_iter().flatten().collect();
        cluster::cluster_materials(&items, rng)
    }

    /// Compute the purchase recommendation for a requirement map.
    pub async fn optimize_purchase(
        &self,
        requirements: &BTreeMap<String, f64>,
    ) -> Result<OptimizationResult> {
        optimize::optimize_purchase(requirements, &*self.materials, &*self.discounts).await
    }

    // --- Cost factor and prediction consumers ---

    pub async fn construction_cost_factors(
        &self,
        quotations: &[Quotation],
    ) -> Result<CostFactors> {
        analysis::construction_cost_factors(
            quotations,
            &self.location,
            &*self.weather,
            &*self.market,
        )
        .await
    }

    pub async fn price_trend(&self, material_id: &str, months: u32) -> Result<PriceTrend> {
        let history = guarded(material_id, || {
            self.prices.price_history(material_id, months)
        })
        .await?;
        Ok(analysis::price_trend(&history))
    }

    pub async fn predict_price(&self, material_id: &str, months_ahead: u32) -> Result<f64> {
        let history = guarded(material_id, || {
            self.prices
                .price_history(material_id, DEFAULT_FEATURE_HISTORY_MONTHS)
        })
        .await?;
        analysis::predict_price(&history, months_ahead, &*self.market).await
    }

    /// Every material the catalog knows about; used by the sweep job.
    pub async fn all_materials(&self) -> Result<Vec<Material>> {
        self.materials.all_materials().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FORECAST_HORIZON_MONTHS;
    use crate::data::{
        InMemoryMaterials, InMemoryPriceHistory, StaticDiscountSchedule, StaticMarketConditions,
        StaticWeather,
    };
    use crate::domain::{MaterialCategory, PricePoint};
    use crate::errors::AnalyticsError;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashSet;

    fn material(id: &str, category: MaterialCategory, price: f64) -> Material {
        Material::new(id, id.to_uppercase(), category, price)
    }

    fn history(id: &str, values: &[f64]) -> PriceSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                PricePoint::new(
                    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                        + Duration::days(i as i64),
                    *v,
                )
            })
            .collect();
        PriceSeries::new(id, points).unwrap()
    }

    fn engine_with(
        materials: Vec<Material>,
        histories: Vec<PriceSeries>,
    ) -> AnalyticsEngine {
        AnalyticsEngine::new(
            Arc::new(InMemoryMaterials::new(materials)),
            Arc::new(InMemoryPriceHistory::new(histories)),
            Arc::new(StaticDiscountSchedule::default()),
            Arc::new(StaticWeather::default()),
            Arc::new(StaticMarketConditions::default()),
            "Harare",
        )
    }

    #[tokio::test]
    async fn test_analyze_material_prices_end_to_end() {
        let engine = engine_with(
            vec![material("cement-01", MaterialCategory::Structural, 12.5)],
            vec![history("cement-01", &[10.0, 11.0, 12.0, 11.5, 12.5, 13.0])],
        );

        let analytics = engine
            .analyze_material_prices("cement-01", 24, DEFAULT_FORECAST_HORIZON_MONTHS)
            .await
            .unwrap();
        assert_eq!(analytics.material_id, "cement-01");
        assert_eq!(analytics.material_name, "CEMENT-01");
        assert!(analytics.analysis.trend_strength > 0.0);
        assert_eq!(
            analytics.analysis.forecast.len(),
            DEFAULT_FORECAST_HORIZON_MONTHS
        );
    }

    #[tokio::test]
    async fn test_unknown_material_surfaces_not_found() {
        let engine = engine_with(vec![], vec![]);
        let err = engine
            .analyze_material_prices("ghost", 24, 6)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::NotFound { ref id } if id == "ghost"));
    }

    #[tokio::test]
    async fn test_clustering_skips_materials_without_history() {
        let materials: Vec<Material> = (0..9)
            .map(|i| {
                material(
                    &format!("mat-{i}"),
                    MaterialCategory::Structural,
                    10.0 + i as f64 * 5.0,
                )
            })
            .collect();
        // mat-8 has no stored history at all
        let histories: Vec<PriceSeries> = (0..8)
            .map(|i| history(&format!("mat-{i}"), &[10.0, 11.0, 12.0]))
            .collect();

        let engine = engine_with(materials.clone(), histories);
        let clusters = engine.cluster_materials_seeded(&materials, 42).await;

        let clustered: HashSet<String> = clusters
            .iter()
            .flat_map(|c| c.members.iter().cloned())
            .collect();
        assert_eq!(clustered.len(), 8, "the history-less material is skipped");
        assert!(!clustered.contains("mat-8"));
        // k = ceil(sqrt(8/2)) = 2 over the survivors
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| !c.members.is_empty()));
    }

    #[tokio::test]
    async fn test_cluster_seeding_is_reproducible() {
        let materials: Vec<Material> = (0..10)
            .map(|i| {
                material(
                    &format!("mat-{i}"),
                    MaterialCategory::Finishing,
                    5.0 + i as f64 * 3.0,
                )
            })
            .collect();
        let histories: Vec<PriceSeries> = materials
            .iter()
            .map(|m| history(&m.id, &[10.0, 11.0, 10.5]))
            .collect();
        let engine = engine_with(materials.clone(), histories);

        let first = engine.cluster_materials_seeded(&materials, 7).await;
        let second = engine.cluster_materials_seeded(&materials, 7).await;
        let members = |clusters: &[Cluster]| -> Vec<Vec<String>> {
            clusters.iter().map(|c| c.members.clone()).collect()
        };
        assert_eq!(members(&first), members(&second));
    }

    struct FlakyHistory {
        inner: InMemoryPriceHistory,
        fail_for: String,
    }

    #[async_trait]
    impl PriceHistoryRepository for FlakyHistory {
        async fn price_history(&self, material_id: &str, months: u32) -> Result<PriceSeries> {
            if material_id == self.fail_for {
                return Err(AnalyticsError::upstream(material_id, "connection reset"));
            }
            self.inner.price_history(material_id, months).await
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_skips_item_not_batch() {
        let materials: Vec<Material> = (0..4)
            .map(|i| {
                material(
                    &format!("mat-{i}"),
                    MaterialCategory::Plumbing,
                    20.0 + i as f64,
                )
            })
            .collect();
        let histories: Vec<PriceSeries> = materials
            .iter()
            .map(|m| history(&m.id, &[10.0, 11.0, 12.0]))
            .collect();

        let engine = AnalyticsEngine::new(
            Arc::new(InMemoryMaterials::new(materials.clone())),
            Arc::new(FlakyHistory {
                inner: InMemoryPriceHistory::new(histories),
                fail_for: "mat-2".to_string(),
            }),
            Arc::new(StaticDiscountSchedule::default()),
            Arc::new(StaticWeather::default()),
            Arc::new(StaticMarketConditions::default()),
            "Harare",
        );

        let clusters = engine.cluster_materials_seeded(&materials, 11).await;
        let clustered: HashSet<String> = clusters
            .iter()
            .flat_map(|c| c.members.iter().cloned())
            .collect();
        assert_eq!(clustered.len(), 3);
        assert!(!clustered.contains("mat-2"));
    }

    #[tokio::test]
    async fn test_optimize_purchase_through_the_engine() {
        let engine = engine_with(
            vec![
                material("mat-a", MaterialCategory::Structural, 100.0),
                material("mat-b", MaterialCategory::Structural, 80.0),
            ],
            vec![],
        );

        let mut requirements = BTreeMap::new();
        requirements.insert("mat-a".to_string(), 100.0);
        let result = engine.optimize_purchase(&requirements).await.unwrap();

        assert_eq!(result.recommended_quantities["mat-a"], 100.0);
        assert_eq!(result.substitution_suggestions.len(), 1);
        assert!(result.expected_savings > 0.0);
    }

    #[tokio::test]
    async fn test_price_trend_and_prediction() {
        let engine = engine_with(
            vec![material("mat-a", MaterialCategory::Structural, 100.0)],
            vec![history("mat-a", &[100.0, 102.0, 104.0, 106.0])],
        );

        let trend = engine.price_trend("mat-a", 12).await.unwrap();
        assert_eq!(
            trend.direction,
            crate::models::TrendDirection::Up
        );

        let predicted = engine.predict_price("mat-a", 6).await.unwrap();
        assert!(predicted > 0.0);
    }
}
