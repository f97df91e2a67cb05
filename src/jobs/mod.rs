// Scheduled work: the periodic analytics sweep over the whole catalog
use std::sync::Arc;
use std::time::Duration;

use crate::config::{DEFAULT_FORECAST_HORIZON_MONTHS, DEFAULT_HISTORY_MONTHS};
use crate::engine::AnalyticsEngine;
use crate::errors::Result;

/// What one sweep pass got through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub analyzed: usize,
    pub skipped: usize,
    pub anomalies_flagged: usize,
}

/// Re-run the per-material analysis across every known material.
/// Individual failures (missing history, upstream trouble) are logged and
/// counted, never fatal.
pub async fn sweep_once(engine: &AnalyticsEngine) -> Result<SweepSummary> {
    let materials = engine.all_materials().await?;
    let mut summary = SweepSummary::default();

    for material in &materials {
        match engine
            .analyze_material_prices(
                &material.id,
                DEFAULT_HISTORY_MONTHS,
                DEFAULT_FORECAST_HORIZON_MONTHS,
            )
            .await
        {
            Ok(analytics) => {
                summary.analyzed += 1;
                summary.anomalies_flagged += analytics.analysis.anomalies.len();
                if !analytics.analysis.anomalies.is_empty() {
                    log::info!(
                        "{}: {} anomalous price points",
                        material.id,
                        analytics.analysis.anomalies.len()
                    );
                }
            }
            Err(e) => {
                summary.skipped += 1;
                log::warn!("sweep skips {}: {}", material.id, e);
            }
        }
    }

    log::info!(
        "sweep done: {} analyzed, {} skipped, {} anomalies",
        summary.analyzed,
        summary.skipped,
        summary.anomalies_flagged
    );
    Ok(summary)
}

/// Run the sweep forever on a fixed interval. Spawn this on the runtime and
/// forget about it; errors are logged and the loop keeps going.
pub async fn run_analytics_sweep(engine: Arc<AnalyticsEngine>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        if let Err(e) = sweep_once(&engine).await {
            log::error!("analytics sweep failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        InMemoryMaterials, InMemoryPriceHistory, StaticDiscountSchedule, StaticMarketConditions,
        StaticWeather,
    };
    use crate::domain::{Material, MaterialCategory, PricePoint, PriceSeries};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    #[tokio::test]
    async fn test_sweep_counts_skips_and_successes() {
        let materials = vec![
            Material::new("mat-a", "A", MaterialCategory::Structural, 10.0),
            Material::new("mat-b", "B", MaterialCategory::Roofing, 20.0),
        ];
        // Only mat-a has any history; mat-b's empty series can't be forecast
        let points: Vec<PricePoint> = (0..6)
            .map(|i| {
                PricePoint::new(
                    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                        + ChronoDuration::days(i * 30),
                    10.0 + i as f64,
                )
            })
            .collect();
        let histories = vec![
            PriceSeries::new("mat-a", points).unwrap(),
            PriceSeries::new("mat-b", vec![]).unwrap(),
        ];

        let engine = AnalyticsEngine::new(
            std::sync::Arc::new(InMemoryMaterials::new(materials)),
            std::sync::Arc::new(InMemoryPriceHistory::new(histories)),
            std::sync::Arc::new(StaticDiscountSchedule::default()),
            std::sync::Arc::new(StaticWeather::default()),
            std::sync::Arc::new(StaticMarketConditions::default()),
            "Harare",
        );

        let summary = sweep_once(&engine).await.unwrap();
        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.skipped, 1);
    }
}
