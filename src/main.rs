use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use itertools::Itertools;

use costlens::data::{
    InMemoryMaterials, InMemoryPriceHistory, StaticDiscountSchedule, StaticMarketConditions,
    StaticWeather,
};
use costlens::domain::{FactorSeries, Material, MaterialCategory, PricePoint, PriceSeries, Quotation};
use costlens::{jobs, AnalyticsEngine, Cli};

/// Synthetic monthly price history: a base level, a mild trend, a yearly
/// wave sampled monthly, and one injected spike so anomaly detection has
/// something to find.
fn demo_history(id: &str, base: f64, trend: f64, wave: f64) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let points: Vec<PricePoint> = (0..24)
        .map(|i| {
            let seasonal = wave * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
            let spike = if i == 17 { base * 0.8 } else { 0.0 };
            PricePoint::new(
                start + Duration::days(30 * i as i64),
                base + trend * i as f64 + seasonal + spike,
            )
        })
        .collect();
    PriceSeries::new(id, points).expect("demo data is well-formed")
}

fn demo_catalog() -> (Vec<Material>, Vec<PriceSeries>) {
    let materials = vec![
        Material::new("cement-425", "Cement 42.5N", MaterialCategory::Structural, 11.5),
        Material::new("cement-325", "Cement 32.5N", MaterialCategory::Structural, 9.2),
        Material::new("rebar-12", "Rebar 12mm", MaterialCategory::Structural, 7.8),
        Material::new("brick-common", "Common Brick", MaterialCategory::Structural, 0.45),
        Material::new("paint-pva", "PVA Paint 20l", MaterialCategory::Finishing, 38.0),
        Material::new("tile-ceramic", "Ceramic Tile", MaterialCategory::Finishing, 14.6),
        Material::new("cable-25", "Cable 2.5mm", MaterialCategory::Electrical, 52.0),
        Material::new("conduit-20", "Conduit 20mm", MaterialCategory::Electrical, 3.1),
        Material::new("pipe-pvc-110", "PVC Pipe 110mm", MaterialCategory::Plumbing, 12.4),
        Material::new("sheet-ibr", "IBR Sheet 3.6m", MaterialCategory::Roofing, 21.9),
    ];

    let histories = materials
        .iter()
        .enumerate()
        .map(|(i, m)| {
            demo_history(
                &m.id,
                m.price_per_unit,
                m.price_per_unit * 0.002 * (i as f64 - 4.0),
                m.price_per_unit * 0.06,
            )
        })
        .collect();

    (materials, histories)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();

    let (materials, histories) = demo_catalog();
    let engine = Arc::new(AnalyticsEngine::new(
        Arc::new(InMemoryMaterials::new(materials.clone())),
        Arc::new(InMemoryPriceHistory::new(histories)),
        Arc::new(StaticDiscountSchedule::default()),
        Arc::new(StaticWeather::default()),
        Arc::new(StaticMarketConditions::default()),
        args.location.clone(),
    ));

    // 1. Per-material statistical bundle
    let analytics = engine
        .analyze_material_prices("cement-425", args.months, args.horizon)
        .await?;
    log::info!(
        "{}: seasonality {} (confidence {:.2}), volatility {:.4}, trend {:.2}, {} anomalies",
        analytics.material_name,
        analytics.analysis.seasonality.pattern,
        analytics.analysis.seasonality.confidence,
        analytics.analysis.volatility,
        analytics.analysis.trend_strength,
        analytics.analysis.anomalies.len(),
    );
    if let Some(first) = analytics.analysis.forecast.first() {
        log::info!(
            "next month forecast: {:.2} (band {:.2}..{:.2})",
            first.price,
            analytics.analysis.confidence_interval.lower[0].price,
            analytics.analysis.confidence_interval.upper[0].price,
        );
    }

    // 2. Factor correlations
    let factors = vec![
        FactorSeries::new("cement", vec![10.0, 10.5, 11.2, 11.0, 11.8, 12.1]),
        FactorSeries::new("fuel", vec![1.4, 1.45, 1.52, 1.50, 1.58, 1.61]),
        FactorSeries::new("labor", vec![8.0, 8.0, 8.1, 8.4, 8.2, 8.3]),
    ];
    for correlation in engine.correlate(&factors) {
        log::info!(
            "corr({}, {}) = {:.3} (p = {:.4})",
            correlation.factor_a,
            correlation.factor_b,
            correlation.coefficient,
            correlation.p_value,
        );
    }

    // 3. Clustering
    let clusters = match args.seed {
        Some(seed) => engine.cluster_materials_seeded(&materials, seed).await,
        None => engine.cluster_materials(&materials).await,
    };
    for cluster in &clusters {
        log::info!(
            "cluster {} [{}]: avg price {:.2}, members: {}",
            cluster.cluster_id,
            cluster.dominant_category,
            cluster.average_price,
            cluster.members.iter().join(", "),
        );
    }

    // 4. Purchase optimization
    let mut requirements = BTreeMap::new();
    requirements.insert("cement-425".to_string(), 600.0);
    requirements.insert("cable-25".to_string(), 40.0);
    requirements.insert("sheet-ibr".to_string(), 120.0);
    let optimization = engine.optimize_purchase(&requirements).await?;
    log::info!(
        "optimization: expected savings {:.1}, {} substitutions, {} bulk deals",
        optimization.expected_savings,
        optimization.substitution_suggestions.len(),
        optimization.bulk_discount_opportunities.len(),
    );
    println!("{}", serde_json::to_string_pretty(&optimization)?);

    // 5. Cost factors for the quoted batch
    let quotations: Vec<Quotation> = requirements
        .iter()
        .filter_map(|(id, qty)| {
            materials.iter().find(|m| &m.id == id).map(|m| Quotation {
                material_id: id.clone(),
                category: m.category,
                quantity: *qty,
                total_price: m.price_per_unit * qty,
            })
        })
        .collect();
    let factors = engine.construction_cost_factors(&quotations).await?;
    log::info!(
        "cost factors: labor {:.2}, weather impact {:.2}, season x{:.2}, market x{:.2}",
        factors.labor_costs,
        factors.weather_impact,
        factors.seasonality_factor,
        factors.market_conditions,
    );

    // 6. Prediction
    let trend = engine.price_trend("cement-425", args.months).await?;
    log::info!(
        "cement-425 trend: {} {:.1}% (confidence {:.0})",
        trend.direction,
        trend.percentage,
        trend.confidence,
    );
    let predicted = engine.predict_price("cement-425", 6).await?;
    log::info!("cement-425 predicted price in 6 months: {:.2}", predicted);

    // Optional standing sweep, the scheduled-job mode
    if let Some(secs) = args.watch_secs {
        log::info!("sweeping the catalog every {secs}s (ctrl-c to stop)");
        jobs::run_analytics_sweep(engine.clone(), std::time::Duration::from_secs(secs)).await;
    }

    Ok(())
}
