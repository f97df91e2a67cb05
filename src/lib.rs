// Core modules
pub mod analysis;
pub mod cluster;
pub mod config;
pub mod data;
pub mod domain;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod optimize;
pub mod utils;

// The engine
pub mod engine;

// Re-export commonly used types
pub use data::{
    DiscountSchedule, MarketConditionProvider, MaterialRepository, PriceHistoryRepository,
    WeatherProvider,
};
pub use domain::{FactorSeries, Material, MaterialCategory, PricePoint, PriceSeries, Quotation};
pub use engine::AnalyticsEngine;
pub use errors::{AnalyticsError, Result};
pub use models::{Cluster, MaterialPriceAnalytics, OptimizationResult};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Months of price history to analyze
    #[arg(long, default_value_t = config::DEFAULT_HISTORY_MONTHS)]
    pub months: u32,

    /// Forecast horizon in monthly steps
    #[arg(long, default_value_t = config::DEFAULT_FORECAST_HORIZON_MONTHS)]
    pub horizon: usize,

    /// Fixed RNG seed for reproducible clustering runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Site location passed to the weather provider
    #[arg(long, default_value = "Harare")]
    pub location: String,

    /// Keep running the analytics sweep on this interval (seconds)
    #[arg(long)]
    pub watch_secs: Option<u64>,
}
