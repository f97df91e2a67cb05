// Statistical characterization of price series and cost factors
pub mod correlation;
pub mod cost_factors;
pub mod decompose;
pub mod prediction;
pub mod timeseries;

// Re-export commonly used functions
pub use correlation::{correlate, correlate_pair};
pub use cost_factors::construction_cost_factors;
pub use decompose::decompose;
pub use prediction::{predict_price, price_trend};
pub use timeseries::{
    analyze_series, detect_anomalies, detect_seasonality, forecast, trend_strength, volatility,
};
