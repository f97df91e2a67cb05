//! Configuration module for the costlens engine.

pub mod analysis;

// Re-export commonly used items
pub use analysis::{
    AnalysisConfig, ANALYSIS, DEFAULT_FEATURE_HISTORY_MONTHS, DEFAULT_FORECAST_HORIZON_MONTHS,
    DEFAULT_HISTORY_MONTHS,
};
