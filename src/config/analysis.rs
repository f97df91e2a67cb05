//! Analysis and computation configuration

use crate::models::DiscountTier;

/// How many months of history the material-level analysis pulls by default.
pub const DEFAULT_HISTORY_MONTHS: u32 = 24;
/// History window used when extracting clustering features.
pub const DEFAULT_FEATURE_HISTORY_MONTHS: u32 = 12;
/// Default forecast horizon, in monthly steps.
pub const DEFAULT_FORECAST_HORIZON_MONTHS: usize = 12;

/// Settings for seasonality detection.
///
/// The period windows are measured in observations of the input series and
/// map a dominant spectral period to a named pattern.
pub struct SeasonalitySettings {
    pub monthly_period: (f64, f64),
    pub quarterly_period: (f64, f64),
    pub yearly_period: (f64, f64),
}

/// Settings for forecasting.
pub struct ForecastSettings {
    // Width of the confidence band around the point forecast (fractional).
    // A business constant, not a fitted statistic.
    pub confidence_band_pct: f64,
}

/// Settings for anomaly detection.
pub struct AnomalySettings {
    // Multiplier on the interquartile range for the outlier fences
    pub iqr_multiplier: f64,
}

/// Settings for k-means clustering.
pub struct ClusterSettings {
    // Cap on Lloyd's iterations; assignment stability usually ends it sooner
    pub max_iterations: usize,
}

/// Settings for purchase optimization.
pub struct OptimizerSettings {
    // Minimum fractional saving for a substitution to be worth reporting
    pub min_substitution_savings: f64,
    // Fallback volume-discount tiers when no schedule is wired in.
    // Percent values are true percents (5.0 = 5%).
    pub default_discount_tiers: [DiscountTier; 3],
}

/// Settings for repository lookups made during fan-out.
pub struct LookupSettings {
    pub timeout_ms: u64,
    // Additional attempts after the first failure
    pub retries: u32,
}

/// Settings for construction cost factor aggregation and price prediction.
pub struct CostFactorSettings {
    // Labor as a share of total material cost
    pub labor_rate: f64,
    // Construction peaks in the dry season (April to October), 1-based months
    pub dry_season_months: (u32, u32),
    pub dry_season_factor: f64,
    pub wet_season_factor: f64,
    // Annual inflation assumption
    pub inflation_rate: f64,
    // Quarterly price level factors Q1..Q4
    pub quarter_factors: [f64; 4],
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    pub seasonality: SeasonalitySettings,
    pub forecast: ForecastSettings,
    pub anomaly: AnomalySettings,
    pub cluster: ClusterSettings,
    pub optimizer: OptimizerSettings,
    pub lookup: LookupSettings,
    pub cost_factors: CostFactorSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    seasonality: SeasonalitySettings {
        monthly_period: (11.0, 13.0),
        quarterly_period: (85.0, 95.0),
        yearly_period: (350.0, 380.0),
    },

    forecast: ForecastSettings {
        confidence_band_pct: 0.10,
    },

    anomaly: AnomalySettings { iqr_multiplier: 1.5 },

    cluster: ClusterSettings { max_iterations: 100 },

    optimizer: OptimizerSettings {
        min_substitution_savings: 0.05,
        default_discount_tiers: [
            DiscountTier {
                minimum_volume: 100.0,
                discount_percent: 5.0,
            },
            DiscountTier {
                minimum_volume: 500.0,
                discount_percent: 10.0,
            },
            DiscountTier {
                minimum_volume: 1000.0,
                discount_percent: 15.0,
            },
        ],
    },

    lookup: LookupSettings {
        timeout_ms: 2_000,
        retries: 1,
    },

    cost_factors: CostFactorSettings {
        labor_rate: 0.3,
        dry_season_months: (4, 10),
        dry_season_factor: 1.1,
        wet_season_factor: 0.9,
        inflation_rate: 0.03,
        quarter_factors: [1.05, 0.95, 0.98, 1.02],
    },
};
