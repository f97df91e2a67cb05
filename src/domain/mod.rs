// Core domain types: materials, price series, cost factors
pub mod material;
pub mod series;

// Re-export commonly used types
pub use material::{Material, MaterialCategory, Quotation};
pub use series::{FactorSeries, PricePoint, PriceSeries};
