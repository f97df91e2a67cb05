// Repository traits the engine consumes, plus in-memory implementations
// used by the demo binary and the test suite.
pub mod lookup;
pub mod memory;
pub mod repository;

// Re-export commonly used types
pub use lookup::guarded;
pub use memory::{
    InMemoryMaterials, InMemoryPriceHistory, StaticDiscountSchedule, StaticMarketConditions,
    StaticWeather,
};
pub use repository::{
    DiscountSchedule, MarketConditionProvider, MaterialRepository, PriceHistoryRepository,
    WeatherProvider, WeatherSeverity,
};
