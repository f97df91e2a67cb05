use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AnalyticsError, Result};

/// A single price observation. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        PricePoint { timestamp, price }
    }
}

/// A chronologically ascending price history for one material (or one
/// abstract factor). May contain gaps; may be empty.
///
/// Construction validates the two invariants the whole analysis stack
/// relies on: no negative prices, and ascending timestamps. A series that
/// violates either is rejected with `InvalidInput` rather than silently
/// re-sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    entity_id: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(entity_id: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let entity_id = entity_id.into();

        for point in &points {
            if point.price < 0.0 {
                return Err(AnalyticsError::invalid(
                    &entity_id,
                    format!("negative price {} at {}", point.price, point.timestamp),
                ));
            }
        }
        for pair in points.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(AnalyticsError::invalid(
                    &entity_id,
                    format!(
                        "series not chronological: {} follows {}",
                        pair[1].timestamp, pair[0].timestamp
                    ),
                ));
            }
        }

        Ok(PriceSeries { entity_id, points })
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The raw value sequence, the shape most of the numeric code wants.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

/// A named numeric series for correlation analysis. Unlike `PriceSeries`
/// these are abstract factors (labor index, fuel cost, ...) so values are
/// unconstrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl FactorSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        FactorSeries {
            name: name.into(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_negative_price() {
        let points = vec![PricePoint::new(ts(1), 10.0), PricePoint::new(ts(2), -1.0)];
        let err = PriceSeries::new("cement-42", points).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput { ref id, .. } if id == "cement-42"));
    }

    #[test]
    fn test_rejects_unsorted_series() {
        let points = vec![PricePoint::new(ts(5), 10.0), PricePoint::new(ts(2), 11.0)];
        assert!(PriceSeries::new("cement-42", points).is_err());
    }

    #[test]
    fn test_accepts_empty_and_gappy_series() {
        assert!(PriceSeries::new("m", vec![]).unwrap().is_empty());
        // Gaps (missing days) are fine as long as order holds
        let points = vec![PricePoint::new(ts(1), 10.0), PricePoint::new(ts(20), 11.0)];
        assert_eq!(PriceSeries::new("m", points).unwrap().len(), 2);
    }
}
