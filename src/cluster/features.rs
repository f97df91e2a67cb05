use rayon::prelude::*;

use crate::analysis::{detect_seasonality, trend_strength, volatility};
use crate::domain::{Material, PriceSeries};
use crate::utils::stats;

/// [price_per_unit, volatility, trend_strength, seasonality_confidence,
/// category_ordinal]
pub const FEATURE_DIMS: usize = 5;

/// The clustering feature vector for one material: its unit price, the
/// statistical shape of its price history, and its category ordinal.
pub fn extract_features(material: &Material, history: &PriceSeries) -> [f64; FEATURE_DIMS] {
    let values = history.values();
    [
        material.price_per_unit,
        volatility(&values),
        trend_strength(&values),
        detect_seasonality(&values).confidence,
        material.category.ordinal() as f64,
    ]
}

/// Min-max normalized feature rows, keeping the per-dimension bounds so
/// centroids can be mapped back into original units.
pub struct FeatureMatrix {
    pub rows: Vec<Vec<f64>>,
    mins: [f64; FEATURE_DIMS],
    maxs: [f64; FEATURE_DIMS],
}

impl FeatureMatrix {
    /// Extract and normalize features for every (material, history) pair.
    /// Per-material extraction is independent, so it fans out across cores.
    pub fn build(items: &[(Material, PriceSeries)]) -> Self {
        let raw: Vec<[f64; FEATURE_DIMS]> = items
            .par_iter()
            .map(|(material, history)| extract_features(material, history))
            .collect();

        let mut mins = [0.0; FEATURE_DIMS];
        let mut maxs = [0.0; FEATURE_DIMS];
        for dim in 0..FEATURE_DIMS {
            let column: Vec<f64> = raw.iter().map(|row| row[dim]).collect();
            mins[dim] = stats::get_min(&column);
            maxs[dim] = stats::get_max(&column);
        }

        let rows = raw
            .iter()
            .map(|row| {
                (0..FEATURE_DIMS)
                    .map(|dim| {
                        let range = maxs[dim] - mins[dim];
                        if range == 0.0 {
                            // A constant dimension carries no distance signal
                            0.0
                        } else {
                            (row[dim] - mins[dim]) / range
                        }
                    })
                    .collect()
            })
            .collect();

        FeatureMatrix { rows, mins, maxs }
    }

    /// Map a normalized centroid back to original feature units.
    pub fn denormalize(&self, centroid: &[f64]) -> Vec<f64> {
        centroid
            .iter()
            .enumerate()
            .map(|(dim, v)| v * (self.maxs[dim] - self.mins[dim]) + self.mins[dim])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MaterialCategory;

    fn material(id: &str, category: MaterialCategory, price: f64) -> Material {
        Material::new(id, id.to_uppercase(), category, price)
    }

    fn no_history(id: &str) -> PriceSeries {
        PriceSeries::new(id, vec![]).unwrap()
    }

    #[test]
    fn test_normalization_bounds_and_roundtrip() {
        let items = vec![
            (
                material("a", MaterialCategory::Structural, 10.0),
                no_history("a"),
            ),
            (
                material("b", MaterialCategory::Roofing, 50.0),
                no_history("b"),
            ),
            (
                material("c", MaterialCategory::Finishing, 30.0),
                no_history("c"),
            ),
        ];
        let matrix = FeatureMatrix::build(&items);

        for row in &matrix.rows {
            for v in row {
                assert!((0.0..=1.0).contains(v), "normalized value {v} out of range");
            }
        }
        // Price dim: a -> 0.0, b -> 1.0, c -> 0.5
        assert_eq!(matrix.rows[0][0], 0.0);
        assert_eq!(matrix.rows[1][0], 1.0);
        assert!((matrix.rows[2][0] - 0.5).abs() < 1e-12);

        // De-normalizing a row recovers the raw features
        let denorm = matrix.denormalize(&matrix.rows[1]);
        assert!((denorm[0] - 50.0).abs() < 1e-9);
        assert!((denorm[4] - MaterialCategory::Roofing.ordinal() as f64).abs() < 1e-9);
    }

    #[test]
    fn test_constant_dimension_is_neutral() {
        // Same category everywhere: the ordinal dimension must not produce NaN
        let items = vec![
            (
                material("a", MaterialCategory::Plumbing, 10.0),
                no_history("a"),
            ),
            (
                material("b", MaterialCategory::Plumbing, 20.0),
                no_history("b"),
            ),
        ];
        let matrix = FeatureMatrix::build(&items);
        assert_eq!(matrix.rows[0][4], 0.0);
        assert_eq!(matrix.rows[1][4], 0.0);
        assert!(matrix.rows.iter().flatten().all(|v| v.is_finite()));
    }
}
