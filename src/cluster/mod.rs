// Unsupervised grouping of materials by price behavior
pub mod features;
pub mod kmeans;

pub use features::{extract_features, FeatureMatrix, FEATURE_DIMS};

use rand::Rng;

use crate::config::ANALYSIS;
use crate::domain::{Material, MaterialCategory, PriceSeries};
use crate::models::Cluster;
use crate::utils::stats;

/// Implicit cluster count: ceil(sqrt(n/2)), at least 1, never above n.
pub fn cluster_count(n: usize) -> usize {
    ((n as f64 / 2.0).sqrt().ceil() as usize).clamp(1, n.max(1))
}

/// Partition materials (with their price histories) into price/behavior
/// groups. Every input material lands in exactly one cluster; exactly
/// min(k, n) clusters come back non-empty.
///
/// The RNG drives k-means++ seeding; pass a seeded one for reproducible
/// runs.
pub fn cluster_materials<R: Rng>(
    items: &[(Material, PriceSeries)],
    rng: &mut R,
) -> Vec<Cluster> {
    if items.is_empty() {
        return Vec::new();
    }

    let matrix = FeatureMatrix::build(items);
    let k = cluster_count(items.len());
    let (assignments, centroids) =
        kmeans::kmeans(&matrix.rows, k, ANALYSIS.cluster.max_iterations, rng);

    (0..k)
        .map(|cluster_id| {
            let members: Vec<&Material> = items
                .iter()
                .zip(&assignments)
                .filter(|(_, &a)| a == cluster_id)
                .map(|((material, _), _)| material)
                .collect();
            summarize(cluster_id, &members, matrix.denormalize(&centroids[cluster_id]))
        })
        .collect()
}

fn summarize(cluster_id: usize, members: &[&Material], centroid: Vec<f64>) -> Cluster {
    let prices: Vec<f64> = members.iter().map(|m| m.price_per_unit).collect();

    Cluster {
        cluster_id,
        centroid,
        members: members.iter().map(|m| m.id.clone()).collect(),
        average_price: stats::mean(&prices),
        price_volatility: stats::population_std_dev(&prices),
        dominant_category: dominant_category(members),
    }
}

/// Most frequent category among members; ties go to the category seen
/// first in member order. Empty member lists (possible only when n < k,
/// which the count clamp rules out) default to Structural.
fn dominant_category(members: &[&Material]) -> MaterialCategory {
    let mut counts: Vec<(MaterialCategory, usize)> = Vec::new();
    for member in members {
        match counts.iter_mut().find(|(c, _)| *c == member.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((member.category, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(MaterialCategory, usize)>, (category, count)| {
            match best {
                // Strictly greater replaces, so the first-seen category wins ties
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((category, count)),
            }
        })
        .map(|(category, _)| category)
        .unwrap_or(MaterialCategory::Structural)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn material(id: &str, category: MaterialCategory, price: f64) -> Material {
        Material::new(id, id.to_uppercase(), category, price)
    }

    fn items(count: usize) -> Vec<(Material, PriceSeries)> {
        (0..count)
            .map(|i| {
                let category = match i % 3 {
                    0 => MaterialCategory::Structural,
                    1 => MaterialCategory::Electrical,
                    _ => MaterialCategory::Roofing,
                };
                let id = format!("mat-{i:02}");
                let m = material(&id, category, 10.0 + 7.3 * i as f64);
                let s = PriceSeries::new(id, vec![]).unwrap();
                (m, s)
            })
            .collect()
    }

    #[test]
    fn test_cluster_count_formula() {
        assert_eq!(cluster_count(1), 1);
        assert_eq!(cluster_count(2), 1);
        assert_eq!(cluster_count(8), 2);
        assert_eq!(cluster_count(18), 3);
        assert_eq!(cluster_count(50), 5);
    }

    #[test]
    fn test_partition_exactness() {
        let input = items(18);
        let mut rng = StdRng::seed_from_u64(99);
        let clusters = cluster_materials(&input, &mut rng);

        assert_eq!(clusters.len(), 3, "k = ceil(sqrt(18/2)) = 3");
        assert!(clusters.iter().all(|c| !c.members.is_empty()));

        let mut seen = HashSet::new();
        let mut total = 0;
        for cluster in &clusters {
            total += cluster.members.len();
            for id in &cluster.members {
                assert!(seen.insert(id.clone()), "{id} assigned twice");
            }
        }
        assert_eq!(total, 18, "every material exactly once");
    }

    #[test]
    fn test_single_material() {
        let input = items(1);
        let mut rng = StdRng::seed_from_u64(1);
        let clusters = cluster_materials(&input, &mut rng);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec!["mat-00".to_string()]);
        assert_eq!(clusters[0].average_price, 10.0);
        assert_eq!(clusters[0].price_volatility, 0.0);
        assert_eq!(clusters[0].centroid.len(), FEATURE_DIMS);
    }

    #[test]
    fn test_dominant_category_tie_breaks_on_first_seen() {
        let a = material("a", MaterialCategory::Roofing, 1.0);
        let b = material("b", MaterialCategory::Plumbing, 1.0);
        let c = material("c", MaterialCategory::Plumbing, 1.0);
        let d = material("d", MaterialCategory::Roofing, 1.0);
        assert_eq!(
            dominant_category(&[&a, &b, &c, &d]),
            MaterialCategory::Roofing,
            "2-2 tie goes to the category encountered first"
        );
        assert_eq!(dominant_category(&[&b, &c, &d]), MaterialCategory::Plumbing);
    }

    #[test]
    fn test_centroid_is_denormalized() {
        let input = items(8);
        let mut rng = StdRng::seed_from_u64(5);
        let clusters = cluster_materials(&input, &mut rng);

        // Prices run 10.0..=61.1, so a normalized [0,1] centroid can't sit
        // there unless it was mapped back to original units
        let price_coords: Vec<f64> = clusters.iter().map(|c| c.centroid[0]).collect();
        assert!(price_coords.iter().any(|p| *p > 1.0));
    }
}
