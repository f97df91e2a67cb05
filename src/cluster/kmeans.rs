use rand::Rng;

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// k-means++ seeding: first centroid uniform, each subsequent one sampled
/// proportionally to squared distance from its nearest existing centroid.
/// The RNG is injected so runs can be made reproducible.
fn init_centroids<R: Rng>(points: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut centroids = vec![points[rng.gen_range(0..points.len())].clone()];

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| euclidean_distance(p, c).powi(2))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let chosen = if total <= 0.0 {
            // All remaining points coincide with a centroid; any pick works
            rng.gen_range(0..points.len())
        } else {
            let mut r = rng.gen::<f64>() * total;
            let mut index = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                r -= w;
                if r <= 0.0 {
                    index = i;
                    break;
                }
            }
            index
        };
        centroids.push(points[chosen].clone());
    }

    centroids
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = euclidean_distance(point, c);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

/// Full Lloyd's iteration: assign, re-center, repeat until assignments are
/// stable or the iteration cap is hit. Returns per-point cluster indices
/// and the final centroids (in normalized feature space).
///
/// When n >= k, empty clusters are repaired by stealing the farthest point
/// from the largest cluster, so exactly k non-empty clusters come back.
pub fn kmeans<R: Rng>(
    points: &[Vec<f64>],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> (Vec<usize>, Vec<Vec<f64>>) {
    assert!(k >= 1 && k <= points.len(), "caller clamps k to [1, n]");

    let dims = points[0].len();
    let mut centroids = init_centroids(points, k, rng);
    let mut assignments: Vec<usize> = points
        .iter()
        .map(|p| nearest_centroid(p, &centroids))
        .collect();

    for _ in 0..max_iterations {
        centroids = recompute_centroids(points, &assignments, &centroids, k, dims);

        let next: Vec<usize> = points
            .iter()
            .map(|p| nearest_centroid(p, &centroids))
            .collect();
        if next == assignments {
            break;
        }
        assignments = next;
    }

    repair_empty_clusters(points, &mut assignments, k);
    centroids = recompute_centroids(points, &assignments, &centroids, k, dims);

    (assignments, centroids)
}

fn recompute_centroids(
    points: &[Vec<f64>],
    assignments: &[usize],
    previous: &[Vec<f64>],
    k: usize,
    dims: usize,
) -> Vec<Vec<f64>> {
    let mut sums = vec![vec![0.0; dims]; k];
    let mut counts = vec![0usize; k];
    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (dim, v) in point.iter().enumerate() {
            sums[cluster][dim] += v;
        }
    }

    (0..k)
        .map(|cluster| {
            if counts[cluster] == 0 {
                // A centroid with no members keeps its position
                previous[cluster].clone()
            } else {
                sums[cluster]
                    .iter()
                    .map(|s| s / counts[cluster] as f64)
                    .collect()
            }
        })
        .collect()
}

/// Move the point farthest from its own centroid out of the largest cluster
/// into each empty one. Guarantees a full partition into k non-empty groups
/// whenever n >= k.
fn repair_empty_clusters(points: &[Vec<f64>], assignments: &mut [usize], k: usize) {
    loop {
        let mut counts = vec![0usize; k];
        for &a in assignments.iter() {
            counts[a] += 1;
        }
        let Some(empty) = counts.iter().position(|&c| c == 0) else {
            return;
        };

        let largest = match counts.iter().enumerate().max_by_key(|(_, &c)| c) {
            Some((cluster, &count)) if count > 1 => cluster,
            _ => return, // n < k; nothing left to split
        };

        // Centroid of the donor cluster
        let dims = points[0].len();
        let mut centroid = vec![0.0; dims];
        let mut count = 0usize;
        for (p, &a) in points.iter().zip(assignments.iter()) {
            if a == largest {
                count += 1;
                for (dim, v) in p.iter().enumerate() {
                    centroid[dim] += v;
                }
            }
        }
        for v in &mut centroid {
            *v /= count as f64;
        }

        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| assignments[*i] == largest)
            .max_by(|(_, a), (_, b)| {
                euclidean_distance(a, &centroid)
                    .partial_cmp(&euclidean_distance(b, &centroid))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);

        match farthest {
            Some(i) => assignments[i] = empty,
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_blobs() -> Vec<Vec<f64>> {
        let mut points = Vec::new();
        for i in 0..5 {
            points.push(vec![0.0 + i as f64 * 0.01, 0.0]);
            points.push(vec![1.0 - i as f64 * 0.01, 1.0]);
        }
        points
    }

    #[test]
    fn test_two_blobs_separate() {
        let points = two_blobs();
        let mut rng = StdRng::seed_from_u64(7);
        let (assignments, centroids) = kmeans(&points, 2, 100, &mut rng);

        assert_eq!(centroids.len(), 2);
        // Even-index points form one blob, odd-index the other
        let first = assignments[0];
        let second = assignments[1];
        assert_ne!(first, second);
        for i in 0..10 {
            let expected = if i % 2 == 0 { first } else { second };
            assert_eq!(assignments[i], expected, "point {} in wrong blob", i);
        }
    }

    #[test]
    fn test_deterministic_under_seed() {
        let points = two_blobs();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            kmeans(&points, 3, 100, &mut rng)
        };
        assert_eq!(run(42).0, run(42).0);
    }

    #[test]
    fn test_duplicate_points_still_fill_k_clusters() {
        let points = vec![vec![0.5, 0.5]; 6];
        let mut rng = StdRng::seed_from_u64(1);
        let (assignments, _) = kmeans(&points, 2, 100, &mut rng);

        let mut counts = [0usize; 2];
        for a in assignments {
            counts[a] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0), "no cluster may end up empty");
    }

    #[test]
    fn test_k_equals_n() {
        let points = vec![vec![0.0], vec![0.5], vec![1.0]];
        let mut rng = StdRng::seed_from_u64(3);
        let (assignments, _) = kmeans(&points, 3, 100, &mut rng);

        let mut seen = assignments.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2], "each point alone in its own cluster");
    }
}
