use argminmax::ArgMinMax;

/// Arithmetic mean. 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by n, not n-1).
/// 0.0 for slices shorter than 2.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let avg_square_diff = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    avg_square_diff.sqrt()
}

/// First and third quartiles by sorted index (floor(0.25n), floor(0.75n)),
/// no interpolation. Returns (q1, q3). Panics on empty input; callers guard.
pub fn quartiles(values: &[f64]) -> (f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1_index = (sorted.len() as f64 * 0.25).floor() as usize;
    let q3_index = (sorted.len() as f64 * 0.75).floor() as usize;
    // floor(0.75n) == n only when n == 0, which callers exclude
    (sorted[q1_index], sorted[q3_index.min(sorted.len() - 1)])
}

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}
