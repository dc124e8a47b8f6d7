//! Order statistics used by the reliability flagger.

/// Percentile `p` (0..=100) of `values` by linear interpolation between
/// order statistics, with rank `p/100 * (n - 1)`.
///
/// Returns `None` for an empty population. A single value is its own
/// percentile. Input order does not matter.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, p))
}

// `sorted` is ascending and non-empty.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}
