//! Converts per-segment weights into durations summing to a target total.

use crate::timeline::round_ms;

/// Minimum duration assigned to any segment, in seconds.
pub const MIN_SEGMENT_SECS: f64 = 0.1;

/// Split `total` seconds across `weights` proportionally.
///
/// Non-positive or non-finite weights count as 1. Each share is rounded to
/// milliseconds and floored at [`MIN_SEGMENT_SECS`]; the rounding residual is
/// added to the last share so the durations reconstruct `total`.
///
/// Returns an empty list when `total` is not positive or there are no
/// weights; callers must treat that as "cannot proceed".
pub fn allocate_durations(total: f64, weights: &[f64]) -> Vec<f64> {
    if !(total > 0.0) || !total.is_finite() || weights.is_empty() {
        return Vec::new();
    }

    let weights: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 1.0 })
        .collect();
    let sum: f64 = weights.iter().sum();

    let mut durations: Vec<f64> = weights
        .iter()
        .map(|w| round_ms(w / sum * total).max(MIN_SEGMENT_SECS))
        .collect();

    let residual = total - durations.iter().sum::<f64>();
    if let Some(last) = durations.last_mut() {
        *last = round_ms(*last + residual).max(MIN_SEGMENT_SECS);
    }

    durations
}

/// Word-count weights for a list of texts.
pub fn word_weights<S: AsRef<str>>(texts: &[S]) -> Vec<f64> {
    texts
        .iter()
        .map(|t| crate::text::word_count(t.as_ref()) as f64)
        .collect()
}
