//! Cosine distance and the similarity score derived from it.
//!
//! The vec0 column is declared with `distance_metric=cosine`, so engine
//! distances live in `[0, 2]`. `similarity_from_distance` relies on that.

/// Cosine distance (`1 - cosine similarity`) between two vectors.
///
/// Returns `None` when the widths differ. A zero-norm vector is treated as
/// orthogonal to everything (distance 1).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(1.0);
    }
    Some(1.0 - dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Map a cosine distance to a similarity score: always `1 - distance`.
///
/// Values outside `[0, 2]` are not clamped. Rounding puts near-identical
/// vectors slightly below zero, which still maps to a score just above 1.
pub fn similarity_from_distance(distance: f32) -> f32 {
    if !(0.0..=2.0).contains(&distance) {
        tracing::debug!(distance, "distance outside cosine range");
    }
    1.0 - distance
}
