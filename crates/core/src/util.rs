//! Common geometry helpers shared across modules.

/// Compute squared distance between two 3D points.
#[inline(always)]
pub fn distance_squared(p1: &[f64; 3], p2: &[f64; 3]) -> f64 {
    let dx = p1[0] - p2[0];
    let dy = p1[1] - p2[1];
    let dz = p1[2] - p2[2];
    dx * dx + dy * dy + dz * dz
}

/// Euclidean distance between two 3D points.
#[inline(always)]
pub fn distance(p1: &[f64; 3], p2: &[f64; 3]) -> f64 {
    distance_squared(p1, p2).sqrt()
}

/// Reciprocal Euclidean distance. Coincident points give `inf`.
#[inline(always)]
pub fn reciprocal_distance(p1: &[f64; 3], p2: &[f64; 3]) -> f64 {
    1.0 / distance(p1, p2)
}
