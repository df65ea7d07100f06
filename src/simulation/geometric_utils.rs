//! Geometric utility functions for distances and steering.

use geo::algorithm::Distance;
use geo::{Euclidean, Point};
use ndarray::Array1;

/// Euclidean distance between two 2D positions.
pub fn distance(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    Euclidean.distance(Point::new(a[0], a[1]), Point::new(b[0], b[1]))
}

/// Returns `v` scaled to unit length.
///
/// A zero (or non-finite) vector has no direction and yields the zero vector,
/// which callers treat as "no movement".
pub fn normalize_or_zero(v: &Array1<f32>) -> Array1<f32> {
    let length = v.dot(v).sqrt();
    if length.is_finite() && length > 0.0 {
        v / length
    } else {
        Array1::zeros(v.len())
    }
}

/// Moves `current` towards `target` by at most `max_delta`, never overshooting.
pub fn move_towards(current: &Array1<f32>, target: &Array1<f32>, max_delta: f32) -> Array1<f32> {
    let remaining = target - current;
    let length = remaining.dot(&remaining).sqrt();
    if length <= max_delta.max(0.0) {
        return target.clone();
    }
    current + &(remaining / length * max_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Array1::from_vec(vec![0.0, 0.0]);
        let b = Array1::from_vec(vec![3.0, 4.0]);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_has_no_direction() {
        let v = normalize_or_zero(&Array1::zeros(2));
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn move_towards_stops_at_target() {
        let a = Array1::from_vec(vec![0.0, 0.0]);
        let b = Array1::from_vec(vec![1.0, 0.0]);

        let halfway = move_towards(&a, &b, 0.5);
        assert!((halfway[0] - 0.5).abs() < 1e-6);

        let arrived = move_towards(&a, &b, 10.0);
        assert!((arrived[0] - 1.0).abs() < 1e-6);
        assert!(arrived[1].abs() < 1e-6);
    }
}
