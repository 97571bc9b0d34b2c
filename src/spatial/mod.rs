//! View-dependent tile prioritisation
//!
//! Tiles are ranked by how close they sit to the centre of the viewer's gaze.
//! The scheduler queries a [`ViewpointSource`] afresh on every iteration and
//! scores tiles through a [`PriorityMetric`].

pub mod viewpoint;

// Re-export main types
pub use viewpoint::{SharedViewpoint, Viewpoint, ViewpointSource};

use glam::Vec3;

/// Trait for scoring how urgently a tile should be fetched
///
/// Scores are compared against each other and against the peripheral
/// admission threshold, so implementations should stay within [-1, 1].
pub trait PriorityMetric: Send + Sync {
    /// Score a tile centred at `tile_position` for the given viewpoint
    fn score(&self, tile_position: Vec3, viewpoint: &Viewpoint) -> f32;
}

/// Cosine of the angle between the gaze direction and the direction to the tile
#[derive(Debug, Clone, Copy, Default)]
pub struct CosinePriority;

impl CosinePriority {
    pub fn new() -> Self {
        Self
    }
}

impl PriorityMetric for CosinePriority {
    fn score(&self, tile_position: Vec3, viewpoint: &Viewpoint) -> f32 {
        let to_tile = (tile_position - viewpoint.position).normalize_or_zero();
        let forward = viewpoint.forward.normalize_or_zero();
        forward.dot(to_tile).clamp(-1.0, 1.0)
    }
}

/// Minimum score a tile must exceed to fall inside a cone of `fov_degrees`
///
/// Evaluated in f64 and rounded once, so 120° yields exactly 0.5.
pub fn admission_threshold(fov_degrees: f32) -> f32 {
    ((fov_degrees as f64).to_radians() / 2.0).cos() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_straight_ahead() {
        let metric = CosinePriority::new();
        let view = Viewpoint::looking(Vec3::Z);
        assert!((metric.score(Vec3::new(0.0, 0.0, 10.0), &view) - 1.0).abs() < 1e-6);
        assert!((metric.score(Vec3::new(0.0, 0.0, -10.0), &view) + 1.0).abs() < 1e-6);
        assert!(metric.score(Vec3::new(10.0, 0.0, 0.0), &view).abs() < 1e-6);
    }

    #[test]
    fn test_score_ignores_forward_length() {
        let metric = CosinePriority::new();
        let short = Viewpoint::looking(Vec3::new(0.0, 0.0, 0.1));
        let long = Viewpoint::looking(Vec3::new(0.0, 0.0, 25.0));
        let tile = Vec3::new(3.0, 1.0, 4.0);
        assert!((metric.score(tile, &short) - metric.score(tile, &long)).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_vectors_score_zero() {
        let metric = CosinePriority::new();
        let view = Viewpoint::new(Vec3::ONE, Vec3::Z);
        assert_eq!(metric.score(Vec3::ONE, &view), 0.0);

        let blind = Viewpoint::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(metric.score(Vec3::X, &blind), 0.0);
    }

    #[test]
    fn test_admission_threshold() {
        assert!((admission_threshold(120.0) - 0.5).abs() < 1e-6);
        assert!(admission_threshold(180.0).abs() < 1e-6);
        assert!((admission_threshold(360.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_is_exact_at_cone_edge() {
        assert_eq!(admission_threshold(120.0), 0.5);
        assert_eq!(admission_threshold(90.0), std::f32::consts::FRAC_1_SQRT_2);

        // A tile scoring exactly cos(fov / 2) sits on the edge and is not admitted
        let edge = 0.5_f32;
        assert!(!(edge > admission_threshold(120.0)));
    }
}
