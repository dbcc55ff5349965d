//! A transform as a value that can be applied at any progress ratio

use super::Transformable;
use crate::types::{Pt, mix_f64};

/// One resolved transform. `apply` at ratio 1 is the full transform; lower
/// ratios give the intermediate state used for animation and tracing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Rotate { degrees: f64, about: Pt },
    Translate { vector: Pt },
    Dilate { scale: f64, about: Pt },
    Reflect { p1: Pt, p2: Pt },
    Project { p1: Pt, p2: Pt },
}

impl TransformOp {
    pub fn name(&self) -> &'static str {
        match self {
            TransformOp::Rotate { .. } => "rotate",
            TransformOp::Translate { .. } => "translate",
            TransformOp::Dilate { .. } => "dilate",
            TransformOp::Reflect { .. } => "reflect",
            TransformOp::Project { .. } => "project",
        }
    }

    pub fn apply<T: Transformable>(&self, shape: &T, ratio: f64) -> T {
        match *self {
            TransformOp::Rotate { degrees, about } => shape.rotate(degrees * ratio, about),
            TransformOp::Translate { vector } => shape.translate(vector * ratio, Pt::ZERO),
            TransformOp::Dilate { scale, about } => shape.dilate(mix_f64(1.0, scale, ratio), about),
            TransformOp::Reflect { p1, p2 } => shape.reflect(p1, p2, ratio),
            TransformOp::Project { p1, p2 } => shape.project(p1, p2, ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Geometry, PointShape};
    use glam::DVec2;

    #[test]
    fn halfway_rotation() {
        let op = TransformOp::Rotate {
            degrees: 180.0,
            about: DVec2::ZERO,
        };
        let p = PointShape::new(DVec2::new(1.0, 0.0));
        assert!(op.apply(&p, 0.5).start_value().distance(DVec2::new(0.0, 1.0)) < 1e-12);
        assert!(op.apply(&p, 1.0).start_value().distance(DVec2::new(-1.0, 0.0)) < 1e-12);
    }

    #[test]
    fn dilation_starts_at_identity() {
        let op = TransformOp::Dilate {
            scale: 3.0,
            about: DVec2::ZERO,
        };
        let p = PointShape::new(DVec2::new(2.0, 1.0));
        assert_eq!(op.apply(&p, 0.0), p);
        assert_eq!(op.apply(&p, 1.0).at, DVec2::new(6.0, 3.0));
    }
}
