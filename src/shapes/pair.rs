//! Two unrelated positions produced together, e.g. a line-circle intersection.

use super::{Geometry, ShapeKind, Transformable};
use crate::types::Pt;

#[derive(Debug, Clone, PartialEq)]
pub struct PointPairShape {
    pub a: Pt,
    pub b: Pt,
}

impl PointPairShape {
    pub fn new(a: Pt, b: Pt) -> Self {
        Self { a, b }
    }
}

impl Geometry for PointPairShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::PointPair
    }

    fn start_value(&self) -> Pt {
        self.a
    }

    fn end_value(&self) -> Pt {
        self.b
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        match i {
            0 => Some(self.a),
            1 => Some(self.b),
            _ => None,
        }
    }

    fn control_points(&self) -> Vec<Pt> {
        vec![self.a, self.b]
    }

    fn path_length(&self) -> f64 {
        0.0
    }
}

impl Transformable for PointPairShape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        Self::new(f(self.a), f(self.b))
    }

    fn reverse(&self) -> Self {
        Self::new(self.b, self.a)
    }

    // Two points have no path between them to cut.
    fn part(&self, _from: f64, _to: f64) -> Self {
        self.clone()
    }
}
