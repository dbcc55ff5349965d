//! A single position.

use super::{Geometry, ShapeKind, Transformable};
use crate::types::Pt;

#[derive(Debug, Clone, PartialEq)]
pub struct PointShape {
    pub at: Pt,
}

impl PointShape {
    pub fn new(at: Pt) -> Self {
        Self { at }
    }
}

impl Geometry for PointShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Point
    }

    fn start_value(&self) -> Pt {
        self.at
    }

    fn end_value(&self) -> Pt {
        self.at
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        (i == 0).then_some(self.at)
    }

    fn control_points(&self) -> Vec<Pt> {
        vec![self.at]
    }

    fn path_length(&self) -> f64 {
        0.0
    }
}

impl Transformable for PointShape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        Self::new(f(self.at))
    }

    fn reverse(&self) -> Self {
        self.clone()
    }

    fn part(&self, _from: f64, _to: f64) -> Self {
        self.clone()
    }
}
