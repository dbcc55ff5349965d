//! Straight segment between two points.

use super::{Geometry, ShapeKind, Transformable};
use crate::types::{Pt, mix};

#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub start: Pt,
    pub end: Pt,
}

impl LineShape {
    pub fn new(start: Pt, end: Pt) -> Self {
        Self { start, end }
    }

    /// Direction vector `end - start`
    pub fn vector(&self) -> Pt {
        self.end - self.start
    }

    pub fn midpoint(&self) -> Pt {
        (self.start + self.end) * 0.5
    }

    pub fn is_degenerate(&self) -> bool {
        self.vector().length_squared() <= crate::types::EPSILON * crate::types::EPSILON
    }
}

impl Geometry for LineShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn start_value(&self) -> Pt {
        self.start
    }

    fn end_value(&self) -> Pt {
        self.end
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        match i {
            0 => Some(self.start),
            1 => Some(self.end),
            _ => None,
        }
    }

    fn control_points(&self) -> Vec<Pt> {
        vec![self.start, self.end]
    }

    fn path_length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

impl Transformable for LineShape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        Self::new(f(self.start), f(self.end))
    }

    fn reverse(&self) -> Self {
        Self::new(self.end, self.start)
    }

    fn part(&self, from: f64, to: f64) -> Self {
        Self::new(
            mix(self.start, self.end, from),
            mix(self.start, self.end, to),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn part_of_line() {
        let line = LineShape::new(DVec2::ZERO, DVec2::new(10.0, 0.0));
        let sub = line.part(0.25, 0.5);
        assert_eq!(sub.start, DVec2::new(2.5, 0.0));
        assert_eq!(sub.end, DVec2::new(5.0, 0.0));
        assert_eq!(line.part(0.0, 1.0), line);
    }

    #[test]
    fn dilate_about_start() {
        let line = LineShape::new(DVec2::ONE, DVec2::new(2.0, 1.0));
        let big = line.dilate(3.0, DVec2::ONE);
        assert_eq!(big.end, DVec2::new(4.0, 1.0));
        assert_eq!(big.start, DVec2::ONE);
    }
}
