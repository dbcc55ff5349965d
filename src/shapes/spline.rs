//! Smooth curves through control points (uniform Catmull-Rom)

use super::polygon::part_chain;
use super::{Geometry, ShapeKind, Transformable};
use crate::defaults;
use crate::types::{Pt, path_length};

#[derive(Debug, Clone, PartialEq)]
pub struct SplineShape {
    pub points: Vec<Pt>,
}

impl SplineShape {
    pub fn new(points: Vec<Pt>) -> Self {
        Self { points }
    }

    /// Dense polyline along the curve, passing through every control point.
    pub fn sampled(&self) -> Vec<Pt> {
        let n = self.points.len();
        if n < 3 {
            return self.points.clone();
        }
        let per_span = defaults::SPLINE_SAMPLES_PER_SPAN;
        let at = |i: isize| self.points[i.clamp(0, n as isize - 1) as usize];

        let mut out = Vec::with_capacity((n - 1) * per_span + 1);
        for span in 0..n - 1 {
            let i = span as isize;
            let (p0, p1, p2, p3) = (at(i - 1), at(i), at(i + 1), at(i + 2));
            for step in 0..per_span {
                let t = step as f64 / per_span as f64;
                out.push(catmull_rom(p0, p1, p2, p3, t));
            }
        }
        out.push(self.points[n - 1]);
        out
    }
}

fn catmull_rom(p0: Pt, p1: Pt, p2: Pt, p3: Pt, t: f64) -> Pt {
    let t2 = t * t;
    let t3 = t2 * t;
    ((p1 * 2.0)
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

impl Geometry for SplineShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Spline
    }

    fn start_value(&self) -> Pt {
        self.points.first().copied().unwrap_or_default()
    }

    fn end_value(&self) -> Pt {
        self.points.last().copied().unwrap_or_default()
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        self.points.get(i).copied()
    }

    fn control_points(&self) -> Vec<Pt> {
        self.points.clone()
    }

    fn path_length(&self) -> f64 {
        path_length(&self.sampled(), false)
    }
}

impl Transformable for SplineShape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        Self::new(self.points.iter().map(|p| f(*p)).collect())
    }

    fn reverse(&self) -> Self {
        Self::new(self.points.iter().rev().copied().collect())
    }

    /// The sub-curve is re-expressed through the dense samples it covers.
    fn part(&self, from: f64, to: f64) -> Self {
        if from <= 0.0 && to >= 1.0 {
            return self.clone();
        }
        Self::new(part_chain(&self.sampled(), false, from, to))
    }
}
