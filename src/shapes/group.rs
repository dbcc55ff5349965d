//! Composite shape: an ordered list of children transformed together

use super::{Geometry, Shape, ShapeKind, Transformable};
use crate::types::Pt;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupShape {
    pub children: Vec<Shape>,
}

impl GroupShape {
    pub fn new(children: Vec<Shape>) -> Self {
        Self { children }
    }

    fn each(&self, f: impl Fn(&Shape) -> Shape) -> Self {
        Self::new(self.children.iter().map(f).collect())
    }
}

impl Geometry for GroupShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Group
    }

    fn start_value(&self) -> Pt {
        self.children.first().map(Geometry::start_value).unwrap_or_default()
    }

    fn end_value(&self) -> Pt {
        self.children.last().map(Geometry::end_value).unwrap_or_default()
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        self.control_points().get(i).copied()
    }

    fn control_points(&self) -> Vec<Pt> {
        self.children.iter().flat_map(Geometry::control_points).collect()
    }

    fn path_length(&self) -> f64 {
        self.children.iter().map(Geometry::path_length).sum()
    }
}

impl Transformable for GroupShape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        self.each(|c| c.map_points(f))
    }

    fn reverse(&self) -> Self {
        Self::new(self.children.iter().rev().map(Transformable::reverse).collect())
    }

    /// Each child owns an equal slice of the progress range. Children
    /// entirely outside `[from, to]` are dropped.
    fn part(&self, from: f64, to: f64) -> Self {
        if from > to {
            return self.part(to, from).reverse();
        }
        let n = self.children.len() as f64;
        let children = self
            .children
            .iter()
            .enumerate()
            .filter_map(|(i, child)| {
                let lo = ((from * n) - i as f64).clamp(0.0, 1.0);
                let hi = ((to * n) - i as f64).clamp(0.0, 1.0);
                (hi > lo).then(|| child.part(lo, hi))
            })
            .collect();
        Self::new(children)
    }

    fn rotate(&self, degrees: f64, about: Pt) -> Self {
        self.each(|c| c.rotate(degrees, about))
    }

    fn translate(&self, vector: Pt, about: Pt) -> Self {
        self.each(|c| c.translate(vector, about))
    }

    fn dilate(&self, scale: f64, about: Pt) -> Self {
        self.each(|c| c.dilate(scale, about))
    }

    fn reflect(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        self.each(|c| c.reflect(p1, p2, ratio))
    }

    fn project(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        self.each(|c| c.project(p1, p2, ratio))
    }
}
