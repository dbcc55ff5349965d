//! Shape values and the transformation engine
//!
//! Every geometric value a statement can produce is one variant of
//! [`Shape`]. Two capabilities are shared by all of them:
//!
//! - [`Geometry`]: read-only queries (type tag, start/end, indexed
//!   positions). Dispatched through `enum_dispatch`.
//! - [`Transformable`]: pure rotate/translate/dilate/reflect/project plus
//!   `reverse` and `part`. Every call returns a new value of the same
//!   variant and leaves the receiver untouched.

mod arc;
mod group;
mod line;
mod pair;
mod point;
mod polygon;
mod spline;
pub mod transform;

pub use arc::ArcShape;
pub use group::GroupShape;
pub use line::LineShape;
pub use pair::PointPairShape;
pub use point::PointShape;
pub use polygon::{FilledPolygonShape, PolygonShape};
pub use spline::SplineShape;
pub use transform::TransformOp;

use enum_dispatch::enum_dispatch;

use crate::types::{Pt, foot, mirror, mix, rotate_about};

/// Variant tag of a shape (`getType()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Line,
    Polygon,
    FilledPolygon,
    Arc,
    Spline,
    PointPair,
    Group,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Point => "point",
            ShapeKind::Line => "line",
            ShapeKind::Polygon => "polygon",
            ShapeKind::FilledPolygon => "filled polygon",
            ShapeKind::Arc => "arc",
            ShapeKind::Spline => "spline",
            ShapeKind::PointPair => "point pair",
            ShapeKind::Group => "group",
        }
    }
}

/// Read-only queries shared by all shapes
#[enum_dispatch]
pub trait Geometry {
    /// The variant tag
    fn kind(&self) -> ShapeKind;

    /// Where drawing the shape begins
    fn start_value(&self) -> Pt;

    /// Where drawing the shape ends
    fn end_value(&self) -> Pt;

    /// The i-th defining position, if there is one
    fn position_index(&self, i: usize) -> Option<Pt>;

    /// All defining positions in order
    fn control_points(&self) -> Vec<Pt>;

    /// Length of the drawn path
    fn path_length(&self) -> f64;
}

/// Pure geometric transforms.
///
/// Vertex-based shapes only implement [`Transformable::map_points`]; the
/// provided methods apply the per-point math. Shapes whose parameters are
/// not all points (arcs, groups) override the methods they need.
pub trait Transformable: Sized {
    /// Apply `f` to every defining point.
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self;

    /// Reverse the drawing direction.
    fn reverse(&self) -> Self;

    /// Sub-path between two progress ratios.
    fn part(&self, from: f64, to: f64) -> Self;

    fn rotate(&self, degrees: f64, about: Pt) -> Self {
        self.map_points(&|p| rotate_about(p, degrees, about))
    }

    fn translate(&self, vector: Pt, _about: Pt) -> Self {
        self.map_points(&|p| p + vector)
    }

    fn dilate(&self, scale: f64, about: Pt) -> Self {
        self.map_points(&|p| about + (p - about) * scale)
    }

    /// Mirror across the line through `p1`, `p2`, blended with the
    /// original by `ratio` (0 = identity, 1 = full reflection).
    fn reflect(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        self.map_points(&|p| mirror(p, p1, p2).map_or(p, |m| mix(p, m, ratio)))
    }

    /// Orthogonal projection onto the line through `p1`, `p2`, blended with
    /// the original by `ratio`.
    fn project(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        self.map_points(&|p| foot(p, p1, p2).map_or(p, |f| mix(p, f, ratio)))
    }
}

/// Any geometric value.
#[enum_dispatch(Geometry)]
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(PointShape),
    Line(LineShape),
    Polygon(PolygonShape),
    FilledPolygon(FilledPolygonShape),
    Arc(ArcShape),
    Spline(SplineShape),
    PointPair(PointPairShape),
    Group(GroupShape),
}

/// Forward a `Transformable` method to the concrete variant and re-wrap it.
macro_rules! dispatch_transform {
    ($self:ident, $s:ident => $call:expr) => {
        match $self {
            Shape::Point($s) => Shape::Point($call),
            Shape::Line($s) => Shape::Line($call),
            Shape::Polygon($s) => Shape::Polygon($call),
            Shape::FilledPolygon($s) => Shape::FilledPolygon($call),
            Shape::Arc($s) => Shape::Arc($call),
            Shape::Spline($s) => Shape::Spline($call),
            Shape::PointPair($s) => Shape::PointPair($call),
            Shape::Group($s) => Shape::Group($call),
        }
    };
}

impl Transformable for Shape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        dispatch_transform!(self, s => s.map_points(f))
    }

    fn reverse(&self) -> Self {
        dispatch_transform!(self, s => s.reverse())
    }

    fn part(&self, from: f64, to: f64) -> Self {
        dispatch_transform!(self, s => s.part(from, to))
    }

    fn rotate(&self, degrees: f64, about: Pt) -> Self {
        dispatch_transform!(self, s => s.rotate(degrees, about))
    }

    fn translate(&self, vector: Pt, about: Pt) -> Self {
        dispatch_transform!(self, s => s.translate(vector, about))
    }

    fn dilate(&self, scale: f64, about: Pt) -> Self {
        dispatch_transform!(self, s => s.dilate(scale, about))
    }

    fn reflect(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        dispatch_transform!(self, s => s.reflect(p1, p2, ratio))
    }

    fn project(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        dispatch_transform!(self, s => s.project(p1, p2, ratio))
    }
}

impl Shape {
    /// Structural comparison with a tolerance on every coordinate.
    pub fn approx_eq(&self, other: &Shape, eps: f64) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        if let (Shape::Group(a), Shape::Group(b)) = (self, other) {
            return a.children.len() == b.children.len()
                && a.children.iter().zip(&b.children).all(|(x, y)| x.approx_eq(y, eps));
        }
        let (a, b) = (self.control_points(), other.control_points());
        a.len() == b.len() && a.iter().zip(&b).all(|(p, q)| p.distance(*q) <= eps)
    }

    pub fn as_point(&self) -> Option<Pt> {
        match self {
            Shape::Point(p) => Some(p.at),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineShape> {
        match self {
            Shape::Line(l) => Some(l),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn samples() -> Vec<Shape> {
        vec![
            PointShape::new(DVec2::new(1.0, 2.0)).into(),
            LineShape::new(DVec2::new(0.0, 0.0), DVec2::new(3.0, 1.0)).into(),
            PolygonShape::closed(vec![DVec2::ZERO, DVec2::new(2.0, 0.0), DVec2::new(1.0, 2.0)]).into(),
            FilledPolygonShape::new(vec![DVec2::ZERO, DVec2::X, DVec2::ONE], vec![]).into(),
            ArcShape::new(DVec2::new(1.0, 1.0), 2.0, 30.0, 120.0).into(),
            SplineShape::new(vec![DVec2::ZERO, DVec2::new(1.0, 2.0), DVec2::new(3.0, 1.0)]).into(),
            PointPairShape::new(DVec2::new(-1.0, 0.0), DVec2::new(1.0, 4.0)).into(),
            GroupShape::new(vec![
                PointShape::new(DVec2::new(5.0, 5.0)).into(),
                ArcShape::circle(DVec2::ZERO, 1.0).into(),
            ])
            .into(),
        ]
    }

    #[test]
    fn transforms_are_pure_and_keep_type() {
        let p1 = DVec2::new(0.0, 1.0);
        let p2 = DVec2::new(2.0, 3.0);
        for shape in samples() {
            let before = shape.clone();
            let results = [
                shape.rotate(33.0, p1),
                shape.translate(DVec2::new(1.0, -2.0), DVec2::ZERO),
                shape.dilate(1.5, p2),
                shape.reflect(p1, p2, 0.4),
                shape.project(p1, p2, 0.7),
                shape.reverse(),
                shape.part(0.2, 0.8),
            ];
            assert_eq!(shape, before, "receiver mutated for {:?}", shape.kind());
            for result in &results {
                assert_eq!(result.kind(), shape.kind());
            }
        }
    }

    #[test]
    fn reflect_zero_is_identity() {
        let p1 = DVec2::new(0.0, 1.0);
        let p2 = DVec2::new(2.0, 3.0);
        for shape in samples() {
            assert!(shape.reflect(p1, p2, 0.0).approx_eq(&shape, 1e-12), "{:?}", shape.kind());
        }
    }

    #[test]
    fn reflect_is_an_involution() {
        let p1 = DVec2::new(-1.0, 0.5);
        let p2 = DVec2::new(2.0, 3.0);
        for shape in samples() {
            let twice = shape.reflect(p1, p2, 1.0).reflect(p1, p2, 1.0);
            assert!(twice.approx_eq(&shape, 1e-9), "{:?}", shape.kind());
        }
    }

    #[test]
    fn full_reflection_moves_points_across_line() {
        let shape: Shape = PointShape::new(DVec2::new(2.0, 0.0)).into();
        let mirrored = shape.reflect(DVec2::ZERO, DVec2::new(0.0, 1.0), 1.0);
        assert!(mirrored.as_point().unwrap().distance(DVec2::new(-2.0, 0.0)) < 1e-12);
        let half = shape.reflect(DVec2::ZERO, DVec2::new(0.0, 1.0), 0.5);
        assert!(half.as_point().unwrap().distance(DVec2::ZERO) < 1e-12);
    }

    #[test]
    fn projection_lands_on_line() {
        let shape: Shape = LineShape::new(DVec2::new(0.0, 2.0), DVec2::new(3.0, 5.0)).into();
        let projected = shape.project(DVec2::ZERO, DVec2::X, 1.0);
        for p in projected.control_points() {
            assert!(p.y.abs() < 1e-12);
        }
    }
}
