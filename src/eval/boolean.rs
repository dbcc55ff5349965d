//! Boolean operations on shapes, via the polygon clipper

use crate::clip::{self, ClipOp, FillRule, Path};
use crate::defaults;
use crate::errors::ResolveError;
use crate::shapes::{FilledPolygonShape, Geometry, GroupShape, Shape};

/// The rings a shape contributes to a boolean operation.
///
/// Closed and filled polygons give their boundary (and holes); arcs are
/// polygonized, open arcs closed by their chord; groups contribute every
/// child's rings.
pub fn rings(shape: &Shape) -> Result<Vec<Path>, ResolveError> {
    match shape {
        Shape::Polygon(p) if p.closed => Ok(vec![p.vertices.clone()]),
        Shape::FilledPolygon(f) => Ok(std::iter::once(f.outer.clone()).chain(f.holes.iter().cloned()).collect()),
        Shape::Arc(arc) => Ok(vec![arc.ring(defaults::ARC_SEGMENTS)]),
        Shape::Group(g) => {
            let mut out = Vec::new();
            for child in &g.children {
                out.extend(rings(child)?);
            }
            Ok(out)
        }
        other => Err(ResolveError::TypeMismatch {
            expected: "closed polygon, filled polygon, arc or group",
            got: other.kind().name(),
        }),
    }
}

/// `a op b` under the even-odd rule. One result polygon is returned as a
/// filled polygon, several (or none) as a group.
pub fn combine(op: ClipOp, a: &Shape, b: &Shape) -> Result<Shape, ResolveError> {
    let subject = rings(a)?;
    let clip = rings(b)?;
    let polygons = clip::execute(&subject, &clip, op, FillRule::EvenOdd)?;
    let mut shapes: Vec<Shape> = polygons
        .into_iter()
        .map(|p| FilledPolygonShape::new(p.outer, p.holes).into())
        .collect();
    Ok(match shapes.len() {
        1 => shapes.remove(0),
        _ => GroupShape::new(shapes).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ArcShape, LineShape, PolygonShape};
    use glam::DVec2;

    fn square(x: f64, y: f64, side: f64) -> Shape {
        PolygonShape::closed(vec![
            DVec2::new(x, y),
            DVec2::new(x + side, y),
            DVec2::new(x + side, y + side),
            DVec2::new(x, y + side),
        ])
        .into()
    }

    #[test]
    fn union_of_overlapping_squares_is_one_filled_polygon() {
        let Shape::FilledPolygon(f) = combine(ClipOp::Union, &square(0.0, 0.0, 2.0), &square(1.0, 1.0, 2.0)).unwrap() else {
            panic!("expected a filled polygon");
        };
        assert!((f.area() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn empty_intersection_is_an_empty_group() {
        let result = combine(ClipOp::Intersection, &square(0.0, 0.0, 1.0), &square(5.0, 5.0, 1.0)).unwrap();
        assert_eq!(result, GroupShape::new(vec![]).into());
    }

    #[test]
    fn circle_minus_square() {
        let circle: Shape = ArcShape::circle(DVec2::ZERO, 1.0).into();
        let Shape::FilledPolygon(f) = combine(ClipOp::Difference, &circle, &square(-0.25, -0.25, 0.5)).unwrap() else {
            panic!("expected a filled polygon");
        };
        assert_eq!(f.holes.len(), 1);
        assert!(f.area() > 2.8 && f.area() < std::f64::consts::PI - 0.25);
    }

    #[test]
    fn lines_are_rejected() {
        let line: Shape = LineShape::new(DVec2::ZERO, DVec2::ONE).into();
        assert!(matches!(
            combine(ClipOp::Union, &line, &square(0.0, 0.0, 1.0)),
            Err(ResolveError::TypeMismatch { .. })
        ));
    }
}
