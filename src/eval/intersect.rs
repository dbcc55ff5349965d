//! `intersect(a, b)` for lines and circles

use crate::errors::ResolveError;
use crate::shapes::{LineShape, PointPairShape, PointShape, Shape};
use crate::types::{EPSILON, Pt, foot};

/// The infinite carrier of a line or the full circle of an arc.
enum Carrier {
    Line(Pt, Pt),
    Circle(Pt, f64),
}

fn carrier(shape: &Shape) -> Result<Carrier, ResolveError> {
    match shape {
        Shape::Line(LineShape { start, end }) => {
            if start.distance(*end) <= EPSILON {
                return Err(ResolveError::Degenerate {
                    what: "zero-length line",
                });
            }
            Ok(Carrier::Line(*start, *end))
        }
        Shape::Arc(arc) => Ok(Carrier::Circle(arc.center, arc.radius)),
        other => Err(ResolveError::TypeMismatch {
            expected: "line or circle",
            got: crate::shapes::Geometry::kind(other).name(),
        }),
    }
}

/// Intersection of two lines or circles: a Point when there is exactly one
/// (crossing lines, tangency), a PointPair when there are two.
pub fn intersect(a: &Shape, b: &Shape) -> Result<Shape, ResolveError> {
    match (carrier(a)?, carrier(b)?) {
        (Carrier::Line(p, q), Carrier::Line(r, s)) => line_line(p, q, r, s),
        (Carrier::Line(p, q), Carrier::Circle(c, rad)) | (Carrier::Circle(c, rad), Carrier::Line(p, q)) => {
            line_circle(p, q, c, rad)
        }
        (Carrier::Circle(c1, r1), Carrier::Circle(c2, r2)) => circle_circle(c1, r1, c2, r2),
    }
}

fn line_line(p: Pt, q: Pt, r: Pt, s: Pt) -> Result<Shape, ResolveError> {
    let d1 = q - p;
    let d2 = s - r;
    let denom = d1.perp_dot(d2);
    if denom.abs() <= EPSILON * d1.length() * d2.length() {
        return Err(ResolveError::NoIntersection);
    }
    let t = (r - p).perp_dot(d2) / denom;
    Ok(PointShape::new(p + d1 * t).into())
}

fn line_circle(p: Pt, q: Pt, center: Pt, radius: f64) -> Result<Shape, ResolveError> {
    let f = foot(center, p, q).ok_or(ResolveError::Degenerate {
        what: "zero-length line",
    })?;
    let h = center.distance(f);
    let tol = EPSILON * radius.max(1.0);
    if h > radius + tol {
        return Err(ResolveError::NoIntersection);
    }
    let half = (radius * radius - h * h).max(0.0).sqrt();
    if half <= tol {
        return Ok(PointShape::new(f).into());
    }
    let dir = (q - p).normalize();
    Ok(PointPairShape::new(f - dir * half, f + dir * half).into())
}

fn circle_circle(c1: Pt, r1: f64, c2: Pt, r2: f64) -> Result<Shape, ResolveError> {
    let d = c1.distance(c2);
    let tol = EPSILON * r1.max(r2).max(1.0);
    if d <= tol || d > r1 + r2 + tol || d < (r1 - r2).abs() - tol {
        return Err(ResolveError::NoIntersection);
    }
    let along = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h2 = r1 * r1 - along * along;
    let axis = (c2 - c1) / d;
    let mid = c1 + axis * along;
    if h2 <= tol * tol {
        return Ok(PointShape::new(mid).into());
    }
    let h = h2.sqrt();
    let normal = axis.perp();
    Ok(PointPairShape::new(mid + normal * h, mid - normal * h).into())
}
