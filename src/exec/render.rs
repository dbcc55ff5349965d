//! Per-shape frame functions
//!
//! Each function is pure: given a shape and a progress ratio it returns the
//! primitives for that frame. Ratio 1 gives the committed output.

use crate::shapes::{ArcShape, FilledPolygonShape, GroupShape, LineShape, PointPairShape, PolygonShape, Shape, SplineShape};
use crate::types::{Pt, Ratio, mix};

use super::constrain::BoundaryConstrainer;
use super::renderer::Primitive;

pub fn shape_frame(shape: &Shape, ratio: Ratio) -> Vec<Primitive> {
    match shape {
        Shape::Point(p) => vec![Primitive::Point { at: p.at }],
        Shape::Line(l) => vec![line_frame(l, ratio)],
        Shape::Polygon(p) => vec![polygon_frame(p, ratio)],
        Shape::FilledPolygon(f) => vec![filled_frame(f, ratio)],
        Shape::Arc(a) => vec![arc_frame(a, ratio)],
        Shape::Spline(s) => vec![spline_frame(s, ratio)],
        Shape::PointPair(p) => pair_frame(p, ratio),
        Shape::Group(g) => group_frame(g, ratio),
    }
}

fn line_frame(line: &LineShape, ratio: Ratio) -> Primitive {
    Primitive::Line {
        from: line.start,
        to: mix(line.start, line.end, ratio.raw()),
    }
}

fn polygon_frame(polygon: &PolygonShape, ratio: Ratio) -> Primitive {
    if ratio.is_complete() {
        return Primitive::Polygon {
            points: polygon.vertices.clone(),
            closed: polygon.closed,
        };
    }
    Primitive::Polygon {
        points: partial_chain(&polygon.vertices, polygon.closed, ratio),
        closed: false,
    }
}

/// The outline is traced first; the fill appears on commit.
fn filled_frame(filled: &FilledPolygonShape, ratio: Ratio) -> Primitive {
    if ratio.is_complete() {
        return Primitive::Region {
            outer: filled.outer.clone(),
            holes: filled.holes.clone(),
        };
    }
    Primitive::Polygon {
        points: partial_chain(&filled.outer, true, ratio),
        closed: false,
    }
}

fn arc_frame(arc: &ArcShape, ratio: Ratio) -> Primitive {
    Primitive::Arc {
        center: arc.center,
        radius: arc.radius,
        start_angle: arc.start_angle,
        sweep: arc.sweep * ratio.raw(),
    }
}

fn spline_frame(spline: &SplineShape, ratio: Ratio) -> Primitive {
    let samples = spline.sampled();
    let points = if ratio.is_complete() {
        samples
    } else {
        partial_chain(&samples, false, ratio)
    };
    Primitive::Polygon { points, closed: false }
}

fn pair_frame(pair: &PointPairShape, ratio: Ratio) -> Vec<Primitive> {
    let (segment, _) = BoundaryConstrainer::uniform(2).constrain(ratio);
    let mut out = vec![Primitive::Point { at: pair.a }];
    if segment == 1 || ratio.is_complete() {
        out.push(Primitive::Point { at: pair.b });
    }
    out
}

/// Children are drawn one after another, each getting an equal share.
fn group_frame(group: &GroupShape, ratio: Ratio) -> Vec<Primitive> {
    if group.children.is_empty() {
        return Vec::new();
    }
    if ratio.is_complete() {
        return group.children.iter().flat_map(|c| shape_frame(c, Ratio::ONE)).collect();
    }
    let (current, local) = BoundaryConstrainer::uniform(group.children.len()).constrain(ratio);
    let mut out: Vec<Primitive> = group.children[..current]
        .iter()
        .flat_map(|c| shape_frame(c, Ratio::ONE))
        .collect();
    out.extend(shape_frame(&group.children[current], local));
    out
}

/// Prefix of a vertex chain covering `ratio` of its length: the finished
/// edges plus the current edge up to the local ratio.
fn partial_chain(vertices: &[Pt], closed: bool, ratio: Ratio) -> Vec<Pt> {
    let mut chain = vertices.to_vec();
    if closed {
        chain.extend(vertices.first().copied());
    }
    if chain.len() < 2 {
        return chain;
    }
    let lengths: Vec<f64> = chain.windows(2).map(|w| w[0].distance(w[1])).collect();
    let (edge, local) = BoundaryConstrainer::from_lengths(&lengths).constrain(ratio);
    let mut out = chain[..=edge].to_vec();
    out.push(mix(chain[edge], chain[edge + 1], local.raw()));
    out
}
