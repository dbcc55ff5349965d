//! Vertex rings: open or closed polygons and filled regions with holes.

use super::{Geometry, ShapeKind, Transformable};
use crate::defaults;
use crate::types::{EPSILON, Pt, mix, on_segment, path_length, signed_area};

/// An ordered chain of vertices. Closed polygons have an implicit edge from
/// the last vertex back to the first; open ones are polylines.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub vertices: Vec<Pt>,
    pub closed: bool,
}

impl PolygonShape {
    pub fn closed(vertices: Vec<Pt>) -> Self {
        Self {
            vertices,
            closed: true,
        }
    }

    pub fn open(vertices: Vec<Pt>) -> Self {
        Self {
            vertices,
            closed: false,
        }
    }

    /// Edges in drawing order, including the closing edge.
    pub fn edges(&self) -> Vec<(Pt, Pt)> {
        edges_of(&self.vertices, self.closed)
    }

    pub fn area(&self) -> f64 {
        if self.closed {
            signed_area(&self.vertices).abs()
        } else {
            0.0
        }
    }
}

fn edges_of(vertices: &[Pt], closed: bool) -> Vec<(Pt, Pt)> {
    let mut edges: Vec<(Pt, Pt)> = vertices.windows(2).map(|w| (w[0], w[1])).collect();
    if closed && vertices.len() > 2 {
        edges.push((vertices[vertices.len() - 1], vertices[0]));
    }
    edges
}

/// Index of the edge `p` lies on, testing every edge starting at `prefer`.
fn locate_edge(p: Pt, edges: &[(Pt, Pt)], prefer: usize) -> usize {
    let n = edges.len();
    (0..n)
        .map(|k| (prefer + k) % n)
        .find(|&i| on_segment(p, edges[i].0, edges[i].1, 1e-7))
        .unwrap_or(prefer)
}

/// Cut the chain between two progress ratios.
///
/// The boundary is resampled into an equal number of samples per edge, so
/// progress is parametrized by sample index rather than arc length. Each
/// ratio picks a sample; the edge carrying that sample is found by a
/// point-on-segment search, and the vertices strictly between the two cut
/// points are spliced in. On a closed chain a reversed range runs across
/// the seam instead of backwards.
pub(crate) fn part_chain(vertices: &[Pt], closed: bool, from: f64, to: f64) -> Vec<Pt> {
    let edges = edges_of(vertices, closed);
    if edges.is_empty() {
        return vertices.to_vec();
    }
    let per_edge = defaults::PART_SAMPLES_PER_EDGE;
    let total = edges.len() * per_edge;

    let sample = |k: usize| -> Pt {
        let e = (k / per_edge).min(edges.len() - 1);
        let t = (k - e * per_edge) as f64 / per_edge as f64;
        mix(edges[e].0, edges[e].1, t)
    };
    let index = |r: f64| -> usize { (r.clamp(0.0, 1.0) * total as f64).round() as usize };

    let (mut ka, mut kb) = (index(from), index(to));
    let backwards = !closed && ka > kb;
    if backwards {
        std::mem::swap(&mut ka, &mut kb);
    }

    let a = sample(ka);
    let b = sample(kb);
    let ea = locate_edge(a, &edges, (ka / per_edge).min(edges.len() - 1));
    let eb = locate_edge(b, &edges, (kb / per_edge).min(edges.len() - 1));

    let mut chain = vec![a];
    if ka <= kb {
        chain.extend((ea + 1..=eb).map(|i| edges[i].0));
    } else {
        chain.extend((ea + 1..edges.len()).map(|i| edges[i].0));
        chain.extend((0..=eb).map(|i| edges[i].0));
    }
    chain.push(b);
    chain.dedup_by(|x, y| x.distance(*y) <= EPSILON);

    if backwards {
        chain.reverse();
    }
    chain
}

impl Geometry for PolygonShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polygon
    }

    fn start_value(&self) -> Pt {
        self.vertices.first().copied().unwrap_or_default()
    }

    fn end_value(&self) -> Pt {
        if self.closed {
            self.start_value()
        } else {
            self.vertices.last().copied().unwrap_or_default()
        }
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        self.vertices.get(i).copied()
    }

    fn control_points(&self) -> Vec<Pt> {
        self.vertices.clone()
    }

    fn path_length(&self) -> f64 {
        path_length(&self.vertices, self.closed)
    }
}

impl Transformable for PolygonShape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| f(*p)).collect(),
            closed: self.closed,
        }
    }

    /// Closed polygons keep their first vertex so the seam does not move.
    fn reverse(&self) -> Self {
        let mut vertices = self.vertices.clone();
        if self.closed && vertices.len() > 1 {
            vertices[1..].reverse();
        } else {
            vertices.reverse();
        }
        Self {
            vertices,
            closed: self.closed,
        }
    }

    fn part(&self, from: f64, to: f64) -> Self {
        Self::open(part_chain(&self.vertices, self.closed, from, to))
    }
}

/// A filled region: an outer ring plus hole rings.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledPolygonShape {
    pub outer: Vec<Pt>,
    pub holes: Vec<Vec<Pt>>,
}

impl FilledPolygonShape {
    pub fn new(outer: Vec<Pt>, holes: Vec<Vec<Pt>>) -> Self {
        Self { outer, holes }
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
    }
}

impl Geometry for FilledPolygonShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::FilledPolygon
    }

    fn start_value(&self) -> Pt {
        self.outer.first().copied().unwrap_or_default()
    }

    fn end_value(&self) -> Pt {
        self.start_value()
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        self.outer.get(i).copied()
    }

    fn control_points(&self) -> Vec<Pt> {
        self.outer
            .iter()
            .chain(self.holes.iter().flatten())
            .copied()
            .collect()
    }

    fn path_length(&self) -> f64 {
        path_length(&self.outer, true)
    }
}

impl Transformable for FilledPolygonShape {
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        Self {
            outer: self.outer.iter().map(|p| f(*p)).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|p| f(*p)).collect())
                .collect(),
        }
    }

    fn reverse(&self) -> Self {
        let flip = |ring: &Vec<Pt>| -> Vec<Pt> {
            let mut ring = ring.clone();
            if ring.len() > 1 {
                ring[1..].reverse();
            }
            ring
        };
        Self {
            outer: flip(&self.outer),
            holes: self.holes.iter().map(flip).collect(),
        }
    }

    /// Only the outer boundary is cut; holes are dropped from a partial region.
    fn part(&self, from: f64, to: f64) -> Self {
        if from <= 0.0 && to >= 1.0 {
            return self.clone();
        }
        Self::new(part_chain(&self.outer, true, from, to), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn square() -> PolygonShape {
        PolygonShape::closed(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn part_first_half_of_square() {
        let half = square().part(0.0, 0.5);
        assert!(!half.closed);
        assert_eq!(
            half.vertices,
            vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)]
        );
    }

    #[test]
    fn part_inside_one_edge() {
        let sub = square().part(0.125, 0.375);
        assert_eq!(sub.vertices.len(), 3);
        assert!(sub.vertices[0].distance(DVec2::new(0.5, 0.0)) < 1e-9);
        assert_eq!(sub.vertices[1], DVec2::new(1.0, 0.0));
        assert!(sub.vertices[2].distance(DVec2::new(1.0, 0.5)) < 1e-9);
    }

    #[test]
    fn part_across_the_seam() {
        let sub = square().part(0.875, 0.125);
        assert!(sub.vertices[0].distance(DVec2::new(0.0, 0.5)) < 1e-9);
        assert_eq!(sub.vertices[1], DVec2::new(0.0, 0.0));
        assert!(sub.vertices[2].distance(DVec2::new(0.5, 0.0)) < 1e-9);
        assert_eq!(sub.vertices.len(), 3);
    }

    #[test]
    fn part_parametrizes_by_sample_not_length() {
        // Edges of very different lengths still take equal shares.
        let poly = PolygonShape::open(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 1.0),
        ]);
        let first = poly.part(0.0, 0.5);
        assert_eq!(first.vertices, vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)]);
    }

    #[test]
    fn backwards_part_on_open_chain_is_reversed() {
        let poly = PolygonShape::open(vec![DVec2::ZERO, DVec2::new(4.0, 0.0)]);
        let sub = poly.part(0.75, 0.25);
        assert!(sub.vertices[0].distance(DVec2::new(3.0, 0.0)) < 1e-9);
        assert!(sub.vertices[1].distance(DVec2::new(1.0, 0.0)) < 1e-9);
    }

    #[test]
    fn reverse_keeps_seam() {
        let rev = square().reverse();
        assert_eq!(rev.vertices[0], DVec2::ZERO);
        assert_eq!(rev.vertices[1], DVec2::new(0.0, 1.0));
    }

    #[test]
    fn filled_area_subtracts_holes() {
        let outer = vec![DVec2::ZERO, DVec2::new(4.0, 0.0), DVec2::new(4.0, 4.0), DVec2::new(0.0, 4.0)];
        let hole = vec![DVec2::ONE, DVec2::new(1.0, 2.0), DVec2::new(2.0, 2.0), DVec2::new(2.0, 1.0)];
        let filled = FilledPolygonShape::new(outer, vec![hole]);
        assert_eq!(filled.area(), 15.0);
    }
}
