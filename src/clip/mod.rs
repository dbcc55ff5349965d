//! Polygon boolean operations (intersection, union, difference, xor)
//!
//! A Vatti scan-beam clipper working on fixed-point coordinates. Input
//! rings are scaled by [`defaults::CLIP_SCALE`] and rounded to `i64`; all
//! slope tests are exact in `i128`. Output rings are simple, outers run
//! counter-clockwise and holes clockwise (y-up), and each hole is attached
//! to the smallest outer that encloses it.

mod edge;
mod engine;
mod output;
mod simple;

use edge::{IntPt, PolyKind};
use engine::Clipper;

use crate::defaults;
use crate::errors::ClipError;
use crate::types::{Pt, signed_area};

/// One ring of vertices, implicitly closed.
pub type Path = Vec<Pt>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOp {
    Intersection,
    Union,
    Difference,
    Xor,
}

impl ClipOp {
    pub fn name(self) -> &'static str {
        match self {
            ClipOp::Intersection => "and",
            ClipOp::Union => "or",
            ClipOp::Difference => "diff",
            ClipOp::Xor => "xor",
        }
    }
}

/// Which regions of a self-overlapping input count as filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    NonZero,
}

/// An outer ring with the holes it directly contains.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExPolygon {
    pub outer: Path,
    pub holes: Vec<Path>,
}

impl ExPolygon {
    pub fn area(&self) -> f64 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
    }
}

/// Total filled area of a clipping result.
pub fn area(polys: &[ExPolygon]) -> f64 {
    polys.iter().map(ExPolygon::area).sum()
}

/// Combine `subject` and `clip` with `op`.
///
/// Degenerate rings (fewer than three distinct vertices, or no area) are
/// ignored, so such input yields an empty result rather than an error.
/// `Err` is only returned for out-of-range coordinates or an internal
/// invariant violation in the sweep.
pub fn execute(subject: &[Path], clip: &[Path], op: ClipOp, fill: FillRule) -> Result<Vec<ExPolygon>, ClipError> {
    crate::log::debug!(
        op = op.name(),
        subject = subject.len(),
        clip = clip.len(),
        "clipping"
    );

    let mut clipper = Clipper::new(op, fill);
    for (paths, kind) in [(subject, PolyKind::Subject), (clip, PolyKind::Clip)] {
        for path in paths {
            let fixed = to_fixed(path)?;
            if !clipper.add_path(&fixed, kind) {
                crate::log::trace!(vertices = path.len(), "skipping degenerate ring");
            }
        }
    }

    let rings = simple::split_touching(clipper.execute()?);
    let result = build_expolygons(rings);
    crate::log::debug!(polygons = result.len(), "clipping done");
    Ok(result)
}

fn to_fixed(path: &[Pt]) -> Result<Vec<IntPt>, ClipError> {
    let scale = |v: f64| -> Result<i64, ClipError> {
        if !v.is_finite() || v.abs() > defaults::CLIP_RANGE {
            return Err(ClipError::CoordinateOutOfRange { value: v });
        }
        Ok(edge::round(v * defaults::CLIP_SCALE))
    };
    path.iter()
        .map(|p| Ok(IntPt::new(scale(p.x)?, scale(p.y)?)))
        .collect()
}

fn to_float(ring: &[IntPt]) -> Path {
    ring.iter()
        .map(|p| Pt::new(p.x as f64 / defaults::CLIP_SCALE, p.y as f64 / defaults::CLIP_SCALE))
        .collect()
}

/// True when `inner` lies inside `outer`. Rings never cross, so any point
/// strictly inside `inner` decides, even when every vertex of `inner` sits
/// on `outer`.
fn ring_inside(inner: &[IntPt], outer: &[IntPt]) -> bool {
    simple::interior_point(inner).is_some_and(|q| simple::contains(outer, q))
}

fn oriented(mut ring: Path, ccw: bool) -> Path {
    if (signed_area(&ring) > 0.0) != ccw {
        ring.reverse();
    }
    ring
}

/// Group rings into outers and holes by nesting depth: even depth is an
/// outer, odd depth a hole of the smallest enclosing outer one level up.
fn build_expolygons(rings: Vec<Vec<IntPt>>) -> Vec<ExPolygon> {
    let n = rings.len();
    let areas: Vec<f64> = rings.iter().map(|r| signed_area(&to_float(r)).abs()).collect();
    let containers: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i && areas[j] > areas[i] && ring_inside(&rings[i], &rings[j]))
                .collect()
        })
        .collect();
    let depth: Vec<usize> = containers.iter().map(Vec::len).collect();

    let mut outers: Vec<usize> = (0..n).filter(|&i| depth[i] % 2 == 0).collect();
    outers.sort_by(|&a, &b| areas[b].total_cmp(&areas[a]));

    let mut result: Vec<ExPolygon> = outers
        .iter()
        .map(|&i| ExPolygon {
            outer: oriented(to_float(&rings[i]), true),
            holes: Vec::new(),
        })
        .collect();

    for hole in (0..n).filter(|&i| depth[i] % 2 == 1) {
        let parent = containers[hole]
            .iter()
            .copied()
            .filter(|&j| depth[j] + 1 == depth[hole])
            .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
        if let Some(slot) = parent.and_then(|p| outers.iter().position(|&o| o == p)) {
            result[slot].holes.push(oriented(to_float(&rings[hole]), false));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
        ]
    }

    fn run(a: &Path, b: &Path, op: ClipOp) -> Vec<ExPolygon> {
        execute(std::slice::from_ref(a), std::slice::from_ref(b), op, FillRule::EvenOdd).unwrap()
    }

    fn assert_close(actual: f64, expected: f64, what: &str) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "{what}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn overlapping_squares() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 1.0, 3.0, 3.0);
        assert_close(area(&run(&a, &b, ClipOp::Intersection)), 1.0, "and");
        assert_close(area(&run(&a, &b, ClipOp::Union)), 7.0, "or");
        assert_close(area(&run(&a, &b, ClipOp::Difference)), 3.0, "diff");
        assert_close(area(&run(&a, &b, ClipOp::Xor)), 6.0, "xor");
        assert_eq!(run(&a, &b, ClipOp::Union).len(), 1);
    }

    #[test]
    fn area_identity_for_triangles() {
        let a = vec![DVec2::new(0.0, 0.0), DVec2::new(5.0, 0.5), DVec2::new(1.5, 4.0)];
        let b = vec![DVec2::new(1.0, -1.0), DVec2::new(4.0, 3.0), DVec2::new(-0.5, 2.5)];
        let and = area(&run(&a, &b, ClipOp::Intersection));
        let a_minus_b = area(&run(&a, &b, ClipOp::Difference));
        let b_minus_a = area(&run(&b, &a, ClipOp::Difference));
        let or = area(&run(&a, &b, ClipOp::Union));
        let xor = area(&run(&a, &b, ClipOp::Xor));
        assert_close(and + a_minus_b + b_minus_a, or, "and + diffs");
        assert_close(a_minus_b + b_minus_a, xor, "xor");
        assert!(and > 0.0);
    }

    #[test]
    fn difference_leaves_a_hole() {
        let big = rect(0.0, 0.0, 4.0, 4.0);
        let small = rect(1.0, 1.0, 3.0, 3.0);
        let result = run(&big, &small, ClipOp::Difference);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 1);
        assert_close(result[0].area(), 12.0, "area");
        assert!(signed_area(&result[0].outer) > 0.0, "outer is counter-clockwise");
        assert!(signed_area(&result[0].holes[0]) < 0.0, "hole is clockwise");
    }

    #[test]
    fn disjoint_union_keeps_both() {
        let result = run(&rect(0.0, 0.0, 1.0, 1.0), &rect(5.0, 5.0, 6.0, 7.0), ClipOp::Union);
        assert_eq!(result.len(), 2);
        assert_close(area(&result), 3.0, "area");
        assert!(run(&rect(0.0, 0.0, 1.0, 1.0), &rect(5.0, 5.0, 6.0, 7.0), ClipOp::Intersection).is_empty());
    }

    #[test]
    fn degenerate_input_is_empty() {
        let flat = vec![DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0)];
        let dup = vec![DVec2::ONE, DVec2::ONE, DVec2::ONE];
        assert!(run(&flat, &dup, ClipOp::Union).is_empty());
    }

    #[test]
    fn self_overlap_depends_on_fill_rule() {
        // the same square twice
        let sq = rect(0.0, 0.0, 1.0, 1.0);
        let subject = vec![sq.clone(), sq];
        let even_odd = execute(&subject, &[], ClipOp::Union, FillRule::EvenOdd).unwrap();
        let non_zero = execute(&subject, &[], ClipOp::Union, FillRule::NonZero).unwrap();
        assert!(even_odd.is_empty());
        assert_close(area(&non_zero), 1.0, "nonzero");
    }

    fn path(points: &[(f64, f64)]) -> Path {
        points.iter().map(|&(x, y)| DVec2::new(x, y)).collect()
    }

    fn cross(a: Pt, b: Pt, c: Pt) -> f64 {
        (b - a).perp_dot(c - a)
    }

    /// First pair of edges, across all rings of `rings`, that cross at a
    /// point interior to both.
    fn find_crossing<'a>(rings: impl IntoIterator<Item = &'a Path>) -> Option<[Pt; 4]> {
        const EPS: f64 = 1e-9;
        let edges: Vec<(Pt, Pt)> = rings
            .into_iter()
            .flat_map(|r| r.iter().copied().zip(r.iter().copied().cycle().skip(1)))
            .collect();
        let opposite = |d1: f64, d2: f64| (d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS);
        for (i, &(p1, p2)) in edges.iter().enumerate() {
            for &(q1, q2) in &edges[i + 1..] {
                if opposite(cross(p1, p2, q1), cross(p1, p2, q2)) && opposite(cross(q1, q2, p1), cross(q1, q2, p2)) {
                    return Some([p1, p2, q1, q2]);
                }
            }
        }
        None
    }

    fn rings_of(result: &[ExPolygon]) -> impl Iterator<Item = &Path> {
        result.iter().flat_map(|p| std::iter::once(&p.outer).chain(&p.holes))
    }

    /// Checks every identity between the four operations on `a` and `b`,
    /// plus simplicity and orientation of each result.
    fn check_pair(a: &Path, b: &Path) {
        let and = run(a, b, ClipOp::Intersection);
        let or = run(a, b, ClipOp::Union);
        let a_minus_b = run(a, b, ClipOp::Difference);
        let b_minus_a = run(b, a, ClipOp::Difference);
        let xor = run(a, b, ClipOp::Xor);
        let ctx = format!("a={a:?} b={b:?}");

        let (area_a, area_b) = (signed_area(a).abs(), signed_area(b).abs());
        let close = |x: f64, y: f64| (x - y).abs() < 1e-4;
        assert!(close(area(&and) + area(&or), area_a + area_b), "and + or: {ctx}");
        assert!(close(area(&and) + area(&a_minus_b), area_a), "a = and + (a - b): {ctx}");
        assert!(close(area(&and) + area(&b_minus_a), area_b), "b = and + (b - a): {ctx}");
        assert!(close(area(&xor), area(&a_minus_b) + area(&b_minus_a)), "xor: {ctx}");

        for (name, result) in [("and", &and), ("or", &or), ("a-b", &a_minus_b), ("b-a", &b_minus_a), ("xor", &xor)] {
            if let Some(edges) = find_crossing(rings_of(result)) {
                panic!("{name} output crosses itself at {edges:?}: {ctx}");
            }
            for poly in result.iter() {
                assert!(signed_area(&poly.outer) > 0.0, "{name} outer is clockwise: {ctx}");
                for hole in &poly.holes {
                    assert!(signed_area(hole) < 0.0, "{name} hole is counter-clockwise: {ctx}");
                }
            }
        }
    }

    #[test]
    fn hole_with_every_vertex_on_the_outer() {
        // the intersection is a triangle whose corners all lie on the
        // union's boundary, so in the xor it is a hole
        let a = path(&[(5.0, 1.0), (1.0, 3.0), (0.0, 1.0), (-4.0, 1.0), (-1.0, -1.0), (0.0, -1.0), (1.0, -1.0)]);
        let b = path(&[(1.0, 3.0), (0.0, 6.0), (-2.0, 3.0), (-1.0, 2.0), (3.0, 0.0)]);
        let xor = run(&a, &b, ClipOp::Xor);
        let diffs = area(&run(&a, &b, ClipOp::Difference)) + area(&run(&b, &a, ClipOp::Difference));
        assert_close(area(&xor), diffs, "xor");
        assert_eq!(xor.iter().map(|p| p.holes.len()).sum::<usize>(), 1);
        assert_close(xor.iter().flat_map(|p| &p.holes).map(|h| signed_area(h)).sum(), -2.8, "hole");
        check_pair(&a, &b);
    }

    #[test]
    fn vertex_on_the_other_edge_keeps_rings_simple() {
        // b's edge (4,1)-(-2,3) passes exactly through a's corner (1,2)
        let a = path(&[(3.0, 0.0), (2.0, 2.0), (1.0, 2.0), (-1.0, 3.0), (-2.0, 0.0)]);
        let b = path(&[(4.0, 1.0), (-2.0, 3.0), (2.0, -2.0)]);
        for op in [ClipOp::Difference, ClipOp::Xor] {
            let result = run(&a, &b, op);
            assert_eq!(find_crossing(rings_of(&result)), None, "{}", op.name());
        }
        check_pair(&a, &b);
    }

    /// Linear congruential generator, enough for reproducible test input.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn range(&mut self, lo: i64, hi: i64) -> i64 {
            lo + (self.next() % (hi - lo + 1) as u64) as i64
        }
    }

    fn touches_other_edge(p: &Path) -> bool {
        let n = p.len();
        (0..n).any(|i| {
            let (a, b) = (p[i], p[(i + 1) % n]);
            p.iter().any(|&v| {
                v != a && v != b && cross(a, b, v) == 0.0 && (v - a).dot(v - b) < 0.0
            })
        })
    }

    /// A simple polygon on the integer grid: random points ordered by angle
    /// around their centroid, retried until no edge touches another.
    fn grid_polygon(rng: &mut Lcg) -> Path {
        loop {
            let n = rng.range(3, 7) as usize;
            let mut pts: Vec<(i64, i64)> = (0..n).map(|_| (rng.range(-4, 6), rng.range(-4, 6))).collect();
            pts.sort();
            pts.dedup();
            let mut p: Path = pts.iter().map(|&(x, y)| DVec2::new(x as f64, y as f64)).collect();
            if p.len() < 3 {
                continue;
            }
            let c = p.iter().copied().sum::<Pt>() / p.len() as f64;
            let angle = |u: &Pt| (u.y - c.y).atan2(u.x - c.x);
            p.sort_by(|u, v| angle(u).total_cmp(&angle(v)));
            if signed_area(&p).abs() > 0.5 && find_crossing([&p]).is_none() && !touches_other_edge(&p) {
                return p;
            }
        }
    }

    #[test]
    fn random_grid_pairs_satisfy_the_area_identities() {
        let mut rng = Lcg(0x5eed_c11b);
        for _ in 0..300 {
            let a = grid_polygon(&mut rng);
            let b = grid_polygon(&mut rng);
            check_pair(&a, &b);
        }
    }

    #[test]
    fn out_of_range_is_an_error() {
        let huge = rect(0.0, 0.0, 1e12, 1.0);
        let err = execute(&[huge], &[], ClipOp::Union, FillRule::EvenOdd).unwrap_err();
        assert!(matches!(err, ClipError::CoordinateOutOfRange { .. }));
    }
}
