//! Output repair: touching vertices and ring containment
//!
//! The sweep rounds intersection points to the fixed-point grid, so a ring
//! can pass through a vertex that lies on one of its own edges, or cross an
//! edge by a fraction of a unit there. [`split_touching`] inserts such
//! vertices into the edges they touch and cuts every ring at its repeated
//! vertices, leaving simple rings that at most share vertices.

use std::collections::HashMap;

use super::edge::IntPt;

/// Largest distance, in fixed-point units, at which a vertex counts as
/// lying on an edge.
const TOUCH_TOLERANCE: f64 = 2.0;

pub(super) fn split_touching(rings: Vec<Vec<IntPt>>) -> Vec<Vec<IntPt>> {
    let vertices: Vec<IntPt> = rings.iter().flatten().copied().collect();
    let mut out = Vec::with_capacity(rings.len());
    for ring in &rings {
        let mut pending = vec![insert_touching(ring, &vertices)];
        while let Some(ring) = pending.pop() {
            let ring = dedup(ring);
            match repeated(&ring) {
                Some((i, j)) => {
                    let mut rest = ring[j..].to_vec();
                    rest.extend_from_slice(&ring[..i]);
                    pending.push(rest);
                    pending.push(ring[i..j].to_vec());
                }
                None => {
                    if ring.len() >= 3 && twice_area(&ring) != 0 {
                        out.push(ring);
                    }
                }
            }
        }
    }
    out
}

fn edges(ring: &[IntPt]) -> impl Iterator<Item = (IntPt, IntPt)> + '_ {
    ring.iter().copied().zip(ring.iter().copied().cycle().skip(1))
}

/// Copy of `ring` with every vertex of `vertices` that lies on one of its
/// edges inserted there, in order along the edge.
fn insert_touching(ring: &[IntPt], vertices: &[IntPt]) -> Vec<IntPt> {
    let mut out = Vec::with_capacity(ring.len());
    for (a, b) in edges(ring) {
        out.push(a);
        let mut touching: Vec<(i128, IntPt)> = vertices
            .iter()
            .filter_map(|&v| along_edge(a, b, v).map(|t| (t, v)))
            .collect();
        touching.sort_by_key(|(t, _)| *t);
        touching.dedup_by_key(|(_, v)| *v);
        out.extend(touching.into_iter().map(|(_, v)| v));
    }
    out
}

/// Position of `v` along `a -> b` (as a dot product) when it lies strictly
/// between the endpoints and within [`TOUCH_TOLERANCE`] of the segment.
fn along_edge(a: IntPt, b: IntPt, v: IntPt) -> Option<i128> {
    if v == a || v == b {
        return None;
    }
    let (dx, dy) = ((b.x - a.x) as i128, (b.y - a.y) as i128);
    let (vx, vy) = ((v.x - a.x) as i128, (v.y - a.y) as i128);
    let len2 = dx * dx + dy * dy;
    let dot = vx * dx + vy * dy;
    if dot <= 0 || dot >= len2 {
        return None;
    }
    let cross = (dx * vy - dy * vx) as f64;
    (cross * cross <= TOUCH_TOLERANCE * TOUCH_TOLERANCE * len2 as f64).then_some(dot)
}

fn dedup(mut ring: Vec<IntPt>) -> Vec<IntPt> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// First pair of indices `i < j` holding the same vertex.
fn repeated(ring: &[IntPt]) -> Option<(usize, usize)> {
    let mut seen = HashMap::with_capacity(ring.len());
    for (j, p) in ring.iter().enumerate() {
        if let Some(i) = seen.insert(*p, j) {
            return Some((i, j));
        }
    }
    None
}

fn twice_area(ring: &[IntPt]) -> i128 {
    edges(ring)
        .map(|(a, b)| a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128)
        .sum()
}

/// A point strictly inside `ring`: the middle of the first span cut by a
/// horizontal line halfway between its two smallest vertex levels.
pub(super) fn interior_point(ring: &[IntPt]) -> Option<(f64, f64)> {
    let y_min = ring.iter().map(|p| p.y).min()?;
    let y_next = ring.iter().map(|p| p.y).filter(|&y| y > y_min).min()?;
    let y = (y_min as f64 + y_next as f64) * 0.5;
    let mut xs: Vec<f64> = edges(ring).filter_map(|(a, b)| crossing_x(a, b, y)).collect();
    xs.sort_by(f64::total_cmp);
    xs.chunks_exact(2)
        .find(|span| span[1] > span[0])
        .map(|span| ((span[0] + span[1]) * 0.5, y))
}

/// Even-odd containment of a point that is not on the boundary of `ring`.
pub(super) fn contains(ring: &[IntPt], (x, y): (f64, f64)) -> bool {
    edges(ring)
        .filter_map(|(a, b)| crossing_x(a, b, y))
        .filter(|&cx| cx > x)
        .count()
        % 2
        == 1
}

fn crossing_x(a: IntPt, b: IntPt, y: f64) -> Option<f64> {
    let (ay, by) = (a.y as f64, b.y as f64);
    if (ay > y) == (by > y) {
        return None;
    }
    let (ax, bx) = (a.x as f64, b.x as f64);
    Some(ax + (y - ay) * (bx - ax) / (by - ay))
}
