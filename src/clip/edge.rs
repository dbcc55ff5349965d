//! Edge records, fixed-point helpers and local-minima construction
//!
//! Every input ring is turned into a circular list of edges stored in one
//! arena (`Clipper::edges`). Links between edges are arena indices; [`NIL`]
//! marks an absent link. "Bottom" is the end with the larger `y`: the sweep
//! runs from large `y` toward small `y`.

use super::engine::Clipper;

pub(super) const NIL: usize = usize::MAX;

/// `dx` value marking a horizontal edge.
pub(super) const HORIZONTAL: f64 = -1.0e40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(super) struct IntPt {
    pub x: i64,
    pub y: i64,
}

impl IntPt {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PolyKind {
    Subject,
    Clip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub(super) struct Edge {
    pub bot: IntPt,
    pub curr: IntPt,
    pub top: IntPt,
    /// Change of x per unit of y, or [`HORIZONTAL`]
    pub dx: f64,
    pub poly: PolyKind,
    pub side: Side,
    pub wind_delta: i32,
    /// Winding count of the edge's own polygon kind
    pub wind_cnt: i32,
    /// Winding count of the other polygon kind
    pub wind_cnt2: i32,
    pub out_idx: Option<usize>,
    pub next: usize,
    pub prev: usize,
    pub next_in_lml: usize,
    pub next_in_ael: usize,
    pub prev_in_ael: usize,
    pub next_in_sel: usize,
    pub prev_in_sel: usize,
}

impl Edge {
    fn new(curr: IntPt, poly: PolyKind) -> Self {
        Self {
            bot: curr,
            curr,
            top: curr,
            dx: 0.0,
            poly,
            side: Side::Left,
            wind_delta: 0,
            wind_cnt: 0,
            wind_cnt2: 0,
            out_idx: None,
            next: NIL,
            prev: NIL,
            next_in_lml: NIL,
            next_in_ael: NIL,
            prev_in_ael: NIL,
            next_in_sel: NIL,
            prev_in_sel: NIL,
        }
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.dx == HORIZONTAL
    }

    fn set_dx(&mut self) {
        let dy = self.top.y - self.bot.y;
        self.dx = if dy == 0 {
            HORIZONTAL
        } else {
            (self.top.x - self.bot.x) as f64 / dy as f64
        };
    }

    /// x where the edge crosses the scan line `y`.
    pub fn top_x(&self, y: i64) -> i64 {
        if y == self.top.y {
            self.top.x
        } else {
            self.bot.x + round(self.dx * (y - self.bot.y) as f64)
        }
    }

    fn reverse_horizontal(&mut self) {
        std::mem::swap(&mut self.top.x, &mut self.bot.x);
    }
}

/// A vertex where two bounds start climbing; `left` and `right` are the
/// first edges of each bound.
#[derive(Debug, Clone, Copy)]
pub(super) struct LocalMinimum {
    pub y: i64,
    pub left: usize,
    pub right: usize,
}

/// Round half away from zero.
#[inline]
pub(super) fn round(v: f64) -> i64 {
    if v < 0.0 {
        (v - 0.5) as i64
    } else {
        (v + 0.5) as i64
    }
}

pub(super) fn slopes_equal3(p1: IntPt, p2: IntPt, p3: IntPt) -> bool {
    (p1.y - p2.y) as i128 * (p2.x - p3.x) as i128 == (p1.x - p2.x) as i128 * (p2.y - p3.y) as i128
}

pub(super) fn slopes_equal4(p1: IntPt, p2: IntPt, p3: IntPt, p4: IntPt) -> bool {
    (p1.y - p2.y) as i128 * (p3.x - p4.x) as i128 == (p1.x - p2.x) as i128 * (p3.y - p4.y) as i128
}

pub(super) fn edge_slopes_equal(e1: &Edge, e2: &Edge) -> bool {
    (e1.top.y - e1.bot.y) as i128 * (e2.top.x - e2.bot.x) as i128
        == (e1.top.x - e1.bot.x) as i128 * (e2.top.y - e2.bot.y) as i128
}

/// Where two edges cross, clamped to the current scan beam.
pub(super) fn intersect_point(e1: &Edge, e2: &Edge) -> IntPt {
    let mut ip = IntPt::default();
    if e1.dx == e2.dx {
        ip.y = e1.curr.y;
        ip.x = e1.top_x(ip.y);
        return ip;
    }
    if e1.dx == 0.0 {
        ip.x = e1.bot.x;
        ip.y = if e2.is_horizontal() {
            e2.bot.y
        } else {
            let b2 = e2.bot.y as f64 - e2.bot.x as f64 / e2.dx;
            round(ip.x as f64 / e2.dx + b2)
        };
    } else if e2.dx == 0.0 {
        ip.x = e2.bot.x;
        ip.y = if e1.is_horizontal() {
            e1.bot.y
        } else {
            let b1 = e1.bot.y as f64 - e1.bot.x as f64 / e1.dx;
            round(ip.x as f64 / e1.dx + b1)
        };
    } else {
        let b1 = e1.bot.x as f64 - e1.bot.y as f64 * e1.dx;
        let b2 = e2.bot.x as f64 - e2.bot.y as f64 * e2.dx;
        let q = (b2 - b1) / (e1.dx - e2.dx);
        ip.y = round(q);
        ip.x = if e1.dx.abs() < e2.dx.abs() {
            round(e1.dx * q + b1)
        } else {
            round(e2.dx * q + b2)
        };
    }

    if ip.y < e1.top.y || ip.y < e2.top.y {
        ip.y = e1.top.y.max(e2.top.y);
        ip.x = if e1.dx.abs() < e2.dx.abs() {
            e1.top_x(ip.y)
        } else {
            e2.top_x(ip.y)
        };
    }
    // never below the bottom of the beam
    if ip.y > e1.curr.y {
        ip.y = e1.curr.y;
        ip.x = if e1.dx.abs() > e2.dx.abs() {
            e2.top_x(ip.y)
        } else {
            e1.top_x(ip.y)
        };
    }
    ip
}

impl Clipper {
    /// Add one closed ring. Returns false when the ring has no area after
    /// duplicate and collinear vertices are dropped.
    pub(super) fn add_path(&mut self, path: &[IntPt], poly: PolyKind) -> bool {
        if path.is_empty() {
            return false;
        }
        let mut high = path.len() - 1;
        while high > 0 && path[high] == path[0] {
            high -= 1;
        }
        while high > 0 && path[high] == path[high - 1] {
            high -= 1;
        }
        if high < 2 {
            return false;
        }

        let base = self.edges.len();
        let n = high + 1;
        for (i, pt) in path.iter().take(n).enumerate() {
            let mut e = Edge::new(*pt, poly);
            e.next = base + (i + 1) % n;
            e.prev = base + (i + n - 1) % n;
            self.edges.push(e);
        }

        let mut e_start = base;
        let mut e = e_start;
        let mut loop_stop = e_start;
        loop {
            let next = self.edges[e].next;
            if self.edges[e].curr == self.edges[next].curr {
                if e == next {
                    break;
                }
                if e == e_start {
                    e_start = next;
                }
                e = self.remove_edge(e);
                loop_stop = e;
                continue;
            }
            let prev = self.edges[e].prev;
            if prev == next {
                break;
            }
            if slopes_equal3(self.edges[prev].curr, self.edges[e].curr, self.edges[next].curr) {
                if e == e_start {
                    e_start = next;
                }
                e = self.remove_edge(e);
                e = self.edges[e].prev;
                loop_stop = e;
                continue;
            }
            e = next;
            if e == loop_stop {
                break;
            }
        }
        if self.edges[e].prev == self.edges[e].next {
            return false;
        }

        let start_y = self.edges[e_start].curr.y;
        let mut is_flat = true;
        e = e_start;
        loop {
            self.init_edge_bounds(e);
            e = self.edges[e].next;
            if is_flat && self.edges[e].curr.y != start_y {
                is_flat = false;
            }
            if e == e_start {
                break;
            }
        }
        if is_flat {
            return false;
        }

        let prev = self.edges[e].prev;
        if self.edges[prev].bot == self.edges[prev].top {
            e = self.edges[e].next;
        }
        let mut e_min = NIL;
        loop {
            e = self.find_next_loc_min(e);
            if e == e_min {
                break;
            }
            if e_min == NIL {
                e_min = e;
            }

            let prev = self.edges[e].prev;
            let (left, right, left_forward) = if self.edges[e].dx < self.edges[prev].dx {
                (prev, e, false)
            } else {
                (e, prev, true)
            };
            let delta = if self.edges[left].next == right { -1 } else { 1 };
            self.edges[left].wind_delta = delta;
            self.edges[right].wind_delta = -delta;

            let y = self.edges[e].bot.y;
            let after_left = self.process_bound(left, left_forward);
            let after_right = self.process_bound(right, !left_forward);
            self.minima.push(LocalMinimum { y, left, right });
            e = if left_forward { after_left } else { after_right };
        }
        true
    }

    fn remove_edge(&mut self, e: usize) -> usize {
        let (prev, next) = (self.edges[e].prev, self.edges[e].next);
        self.edges[prev].next = next;
        self.edges[next].prev = prev;
        self.edges[e].prev = NIL;
        next
    }

    fn init_edge_bounds(&mut self, e: usize) {
        let next_curr = self.edges[self.edges[e].next].curr;
        let edge = &mut self.edges[e];
        if edge.curr.y >= next_curr.y {
            edge.bot = edge.curr;
            edge.top = next_curr;
        } else {
            edge.top = edge.curr;
            edge.bot = next_curr;
        }
        edge.set_dx();
    }

    fn find_next_loc_min(&self, mut e: usize) -> usize {
        let edges = &self.edges;
        loop {
            while edges[e].bot != edges[edges[e].prev].bot || edges[e].curr == edges[e].top {
                e = edges[e].next;
            }
            if !edges[e].is_horizontal() && !edges[edges[e].prev].is_horizontal() {
                break;
            }
            while edges[edges[e].prev].is_horizontal() {
                e = edges[e].prev;
            }
            let first_horz = e;
            while edges[e].is_horizontal() {
                e = edges[e].next;
            }
            if edges[e].top.y == edges[edges[e].prev].bot.y {
                // an intermediate horizontal, not a minimum
                continue;
            }
            if edges[edges[first_horz].prev].bot.x < edges[e].bot.x {
                e = first_horz;
            }
            break;
        }
        e
    }

    /// Chain the edges of one bound through `next_in_lml` and return the
    /// first edge past the bound's maximum.
    fn process_bound(&mut self, mut e: usize, forward: bool) -> usize {
        let mut result = e;

        if self.edges[e].is_horizontal() {
            let horz = if forward {
                self.edges[e].prev
            } else {
                self.edges[e].next
            };
            let bot_x = self.edges[e].bot.x;
            if self.edges[horz].is_horizontal() {
                if self.edges[horz].bot.x != bot_x && self.edges[horz].top.x != bot_x {
                    self.edges[e].reverse_horizontal();
                }
            } else if self.edges[horz].bot.x != bot_x {
                self.edges[e].reverse_horizontal();
            }
        }

        let e_start = e;
        if forward {
            while self.edges[result].top.y == self.edges[self.edges[result].next].bot.y {
                result = self.edges[result].next;
            }
            if self.edges[result].is_horizontal() {
                let mut horz = result;
                while self.edges[self.edges[horz].prev].is_horizontal() {
                    horz = self.edges[horz].prev;
                }
                let before = self.edges[horz].prev;
                if self.edges[before].top.x > self.edges[self.edges[result].next].top.x {
                    result = before;
                }
            }
            loop {
                let prev_top_x = self.edges[self.edges[e].prev].top.x;
                let edge = &mut self.edges[e];
                if edge.is_horizontal() && e != e_start && edge.bot.x != prev_top_x {
                    edge.reverse_horizontal();
                }
                if e == result {
                    break;
                }
                edge.next_in_lml = edge.next;
                e = edge.next;
            }
            self.edges[result].next
        } else {
            while self.edges[result].top.y == self.edges[self.edges[result].prev].bot.y {
                result = self.edges[result].prev;
            }
            if self.edges[result].is_horizontal() {
                let mut horz = result;
                while self.edges[self.edges[horz].next].is_horizontal() {
                    horz = self.edges[horz].next;
                }
                let after = self.edges[horz].next;
                if self.edges[after].top.x >= self.edges[self.edges[result].prev].top.x {
                    result = after;
                }
            }
            loop {
                let next_top_x = self.edges[self.edges[e].next].top.x;
                let edge = &mut self.edges[e];
                if edge.is_horizontal() && e != e_start && edge.bot.x != next_top_x {
                    edge.reverse_horizontal();
                }
                if e == result {
                    break;
                }
                edge.next_in_lml = edge.prev;
                e = edge.prev;
            }
            self.edges[result].prev
        }
    }
}
