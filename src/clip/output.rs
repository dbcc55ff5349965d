//! Output records: the rings being built during the sweep, and the
//! post-pass that joins rings sharing an edge and strips degenerate points.

use super::edge::{IntPt, NIL, Side, slopes_equal3, slopes_equal4};
use super::engine::Clipper;
use super::simple::{contains, interior_point};
use crate::errors::ClipError;

/// One output ring under construction. `pts` is the left-most point;
/// `pts.prev` the right-most.
#[derive(Debug, Clone)]
pub(super) struct OutRec {
    pub idx: usize,
    pub is_hole: bool,
    pub first_left: usize,
    pub pts: usize,
}

#[derive(Debug, Clone)]
pub(super) struct OutPt {
    pub idx: usize,
    pub pt: IntPt,
    pub next: usize,
    pub prev: usize,
}

/// Two output points on overlapping edges that must be merged once the
/// sweep is done. `off` is a second point on the shared edge.
#[derive(Debug, Clone, Copy)]
pub(super) struct Join {
    pub op1: usize,
    pub op2: usize,
    pub off: IntPt,
}

impl Clipper {
    fn create_out_rec(&mut self) -> usize {
        let idx = self.out_recs.len();
        self.out_recs.push(OutRec {
            idx,
            is_hole: false,
            first_left: NIL,
            pts: NIL,
        });
        idx
    }

    fn new_out_pt(&mut self, idx: usize, pt: IntPt) -> usize {
        let id = self.out_pts.len();
        self.out_pts.push(OutPt {
            idx,
            pt,
            next: id,
            prev: id,
        });
        id
    }

    pub(super) fn add_join(&mut self, op1: usize, op2: usize, off: IntPt) {
        self.joins.push(Join { op1, op2, off });
    }

    pub(super) fn add_ghost_join(&mut self, op: usize, off: IntPt) {
        self.ghost_joins.push(Join { op1: op, op2: NIL, off });
    }

    /// Append `pt` to the ring `e` contributes to, at the end matching the
    /// edge's side. Starts a new ring for an edge without one.
    pub(super) fn add_out_pt(&mut self, e: usize, pt: IntPt) -> usize {
        let Some(rec) = self.edges[e].out_idx else {
            let rec = self.create_out_rec();
            let op = self.new_out_pt(rec, pt);
            self.out_recs[rec].pts = op;
            self.set_hole_state(e, rec);
            self.edges[e].out_idx = Some(rec);
            return op;
        };

        let first = self.out_recs[rec].pts;
        let last = self.out_pts[first].prev;
        let to_front = self.edges[e].side == Side::Left;
        if to_front && pt == self.out_pts[first].pt {
            return first;
        }
        if !to_front && pt == self.out_pts[last].pt {
            return last;
        }

        let op = self.new_out_pt(rec, pt);
        self.out_pts[op].next = first;
        self.out_pts[op].prev = last;
        self.out_pts[last].next = op;
        self.out_pts[first].prev = op;
        if to_front {
            self.out_recs[rec].pts = op;
        }
        op
    }

    pub(super) fn last_out_pt(&self, e: usize) -> usize {
        let Some(rec) = self.edges[e].out_idx else {
            return NIL;
        };
        let first = self.out_recs[rec].pts;
        match self.edges[e].side {
            Side::Left => first,
            Side::Right => self.out_pts[first].prev,
        }
    }

    /// A ring is a hole when an odd number of contributing edges lie to its
    /// left, counting each enclosing ring once.
    fn set_hole_state(&mut self, e: usize, rec: usize) {
        let mut e2 = self.edges[e].prev_in_ael;
        let mut nearest: Option<usize> = None;
        while e2 != NIL {
            if let Some(idx) = self.edges[e2].out_idx {
                nearest = match nearest {
                    None => Some(idx),
                    Some(n) if n == idx => None,
                    keep => keep,
                };
            }
            e2 = self.edges[e2].prev_in_ael;
        }
        match nearest {
            None => {
                self.out_recs[rec].first_left = NIL;
                self.out_recs[rec].is_hole = false;
            }
            Some(outer) => {
                self.out_recs[rec].first_left = outer;
                self.out_recs[rec].is_hole = !self.out_recs[outer].is_hole;
            }
        }
    }

    pub(super) fn add_local_min_poly(&mut self, e1: usize, e2: usize, pt: IntPt) -> usize {
        let (result, e, prev_e);
        if self.edges[e2].is_horizontal() || self.edges[e1].dx > self.edges[e2].dx {
            result = self.add_out_pt(e1, pt);
            self.edges[e2].out_idx = self.edges[e1].out_idx;
            self.edges[e1].side = Side::Left;
            self.edges[e2].side = Side::Right;
            e = e1;
            prev_e = if self.edges[e].prev_in_ael == e2 {
                self.edges[e2].prev_in_ael
            } else {
                self.edges[e].prev_in_ael
            };
        } else {
            result = self.add_out_pt(e2, pt);
            self.edges[e1].out_idx = self.edges[e2].out_idx;
            self.edges[e1].side = Side::Right;
            self.edges[e2].side = Side::Left;
            e = e2;
            prev_e = if self.edges[e].prev_in_ael == e1 {
                self.edges[e1].prev_in_ael
            } else {
                self.edges[e].prev_in_ael
            };
        }

        if prev_e != NIL
            && self.edges[prev_e].out_idx.is_some()
            && self.edges[prev_e].top.y < pt.y
            && self.edges[e].top.y < pt.y
        {
            let x_prev = self.edges[prev_e].top_x(pt.y);
            let x_e = self.edges[e].top_x(pt.y);
            if x_prev == x_e
                && slopes_equal4(
                    IntPt::new(x_prev, pt.y),
                    self.edges[prev_e].top,
                    IntPt::new(x_e, pt.y),
                    self.edges[e].top,
                )
            {
                let op = self.add_out_pt(prev_e, pt);
                let top = self.edges[e].top;
                self.add_join(result, op, top);
            }
        }
        result
    }

    pub(super) fn add_local_max_poly(&mut self, e1: usize, e2: usize, pt: IntPt) -> Result<(), ClipError> {
        self.add_out_pt(e1, pt);
        let (Some(i1), Some(i2)) = (self.edges[e1].out_idx, self.edges[e2].out_idx) else {
            return Err(ClipError::Maxima { y: pt.y });
        };
        if i1 == i2 {
            self.edges[e1].out_idx = None;
            self.edges[e2].out_idx = None;
        } else if i1 < i2 {
            self.append_polygon(e1, e2);
        } else {
            self.append_polygon(e2, e1);
        }
        Ok(())
    }

    /// Splice the ring of `e2` onto the ring of `e1` where the two bounds meet.
    fn append_polygon(&mut self, e1: usize, e2: usize) {
        let (Some(rec1), Some(rec2)) = (self.edges[e1].out_idx, self.edges[e2].out_idx) else {
            return;
        };
        let hole_state_rec = if self.rec_right_of(rec1, rec2) {
            rec2
        } else if self.rec_right_of(rec2, rec1) {
            rec1
        } else {
            self.lowermost_rec(rec1, rec2)
        };

        let p1_lft = self.out_recs[rec1].pts;
        let p1_rt = self.out_pts[p1_lft].prev;
        let p2_lft = self.out_recs[rec2].pts;
        let p2_rt = self.out_pts[p2_lft].prev;

        let (side1, side2) = (self.edges[e1].side, self.edges[e2].side);
        match (side1, side2) {
            (Side::Left, Side::Left) => {
                // z y x a b c
                self.reverse_links(p2_lft);
                self.out_pts[p2_lft].next = p1_lft;
                self.out_pts[p1_lft].prev = p2_lft;
                self.out_pts[p1_rt].next = p2_rt;
                self.out_pts[p2_rt].prev = p1_rt;
                self.out_recs[rec1].pts = p2_rt;
            }
            (Side::Left, Side::Right) => {
                // x y z a b c
                self.out_pts[p2_rt].next = p1_lft;
                self.out_pts[p1_lft].prev = p2_rt;
                self.out_pts[p2_lft].prev = p1_rt;
                self.out_pts[p1_rt].next = p2_lft;
                self.out_recs[rec1].pts = p2_lft;
            }
            (Side::Right, Side::Right) => {
                // a b c z y x
                self.reverse_links(p2_lft);
                self.out_pts[p1_rt].next = p2_rt;
                self.out_pts[p2_rt].prev = p1_rt;
                self.out_pts[p2_lft].next = p1_lft;
                self.out_pts[p1_lft].prev = p2_lft;
            }
            (Side::Right, Side::Left) => {
                // a b c x y z
                self.out_pts[p1_rt].next = p2_lft;
                self.out_pts[p2_lft].prev = p1_rt;
                self.out_pts[p1_lft].prev = p2_rt;
                self.out_pts[p2_rt].next = p1_lft;
            }
        }

        if hole_state_rec == rec2 {
            if self.out_recs[rec2].first_left != rec1 {
                self.out_recs[rec1].first_left = self.out_recs[rec2].first_left;
            }
            self.out_recs[rec1].is_hole = self.out_recs[rec2].is_hole;
        }
        self.out_recs[rec2].pts = NIL;
        self.out_recs[rec2].first_left = rec1;

        self.edges[e1].out_idx = None;
        self.edges[e2].out_idx = None;

        let mut e = self.active;
        while e != NIL {
            if self.edges[e].out_idx == Some(rec2) {
                self.edges[e].out_idx = Some(rec1);
                self.edges[e].side = side1;
                break;
            }
            e = self.edges[e].next_in_ael;
        }
        self.out_recs[rec2].idx = rec1;
    }

    fn rec_right_of(&self, mut rec1: usize, rec2: usize) -> bool {
        loop {
            rec1 = self.out_recs[rec1].first_left;
            if rec1 == rec2 {
                return true;
            }
            if rec1 == NIL {
                return false;
            }
        }
    }

    fn bottom_pt(&self, start: usize) -> usize {
        let mut best = start;
        let mut op = self.out_pts[start].next;
        while op != start {
            let (p, b) = (self.out_pts[op].pt, self.out_pts[best].pt);
            if p.y > b.y || (p.y == b.y && p.x < b.x) {
                best = op;
            }
            op = self.out_pts[op].next;
        }
        best
    }

    /// The ring whose bottom point is lowest (then left-most) carries the
    /// hole state of a merged pair.
    fn lowermost_rec(&self, rec1: usize, rec2: usize) -> usize {
        let b1 = self.out_pts[self.bottom_pt(self.out_recs[rec1].pts)].pt;
        let b2 = self.out_pts[self.bottom_pt(self.out_recs[rec2].pts)].pt;
        if b1.y > b2.y {
            rec1
        } else if b1.y < b2.y {
            rec2
        } else if b1.x < b2.x {
            rec1
        } else if b1.x > b2.x {
            rec2
        } else {
            rec1
        }
    }

    fn out_rec_of(&self, idx: usize) -> usize {
        let mut rec = idx;
        while rec != self.out_recs[rec].idx {
            rec = self.out_recs[rec].idx;
        }
        rec
    }

    pub(super) fn reverse_links(&mut self, start: usize) {
        let mut op = start;
        loop {
            let p = &mut self.out_pts[op];
            std::mem::swap(&mut p.next, &mut p.prev);
            op = p.prev;
            if op == start {
                break;
            }
        }
    }

    pub(super) fn area(&self, start: usize) -> f64 {
        let mut a = 0.0;
        let mut op = start;
        loop {
            let prev = self.out_pts[self.out_pts[op].prev].pt;
            let pt = self.out_pts[op].pt;
            a += (prev.x + pt.x) as f64 * (prev.y - pt.y) as f64;
            op = self.out_pts[op].next;
            if op == start {
                break;
            }
        }
        a * 0.5
    }

    fn ring_points(&self, start: usize) -> Vec<IntPt> {
        let mut ring = vec![self.out_pts[start].pt];
        let mut op = self.out_pts[start].next;
        while op != start {
            ring.push(self.out_pts[op].pt);
            op = self.out_pts[op].next;
        }
        ring
    }

    fn dup_out_pt(&mut self, op: usize, insert_after: bool) -> usize {
        let (idx, pt) = (self.out_pts[op].idx, self.out_pts[op].pt);
        let dup = self.new_out_pt(idx, pt);
        if insert_after {
            let next = self.out_pts[op].next;
            self.out_pts[dup].next = next;
            self.out_pts[dup].prev = op;
            self.out_pts[next].prev = dup;
            self.out_pts[op].next = dup;
        } else {
            let prev = self.out_pts[op].prev;
            self.out_pts[dup].prev = prev;
            self.out_pts[dup].next = op;
            self.out_pts[prev].next = dup;
            self.out_pts[op].prev = dup;
        }
        dup
    }

    /// Connect `op1 -> op2` and `op1b <- op2b` (or the mirror) so that the
    /// shared edge is cut out of both rings.
    fn link_pair(&mut self, op1: usize, op1b: usize, op2: usize, op2b: usize, op1_prev_is_op2: bool) {
        if op1_prev_is_op2 {
            self.out_pts[op1].prev = op2;
            self.out_pts[op2].next = op1;
            self.out_pts[op1b].next = op2b;
            self.out_pts[op2b].prev = op1b;
        } else {
            self.out_pts[op1].next = op2;
            self.out_pts[op2].prev = op1;
            self.out_pts[op1b].prev = op2b;
            self.out_pts[op2b].next = op1b;
        }
    }

    /// Walk one horizontal run to `pt` and duplicate the point there.
    fn horz_cut(&mut self, mut op: usize, pt: IntPt, left_to_right: bool, discard_left: bool) -> (usize, usize) {
        if left_to_right {
            loop {
                let next = self.out_pts[self.out_pts[op].next].pt;
                if next.x <= pt.x && next.x >= self.out_pts[op].pt.x && next.y == pt.y {
                    op = self.out_pts[op].next;
                } else {
                    break;
                }
            }
            if discard_left && self.out_pts[op].pt.x != pt.x {
                op = self.out_pts[op].next;
            }
            let mut opb = self.dup_out_pt(op, !discard_left);
            if self.out_pts[opb].pt != pt {
                op = opb;
                self.out_pts[op].pt = pt;
                opb = self.dup_out_pt(op, !discard_left);
            }
            (op, opb)
        } else {
            loop {
                let next = self.out_pts[self.out_pts[op].next].pt;
                if next.x >= pt.x && next.x <= self.out_pts[op].pt.x && next.y == pt.y {
                    op = self.out_pts[op].next;
                } else {
                    break;
                }
            }
            if !discard_left && self.out_pts[op].pt.x != pt.x {
                op = self.out_pts[op].next;
            }
            let mut opb = self.dup_out_pt(op, discard_left);
            if self.out_pts[opb].pt != pt {
                op = opb;
                self.out_pts[op].pt = pt;
                opb = self.dup_out_pt(op, discard_left);
            }
            (op, opb)
        }
    }

    fn join_horz(&mut self, op1: usize, op1b: usize, op2: usize, op2b: usize, pt: IntPt, discard_left: bool) -> bool {
        let ltr1 = self.out_pts[op1].pt.x <= self.out_pts[op1b].pt.x;
        let ltr2 = self.out_pts[op2].pt.x <= self.out_pts[op2b].pt.x;
        if ltr1 == ltr2 {
            return false;
        }
        let (op1, op1b) = self.horz_cut(op1, pt, ltr1, discard_left);
        let (op2, op2b) = self.horz_cut(op2, pt, ltr2, discard_left);
        self.link_pair(op1, op1b, op2, op2b, ltr1 == discard_left);
        true
    }

    /// Splice the two rings referenced by join `j` along their shared edge.
    fn join_points(&mut self, j: usize, rec1: usize, rec2: usize) -> bool {
        let Join { op1, op2, off } = self.joins[j];
        let (mut op1, mut op2) = (op1, op2);
        let pt = |c: &Self, op: usize| c.out_pts[op].pt;
        let next = |c: &Self, op: usize| c.out_pts[op].next;
        let prev = |c: &Self, op: usize| c.out_pts[op].prev;

        let is_horizontal = pt(self, op1).y == off.y;

        if is_horizontal && off == pt(self, op1) && off == pt(self, op2) {
            // rings touching at a single point on a horizontal
            if rec1 != rec2 {
                return false;
            }
            let mut op1b = next(self, op1);
            while op1b != op1 && pt(self, op1b) == off {
                op1b = next(self, op1b);
            }
            let reverse1 = pt(self, op1b).y > off.y;
            let mut op2b = next(self, op2);
            while op2b != op2 && pt(self, op2b) == off {
                op2b = next(self, op2b);
            }
            let reverse2 = pt(self, op2b).y > off.y;
            if reverse1 == reverse2 {
                return false;
            }
            return self.splice_join(j, op1, op2, reverse1);
        }

        if is_horizontal {
            let mut op1b = op1;
            while pt(self, prev(self, op1)).y == pt(self, op1).y && prev(self, op1) != op1b && prev(self, op1) != op2 {
                op1 = prev(self, op1);
            }
            while pt(self, next(self, op1b)).y == pt(self, op1b).y && next(self, op1b) != op1 && next(self, op1b) != op2 {
                op1b = next(self, op1b);
            }
            if next(self, op1b) == op1 || next(self, op1b) == op2 {
                return false;
            }
            let mut op2b = op2;
            while pt(self, prev(self, op2)).y == pt(self, op2).y && prev(self, op2) != op2b && prev(self, op2) != op1b {
                op2 = prev(self, op2);
            }
            while pt(self, next(self, op2b)).y == pt(self, op2b).y && next(self, op2b) != op2 && next(self, op2b) != op1 {
                op2b = next(self, op2b);
            }
            if next(self, op2b) == op2 || next(self, op2b) == op1 {
                return false;
            }

            let (x1, x1b, x2, x2b) = (pt(self, op1).x, pt(self, op1b).x, pt(self, op2).x, pt(self, op2b).x);
            let Some((left, right)) = overlap(x1, x1b, x2, x2b) else {
                return false;
            };
            let within = |x: i64| x >= left && x <= right;
            let (cut, discard_left) = if within(x1) {
                (pt(self, op1), x1 > x1b)
            } else if within(x2) {
                (pt(self, op2), x2 > x2b)
            } else if within(x1b) {
                (pt(self, op1b), x1b > x1)
            } else {
                (pt(self, op2b), x2b > x2)
            };
            self.joins[j].op1 = op1;
            self.joins[j].op2 = op2;
            return self.join_horz(op1, op1b, op2, op2b, cut, discard_left);
        }

        // non-horizontal: op1 and op2 share a point and both continue
        // toward `off` along the same slope
        let mut op1b = next(self, op1);
        while pt(self, op1b) == pt(self, op1) && op1b != op1 {
            op1b = next(self, op1b);
        }
        let reverse1 = pt(self, op1b).y > pt(self, op1).y || !slopes_equal3(pt(self, op1), pt(self, op1b), off);
        if reverse1 {
            op1b = prev(self, op1);
            while pt(self, op1b) == pt(self, op1) && op1b != op1 {
                op1b = prev(self, op1b);
            }
            if pt(self, op1b).y > pt(self, op1).y || !slopes_equal3(pt(self, op1), pt(self, op1b), off) {
                return false;
            }
        }
        let mut op2b = next(self, op2);
        while pt(self, op2b) == pt(self, op2) && op2b != op2 {
            op2b = next(self, op2b);
        }
        let reverse2 = pt(self, op2b).y > pt(self, op2).y || !slopes_equal3(pt(self, op2), pt(self, op2b), off);
        if reverse2 {
            op2b = prev(self, op2);
            while pt(self, op2b) == pt(self, op2) && op2b != op2 {
                op2b = prev(self, op2b);
            }
            if pt(self, op2b).y > pt(self, op2).y || !slopes_equal3(pt(self, op2), pt(self, op2b), off) {
                return false;
            }
        }
        if op1b == op1 || op2b == op2 || op1b == op2b || (rec1 == rec2 && reverse1 == reverse2) {
            return false;
        }
        self.splice_join(j, op1, op2, reverse1)
    }

    fn splice_join(&mut self, j: usize, op1: usize, op2: usize, reverse1: bool) -> bool {
        let op1b = self.dup_out_pt(op1, !reverse1);
        let op2b = self.dup_out_pt(op2, reverse1);
        self.link_pair(op1, op1b, op2, op2b, reverse1);
        self.joins[j].op1 = op1;
        self.joins[j].op2 = op1b;
        true
    }

    fn update_out_pt_idxs(&mut self, rec: usize) {
        let start = self.out_recs[rec].pts;
        let mut op = start;
        loop {
            self.out_pts[op].idx = rec;
            op = self.out_pts[op].prev;
            if op == start {
                break;
            }
        }
    }

    /// True when ring `inner` lies inside ring `outer`.
    fn ring_contains(&self, outer: usize, inner: usize) -> bool {
        let outer = self.ring_points(outer);
        interior_point(&self.ring_points(inner)).is_some_and(|q| contains(&outer, q))
    }

    pub(super) fn join_common_edges(&mut self) {
        for j in 0..self.joins.len() {
            let join = self.joins[j];
            let rec1 = self.out_rec_of(self.out_pts[join.op1].idx);
            let mut rec2 = self.out_rec_of(self.out_pts[join.op2].idx);
            if self.out_recs[rec1].pts == NIL || self.out_recs[rec2].pts == NIL {
                continue;
            }

            let hole_state_rec = if rec1 == rec2 {
                rec1
            } else if self.rec_right_of(rec1, rec2) {
                rec2
            } else if self.rec_right_of(rec2, rec1) {
                rec1
            } else {
                self.lowermost_rec(rec1, rec2)
            };

            if !self.join_points(j, rec1, rec2) {
                continue;
            }

            if rec1 == rec2 {
                // one ring split into two
                self.out_recs[rec1].pts = self.joins[j].op1;
                rec2 = self.create_out_rec();
                self.out_recs[rec2].pts = self.joins[j].op2;
                self.update_out_pt_idxs(rec2);

                let (pts1, pts2) = (self.out_recs[rec1].pts, self.out_recs[rec2].pts);
                if self.ring_contains(pts1, pts2) {
                    self.out_recs[rec2].is_hole = !self.out_recs[rec1].is_hole;
                    self.out_recs[rec2].first_left = rec1;
                    if self.out_recs[rec2].is_hole == (self.area(pts2) > 0.0) {
                        self.reverse_links(pts2);
                    }
                } else if self.ring_contains(pts2, pts1) {
                    self.out_recs[rec2].is_hole = self.out_recs[rec1].is_hole;
                    self.out_recs[rec1].is_hole = !self.out_recs[rec2].is_hole;
                    self.out_recs[rec2].first_left = self.out_recs[rec1].first_left;
                    self.out_recs[rec1].first_left = rec2;
                    if self.out_recs[rec1].is_hole == (self.area(pts1) > 0.0) {
                        self.reverse_links(pts1);
                    }
                } else {
                    self.out_recs[rec2].is_hole = self.out_recs[rec1].is_hole;
                    self.out_recs[rec2].first_left = self.out_recs[rec1].first_left;
                }
            } else {
                // two rings merged into one
                self.out_recs[rec2].pts = NIL;
                self.out_recs[rec2].idx = rec1;
                self.out_recs[rec1].is_hole = self.out_recs[hole_state_rec].is_hole;
                if hole_state_rec == rec2 {
                    self.out_recs[rec1].first_left = self.out_recs[rec2].first_left;
                }
                self.out_recs[rec2].first_left = rec1;
            }
        }
    }

    /// Remove duplicate points and the middle point of collinear runs.
    /// A ring that collapses below three points is dropped.
    pub(super) fn fixup_out_polygon(&mut self, rec: usize) {
        let mut last_ok = NIL;
        let mut pp = self.out_recs[rec].pts;
        loop {
            let (prev, next) = (self.out_pts[pp].prev, self.out_pts[pp].next);
            if prev == pp || prev == next {
                self.out_recs[rec].pts = NIL;
                return;
            }
            let (a, p, b) = (self.out_pts[prev].pt, self.out_pts[pp].pt, self.out_pts[next].pt);
            if p == b || p == a || slopes_equal3(a, p, b) {
                last_ok = NIL;
                self.out_pts[prev].next = next;
                self.out_pts[next].prev = prev;
                pp = prev;
            } else if pp == last_ok {
                break;
            } else {
                if last_ok == NIL {
                    last_ok = pp;
                }
                pp = next;
            }
        }
        self.out_recs[rec].pts = pp;
    }

    pub(super) fn collect_rings(&self) -> Vec<Vec<IntPt>> {
        self.out_recs
            .iter()
            .filter(|rec| rec.pts != NIL)
            .map(|rec| self.ring_points(rec.pts))
            .filter(|ring| ring.len() >= 3)
            .collect()
    }
}

fn overlap(a1: i64, a2: i64, b1: i64, b2: i64) -> Option<(i64, i64)> {
    let (left, right) = if a1 < a2 {
        if b1 < b2 {
            (a1.max(b1), a2.min(b2))
        } else {
            (a1.max(b2), a2.min(b1))
        }
    } else if b1 < b2 {
        (a2.max(b1), a1.min(b2))
    } else {
        (a2.max(b2), a1.min(b1))
    };
    (left < right).then_some((left, right))
}
