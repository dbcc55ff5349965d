//! The scan-beam sweep
//!
//! Scan lines are visited from the largest `y` down to the smallest. Between
//! two consecutive scan lines no edge starts, ends or crosses another except
//! at the beam boundaries, so the active edge list (AEL) only changes at
//! those boundaries: local minima are inserted at the bottom, crossings are
//! resolved by swapping neighbours, and maxima are removed at the top.

use std::collections::BinaryHeap;

use super::edge::{
    Edge, IntPt, LocalMinimum, NIL, PolyKind, Side, edge_slopes_equal, intersect_point,
    slopes_equal4,
};
use super::output::{Join, OutPt, OutRec};
use super::{ClipOp, FillRule};
use crate::errors::ClipError;

#[derive(Debug, Clone, Copy)]
struct IntersectNode {
    e1: usize,
    e2: usize,
    pt: IntPt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    LeftToRight,
    RightToLeft,
}

pub(super) struct Clipper {
    pub edges: Vec<Edge>,
    pub minima: Vec<LocalMinimum>,
    current_lm: usize,
    scanbeam: BinaryHeap<i64>,
    /// Head of the active edge list
    pub active: usize,
    /// Head of the sorted edge list (horizontals, or the intersection sort)
    pub sorted: usize,
    intersections: Vec<IntersectNode>,
    pub out_recs: Vec<OutRec>,
    pub out_pts: Vec<OutPt>,
    pub joins: Vec<Join>,
    pub ghost_joins: Vec<Join>,
    pub op: ClipOp,
    pub fill: FillRule,
}

impl Clipper {
    pub fn new(op: ClipOp, fill: FillRule) -> Self {
        Self {
            edges: Vec::new(),
            minima: Vec::new(),
            current_lm: 0,
            scanbeam: BinaryHeap::new(),
            active: NIL,
            sorted: NIL,
            intersections: Vec::new(),
            out_recs: Vec::new(),
            out_pts: Vec::new(),
            joins: Vec::new(),
            ghost_joins: Vec::new(),
            op,
            fill,
        }
    }

    /// Run the sweep and return the output rings in fixed-point coordinates.
    pub fn execute(&mut self) -> Result<Vec<Vec<IntPt>>, ClipError> {
        self.reset();
        let Some(bot_y) = self.pop_scanbeam() else {
            return Ok(Vec::new());
        };
        self.insert_local_minima(bot_y)?;
        while let Some(top_y) = self.pop_scanbeam() {
            self.process_horizontals()?;
            self.ghost_joins.clear();
            self.process_intersections(top_y)?;
            self.process_edges_at_top(top_y)?;
            self.insert_local_minima(top_y)?;
        }

        for rec in 0..self.out_recs.len() {
            let pts = self.out_recs[rec].pts;
            if pts != NIL && self.out_recs[rec].is_hole == (self.area(pts) > 0.0) {
                self.reverse_links(pts);
            }
        }
        self.join_common_edges();
        for rec in 0..self.out_recs.len() {
            if self.out_recs[rec].pts != NIL {
                self.fixup_out_polygon(rec);
            }
        }
        Ok(self.collect_rings())
    }

    fn reset(&mut self) {
        self.minima.sort_by(|a, b| b.y.cmp(&a.y));
        self.scanbeam.clear();
        for lm in &self.minima {
            self.scanbeam.push(lm.y);
            for (e, side) in [(lm.left, Side::Left), (lm.right, Side::Right)] {
                let edge = &mut self.edges[e];
                edge.curr = edge.bot;
                edge.side = side;
                edge.out_idx = None;
            }
        }
        self.active = NIL;
        self.sorted = NIL;
        self.current_lm = 0;
    }

    fn pop_scanbeam(&mut self) -> Option<i64> {
        let y = self.scanbeam.pop()?;
        while self.scanbeam.peek() == Some(&y) {
            self.scanbeam.pop();
        }
        Some(y)
    }

    fn pop_local_minimum(&mut self, y: i64) -> Option<LocalMinimum> {
        let lm = *self.minima.get(self.current_lm)?;
        if lm.y != y {
            return None;
        }
        self.current_lm += 1;
        Some(lm)
    }

    fn insert_local_minima(&mut self, bot_y: i64) -> Result<(), ClipError> {
        while let Some(lm) = self.pop_local_minimum(bot_y) {
            let (lb, rb) = (lm.left, lm.right);

            self.insert_edge_into_ael(lb, NIL);
            self.insert_edge_into_ael(rb, lb);
            self.set_winding_count(lb);
            self.edges[rb].wind_cnt = self.edges[lb].wind_cnt;
            self.edges[rb].wind_cnt2 = self.edges[lb].wind_cnt2;
            let mut op1 = NIL;
            if self.is_contributing(lb) {
                let bot = self.edges[lb].bot;
                op1 = self.add_local_min_poly(lb, rb, bot);
            }
            self.scanbeam.push(self.edges[lb].top.y);

            if self.edges[rb].is_horizontal() {
                self.add_edge_to_sel(rb);
                let next = self.edges[rb].next_in_lml;
                if next != NIL {
                    self.scanbeam.push(self.edges[next].top.y);
                }
            } else {
                self.scanbeam.push(self.edges[rb].top.y);
            }

            // output polygons sharing a horizontal edge are joined later
            if op1 != NIL && self.edges[rb].is_horizontal() && !self.ghost_joins.is_empty() {
                let (rb_bot, rb_top) = (self.edges[rb].bot.x, self.edges[rb].top.x);
                let ghosts: Vec<Join> = self.ghost_joins.clone();
                for ghost in ghosts {
                    let ghost_x = self.out_pts[ghost.op1].pt.x;
                    if horz_segments_overlap(ghost_x, ghost.off.x, rb_bot, rb_top) {
                        self.add_join(ghost.op1, op1, ghost.off);
                    }
                }
            }

            let lb_prev = self.edges[lb].prev_in_ael;
            if self.edges[lb].out_idx.is_some()
                && lb_prev != NIL
                && self.edges[lb_prev].curr.x == self.edges[lb].bot.x
                && self.edges[lb_prev].out_idx.is_some()
                && slopes_equal4(
                    self.edges[lb_prev].bot,
                    self.edges[lb_prev].top,
                    self.edges[lb].curr,
                    self.edges[lb].top,
                )
            {
                let bot = self.edges[lb].bot;
                let op2 = self.add_out_pt(lb_prev, bot);
                let top = self.edges[lb].top;
                self.add_join(op1, op2, top);
            }

            if self.edges[lb].next_in_ael != rb {
                let rb_prev = self.edges[rb].prev_in_ael;
                if self.edges[rb].out_idx.is_some()
                    && self.edges[rb_prev].out_idx.is_some()
                    && slopes_equal4(
                        self.edges[rb_prev].curr,
                        self.edges[rb_prev].top,
                        self.edges[rb].curr,
                        self.edges[rb].top,
                    )
                {
                    let bot = self.edges[rb].bot;
                    let op2 = self.add_out_pt(rb_prev, bot);
                    let top = self.edges[rb].top;
                    self.add_join(op1, op2, top);
                }

                let mut e = self.edges[lb].next_in_ael;
                let at = self.edges[lb].curr;
                while e != NIL && e != rb {
                    // rb is right of e above the crossing
                    self.intersect_edges(rb, e, at)?;
                    e = self.edges[e].next_in_ael;
                }
            }
        }
        Ok(())
    }

    fn insert_edge_into_ael(&mut self, edge: usize, start: usize) {
        if self.active == NIL {
            self.edges[edge].prev_in_ael = NIL;
            self.edges[edge].next_in_ael = NIL;
            self.active = edge;
        } else if start == NIL && self.inserts_before(self.active, edge) {
            self.edges[edge].prev_in_ael = NIL;
            self.edges[edge].next_in_ael = self.active;
            self.edges[self.active].prev_in_ael = edge;
            self.active = edge;
        } else {
            let mut start = if start == NIL { self.active } else { start };
            while self.edges[start].next_in_ael != NIL
                && !self.inserts_before(self.edges[start].next_in_ael, edge)
            {
                start = self.edges[start].next_in_ael;
            }
            let next = self.edges[start].next_in_ael;
            self.edges[edge].next_in_ael = next;
            if next != NIL {
                self.edges[next].prev_in_ael = edge;
            }
            self.edges[edge].prev_in_ael = start;
            self.edges[start].next_in_ael = edge;
        }
    }

    /// True when `e2` belongs left of `e1` in the AEL.
    fn inserts_before(&self, e1: usize, e2: usize) -> bool {
        let (a, b) = (&self.edges[e1], &self.edges[e2]);
        if b.curr.x == a.curr.x {
            if b.top.y > a.top.y {
                b.top.x < a.top_x(b.top.y)
            } else {
                a.top.x > b.top_x(a.top.y)
            }
        } else {
            b.curr.x < a.curr.x
        }
    }

    fn set_winding_count(&mut self, edge: usize) {
        let kind = self.edges[edge].poly;
        let delta = self.edges[edge].wind_delta;
        let mut e = self.edges[edge].prev_in_ael;
        while e != NIL && self.edges[e].poly != kind {
            e = self.edges[e].prev_in_ael;
        }

        let (wind_cnt, mut wind_cnt2);
        if e == NIL {
            wind_cnt = delta;
            wind_cnt2 = 0;
            e = self.active;
        } else if self.fill == FillRule::EvenOdd {
            wind_cnt = delta;
            wind_cnt2 = self.edges[e].wind_cnt2;
            e = self.edges[e].next_in_ael;
        } else {
            let prev = &self.edges[e];
            wind_cnt = if prev.wind_cnt * prev.wind_delta < 0 {
                // leaving the previous polygon
                if prev.wind_cnt.abs() > 1 {
                    if prev.wind_delta * delta < 0 {
                        prev.wind_cnt
                    } else {
                        prev.wind_cnt + delta
                    }
                } else {
                    delta
                }
            } else if prev.wind_delta * delta < 0 {
                prev.wind_cnt
            } else {
                prev.wind_cnt + delta
            };
            wind_cnt2 = prev.wind_cnt2;
            e = prev.next_in_ael;
        }

        while e != edge && e != NIL {
            match self.fill {
                FillRule::EvenOdd => wind_cnt2 = if wind_cnt2 == 0 { 1 } else { 0 },
                FillRule::NonZero => wind_cnt2 += self.edges[e].wind_delta,
            }
            e = self.edges[e].next_in_ael;
        }
        self.edges[edge].wind_cnt = wind_cnt;
        self.edges[edge].wind_cnt2 = wind_cnt2;
    }

    fn is_contributing(&self, e: usize) -> bool {
        let edge = &self.edges[e];
        if self.fill == FillRule::NonZero && edge.wind_cnt.abs() != 1 {
            return false;
        }
        match self.op {
            ClipOp::Intersection => edge.wind_cnt2 != 0,
            ClipOp::Union => edge.wind_cnt2 == 0,
            ClipOp::Difference => match edge.poly {
                PolyKind::Subject => edge.wind_cnt2 == 0,
                PolyKind::Clip => edge.wind_cnt2 != 0,
            },
            ClipOp::Xor => true,
        }
    }

    fn winding(&self, count: i32) -> i32 {
        count.abs()
    }

    /// Update winding counts and output for two edges crossing at `pt`.
    /// `e1` must be right of `e2` above the crossing.
    fn intersect_edges(&mut self, e1: usize, e2: usize, pt: IntPt) -> Result<(), ClipError> {
        let e1_contributing = self.edges[e1].out_idx.is_some();
        let e2_contributing = self.edges[e2].out_idx.is_some();

        if self.edges[e1].poly == self.edges[e2].poly {
            if self.fill == FillRule::EvenOdd {
                let tmp = self.edges[e1].wind_cnt;
                self.edges[e1].wind_cnt = self.edges[e2].wind_cnt;
                self.edges[e2].wind_cnt = tmp;
            } else {
                let (d1, d2) = (self.edges[e1].wind_delta, self.edges[e2].wind_delta);
                let a = &mut self.edges[e1];
                if a.wind_cnt + d2 == 0 {
                    a.wind_cnt = -a.wind_cnt;
                } else {
                    a.wind_cnt += d2;
                }
                let b = &mut self.edges[e2];
                if b.wind_cnt - d1 == 0 {
                    b.wind_cnt = -b.wind_cnt;
                } else {
                    b.wind_cnt -= d1;
                }
            }
        } else if self.fill == FillRule::EvenOdd {
            for e in [e1, e2] {
                let c = &mut self.edges[e].wind_cnt2;
                *c = if *c == 0 { 1 } else { 0 };
            }
        } else {
            let (d1, d2) = (self.edges[e1].wind_delta, self.edges[e2].wind_delta);
            self.edges[e1].wind_cnt2 += d2;
            self.edges[e2].wind_cnt2 -= d1;
        }

        let e1_wc = self.winding(self.edges[e1].wind_cnt);
        let e2_wc = self.winding(self.edges[e2].wind_cnt);
        let same_kind = self.edges[e1].poly == self.edges[e2].poly;

        if e1_contributing && e2_contributing {
            if (e1_wc != 0 && e1_wc != 1)
                || (e2_wc != 0 && e2_wc != 1)
                || (!same_kind && self.op != ClipOp::Xor)
            {
                self.add_local_max_poly(e1, e2, pt)?;
            } else {
                self.add_out_pt(e1, pt);
                self.add_out_pt(e2, pt);
                self.swap_sides(e1, e2);
                self.swap_out_idx(e1, e2);
            }
        } else if e1_contributing {
            if e2_wc == 0 || e2_wc == 1 {
                self.add_out_pt(e1, pt);
                self.swap_sides(e1, e2);
                self.swap_out_idx(e1, e2);
            }
        } else if e2_contributing {
            if e1_wc == 0 || e1_wc == 1 {
                self.add_out_pt(e2, pt);
                self.swap_sides(e1, e2);
                self.swap_out_idx(e1, e2);
            }
        } else if (e1_wc == 0 || e1_wc == 1) && (e2_wc == 0 || e2_wc == 1) {
            let e1_wc2 = self.winding(self.edges[e1].wind_cnt2);
            let e2_wc2 = self.winding(self.edges[e2].wind_cnt2);
            if !same_kind {
                self.add_local_min_poly(e1, e2, pt);
            } else if e1_wc == 1 && e2_wc == 1 {
                let start = match self.op {
                    ClipOp::Intersection => e1_wc2 > 0 && e2_wc2 > 0,
                    ClipOp::Union => e1_wc2 <= 0 && e2_wc2 <= 0,
                    ClipOp::Difference => match self.edges[e1].poly {
                        PolyKind::Clip => e1_wc2 > 0 && e2_wc2 > 0,
                        PolyKind::Subject => e1_wc2 <= 0 && e2_wc2 <= 0,
                    },
                    ClipOp::Xor => true,
                };
                if start {
                    self.add_local_min_poly(e1, e2, pt);
                }
            } else {
                self.swap_sides(e1, e2);
            }
        }
        Ok(())
    }

    fn swap_sides(&mut self, e1: usize, e2: usize) {
        let side = self.edges[e1].side;
        self.edges[e1].side = self.edges[e2].side;
        self.edges[e2].side = side;
    }

    fn swap_out_idx(&mut self, e1: usize, e2: usize) {
        let idx = self.edges[e1].out_idx;
        self.edges[e1].out_idx = self.edges[e2].out_idx;
        self.edges[e2].out_idx = idx;
    }

    // ------------------------------------------------------------------
    // AEL / SEL maintenance
    // ------------------------------------------------------------------

    fn delete_from_ael(&mut self, e: usize) {
        let (prev, next) = (self.edges[e].prev_in_ael, self.edges[e].next_in_ael);
        if prev == NIL && next == NIL && e != self.active {
            return;
        }
        if prev != NIL {
            self.edges[prev].next_in_ael = next;
        } else {
            self.active = next;
        }
        if next != NIL {
            self.edges[next].prev_in_ael = prev;
        }
        self.edges[e].next_in_ael = NIL;
        self.edges[e].prev_in_ael = NIL;
    }

    fn add_edge_to_sel(&mut self, e: usize) {
        self.edges[e].prev_in_sel = NIL;
        self.edges[e].next_in_sel = self.sorted;
        if self.sorted != NIL {
            self.edges[self.sorted].prev_in_sel = e;
        }
        self.sorted = e;
    }

    fn delete_from_sel(&mut self, e: usize) {
        let (prev, next) = (self.edges[e].prev_in_sel, self.edges[e].next_in_sel);
        if prev == NIL && next == NIL && e != self.sorted {
            return;
        }
        if prev != NIL {
            self.edges[prev].next_in_sel = next;
        } else {
            self.sorted = next;
        }
        if next != NIL {
            self.edges[next].prev_in_sel = prev;
        }
        self.edges[e].next_in_sel = NIL;
        self.edges[e].prev_in_sel = NIL;
    }

    fn copy_ael_to_sel(&mut self) {
        let mut e = self.active;
        self.sorted = e;
        while e != NIL {
            self.edges[e].prev_in_sel = self.edges[e].prev_in_ael;
            self.edges[e].next_in_sel = self.edges[e].next_in_ael;
            e = self.edges[e].next_in_ael;
        }
    }

    fn swap_positions_in_ael(&mut self, e1: usize, e2: usize) {
        // one of them already left the AEL
        if self.edges[e1].next_in_ael == self.edges[e1].prev_in_ael
            || self.edges[e2].next_in_ael == self.edges[e2].prev_in_ael
        {
            return;
        }
        let head = swap_linked(
            &mut self.edges,
            e1,
            e2,
            |e| (e.prev_in_ael, e.next_in_ael),
            |e, prev, next| {
                e.prev_in_ael = prev;
                e.next_in_ael = next;
            },
        );
        if let Some(head) = head {
            self.active = head;
        }
    }

    fn swap_positions_in_sel(&mut self, e1: usize, e2: usize) {
        if (self.edges[e1].next_in_sel == NIL && self.edges[e1].prev_in_sel == NIL)
            || (self.edges[e2].next_in_sel == NIL && self.edges[e2].prev_in_sel == NIL)
        {
            return;
        }
        let head = swap_linked(
            &mut self.edges,
            e1,
            e2,
            |e| (e.prev_in_sel, e.next_in_sel),
            |e, prev, next| {
                e.prev_in_sel = prev;
                e.next_in_sel = next;
            },
        );
        if let Some(head) = head {
            self.sorted = head;
        }
    }

    /// Replace `e` by the next edge of its bound, keeping its AEL slot and
    /// winding state. Returns the new edge.
    fn update_edge_into_ael(&mut self, e: usize) -> Result<usize, ClipError> {
        let next = self.edges[e].next_in_lml;
        if next == NIL {
            return Err(ClipError::BoundOverrun);
        }
        let old = self.edges[e].clone();
        {
            let n = &mut self.edges[next];
            n.out_idx = old.out_idx;
            n.side = old.side;
            n.wind_delta = old.wind_delta;
            n.wind_cnt = old.wind_cnt;
            n.wind_cnt2 = old.wind_cnt2;
            n.curr = n.bot;
            n.prev_in_ael = old.prev_in_ael;
            n.next_in_ael = old.next_in_ael;
        }
        if old.prev_in_ael != NIL {
            self.edges[old.prev_in_ael].next_in_ael = next;
        } else {
            self.active = next;
        }
        if old.next_in_ael != NIL {
            self.edges[old.next_in_ael].prev_in_ael = next;
        }
        if !self.edges[next].is_horizontal() {
            self.scanbeam.push(self.edges[next].top.y);
        }
        Ok(next)
    }

    // ------------------------------------------------------------------
    // Horizontals
    // ------------------------------------------------------------------

    fn process_horizontals(&mut self) -> Result<(), ClipError> {
        while self.sorted != NIL {
            let horz = self.sorted;
            self.delete_from_sel(horz);
            self.process_horizontal(horz)?;
        }
        Ok(())
    }

    fn horz_direction(&self, e: usize) -> (Direction, i64, i64) {
        let edge = &self.edges[e];
        if edge.bot.x < edge.top.x {
            (Direction::LeftToRight, edge.bot.x, edge.top.x)
        } else {
            (Direction::RightToLeft, edge.top.x, edge.bot.x)
        }
    }

    fn next_in_ael_dir(&self, e: usize, dir: Direction) -> usize {
        match dir {
            Direction::LeftToRight => self.edges[e].next_in_ael,
            Direction::RightToLeft => self.edges[e].prev_in_ael,
        }
    }

    fn maxima_pair(&self, e: usize) -> usize {
        let edge = &self.edges[e];
        let (next, prev) = (&self.edges[edge.next], &self.edges[edge.prev]);
        if next.top == edge.top && next.next_in_lml == NIL {
            edge.next
        } else if prev.top == edge.top && prev.next_in_lml == NIL {
            edge.prev
        } else {
            NIL
        }
    }

    /// Like [`Self::maxima_pair`] but ignores a partner that is not active.
    fn maxima_pair_active(&self, e: usize) -> usize {
        let pair = self.maxima_pair(e);
        if pair != NIL {
            let p = &self.edges[pair];
            if p.next_in_ael == p.prev_in_ael && !p.is_horizontal() {
                return NIL;
            }
        }
        pair
    }

    /// Join the current horizontal output point with any overlapping
    /// horizontal still waiting in the SEL.
    fn join_pending_horizontals(&mut self, horz: usize, op1: usize) {
        let (bot_x, top_x) = (self.edges[horz].bot.x, self.edges[horz].top.x);
        let mut other = self.sorted;
        while other != NIL {
            let o = &self.edges[other];
            if o.out_idx.is_some() && horz_segments_overlap(bot_x, top_x, o.bot.x, o.top.x) {
                let off = o.top;
                let op2 = self.last_out_pt(other);
                self.add_join(op2, op1, off);
            }
            other = self.edges[other].next_in_sel;
        }
    }

    fn process_horizontal(&mut self, mut horz: usize) -> Result<(), ClipError> {
        let (mut dir, mut horz_left, mut horz_right) = self.horz_direction(horz);

        let mut last_horz = horz;
        while self.edges[last_horz].next_in_lml != NIL
            && self.edges[self.edges[last_horz].next_in_lml].is_horizontal()
        {
            last_horz = self.edges[last_horz].next_in_lml;
        }
        let max_pair = if self.edges[last_horz].next_in_lml == NIL {
            self.maxima_pair(last_horz)
        } else {
            NIL
        };

        let mut op1 = NIL;
        loop {
            let is_last = horz == last_horz;
            let mut e = self.next_in_ael_dir(horz, dir);
            while e != NIL {
                let ex = self.edges[e].curr.x;
                if (dir == Direction::LeftToRight && ex > horz_right)
                    || (dir == Direction::RightToLeft && ex < horz_left)
                {
                    break;
                }
                // end of an intermediate horizontal
                let lml = self.edges[horz].next_in_lml;
                if ex == self.edges[horz].top.x && lml != NIL && self.edges[e].dx < self.edges[lml].dx {
                    break;
                }

                if self.edges[horz].out_idx.is_some() {
                    let at = self.edges[e].curr;
                    op1 = self.add_out_pt(horz, at);
                    self.join_pending_horizontals(horz, op1);
                    let bot = self.edges[horz].bot;
                    self.add_ghost_join(op1, bot);
                }

                if e == max_pair && is_last {
                    if self.edges[horz].out_idx.is_some() {
                        let top = self.edges[horz].top;
                        self.add_local_max_poly(horz, max_pair, top)?;
                    }
                    self.delete_from_ael(horz);
                    self.delete_from_ael(max_pair);
                    return Ok(());
                }

                let pt = IntPt::new(self.edges[e].curr.x, self.edges[horz].curr.y);
                match dir {
                    Direction::LeftToRight => self.intersect_edges(horz, e, pt)?,
                    Direction::RightToLeft => self.intersect_edges(e, horz, pt)?,
                }
                let next = self.next_in_ael_dir(e, dir);
                self.swap_positions_in_ael(horz, e);
                e = next;
            }

            let lml = self.edges[horz].next_in_lml;
            if lml == NIL || !self.edges[lml].is_horizontal() {
                break;
            }
            horz = self.update_edge_into_ael(horz)?;
            if self.edges[horz].out_idx.is_some() {
                let bot = self.edges[horz].bot;
                self.add_out_pt(horz, bot);
            }
            (dir, horz_left, horz_right) = self.horz_direction(horz);
        }

        if self.edges[horz].out_idx.is_some() && op1 == NIL {
            op1 = self.last_out_pt(horz);
            self.join_pending_horizontals(horz, op1);
            let top = self.edges[horz].top;
            self.add_ghost_join(op1, top);
        }

        if self.edges[horz].next_in_lml != NIL {
            if self.edges[horz].out_idx.is_some() {
                let top = self.edges[horz].top;
                let op1 = self.add_out_pt(horz, top);
                horz = self.update_edge_into_ael(horz)?;
                let (prev, next) = (self.edges[horz].prev_in_ael, self.edges[horz].next_in_ael);
                let bot = self.edges[horz].bot;
                if prev != NIL && self.joins_at_bottom(horz, prev) {
                    let op2 = self.add_out_pt(prev, bot);
                    let top = self.edges[horz].top;
                    self.add_join(op1, op2, top);
                } else if next != NIL && self.joins_at_bottom(horz, next) {
                    let op2 = self.add_out_pt(next, bot);
                    let top = self.edges[horz].top;
                    self.add_join(op1, op2, top);
                }
            } else {
                self.update_edge_into_ael(horz)?;
            }
        } else {
            if self.edges[horz].out_idx.is_some() {
                let top = self.edges[horz].top;
                self.add_out_pt(horz, top);
            }
            self.delete_from_ael(horz);
        }
        Ok(())
    }

    /// `other` is a contributing neighbour starting at `e`'s bottom with the
    /// same slope, so the two outputs overlap along `e`.
    fn joins_at_bottom(&self, e: usize, other: usize) -> bool {
        let (a, b) = (&self.edges[e], &self.edges[other]);
        b.curr == a.bot && b.out_idx.is_some() && b.curr.y > b.top.y && edge_slopes_equal(a, b)
    }

    // ------------------------------------------------------------------
    // Intersections
    // ------------------------------------------------------------------

    fn process_intersections(&mut self, top_y: i64) -> Result<(), ClipError> {
        if self.active == NIL {
            return Ok(());
        }
        self.build_intersect_list(top_y);
        match self.intersections.len() {
            0 => return Ok(()),
            1 => {}
            _ => self.fixup_intersection_order()?,
        }
        let nodes = std::mem::take(&mut self.intersections);
        for node in nodes {
            self.intersect_edges(node.e1, node.e2, node.pt)?;
            self.swap_positions_in_ael(node.e1, node.e2);
        }
        self.sorted = NIL;
        Ok(())
    }

    /// Bubble-sort the AEL by x at `top_y`, recording every swap as a
    /// crossing.
    fn build_intersect_list(&mut self, top_y: i64) {
        let mut e = self.active;
        self.sorted = e;
        while e != NIL {
            let x = self.edges[e].top_x(top_y);
            let edge = &mut self.edges[e];
            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            edge.curr.x = x;
            e = edge.next_in_ael;
        }

        loop {
            let mut modified = false;
            e = self.sorted;
            while self.edges[e].next_in_sel != NIL {
                let next = self.edges[e].next_in_sel;
                if self.edges[e].curr.x > self.edges[next].curr.x {
                    let mut pt = intersect_point(&self.edges[e], &self.edges[next]);
                    if pt.y < top_y {
                        pt = IntPt::new(self.edges[e].top_x(top_y), top_y);
                    }
                    self.intersections.push(IntersectNode { e1: e, e2: next, pt });
                    self.swap_positions_in_sel(e, next);
                    modified = true;
                } else {
                    e = next;
                }
            }
            let prev = self.edges[e].prev_in_sel;
            if prev == NIL || !modified {
                break;
            }
            self.edges[prev].next_in_sel = NIL;
        }
        self.sorted = NIL;
    }

    /// Reorder crossings bottom-first so that each one is between edges
    /// adjacent at the moment it is processed.
    fn fixup_intersection_order(&mut self) -> Result<(), ClipError> {
        self.copy_ael_to_sel();
        self.intersections.sort_by(|a, b| b.pt.y.cmp(&a.pt.y));
        let count = self.intersections.len();
        for i in 0..count {
            if !self.edges_adjacent(i) {
                let j = (i + 1..count)
                    .find(|&j| self.edges_adjacent(j))
                    .ok_or(ClipError::IntersectionOrder)?;
                self.intersections.swap(i, j);
            }
            let node = self.intersections[i];
            self.swap_positions_in_sel(node.e1, node.e2);
        }
        Ok(())
    }

    fn edges_adjacent(&self, i: usize) -> bool {
        let node = &self.intersections[i];
        self.edges[node.e1].next_in_sel == node.e2 || self.edges[node.e1].prev_in_sel == node.e2
    }

    // ------------------------------------------------------------------
    // Top of the scan beam
    // ------------------------------------------------------------------

    fn is_maxima(&self, e: usize, y: i64) -> bool {
        self.edges[e].top.y == y && self.edges[e].next_in_lml == NIL
    }

    fn is_intermediate(&self, e: usize, y: i64) -> bool {
        self.edges[e].top.y == y && self.edges[e].next_in_lml != NIL
    }

    fn process_edges_at_top(&mut self, top_y: i64) -> Result<(), ClipError> {
        let mut e = self.active;
        while e != NIL {
            let mut is_max = self.is_maxima(e, top_y);
            if is_max {
                let pair = self.maxima_pair_active(e);
                is_max = pair == NIL || !self.edges[pair].is_horizontal();
            }

            if is_max {
                let prev = self.edges[e].prev_in_ael;
                self.do_maxima(e)?;
                e = if prev == NIL {
                    self.active
                } else {
                    self.edges[prev].next_in_ael
                };
            } else {
                let lml = self.edges[e].next_in_lml;
                if self.is_intermediate(e, top_y) && self.edges[lml].is_horizontal() {
                    e = self.update_edge_into_ael(e)?;
                    if self.edges[e].out_idx.is_some() {
                        let bot = self.edges[e].bot;
                        self.add_out_pt(e, bot);
                    }
                    self.add_edge_to_sel(e);
                } else {
                    let x = self.edges[e].top_x(top_y);
                    self.edges[e].curr = IntPt::new(x, top_y);
                }
                e = self.edges[e].next_in_ael;
            }
        }

        self.process_horizontals()?;

        e = self.active;
        while e != NIL {
            if self.is_intermediate(e, top_y) {
                let op = if self.edges[e].out_idx.is_some() {
                    let top = self.edges[e].top;
                    self.add_out_pt(e, top)
                } else {
                    NIL
                };
                e = self.update_edge_into_ael(e)?;

                let (prev, next) = (self.edges[e].prev_in_ael, self.edges[e].next_in_ael);
                if op != NIL {
                    let bot = self.edges[e].bot;
                    if prev != NIL && self.shares_rising_edge(e, prev) {
                        let op2 = self.add_out_pt(prev, bot);
                        let top = self.edges[e].top;
                        self.add_join(op, op2, top);
                    } else if next != NIL && self.shares_rising_edge(e, next) {
                        let op2 = self.add_out_pt(next, bot);
                        let top = self.edges[e].top;
                        self.add_join(op, op2, top);
                    }
                }
            }
            e = self.edges[e].next_in_ael;
        }
        Ok(())
    }

    fn shares_rising_edge(&self, e: usize, other: usize) -> bool {
        let (a, b) = (&self.edges[e], &self.edges[other]);
        b.curr == a.bot
            && b.out_idx.is_some()
            && b.curr.y > b.top.y
            && slopes_equal4(a.curr, a.top, b.curr, b.top)
    }

    fn do_maxima(&mut self, e: usize) -> Result<(), ClipError> {
        let pair = self.maxima_pair_active(e);
        if pair == NIL {
            if self.edges[e].out_idx.is_some() {
                let top = self.edges[e].top;
                self.add_out_pt(e, top);
            }
            self.delete_from_ael(e);
            return Ok(());
        }

        let top = self.edges[e].top;
        let mut next = self.edges[e].next_in_ael;
        while next != NIL && next != pair {
            self.intersect_edges(e, next, top)?;
            self.swap_positions_in_ael(e, next);
            next = self.edges[e].next_in_ael;
        }

        match (self.edges[e].out_idx, self.edges[pair].out_idx) {
            (None, None) => {}
            (Some(_), Some(_)) => self.add_local_max_poly(e, pair, top)?,
            _ => return Err(ClipError::Maxima { y: top.y }),
        }
        self.delete_from_ael(e);
        self.delete_from_ael(pair);
        Ok(())
    }
}

pub(super) fn horz_segments_overlap(mut a1: i64, mut a2: i64, mut b1: i64, mut b2: i64) -> bool {
    if a1 > a2 {
        std::mem::swap(&mut a1, &mut a2);
    }
    if b1 > b2 {
        std::mem::swap(&mut b1, &mut b2);
    }
    a1 < b2 && b1 < a2
}

/// Swap two nodes of a doubly linked list threaded through `edges`.
/// Returns the node that became the list head, if either did.
fn swap_linked(
    edges: &mut [Edge],
    e1: usize,
    e2: usize,
    get: impl Fn(&Edge) -> (usize, usize),
    set: impl Fn(&mut Edge, usize, usize),
) -> Option<usize> {
    let (p1, n1) = get(&edges[e1]);
    let (p2, n2) = get(&edges[e2]);
    let set_next = |edges: &mut [Edge], at: usize, to: usize| {
        if at != NIL {
            let (p, _) = get(&edges[at]);
            set(&mut edges[at], p, to);
        }
    };
    let set_prev = |edges: &mut [Edge], at: usize, to: usize| {
        if at != NIL {
            let (_, n) = get(&edges[at]);
            set(&mut edges[at], to, n);
        }
    };

    if n1 == e2 {
        set_prev(edges, n2, e1);
        set_next(edges, p1, e2);
        set(&mut edges[e2], p1, e1);
        set(&mut edges[e1], e2, n2);
    } else if n2 == e1 {
        set_prev(edges, n1, e2);
        set_next(edges, p2, e1);
        set(&mut edges[e1], p2, e2);
        set(&mut edges[e2], e1, n1);
    } else {
        set(&mut edges[e1], p2, n2);
        set_prev(edges, n2, e1);
        set_next(edges, p2, e1);
        set(&mut edges[e2], p1, n1);
        set_prev(edges, n1, e2);
        set_next(edges, p1, e2);
    }

    if get(&edges[e1]).0 == NIL {
        Some(e1)
    } else if get(&edges[e2]).0 == NIL {
        Some(e2)
    } else {
        None
    }
}
