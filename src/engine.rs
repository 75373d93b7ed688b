//! The sweep engine: event arena, event queue, sweep-line status, and the
//! main loop that drives them (spec §4.2, §4.5, §4.6).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::assembler::Assembler;
use crate::event::{EdgeType, PolygonType, SweepEvent, SweepEventId};
use crate::geometry::{segment_intersection, signed_area, Intersection};
use crate::point::Point2D;
use crate::polygon::Polygon;
use crate::segment::Segment;
use crate::Operation;

/// Output of a full sweep: the assembled polygon plus every intersection
/// point the geometry kernel reported along the way (spec §6).
pub(crate) struct SweepOutput {
    pub polygon: Polygon,
    pub intersections: Vec<Point2D>,
}

/// Runs the Martinez-Rueda-Feito plane sweep for `operation` over `subject`
/// and `clipping`, including the empty/disjoint shortcuts of spec §4.5(i).
pub(crate) fn compute(subject: &Polygon, clipping: &Polygon, operation: Operation) -> SweepOutput {
    if subject.is_empty() || clipping.is_empty() {
        let polygon = match operation {
            Operation::Intersection => Polygon::empty(),
            Operation::Difference => subject.clone(),
            Operation::Union | Operation::Xor => {
                if subject.is_empty() {
                    clipping.clone()
                } else {
                    subject.clone()
                }
            }
        };
        return SweepOutput { polygon, intersections: Vec::new() };
    }

    let subject_bbox = subject.bounding_box().expect("non-empty polygon has a bounding box");
    let clipping_bbox = clipping.bounding_box().expect("non-empty polygon has a bounding box");

    if !subject_bbox.overlaps(&clipping_bbox) {
        let polygon = match operation {
            Operation::Intersection => Polygon::empty(),
            Operation::Difference => subject.clone(),
            Operation::Union | Operation::Xor => {
                let mut contours = subject.contours.clone();
                contours.extend(clipping.contours.iter().cloned());
                Polygon::new(contours)
            }
        };
        return SweepOutput { polygon, intersections: Vec::new() };
    }

    let mut engine = Engine::new(operation);
    engine.process_polygon(subject, PolygonType::Subject);
    engine.process_polygon(clipping, PolygonType::Clipping);

    let minmaxx = subject_bbox.right.min(clipping_bbox.right);
    engine.run(minmaxx, subject_bbox.right);
    engine.finish()
}

struct Engine {
    events: Vec<SweepEvent>,
    queue: BinaryHeap<Reverse<SweepEvent>>,
    status: Vec<SweepEventId>,
    assembler: Assembler,
    intersections: Vec<Point2D>,
    operation: Operation,
    next_seq: usize,
}

impl Engine {
    fn new(operation: Operation) -> Self {
        Engine {
            events: Vec::new(),
            queue: BinaryHeap::new(),
            status: Vec::new(),
            assembler: Assembler::new(),
            intersections: Vec::new(),
            operation,
            next_seq: 0,
        }
    }

    fn next_seq(&mut self) -> usize {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Builds the left/right event pair for every non-degenerate edge of
    /// every contour and pushes both into the queue.
    fn process_polygon(&mut self, polygon: &Polygon, polygon_type: PolygonType) {
        for contour in &polygon.contours {
            let n = contour.nodes.len();
            if n < 2 {
                continue;
            }
            for i in 0..n {
                let p = contour.nodes[i];
                let q = contour.nodes[(i + 1) % n];
                if Segment::new(p, q).is_degenerate() {
                    continue;
                }

                let (left_pt, right_pt) = if (p.x, p.y) < (q.x, q.y) { (p, q) } else { (q, p) };

                let left_id = SweepEventId(self.events.len());
                let left_seq = self.next_seq();
                self.events.push(SweepEvent {
                    id: left_id,
                    point: left_pt,
                    other_point: right_pt,
                    twin: SweepEventId(left_id.0 + 1),
                    is_left: true,
                    polygon_type,
                    edge_type: EdgeType::Normal,
                    in_out: false,
                    is_inside: false,
                    status_pos: None,
                    seq: left_seq,
                });

                let right_id = SweepEventId(self.events.len());
                let right_seq = self.next_seq();
                self.events.push(SweepEvent {
                    id: right_id,
                    point: right_pt,
                    other_point: left_pt,
                    twin: left_id,
                    is_left: false,
                    polygon_type,
                    edge_type: EdgeType::Normal,
                    in_out: false,
                    is_inside: false,
                    status_pos: None,
                    seq: right_seq,
                });

                self.queue.push(Reverse(self.events[left_id.0].clone()));
                self.queue.push(Reverse(self.events[right_id.0].clone()));
            }
        }
    }

    /// Main sweep loop (spec §4.5).
    fn run(&mut self, minmaxx: f64, subject_max_x: f64) {
        while let Some(Reverse(popped)) = self.queue.pop() {
            let id = popped.id;
            let point = self.events[id.0].point;

            #[cfg(feature = "trace-events")]
            log::trace!(
                "pop {:?} at {:?} (left={})",
                id,
                point,
                self.events[id.0].is_left
            );

            match self.operation {
                Operation::Intersection if point.x > minmaxx => break,
                Operation::Difference if point.x > subject_max_x => break,
                _ => {}
            }

            if self.events[id.0].is_left {
                self.handle_left(id);
            } else {
                self.handle_right(id);
            }
        }
    }

    fn handle_left(&mut self, id: SweepEventId) {
        let pos = self.insert_status(id);

        let prev = if pos > 0 { Some(self.status[pos - 1]) } else { None };
        let next = if pos + 1 < self.status.len() { Some(self.status[pos + 1]) } else { None };

        self.compute_flags(pos);

        if let Some(next_id) = next {
            self.possible_intersection(id, next_id);
        }
        if let Some(prev_id) = prev {
            self.possible_intersection(id, prev_id);
        }
    }

    fn handle_right(&mut self, id: SweepEventId) {
        let left_id = self.events[id.0].twin;
        let pos = self.events[left_id.0]
            .status_pos
            .expect("a right event's twin must be active in the status line");

        let prev = if pos > 0 { Some(self.status[pos - 1]) } else { None };
        let next = if pos + 1 < self.status.len() { Some(self.status[pos + 1]) } else { None };

        if should_emit(self.operation, &self.events[left_id.0]) {
            let left = &self.events[left_id.0];
            self.assembler.add_segment(left.point, left.other_point, left.in_out);
        }

        self.remove_status(pos);

        if let (Some(prev_id), Some(next_id)) = (prev, next) {
            self.possible_intersection(prev_id, next_id);
        }
    }

    /// Spec §4.5(iii): transition/inside-other flags for the just-inserted
    /// left event at `status[pos]`.
    fn compute_flags(&mut self, pos: usize) {
        let e_id = self.status[pos];

        if pos == 0 {
            self.events[e_id.0].is_inside = false;
            self.events[e_id.0].in_out = false;
            return;
        }

        let prev_id = self.status[pos - 1];
        let prev_edge_type = self.events[prev_id.0].edge_type;

        if prev_edge_type != EdgeType::Normal {
            if pos < 2 {
                self.events[e_id.0].is_inside = true;
                self.events[e_id.0].in_out = false;
                return;
            }
            let pp_id = self.status[pos - 2];
            let e_poly = self.events[e_id.0].polygon_type;
            let prev_poly = self.events[prev_id.0].polygon_type;
            if prev_poly == e_poly {
                self.events[e_id.0].in_out = !self.events[prev_id.0].in_out;
                self.events[e_id.0].is_inside = !self.events[pp_id.0].in_out;
            } else {
                self.events[e_id.0].in_out = !self.events[pp_id.0].in_out;
                self.events[e_id.0].is_inside = !self.events[prev_id.0].in_out;
            }
        } else {
            let e_poly = self.events[e_id.0].polygon_type;
            let prev_poly = self.events[prev_id.0].polygon_type;
            if prev_poly == e_poly {
                self.events[e_id.0].is_inside = self.events[prev_id.0].is_inside;
                self.events[e_id.0].in_out = !self.events[prev_id.0].in_out;
            } else {
                self.events[e_id.0].is_inside = !self.events[prev_id.0].in_out;
                self.events[e_id.0].in_out = self.events[prev_id.0].is_inside;
            }
        }
    }

    /// Inserts `id` into the sorted status line and returns its position.
    fn insert_status(&mut self, id: SweepEventId) -> usize {
        let events = &self.events;
        let idx = self
            .status
            .binary_search_by(|&existing| segment_order(events, existing, id))
            .unwrap_or_else(|e| e);
        self.status.insert(idx, id);
        self.refresh_status_positions(idx);
        idx
    }

    fn remove_status(&mut self, pos: usize) {
        let id = self.status.remove(pos);
        self.events[id.0].status_pos = None;
        self.refresh_status_positions(pos);
    }

    fn refresh_status_positions(&mut self, from: usize) {
        for k in from..self.status.len() {
            let id = self.status[k];
            self.events[id.0].status_pos = Some(k);
        }
    }

    /// Dispatches a pairwise intersection test between two left events
    /// currently adjacent in the status (spec §4.6).
    fn possible_intersection(&mut self, s1_id: SweepEventId, s2_id: SweepEventId) {
        let s1_twin = self.events[s1_id.0].twin;
        let s2_twin = self.events[s2_id.0].twin;
        let seg1 = Segment::new(self.events[s1_id.0].point, self.events[s1_twin.0].point);
        let seg2 = Segment::new(self.events[s2_id.0].point, self.events[s2_twin.0].point);

        match segment_intersection(&seg1, &seg2) {
            Intersection::None => {}
            Intersection::Point(p) => {
                self.intersections.push(p);

                let s1_is_endpoint = p == seg1.begin || p == seg1.end;
                let s2_is_endpoint = p == seg2.begin || p == seg2.end;
                if s1_is_endpoint && s2_is_endpoint {
                    return;
                }
                if !s1_is_endpoint {
                    self.divide(s1_id, p);
                }
                if !s2_is_endpoint {
                    self.divide(s2_id, p);
                }
            }
            Intersection::Overlap(p1, p2) => {
                self.intersections.push(p1);
                self.intersections.push(p2);
                if self.events[s1_id.0].polygon_type == self.events[s2_id.0].polygon_type {
                    return;
                }
                self.handle_overlap(s1_id, s2_id);
            }
        }
    }

    /// Splits the edge owning left event `e_id` at interior point `p` (spec
    /// §4.6's `divide` subroutine). Returns the id of the new left event
    /// that continues from `p`.
    fn divide(&mut self, e_id: SweepEventId, p: Point2D) -> SweepEventId {
        let old_twin_id = self.events[e_id.0].twin;
        let e_point = self.events[e_id.0].point;
        let far_point = self.events[e_id.0].other_point;
        let polygon_type = self.events[e_id.0].polygon_type;
        let edge_type = self.events[e_id.0].edge_type;

        let r_new_id = SweepEventId(self.events.len());
        let r_seq = self.next_seq();
        self.events.push(SweepEvent {
            id: r_new_id,
            point: p,
            other_point: e_point,
            twin: e_id,
            is_left: false,
            polygon_type,
            edge_type,
            in_out: false,
            is_inside: false,
            status_pos: None,
            seq: r_seq,
        });

        let l_new_id = SweepEventId(self.events.len());
        let l_seq = self.next_seq();
        self.events.push(SweepEvent {
            id: l_new_id,
            point: p,
            other_point: far_point,
            twin: old_twin_id,
            is_left: true,
            polygon_type,
            edge_type,
            in_out: false,
            is_inside: false,
            status_pos: None,
            seq: l_seq,
        });

        self.events[old_twin_id.0].twin = l_new_id;
        self.events[old_twin_id.0].other_point = p;
        self.events[e_id.0].twin = r_new_id;
        self.events[e_id.0].other_point = p;

        let l_point = self.events[l_new_id.0].point;
        let old_twin_point = self.events[old_twin_id.0].point;
        if (l_point.x, l_point.y) > (old_twin_point.x, old_twin_point.y) {
            log::warn!(
                "subdivision at {:?} produced an inverted left/right pair, swapping is-left flags",
                p
            );
            self.events[l_new_id.0].is_left = false;
            self.events[old_twin_id.0].is_left = true;
        }

        self.queue.push(Reverse(self.events[r_new_id.0].clone()));
        self.queue.push(Reverse(self.events[l_new_id.0].clone()));

        l_new_id
    }

    fn mark_non_contributing(&mut self, id: SweepEventId) {
        self.set_edge_type_pair(id, EdgeType::NonContributing);
    }

    /// Sets `target`'s edge type from comparing `reference`'s and
    /// `transition_source`'s `in_out`. These are kept as separate
    /// parameters because `target` is often a piece `divide()` just created
    /// — its own `in_out` is still the placeholder set at creation and only
    /// becomes real once it is popped and runs through `compute_flags` — so
    /// the comparison must read the transition off an event that has
    /// already been through that (an original, not-yet-subdivided-away left
    /// event; transition is invariant along one original edge).
    fn mark_same_or_different(
        &mut self,
        reference_id: SweepEventId,
        transition_source_id: SweepEventId,
        target_id: SweepEventId,
    ) {
        let same = self.events[reference_id.0].in_out == self.events[transition_source_id.0].in_out;
        let edge_type = if same { EdgeType::SameTransition } else { EdgeType::DifferentTransition };
        self.set_edge_type_pair(target_id, edge_type);
    }

    fn set_edge_type_pair(&mut self, id: SweepEventId, edge_type: EdgeType) {
        let twin = self.events[id.0].twin;
        self.events[id.0].edge_type = edge_type;
        self.events[twin.0].edge_type = edge_type;
    }

    /// Collinear-overlap classification (spec §4.6's overlap handling).
    /// `a_id`/`b_id` are left events of two segments from different
    /// polygons whose full extents overlap along the same line.
    fn handle_overlap(&mut self, a_id: SweepEventId, b_id: SweepEventId) {
        let a_twin = self.events[a_id.0].twin;
        let b_twin = self.events[b_id.0].twin;
        let a_begin = self.events[a_id.0].point;
        let a_end = self.events[a_twin.0].point;
        let b_begin = self.events[b_id.0].point;
        let b_end = self.events[b_twin.0].point;

        let same_begin = a_begin == b_begin;
        let same_end = a_end == b_end;

        if same_begin && same_end {
            self.mark_non_contributing(a_id);
            self.mark_same_or_different(a_id, b_id, b_id);
            return;
        }

        if same_begin {
            let (shorter, longer, split_at) =
                if a_end.distance_squared(&a_begin) <= b_end.distance_squared(&b_begin) {
                    (a_id, b_id, a_end)
                } else {
                    (b_id, a_id, b_end)
                };
            self.divide(longer, split_at);
            self.mark_non_contributing(shorter);
            self.mark_same_or_different(shorter, longer, longer);
            return;
        }

        if same_end {
            let (shorter, longer) =
                if a_begin.distance_squared(&a_end) <= b_begin.distance_squared(&b_end) {
                    (a_id, b_id)
                } else {
                    (b_id, a_id)
                };
            let shorter_begin = self.events[shorter.0].point;
            let overlap_piece = self.divide(longer, shorter_begin);
            self.mark_non_contributing(shorter);
            self.mark_same_or_different(shorter, longer, overlap_piece);
            return;
        }

        // Four distinct endpoints: sort along the shared direction to find
        // which case (containment vs. proper overlap) applies.
        let dir = (a_end.x - a_begin.x, a_end.y - a_begin.y);
        let t_of = |p: &Point2D| -> f64 {
            if dir.0.abs() >= dir.1.abs() {
                (p.x - a_begin.x) / dir.0
            } else {
                (p.y - a_begin.y) / dir.1
            }
        };

        let mut pts = [(0.0_f64, a_begin, true), (t_of(&a_end), a_end, true), (t_of(&b_begin), b_begin, false), (t_of(&b_end), b_end, false)];
        pts.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap());

        let leading_is_a = pts[0].2;
        let trailing_is_a = pts[3].2;

        if leading_is_a == trailing_is_a {
            // One segment's span brackets the other on both sides.
            let (outer, inner) = if leading_is_a { (a_id, b_id) } else { (b_id, a_id) };
            let mid = self.divide(outer, pts[1].1);
            self.divide(mid, pts[2].1);
            self.mark_non_contributing(inner);
            self.mark_same_or_different(inner, outer, mid);
        } else {
            let (leading, trailing) = if leading_is_a { (a_id, b_id) } else { (b_id, a_id) };
            let leading_tail = self.divide(leading, pts[1].1);
            self.divide(trailing, pts[2].1);
            self.mark_non_contributing(leading_tail);
            self.mark_same_or_different(leading, trailing, trailing);
        }
    }

    fn finish(self) -> SweepOutput {
        SweepOutput { polygon: self.assembler.into_polygon(), intersections: self.intersections }
    }
}

/// Whether a just-closed left event's edge belongs in the result of
/// `operation` (spec §4.4/§4.5).
fn should_emit(operation: Operation, left: &SweepEvent) -> bool {
    match left.edge_type {
        EdgeType::NonContributing => false,
        EdgeType::SameTransition => matches!(operation, Operation::Intersection | Operation::Union),
        EdgeType::DifferentTransition => matches!(operation, Operation::Difference),
        EdgeType::Normal => match operation {
            Operation::Intersection => left.is_inside,
            Operation::Union => !left.is_inside,
            Operation::Difference => {
                (left.polygon_type == PolygonType::Subject && !left.is_inside)
                    || (left.polygon_type == PolygonType::Clipping && left.is_inside)
            }
            Operation::Xor => true,
        },
    }
}

/// Segment comparator for the sweep-line status (spec §4.3): strict order
/// of two left events by which sits below the other at the sweep position.
fn segment_order(events: &[SweepEvent], s: SweepEventId, t: SweepEventId) -> Ordering {
    if s == t {
        return Ordering::Equal;
    }

    let s_ev = &events[s.0];
    let t_ev = &events[t.0];

    let area1 = signed_area(&s_ev.point, &s_ev.other_point, &t_ev.point);
    let area2 = signed_area(&s_ev.point, &s_ev.other_point, &t_ev.other_point);

    let s_below_t = if area1 != 0.0 || area2 != 0.0 {
        if s_ev.point == t_ev.point {
            s_ev.below(&t_ev.other_point)
        } else if !s_ev.ranks_after(t_ev) {
            t_ev.above(&s_ev.point)
        } else {
            s_ev.below(&t_ev.point)
        }
    } else {
        s_ev.seq < t_ev.seq
    };

    if s_below_t {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}
