//! Sweep events: one per endpoint of one (possibly subdivided) edge.

use crate::geometry::signed_area;
use crate::point::Point2D;
use std::cmp::Ordering;

/// Which input polygon an edge originated from.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum PolygonType {
    Subject,
    Clipping,
}

/// How an edge contributes to the output, per spec §4.4.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EdgeType {
    Normal,
    NonContributing,
    SameTransition,
    DifferentTransition,
}

/// Index into the event arena owned by the sweep engine. Cheap, `Copy`,
/// valid only for the lifetime of the arena it was produced from — the
/// arena/index pairing is spec §9's own recommendation over pointer-based
/// cross references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SweepEventId(pub usize);

/// One endpoint of one edge. See spec §3 for the full attribute list.
#[derive(Debug, Clone)]
pub struct SweepEvent {
    /// This event's own slot in the arena it was created from. Carried on
    /// the event itself (rather than looked up separately) so a popped
    /// queue snapshot can still identify which arena slot is authoritative.
    pub id: SweepEventId,
    /// This endpoint.
    pub point: Point2D,
    /// The other endpoint of the same edge — cached by value so the event
    /// comparator never needs arena access (see SPEC_FULL.md §3).
    pub other_point: Point2D,
    /// Index of the twin event (the other endpoint of this edge).
    pub twin: SweepEventId,
    /// True iff `point` is the left endpoint under the event comparator.
    pub is_left: bool,
    pub polygon_type: PolygonType,
    pub edge_type: EdgeType,
    /// Inside-outside transition flag (spec: "transition").
    pub in_out: bool,
    /// Inside-other-polygon flag, meaningful only on left events.
    pub is_inside: bool,
    /// Position handle into the sweep-line status, meaningful only on left
    /// events while the segment is active.
    pub status_pos: Option<usize>,
    /// Monotonic creation order, used only to break ties among collinear
    /// segments in the segment comparator (spec §4.3 step 3: "the exact
    /// tiebreaker does not matter for correctness as long as it is a strict
    /// total order").
    pub seq: usize,
}

impl SweepEvent {
    /// Is the segment (point, other_point), oriented left-to-right, below
    /// `query`?
    #[inline]
    pub fn below(&self, query: &Point2D) -> bool {
        if self.is_left {
            signed_area(&self.point, &self.other_point, query) > 0.0
        } else {
            signed_area(&self.other_point, &self.point, query) > 0.0
        }
    }

    #[inline]
    pub fn above(&self, query: &Point2D) -> bool {
        !self.below(query)
    }

    /// True iff `self` ranks strictly after `other` in processing order
    /// (spec §4.3 event comparator).
    pub fn ranks_after(&self, other: &SweepEvent) -> bool {
        if self.point.x != other.point.x {
            return self.point.x > other.point.x;
        }

        if self.point.y != other.point.y {
            return self.point.y > other.point.y;
        }

        if self.is_left != other.is_left {
            return self.is_left;
        }

        self.above(&other.other_point)
    }
}

// `Eq`/`Ord` let `SweepEvent` snapshots sit directly in a `BinaryHeap`
// (wrapped in `Reverse` for min-heap order) without a separate key type.
// Identity is by arena slot; ranking among distinct events is `ranks_after`
// with `seq` as the final, total-order-guaranteeing tiebreak.
impl PartialEq for SweepEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SweepEvent {}

impl PartialOrd for SweepEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SweepEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.id == other.id {
            return Ordering::Equal;
        }
        if self.ranks_after(other) {
            Ordering::Greater
        } else if other.ranks_after(self) {
            Ordering::Less
        } else {
            self.seq.cmp(&other.seq)
        }
    }
}
