//! Geometry kernel: signed-area predicate and segment-segment intersection.
//! Pure, stateless functions only — no sweep-line state lives here.

use crate::point::Point2D;
use crate::segment::Segment;

/// Squared-cross-product tolerance used to decide "parallel" vs "not
/// parallel" and "collinear" vs "merely parallel". Chosen strictly larger
/// than expected round-off at typical input scales (reference value from
/// the design notes).
pub const EPSILON: f64 = 1e-7;

/// Per-coordinate endpoint-snapping tolerance: an intersection point closer
/// than this to one of the four segment endpoints is replaced by that
/// endpoint exactly, to avoid spawning an infinitesimal segment on the next
/// subdivision pass.
pub const DELTA: f64 = 1e-8;

/// Signed area of the triangle (a, b, c). Positive iff a -> b -> c turns
/// counter-clockwise.
#[inline]
pub fn signed_area(a: &Point2D, b: &Point2D, c: &Point2D) -> f64 {
    (a.x - c.x) * (b.y - c.y) - (b.x - c.x) * (a.y - c.y)
}

#[inline]
fn cross(u: (f64, f64), v: (f64, f64)) -> f64 {
    u.0 * v.1 - u.1 * v.0
}

#[inline]
fn len_sq(u: (f64, f64)) -> f64 {
    u.0 * u.0 + u.1 * u.1
}

/// Outcome of [`segment_intersection`]: how many points the two segments
/// share, and which ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    None,
    Point(Point2D),
    Overlap(Point2D, Point2D),
}

impl Intersection {
    pub fn count(&self) -> u8 {
        match self {
            Intersection::None => 0,
            Intersection::Point(_) => 1,
            Intersection::Overlap(_, _) => 2,
        }
    }
}

/// Computes the intersection of two segments, with endpoint snapping.
///
/// Mirrors spec §4.1: non-parallel segments are solved via Cramer's rule on
/// the two scalar parameters; parallel-but-not-collinear segments return
/// `None`; collinear segments return the overlap interval on `[0, 1]` of
/// `s1`, which may be empty, a single point, or a sub-segment.
pub fn segment_intersection(s1: &Segment, s2: &Segment) -> Intersection {
    let d0 = s1.end.sub(&s1.begin);
    let d1 = s2.end.sub(&s2.begin);
    let e = s2.begin.sub(&s1.begin);

    let k = cross(d0, d1);

    if k * k > EPSILON * len_sq(d0) * len_sq(d1) {
        // Not parallel: unique solution (if within both unit intervals).
        let s = cross(e, d1) / k;
        let t = cross(e, d0) / k;

        if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
            return Intersection::None;
        }

        let mut p = Point2D::new(s1.begin.x + s * d0.0, s1.begin.y + s * d0.1);
        snap_to_nearest_endpoint(&mut p, s1, s2);
        return Intersection::Point(p);
    }

    if cross(e, d0) * cross(e, d0) > EPSILON * len_sq(d0) * len_sq(e) {
        // Parallel, not collinear.
        return Intersection::None;
    }

    // Collinear: parameterize s2's endpoints against s1's direction and
    // intersect with s1's own parameter interval [0, 1].
    let param = |p: &Point2D| -> f64 {
        if d0.0.abs() >= d0.1.abs() {
            (p.x - s1.begin.x) / d0.0
        } else {
            (p.y - s1.begin.y) / d0.1
        }
    };

    let (t0, t1) = {
        let a = param(&s2.begin);
        let b = param(&s2.end);
        if a <= b { (a, b) } else { (b, a) }
    };

    let lo = t0.max(0.0);
    let hi = t1.min(1.0);

    if lo > hi {
        return Intersection::None;
    }

    let at = |t: f64| Point2D::new(s1.begin.x + t * d0.0, s1.begin.y + t * d0.1);

    if (hi - lo).abs() < f64::EPSILON {
        Intersection::Point(at(lo))
    } else {
        Intersection::Overlap(at(lo), at(hi))
    }
}

/// Snaps `p` onto whichever of the four segment endpoints it lands within
/// `DELTA` of, per-coordinate. Closes off the rounding-error cascades that
/// would otherwise re-enter subdivision at sub-ulp offsets (spec §4.1, §9).
fn snap_to_nearest_endpoint(p: &mut Point2D, s1: &Segment, s2: &Segment) {
    for q in [&s1.begin, &s1.end, &s2.begin, &s2.end] {
        if (p.x - q.x).abs() < DELTA && (p.y - q.y).abs() < DELTA {
            *p = *q;
            return;
        }
    }
}
