//! Boolean set operations — intersection, union, difference, and symmetric
//! difference — between two planar polygons via the Martinez-Rueda-Feito
//! plane-sweep clipping algorithm.
//!
//! ```
//! use polyclip::{BooleanOp, Contour, Operation, Point2D, Polygon};
//!
//! let square = |x0: f64, y0: f64, x1: f64, y1: f64| {
//!     Polygon::new(vec![Contour::new(vec![
//!         Point2D::new(x0, y0),
//!         Point2D::new(x1, y0),
//!         Point2D::new(x1, y1),
//!         Point2D::new(x0, y1),
//!     ])])
//! };
//!
//! let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0));
//! let result = op.compute(Operation::Intersection);
//! assert_eq!(result.contours.len(), 1);
//! assert!(op.intersection_count() >= 2);
//! ```

mod assembler;
mod bbox;
mod chain;
mod engine;
mod event;
mod geometry;
mod point;
mod polygon;
mod segment;

pub use bbox::Bbox;
pub use geometry::{DELTA, EPSILON};
pub use point::{point_on_segment, Point2D};
pub use polygon::{calculate_winding_order, Contour, Polygon, WindingOrder};

/// A Boolean set operation, stable-numbered per spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Intersection = 0,
    Union = 1,
    Difference = 2,
    Xor = 3,
}

/// Holds a subject/clipping polygon pair and runs Boolean operations over
/// them (spec §6's public façade). The intersection counter and
/// intersections list live on the instance, per spec §9: they reflect
/// whichever operation was computed most recently, not a fresh sweep.
#[derive(Debug, Clone)]
pub struct BooleanOp {
    subject: Polygon,
    clipping: Polygon,
    last_intersections: Vec<Point2D>,
}

impl BooleanOp {
    pub fn construct(subject: Polygon, clipping: Polygon) -> Self {
        BooleanOp { subject, clipping, last_intersections: Vec::new() }
    }

    /// Runs `operation` and returns only the resulting polygon.
    pub fn compute(&mut self, operation: Operation) -> Polygon {
        self.compute_with_intersections(operation).polygon
    }

    /// Runs `operation` and returns both the resulting polygon and every
    /// intersection point the geometry kernel reported along the way.
    /// Also caches the intersections for [`BooleanOp::intersection_count`].
    pub fn compute_with_intersections(&mut self, operation: Operation) -> ComputeResult {
        let output = engine::compute(&self.subject, &self.clipping, operation);
        log::debug!(
            "{:?}: {} contour(s) out, {} intersection(s) recorded",
            operation,
            output.polygon.contours.len(),
            output.intersections.len()
        );
        self.last_intersections = output.intersections.clone();
        ComputeResult { polygon: output.polygon, intersections: output.intersections }
    }

    /// Number of intersection points recorded by the most recent `compute`
    /// or `compute_with_intersections` call. Zero if neither has run yet.
    pub fn intersection_count(&self) -> usize {
        self.last_intersections.len()
    }
}

/// Return value of [`BooleanOp::compute_with_intersections`].
#[derive(Debug, Clone)]
pub struct ComputeResult {
    pub polygon: Polygon,
    pub intersections: Vec<Point2D>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new(vec![Contour::new(vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ])])
    }

    fn area(polygon: &Polygon) -> f64 {
        polygon
            .contours
            .iter()
            .map(|c| {
                let nodes = &c.nodes;
                let mut sum = 0.0;
                for i in 0..nodes.len() {
                    let a = nodes[i];
                    let b = nodes[(i + 1) % nodes.len()];
                    sum += a.x * b.y - b.x * a.y;
                }
                let signed = sum.abs() / 2.0;
                if c.is_hole() {
                    -signed
                } else {
                    signed
                }
            })
            .sum()
    }

    #[test]
    fn overlapping_unit_squares_intersection() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0));
        let result = op.compute(Operation::Intersection);
        assert_relative_eq!(area(&result), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn overlapping_unit_squares_union_area() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0));
        let result = op.compute(Operation::Union);
        // |A| + |B| - |A ∩ B| = 4 + 4 - 1
        assert_relative_eq!(area(&result), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn disjoint_squares_union_is_two_contours() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 1.0, 1.0), square(5.0, 5.0, 6.0, 6.0));
        let result = op.compute(Operation::Union);
        assert_eq!(result.contours.len(), 2);
        assert_relative_eq!(area(&result), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn disjoint_squares_intersection_is_empty() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 1.0, 1.0), square(5.0, 5.0, 6.0, 6.0));
        let result = op.compute(Operation::Intersection);
        assert!(result.is_empty());
    }

    #[test]
    fn identical_squares_union_equals_input() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let mut op = BooleanOp::construct(a.clone(), a.clone());
        let result = op.compute(Operation::Union);
        assert_relative_eq!(area(&result), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn xor_of_overlapping_squares_excludes_the_shared_region() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0));
        let result = op.compute(Operation::Xor);
        // |A| + |B| - 2|A ∩ B| = 4 + 4 - 2
        assert_relative_eq!(area(&result), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn difference_removes_the_overlap() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0));
        let result = op.compute(Operation::Difference);
        assert_relative_eq!(area(&result), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn square_with_hole_minus_overlapping_square() {
        // A 10x10 square with a 4x4 hole in the middle, minus a square that
        // overlaps the hole's right edge — exercises the assembler's
        // hole-depth bookkeeping alongside a genuine edge subdivision.
        let outer = Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ]);
        let hole = Contour::new(vec![
            Point2D::new(3.0, 3.0),
            Point2D::new(7.0, 3.0),
            Point2D::new(7.0, 7.0),
            Point2D::new(3.0, 7.0),
        ]);
        let subject = Polygon::new(vec![outer, hole]);
        let clip = square(6.0, 4.0, 9.0, 6.0);

        let mut op = BooleanOp::construct(subject, clip);
        let result = op.compute(Operation::Difference);
        // Only the part of the clip square that falls on solid material
        // (inside the outer boundary, outside the existing hole) removes
        // any area: the 3x2 clip square minus its 1x2 overlap with the
        // hole, i.e. (9-7)*(6-4) = 4 square units of material removed.
        assert_relative_eq!(area(&result), 100.0 - 16.0 - 4.0, epsilon = 1e-9);
    }

    #[test]
    fn touching_at_a_single_vertex_has_no_area_intersection() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(1.0, 1.0, 2.0, 2.0);
        let mut op = BooleanOp::construct(a, b);
        let result = op.compute(Operation::Intersection);
        assert!(result.is_empty());
    }

    #[test]
    fn collinear_overlapping_edge_union_has_no_duplicate_seam() {
        // B's left edge lies on A's right edge, collinear, partially
        // overlapping rather than coincident end to end.
        let a = Polygon::new(vec![Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(3.0, 1.0),
            Point2D::new(0.0, 1.0),
        ])]);
        let b = Polygon::new(vec![Contour::new(vec![
            Point2D::new(1.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(4.0, 1.0),
            Point2D::new(1.0, 1.0),
        ])]);
        let mut op = BooleanOp::construct(a, b);
        let result = op.compute(Operation::Union);
        assert_eq!(result.contours.len(), 1);
        assert_relative_eq!(area(&result), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn intersection_count_matches_recorded_points() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0));
        assert_eq!(op.intersection_count(), 0);
        let result = op.compute_with_intersections(Operation::Intersection);
        assert_eq!(op.intersection_count(), result.intersections.len());
        assert!(!result.intersections.is_empty());
    }

    #[test]
    fn intersection_count_reflects_the_most_recent_compute() {
        let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(5.0, 5.0, 6.0, 6.0));
        op.compute(Operation::Intersection);
        assert_eq!(op.intersection_count(), 0);

        let mut op = BooleanOp::construct(square(0.0, 0.0, 2.0, 2.0), square(1.0, 1.0, 3.0, 3.0));
        op.compute(Operation::Intersection);
        assert!(op.intersection_count() >= 2);
    }

    #[test]
    fn union_and_intersection_are_commutative() {
        let a = square(0.0, 0.0, 2.0, 2.0);
        let b = square(1.0, 1.0, 3.0, 3.0);
        let mut ab = BooleanOp::construct(a.clone(), b.clone());
        let mut ba = BooleanOp::construct(b, a);

        assert_relative_eq!(
            area(&ab.compute(Operation::Union)),
            area(&ba.compute(Operation::Union)),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            area(&ab.compute(Operation::Intersection)),
            area(&ba.compute(Operation::Intersection)),
            epsilon = 1e-9
        );
    }

    #[test]
    fn difference_is_not_commutative_across_asymmetric_inputs() {
        let a = square(0.0, 0.0, 2.0, 2.0);
        let b = square(1.0, 1.0, 3.0, 3.0);
        let mut ab = BooleanOp::construct(a.clone(), b.clone());
        let mut ba = BooleanOp::construct(b, a);

        let a_minus_b = area(&ab.compute(Operation::Difference));
        let b_minus_a = area(&ba.compute(Operation::Difference));
        assert!((a_minus_b - b_minus_a).abs() > 1e-9);
    }

    #[test]
    fn identical_polygon_is_idempotent_for_all_four_operations() {
        let a = square(2.0, -1.0, 6.0, 4.0);

        let mut op = BooleanOp::construct(a.clone(), a.clone());
        assert_relative_eq!(area(&op.compute(Operation::Intersection)), area(&a), epsilon = 1e-9);
        let mut op = BooleanOp::construct(a.clone(), a.clone());
        assert_relative_eq!(area(&op.compute(Operation::Union)), area(&a), epsilon = 1e-9);
        let mut op = BooleanOp::construct(a.clone(), a.clone());
        assert!(op.compute(Operation::Difference).is_empty());
        let mut op = BooleanOp::construct(a.clone(), a);
        assert!(op.compute(Operation::Xor).is_empty());
    }

    proptest! {
        /// Area identities from spec §8, checked over random axis-aligned
        /// rectangles: |A∩B| + |A∪B| = |A| + |B|; |A∪B| = |A|+|B|-|A∩B|;
        /// |A\B| = |A| - |A∩B|; |A△B| = |A∪B| - |A∩B|.
        #[test]
        fn area_identities_hold_for_random_rectangles(
            ax in -50.0f64..50.0, ay in -50.0f64..50.0, aw in 0.5f64..20.0, ah in 0.5f64..20.0,
            bx in -50.0f64..50.0, by in -50.0f64..50.0, bw in 0.5f64..20.0, bh in 0.5f64..20.0,
        ) {
            let a = square(ax, ay, ax + aw, ay + ah);
            let b = square(bx, by, bx + bw, by + bh);
            let area_a = area(&a);
            let area_b = area(&b);
            let tol = 1e-6 * (area_a + area_b + 1.0);

            let mut op = BooleanOp::construct(a.clone(), b.clone());
            let inter = area(&op.compute(Operation::Intersection));
            let mut op = BooleanOp::construct(a.clone(), b.clone());
            let union = area(&op.compute(Operation::Union));
            let mut op = BooleanOp::construct(a.clone(), b.clone());
            let xor = area(&op.compute(Operation::Xor));
            let mut op = BooleanOp::construct(a, b);
            let diff = area(&op.compute(Operation::Difference));

            prop_assert!((union - (area_a + area_b - inter)).abs() < tol);
            prop_assert!((xor - (union - inter)).abs() < tol);
            prop_assert!((diff - (area_a - inter)).abs() < tol);
        }
    }
}
