//! Contour assembler: stitches surviving output segments into closed point
//! chains and classifies each as an outer boundary or a hole with a nesting
//! depth (spec §4.7).

use crate::chain::Chain;
use crate::point::Point2D;
use crate::polygon::{Contour, Polygon};
use std::collections::VecDeque;

struct ClosedChain {
    nodes: VecDeque<Point2D>,
    /// Spatial context recorded at the moment this chain closed: the index
    /// of the most-recently-closed chain at that time, and the
    /// out-transition flag of the edge that closed this one.
    prev_closed_index: Option<usize>,
    transition: bool,
}

/// Accumulates emitted output segments into open chains, then closed
/// chains, then classifies the closed chains into a hole/boundary hierarchy.
pub(crate) struct Assembler {
    open: Vec<Chain>,
    closed: Vec<ClosedChain>,
    last_closed_index: Option<usize>,
}

impl Assembler {
    pub(crate) fn new() -> Self {
        Assembler { open: Vec::new(), closed: Vec::new(), last_closed_index: None }
    }

    /// Feeds one output segment, oriented as the sweep saw it, with the
    /// out-transition flag of the emitting right event.
    pub(crate) fn add_segment(&mut self, begin: Point2D, end: Point2D, transition: bool) {
        let mut linked_at = None;
        for (j, chain) in self.open.iter_mut().enumerate() {
            if chain.link_segment(begin, end) {
                linked_at = Some(j);
                break;
            }
        }

        let Some(j) = linked_at else {
            self.open.push(Chain::init(begin, end));
            return;
        };

        if self.open[j].is_closed() {
            let chain = self.open.remove(j);
            let new_index = self.closed.len();
            self.closed.push(ClosedChain {
                nodes: chain.into_nodes(),
                prev_closed_index: self.last_closed_index,
                transition,
            });
            self.last_closed_index = Some(new_index);
            return;
        }

        // Chain j is still open: try to splice it onto every other open
        // chain (a segment can bridge two previously-separate chains).
        let mut merge_into = None;
        for k in 0..self.open.len() {
            if k == j {
                continue;
            }
            let other = self.open[k].clone();
            if self.open[j].link_chain(other) {
                merge_into = Some(k);
                break;
            }
        }

        if let Some(k) = merge_into {
            self.open.remove(k);
            // Re-resolve j's position since removing k may have shifted it.
            let j = if k < j { j - 1 } else { j };
            if self.open[j].is_closed() {
                let chain = self.open.remove(j);
                let new_index = self.closed.len();
                self.closed.push(ClosedChain {
                    nodes: chain.into_nodes(),
                    prev_closed_index: self.last_closed_index,
                    transition,
                });
                self.last_closed_index = Some(new_index);
            }
        }
    }

    /// Classifies every closed chain into outer boundaries and holes with
    /// nesting depth (spec §4.7 "Contour hierarchy classification"), then
    /// returns the assembled polygon.
    pub(crate) fn into_polygon(self) -> Polygon {
        self.open.iter().filter(|c| !c.is_empty()).for_each(|_| {
            log::warn!("assembler: discarding a point chain that never closed");
        });

        let mut contours: Vec<Contour> = Vec::with_capacity(self.closed.len());

        for chain in &self.closed {
            let nodes: Vec<Point2D> = chain.nodes.iter().copied().collect();

            let (parent, depth) = match chain.prev_closed_index {
                None => (None, 0),
                Some(prev_idx) => {
                    if chain.transition {
                        // Transition out -> in: this chain is a hole.
                        let lower = &contours[prev_idx];
                        match lower.parent() {
                            Some(grandparent) => (Some(grandparent), lower.depth()),
                            None => (Some(prev_idx), lower.depth() + 1),
                        }
                    } else {
                        // Transition in -> out: this chain is an outer boundary.
                        (None, contours[prev_idx].depth())
                    }
                }
            };

            if let Some(parent_idx) = parent {
                contours[parent_idx].add_hole(contours.len());
            }
            contours.push(Contour::with_classification(nodes, parent, depth));
        }

        Polygon::new(contours)
    }
}
