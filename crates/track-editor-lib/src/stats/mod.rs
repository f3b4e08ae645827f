//! Incremental statistics over a polyline range
//!
//! A statistic tracks a contiguous vertex range of one [`Polyline`] and folds
//! in one value per node: either per vertex or per segment, as picked by its
//! [`Property`]. The range is held by handle only, so the statistic never owns
//! or borrows the polyline between calls.
//!
//! The traversal protocol lives in the [`Statistic`] trait:
//!
//! - [`Statistic::of`] / [`Statistic::from_to`] rebuild from scratch;
//! - [`Statistic::add`] folds one more segment in at either end of the range;
//! - [`Statistic::remove`] un-folds a segment at either end of the range. Any
//!   removal the aggregate cannot express incrementally clears it, and
//!   [`Statistic::update`] rescans the remembered range.
//!
//! Nodes whose value is `NaN` (e.g. a speed with no timestamps) are skipped.

mod max_min;
mod median;
mod std_dev;
mod sum_mean;

pub use max_min::{Extreme, Filter, MaxMin};
pub use median::{Median, MedianValue};
pub use std_dev::StandardDeviationStats;
pub use sum_mean::{SumMean, SumMeanStats};

use crate::polyline::{Polyline, SegmentRef, VertexRef};

/// Which node value a statistic reads
pub enum Property<V, S> {
    Vertex(fn(&V) -> f64),
    Segment(fn(&S) -> f64),
}

impl<V, S> Clone for Property<V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, S> Copy for Property<V, S> {}

impl<V, S> std::fmt::Debug for Property<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Vertex(_) => f.write_str("Property::Vertex"),
            Property::Segment(_) => f.write_str("Property::Segment"),
        }
    }
}

impl<V, S> Property<V, S> {
    /// Value of `node`, `None` if it is of the other kind or not in `line`
    pub fn value_at(&self, line: &Polyline<V, S>, node: NodeRef) -> Option<f64> {
        match (*self, node) {
            (Property::Vertex(value_of), NodeRef::Vertex(v)) => line.vertex(v).map(value_of),
            (Property::Segment(value_of), NodeRef::Segment(s)) => line.segment(s).map(value_of),
            _ => None,
        }
    }

    /// First node this property reads at or after `vertex`
    pub(crate) fn node_from(&self, line: &Polyline<V, S>, vertex: VertexRef) -> Option<NodeRef> {
        match self {
            Property::Vertex(_) => line.contains(vertex).then_some(NodeRef::Vertex(vertex)),
            Property::Segment(_) => line.segment_after(vertex).map(NodeRef::Segment),
        }
    }
}

/// A vertex or segment handle, as folded into a statistic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    Vertex(VertexRef),
    Segment(SegmentRef),
}

impl NodeRef {
    /// Neighbouring node of the same kind
    pub fn step<V, S>(self, line: &Polyline<V, S>, forward: bool) -> Option<NodeRef> {
        match (self, forward) {
            (NodeRef::Vertex(v), true) => line.next_vertex(v).map(NodeRef::Vertex),
            (NodeRef::Vertex(v), false) => line.prev_vertex(v).map(NodeRef::Vertex),
            (NodeRef::Segment(s), true) => line.next_segment(s).map(NodeRef::Segment),
            (NodeRef::Segment(s), false) => line.prev_segment(s).map(NodeRef::Segment),
        }
    }

    /// Vertex bounding this node on the leading side
    pub fn leading_vertex<V, S>(self, line: &Polyline<V, S>) -> Option<VertexRef> {
        match self {
            NodeRef::Vertex(v) => Some(v),
            NodeRef::Segment(s) => line.segment_start(s),
        }
    }

    /// Vertex bounding this node on the trailing side
    pub fn trailing_vertex<V, S>(self, line: &Polyline<V, S>) -> Option<VertexRef> {
        match self {
            NodeRef::Vertex(v) => Some(v),
            NodeRef::Segment(s) => line.segment_end(s),
        }
    }
}

/// Tracked vertex range of a statistic
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent {
    pub first: Option<VertexRef>,
    pub last: Option<VertexRef>,
}

/// End of the tracked range a node is folded in at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Front,
    Back,
}

/// Shared traversal protocol for all statistics
///
/// Implementors provide the aggregate hooks; the range bookkeeping is shared.
pub trait Statistic<V, S> {
    fn property(&self) -> Property<V, S>;

    fn extent(&self) -> Extent;

    fn extent_mut(&mut self) -> &mut Extent;

    /// Fold one node's value in
    fn add_node(&mut self, node: NodeRef, value: f64, edge: Edge);

    /// Un-fold one node's value. Returns `false` if the aggregate cannot be
    /// updated incrementally and needs a rescan.
    fn remove_node(&mut self, node: NodeRef, value: f64) -> bool;

    /// Reset the aggregate to its initial state; the extent is kept
    fn clear(&mut self);

    /// Rebuild over the whole polyline
    fn of(&mut self, line: &Polyline<V, S>) {
        self.from_to(line, line.first_vertex(), line.last_vertex());
    }

    /// Rebuild over `start..=end`
    ///
    /// Walks forward from `start` and stops at `end` or at the tail, whichever
    /// comes first, so an `end` from another chain or already removed scans to
    /// the tail. A `start` not in `line` leaves the statistic empty.
    fn from_to(&mut self, line: &Polyline<V, S>, start: Option<VertexRef>, end: Option<VertexRef>) {
        self.clear();
        *self.extent_mut() = Extent::default();

        let Some(start) = start.filter(|&v| line.contains(v)) else {
            return;
        };
        *self.extent_mut() = Extent {
            first: Some(start),
            last: Some(start),
        };
        if let Property::Vertex(value_of) = self.property() {
            if let Some(value) = line.vertex(start).map(value_of).filter(|v| !v.is_nan()) {
                self.add_node(NodeRef::Vertex(start), value, Edge::Back);
            }
        }
        if end == Some(start) {
            return;
        }

        let mut segment = line.segment_after(start);
        while let Some(current) = segment {
            self.add(line, current, true);
            if line.segment_end(current) == end {
                break;
            }
            segment = line.next_segment(current);
        }
    }

    /// Fold one segment in
    ///
    /// A segment starting at the current last vertex (or any segment, while
    /// the range is empty) extends the range at the back; with
    /// `next_vertex_only` only its trailing vertex is new, which is how forward
    /// walks avoid counting a vertex twice. A segment ending at the current
    /// first vertex extends the range at the front and contributes its leading
    /// vertex. Any other segment would leave a hole and is refused.
    fn add(&mut self, line: &Polyline<V, S>, segment: SegmentRef, next_vertex_only: bool) -> bool {
        let (Some(start), Some(end)) = (line.segment_start(segment), line.segment_end(segment))
        else {
            return false;
        };
        let extent = self.extent();
        let edge = if extent.first.is_none() || extent.last == Some(start) {
            Edge::Back
        } else if extent.first == Some(end) {
            Edge::Front
        } else {
            return false;
        };

        let property = self.property();
        let nodes = match (property, edge) {
            (Property::Segment(_), _) => [Some(NodeRef::Segment(segment)), None],
            (Property::Vertex(_), Edge::Front) => [Some(NodeRef::Vertex(start)), None],
            (Property::Vertex(_), Edge::Back) => [
                (!next_vertex_only).then_some(NodeRef::Vertex(start)),
                Some(NodeRef::Vertex(end)),
            ],
        };
        for node in nodes.into_iter().flatten() {
            match property.value_at(line, node) {
                Some(value) if !value.is_nan() => self.add_node(node, value, edge),
                _ => {}
            }
        }

        let extent = self.extent_mut();
        match edge {
            Edge::Front => extent.first = Some(start),
            Edge::Back => {
                if extent.first.is_none() {
                    extent.first = Some(start);
                }
                extent.last = Some(end);
            }
        }
        true
    }

    /// Un-fold one segment at either end of the range
    ///
    /// Call before the segment leaves the polyline. A segment in the middle of
    /// the range, or one the aggregate cannot drop incrementally, clears the
    /// statistic and returns `false`; call [`Statistic::update`] to rebuild.
    fn remove(&mut self, line: &Polyline<V, S>, segment: SegmentRef) -> bool {
        let (Some(start), Some(end)) = (line.segment_start(segment), line.segment_end(segment))
        else {
            self.clear();
            return false;
        };
        let extent = self.extent();
        let (leaving, collapsed) = if extent.first == Some(start) {
            let leaving = match self.property() {
                Property::Vertex(_) => NodeRef::Vertex(start),
                Property::Segment(_) => NodeRef::Segment(segment),
            };
            (Some(leaving), Extent {
                first: Some(end),
                ..extent
            })
        } else if extent.last == Some(end) {
            let leaving = match self.property() {
                Property::Vertex(_) => NodeRef::Vertex(end),
                Property::Segment(_) => NodeRef::Segment(segment),
            };
            (Some(leaving), Extent {
                last: Some(start),
                ..extent
            })
        } else {
            (None, extent)
        };

        let removed = match leaving {
            Some(node) => match self.property().value_at(line, node) {
                Some(value) if value.is_nan() => true,
                Some(value) => self.remove_node(node, value),
                None => false,
            },
            None => false,
        };
        *self.extent_mut() = collapsed;
        if !removed {
            self.clear();
        }
        removed
    }

    /// Full rescan of the remembered range
    fn update(&mut self, line: &Polyline<V, S>) {
        let extent = self.extent();
        self.from_to(line, extent.first, extent.last);
    }
}
