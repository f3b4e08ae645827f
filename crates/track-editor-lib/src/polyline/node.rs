//! Node wrappers and public handles for the polyline lists

use super::Polyline;
use super::arena::Key;

/// Derive a segment value from the two vertices it connects
///
/// Called every time two vertices become adjacent: initial build, insertion
/// boundaries and the merge left behind by a removal. Implementations must be
/// pure, since the engine may call them more than once for the same pair.
pub trait SegmentValue<V> {
    fn between(start: &V, end: &V) -> Self;
}

/// Handle to a vertex node of one specific [`Polyline`]
///
/// Handles are plain copyable addresses. A handle whose node was removed, or
/// which belongs to another polyline, simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexRef {
    pub(crate) owner: u64,
    pub(crate) key: Key,
}

/// Handle to a segment node of one specific [`Polyline`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentRef {
    pub(crate) owner: u64,
    pub(crate) key: Key,
}

/// Vertex list node. `prev_seg` is `None` on the head, `next_seg` on the tail.
#[derive(Clone, Debug)]
pub(crate) struct VertexNode<V> {
    pub(crate) value: V,
    pub(crate) prev: Option<Key>,
    pub(crate) next: Option<Key>,
    pub(crate) prev_seg: Option<Key>,
    pub(crate) next_seg: Option<Key>,
}

impl<V> VertexNode<V> {
    pub(crate) fn new(value: V) -> Self {
        Self {
            value,
            prev: None,
            next: None,
            prev_seg: None,
            next_seg: None,
        }
    }
}

/// Segment list node
///
/// Segment order is never stored separately: the neighbours of a segment are
/// `prev_vert.prev_seg` and `next_vert.next_seg`, which keeps both lists in
/// lock-step whatever edit happened.
#[derive(Clone, Debug)]
pub(crate) struct SegmentNode<S> {
    pub(crate) value: S,
    pub(crate) prev_vert: Key,
    pub(crate) next_vert: Key,
}

/// Vertex and segment counts of a polyline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub vertices: usize,
    pub segments: usize,
}

/// Anything that can be spliced into a polyline
///
/// Removal operations hand back the detached run as a [`Polyline`], so a removed
/// chain can be fed straight back through [`Insertion::Chain`].
#[derive(Debug)]
pub enum Insertion<V, S> {
    Single(V),
    Many(Vec<V>),
    /// An existing chain, moved in without recomputing its inner segments
    Chain(Polyline<V, S>),
}

impl<V, S> Insertion<V, S>
where
    S: SegmentValue<V>,
{
    /// Normalize every input shape into one chain before any splicing happens
    pub(crate) fn into_polyline(self) -> Polyline<V, S> {
        match self {
            Insertion::Single(value) => Polyline::from_vertices([value]),
            Insertion::Many(values) => Polyline::from_vertices(values),
            Insertion::Chain(chain) => chain,
        }
    }
}

impl<V, S> From<Vec<V>> for Insertion<V, S> {
    fn from(values: Vec<V>) -> Self {
        Insertion::Many(values)
    }
}

impl<V, S> From<Polyline<V, S>> for Insertion<V, S> {
    fn from(chain: Polyline<V, S>) -> Self {
        Insertion::Chain(chain)
    }
}

impl<V, S> From<Option<Polyline<V, S>>> for Insertion<V, S> {
    fn from(chain: Option<Polyline<V, S>>) -> Self {
        Insertion::Chain(chain.unwrap_or_default())
    }
}
