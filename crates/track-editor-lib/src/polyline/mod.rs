//! Dual linked-list polyline
//!
//! A [`Polyline`] owns a vertex list and a segment list kept in lock-step: every
//! pair of adjacent vertices is bridged by exactly one segment whose value is
//! derived through [`SegmentValue`]. Vertices know their flanking segments and
//! segments know the two vertices they connect.
//!
//! Nodes live in generational arenas and are addressed through [`VertexRef`] and
//! [`SegmentRef`] handles. A handle is tagged with the polyline that issued it,
//! so "not in this polyline" (removed, detached, or foreign) is a cheap check
//! rather than a dangling pointer.
//!
//! Structural edits bump [`Polyline::version`]; in-place value edits do not.

mod arena;
mod edit;
mod node;
mod search;
mod split;

pub use edit::Replacement;
pub use node::{Insertion, SegmentRef, SegmentValue, Size, VertexRef};
pub use search::{SegmentView, Threshold, VertexView};

use arena::{Arena, Key};
use node::{SegmentNode, VertexNode};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of polyline identities used to tag handles
static NEXT_POLYLINE_ID: AtomicU64 = AtomicU64::new(1);

fn next_polyline_id() -> u64 {
    NEXT_POLYLINE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Ordered vertices plus the derived segments between them
pub struct Polyline<V, S> {
    id: u64,
    vertices: Arena<VertexNode<V>>,
    segments: Arena<SegmentNode<S>>,
    head: Option<Key>,
    tail: Option<Key>,
    version: u64,
}

impl<V, S> Default for Polyline<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> Polyline<V, S> {
    /// Create an empty polyline
    pub fn new() -> Self {
        Self {
            id: next_polyline_id(),
            vertices: Arena::default(),
            segments: Arena::default(),
            head: None,
            tail: None,
            version: 0,
        }
    }

    /// Build a chain from ready-made values without calling the segment hook
    ///
    /// `segments[i]` bridges `vertices[i]` and `vertices[i + 1]`.
    pub(crate) fn from_parts(
        vertices: impl IntoIterator<Item = V>,
        segments: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut line = Self::new();
        let mut vertices = vertices.into_iter();
        let Some(first) = vertices.next() else {
            return line;
        };

        let mut tail = line.vertices.insert(VertexNode::new(first));
        line.head = Some(tail);
        for (value, segment) in vertices.zip(segments) {
            let key = line.vertices.insert(VertexNode::new(value));
            line.join_with(tail, key, segment);
            tail = key;
        }
        line.tail = Some(tail);
        line
    }

    /// Drain every value in list order, leaving the polyline empty
    pub(crate) fn take_parts(&mut self) -> (Vec<V>, Vec<S>) {
        let mut vertices = Vec::with_capacity(self.vertices.len());
        let mut segments = Vec::with_capacity(self.segments.len());

        let mut cursor = self.head.take();
        self.tail = None;
        while let Some(key) = cursor {
            let Some(node) = self.vertices.remove(key) else {
                break;
            };
            if let Some(segment) = node.next_seg.and_then(|s| self.segments.remove(s)) {
                segments.push(segment.value);
            }
            vertices.push(node.value);
            cursor = node.next;
        }
        (vertices, segments)
    }

    /// Link two free-standing vertex nodes with a segment carrying `value`
    fn join_with(&mut self, left: Key, right: Key, value: S) -> Key {
        let segment = self.segments.insert(SegmentNode {
            value,
            prev_vert: left,
            next_vert: right,
        });
        let left_node = &mut self.vertices[left];
        left_node.next = Some(right);
        left_node.next_seg = Some(segment);
        let right_node = &mut self.vertices[right];
        right_node.prev = Some(left);
        right_node.prev_seg = Some(segment);
        segment
    }

    #[inline]
    fn vertex_ref(&self, key: Key) -> VertexRef {
        VertexRef { owner: self.id, key }
    }

    #[inline]
    fn segment_ref(&self, key: Key) -> SegmentRef {
        SegmentRef { owner: self.id, key }
    }

    /// Resolve a handle to a live key of this polyline
    #[inline]
    fn vertex_key(&self, vertex: VertexRef) -> Option<Key> {
        (vertex.owner == self.id && self.vertices.contains(vertex.key)).then_some(vertex.key)
    }

    #[inline]
    fn segment_key(&self, segment: SegmentRef) -> Option<Key> {
        (segment.owner == self.id && self.segments.contains(segment.key)).then_some(segment.key)
    }

    /// Whether walking forward from `from` reaches `to` (inclusive)
    fn reaches(&self, from: Key, to: Key) -> bool {
        let mut cursor = Some(from);
        while let Some(key) = cursor {
            if key == to {
                return true;
            }
            cursor = self.vertices[key].next;
        }
        false
    }

    /// Structural change counter
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Vertex and segment counts
    #[inline]
    pub fn size(&self) -> Size {
        Size {
            vertices: self.vertices.len(),
            segments: self.segments.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Whether the handle resolves to a live vertex of this polyline
    #[inline]
    pub fn contains(&self, vertex: VertexRef) -> bool {
        self.vertex_key(vertex).is_some()
    }

    #[inline]
    pub fn is_not_in_polyline(&self, vertex: VertexRef) -> bool {
        !self.contains(vertex)
    }

    #[inline]
    pub fn contains_segment(&self, segment: SegmentRef) -> bool {
        self.segment_key(segment).is_some()
    }

    pub fn first_vertex(&self) -> Option<VertexRef> {
        self.head.map(|key| self.vertex_ref(key))
    }

    pub fn last_vertex(&self) -> Option<VertexRef> {
        self.tail.map(|key| self.vertex_ref(key))
    }

    pub fn first_segment(&self) -> Option<SegmentRef> {
        let key = self.vertices[self.head?].next_seg?;
        Some(self.segment_ref(key))
    }

    pub fn last_segment(&self) -> Option<SegmentRef> {
        let key = self.vertices[self.tail?].prev_seg?;
        Some(self.segment_ref(key))
    }

    pub fn next_vertex(&self, vertex: VertexRef) -> Option<VertexRef> {
        let next = self.vertices[self.vertex_key(vertex)?].next?;
        Some(self.vertex_ref(next))
    }

    pub fn prev_vertex(&self, vertex: VertexRef) -> Option<VertexRef> {
        let prev = self.vertices[self.vertex_key(vertex)?].prev?;
        Some(self.vertex_ref(prev))
    }

    /// Segment ending at `vertex` (`None` for the head)
    pub fn segment_before(&self, vertex: VertexRef) -> Option<SegmentRef> {
        let segment = self.vertices[self.vertex_key(vertex)?].prev_seg?;
        Some(self.segment_ref(segment))
    }

    /// Segment starting at `vertex` (`None` for the tail)
    pub fn segment_after(&self, vertex: VertexRef) -> Option<SegmentRef> {
        let segment = self.vertices[self.vertex_key(vertex)?].next_seg?;
        Some(self.segment_ref(segment))
    }

    /// Leading vertex of a segment
    pub fn segment_start(&self, segment: SegmentRef) -> Option<VertexRef> {
        let vertex = self.segments[self.segment_key(segment)?].prev_vert;
        Some(self.vertex_ref(vertex))
    }

    /// Trailing vertex of a segment
    pub fn segment_end(&self, segment: SegmentRef) -> Option<VertexRef> {
        let vertex = self.segments[self.segment_key(segment)?].next_vert;
        Some(self.vertex_ref(vertex))
    }

    pub fn next_segment(&self, segment: SegmentRef) -> Option<SegmentRef> {
        let end = self.segments[self.segment_key(segment)?].next_vert;
        let next = self.vertices[end].next_seg?;
        Some(self.segment_ref(next))
    }

    pub fn prev_segment(&self, segment: SegmentRef) -> Option<SegmentRef> {
        let start = self.segments[self.segment_key(segment)?].prev_vert;
        let prev = self.vertices[start].prev_seg?;
        Some(self.segment_ref(prev))
    }

    #[inline]
    pub fn vertex(&self, vertex: VertexRef) -> Option<&V> {
        self.vertex_key(vertex).map(|key| &self.vertices[key].value)
    }

    #[inline]
    pub fn segment(&self, segment: SegmentRef) -> Option<&S> {
        self.segment_key(segment).map(|key| &self.segments[key].value)
    }

    /// Handle of the vertex at list position `index`
    pub fn vertex_at(&self, index: usize) -> Option<VertexRef> {
        self.vertex_refs_iter().nth(index)
    }

    /// List position of `vertex`
    pub fn position(&self, vertex: VertexRef) -> Option<usize> {
        self.vertex_key(vertex)?;
        self.vertex_refs_iter().position(|v| v == vertex)
    }

    fn vertex_refs_iter(&self) -> impl Iterator<Item = VertexRef> + '_ {
        std::iter::successors(self.head, move |&key| self.vertices[key].next)
            .map(move |key| self.vertex_ref(key))
    }

    /// Vertices in list order, with their handles
    pub fn iter(&self) -> impl Iterator<Item = (VertexRef, &V)> + '_ {
        std::iter::successors(self.head, move |&key| self.vertices[key].next)
            .map(move |key| (self.vertex_ref(key), &self.vertices[key].value))
    }

    /// Segments in list order, with their handles
    pub fn segment_iter(&self) -> impl Iterator<Item = (SegmentRef, &S)> + '_ {
        let first = self.head.and_then(|key| self.vertices[key].next_seg);
        std::iter::successors(first, move |&key| {
            let end = self.segments[key].next_vert;
            self.vertices[end].next_seg
        })
        .map(move |key| (self.segment_ref(key), &self.segments[key].value))
    }

    /// Materialized vertex handles in list order
    pub fn vertex_refs(&self) -> Vec<VertexRef> {
        self.vertex_refs_iter().collect()
    }

    /// Materialized segment handles in list order
    pub fn segment_refs(&self) -> Vec<SegmentRef> {
        self.segment_iter().map(|(segment, _)| segment).collect()
    }

    /// Consume the polyline, returning its vertex values in order
    pub fn into_vertices(mut self) -> Vec<V> {
        self.take_parts().0
    }
}

impl<V: Clone, S: Clone> Polyline<V, S> {
    /// Copies of every vertex value, independent of the polyline
    pub fn vertices(&self) -> Vec<V> {
        self.iter().map(|(_, value)| value.clone()).collect()
    }

    /// Copies of every segment value, independent of the polyline
    pub fn segments(&self) -> Vec<S> {
        self.segment_iter().map(|(_, value)| value.clone()).collect()
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<V, S> Polyline<V, S>
where
    S: SegmentValue<V>,
{
    /// Build a polyline, deriving every segment through the hook
    pub fn from_vertices(values: impl IntoIterator<Item = V>) -> Self {
        let mut line = Self::new();
        let mut tail = None;
        for value in values {
            let key = line.vertices.insert(VertexNode::new(value));
            match tail {
                Some(prev) => line.join(prev, key),
                None => line.head = Some(key),
            }
            tail = Some(key);
        }
        line.tail = tail;
        line
    }

    /// Link two free-standing vertex nodes, deriving the segment value
    fn join(&mut self, left: Key, right: Key) {
        let value = S::between(&self.vertices[left].value, &self.vertices[right].value);
        self.join_with(left, right, value);
    }

    /// Recompute one segment from its two vertices
    fn refresh_segment(&mut self, segment: Key) {
        let node = &self.segments[segment];
        let value = S::between(
            &self.vertices[node.prev_vert].value,
            &self.vertices[node.next_vert].value,
        );
        self.segments[segment].value = value;
    }

    /// Edit a vertex value in place
    ///
    /// Both flanking segments are recomputed. This is not a structural change, so
    /// `version` is left alone. Returns `false` if the vertex is not in this polyline.
    pub fn update_vertex(&mut self, vertex: VertexRef, edit: impl FnOnce(&mut V)) -> bool {
        let Some(key) = self.vertex_key(vertex) else {
            return false;
        };
        edit(&mut self.vertices[key].value);
        let node = &self.vertices[key];
        let flanking = [node.prev_seg, node.next_seg];
        for segment in flanking.into_iter().flatten() {
            self.refresh_segment(segment);
        }
        true
    }

    /// Recompute every segment value
    pub fn refresh_segments(&mut self) {
        let keys: Vec<Key> = self.segment_iter().map(|(s, _)| s.key).collect();
        for key in keys {
            self.refresh_segment(key);
        }
    }
}

impl<V, S> FromIterator<V> for Polyline<V, S>
where
    S: SegmentValue<V>,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_vertices(iter)
    }
}

/// Deep copy with a fresh identity: handles of the source do not resolve in the copy
impl<V: Clone, S: Clone> Clone for Polyline<V, S> {
    fn clone(&self) -> Self {
        let mut copy = Self::from_parts(
            self.iter().map(|(_, v)| v.clone()),
            self.segment_iter().map(|(_, s)| s.clone()),
        );
        copy.version = self.version;
        copy
    }
}

/// Value equality over both lists; node identity is ignored
impl<V: PartialEq, S: PartialEq> PartialEq for Polyline<V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self.iter().map(|(_, v)| v).eq(other.iter().map(|(_, v)| v))
            && self
                .segment_iter()
                .map(|(_, s)| s)
                .eq(other.segment_iter().map(|(_, s)| s))
    }
}

impl<V: std::fmt::Debug, S> std::fmt::Debug for Polyline<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polyline")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("vertices", &self.iter().map(|(_, v)| v).collect::<Vec<_>>())
            .finish()
    }
}
