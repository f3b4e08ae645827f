//! Structural edits: insertion, removal, trimming and replacement
//!
//! Every edit goes through two primitives. [`Polyline::remove_run`] detaches an
//! inclusive vertex run and bridges the survivors with one recomputed segment;
//! [`Polyline::insert_between`] adopts a chain and hooks it between two adjacent
//! anchors. Replacement is the first followed by the second at the vacated spot.

use super::arena::Key;
use super::node::{Insertion, SegmentValue, VertexNode};
use super::{Polyline, VertexRef};

/// Outcome of a replace operation
#[derive(Debug)]
pub struct Replacement<V, S> {
    /// Detached run, `None` when nothing was removed
    pub removed: Option<Polyline<V, S>>,
    /// Number of vertices spliced in
    pub inserted: usize,
}

impl<V, S> Default for Replacement<V, S> {
    fn default() -> Self {
        Self {
            removed: None,
            inserted: 0,
        }
    }
}

/// Resolved edit location: the anchors around a (possibly empty) run
#[derive(Clone, Copy, Debug)]
struct Span {
    left: Option<Key>,
    right: Option<Key>,
    run: Option<(Key, Key)>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<V, S> Polyline<V, S>
where
    S: SegmentValue<V>,
{
    /// Span strictly between `start` and `end`; a missing bound means the list end
    fn exclusive_span(&self, start: Option<VertexRef>, end: Option<VertexRef>) -> Option<Span> {
        let left = start.and_then(|v| self.vertex_key(v));
        let right = end.and_then(|v| self.vertex_key(v));
        let first = match left {
            Some(l) => self.vertices[l].next,
            None => self.head,
        };
        if first == right {
            return Some(Span {
                left,
                right,
                run: None,
            });
        }

        let last = match right {
            Some(r) => self.vertices[r].prev,
            None => self.tail,
        };
        let (first, last) = (first?, last?);
        if !self.reaches(first, last) {
            return None;
        }
        Some(Span {
            left,
            right,
            run: Some((first, last)),
        })
    }

    /// Span from `start` to `end` inclusive
    ///
    /// A missing start means the head. An end that is missing, or not reachable
    /// walking forward from the start, means the tail.
    fn inclusive_span(&self, start: Option<VertexRef>, end: Option<VertexRef>) -> Option<Span> {
        let Some(head) = self.head else {
            return Some(Span {
                left: None,
                right: None,
                run: None,
            });
        };
        let first = start.and_then(|v| self.vertex_key(v)).unwrap_or(head);
        let last = match end.and_then(|v| self.vertex_key(v)) {
            Some(e) if self.reaches(first, e) => e,
            _ => self.tail?,
        };
        Some(Span {
            left: self.vertices[first].prev,
            right: self.vertices[last].next,
            run: Some((first, last)),
        })
    }

    /// Detach `first..=last` and bridge the survivors
    fn remove_run(&mut self, first: Key, last: Key) -> Polyline<V, S> {
        let left = self.vertices[first].prev;
        let right = self.vertices[last].next;

        // Boundary segments are dropped, the survivors get a fresh one
        if let Some(segment) = self.vertices[first].prev_seg.take() {
            self.segments.remove(segment);
        }
        if let Some(segment) = self.vertices[last].next_seg.take() {
            self.segments.remove(segment);
        }
        self.vertices[first].prev = None;
        self.vertices[last].next = None;
        if let Some(l) = left {
            let node = &mut self.vertices[l];
            node.next = None;
            node.next_seg = None;
        }
        if let Some(r) = right {
            let node = &mut self.vertices[r];
            node.prev = None;
            node.prev_seg = None;
        }

        let mut values = Vec::new();
        let mut inner = Vec::new();
        let mut cursor = Some(first);
        while let Some(key) = cursor {
            let Some(node) = self.vertices.remove(key) else {
                break;
            };
            if let Some(segment) = node.next_seg.and_then(|s| self.segments.remove(s)) {
                inner.push(segment.value);
            }
            values.push(node.value);
            cursor = node.next;
        }

        match (left, right) {
            (Some(l), Some(r)) => self.join(l, r),
            (Some(l), None) => self.tail = Some(l),
            (None, Some(r)) => self.head = Some(r),
            (None, None) => {
                self.head = None;
                self.tail = None;
            }
        }
        self.version += 1;

        tracing::trace!(removed = values.len(), "detached vertex run");
        Polyline::from_parts(values, inner)
    }

    /// Move every node of `donor` into this polyline's storage as a free run
    ///
    /// Values move as-is; segments inside the donor are not recomputed.
    fn adopt(&mut self, mut donor: Polyline<V, S>) -> Option<(Key, Key, usize)> {
        let (values, inner) = donor.take_parts();
        let mut values = values.into_iter();
        let first = self.vertices.insert(VertexNode::new(values.next()?));
        let mut last = first;
        let mut count = 1;
        for (value, segment) in values.zip(inner) {
            let key = self.vertices.insert(VertexNode::new(value));
            self.join_with(last, key, segment);
            last = key;
            count += 1;
        }
        Some((first, last, count))
    }

    /// Splice `donor` between two adjacent anchors
    ///
    /// `None` anchors stand for the list ends.
    ///
    /// # Panics
    ///
    /// Panics if the anchors are not adjacent ends of the list, which means the
    /// caller computed a location that cannot exist.
    fn insert_between(
        &mut self,
        left: Option<Key>,
        right: Option<Key>,
        donor: Polyline<V, S>,
    ) -> usize {
        let anchored = match (left, right) {
            (Some(l), Some(r)) => self.vertices[l].next == Some(r),
            (Some(l), None) => self.tail == Some(l),
            (None, Some(r)) => self.head == Some(r),
            (None, None) => self.head.is_none(),
        };
        if !anchored {
            panic!("insertion anchors {left:?}/{right:?} are not adjacent in this polyline");
        }

        let Some((first, last, count)) = self.adopt(donor) else {
            return 0;
        };

        if let Some(l) = left {
            if let Some(segment) = self.vertices[l].next_seg.take() {
                self.segments.remove(segment);
            }
            self.join(l, first);
        } else {
            self.head = Some(first);
        }
        if let Some(r) = right {
            self.vertices[r].prev_seg = None;
            self.join(last, r);
        } else {
            self.tail = Some(last);
        }

        self.version += 1;
        count
    }

    /// Remove the span's run then insert at the vacated position
    fn splice(&mut self, span: Span, insertion: Option<Polyline<V, S>>) -> Replacement<V, S> {
        let removed = span.run.map(|(first, last)| self.remove_run(first, last));
        let inserted = match insertion {
            Some(donor) => self.insert_between(span.left, span.right, donor),
            None => 0,
        };
        Replacement { removed, inserted }
    }

    /// Add vertices after the tail
    pub fn append(&mut self, insertion: impl Into<Insertion<V, S>>) -> usize {
        let donor = insertion.into().into_polyline();
        self.insert_between(self.tail, None, donor)
    }

    /// Add vertices before the head
    pub fn prepend(&mut self, insertion: impl Into<Insertion<V, S>>) -> usize {
        let donor = insertion.into().into_polyline();
        self.insert_between(None, self.head, donor)
    }

    /// Insert after `target`; returns 0 when `target` is not in this polyline
    pub fn insert_after(
        &mut self,
        target: VertexRef,
        insertion: impl Into<Insertion<V, S>>,
    ) -> usize {
        let Some(key) = self.vertex_key(target) else {
            return 0;
        };
        let right = self.vertices[key].next;
        self.insert_between(Some(key), right, insertion.into().into_polyline())
    }

    /// Insert before `target`; returns 0 when `target` is not in this polyline
    pub fn insert_before(
        &mut self,
        target: VertexRef,
        insertion: impl Into<Insertion<V, S>>,
    ) -> usize {
        let Some(key) = self.vertex_key(target) else {
            return 0;
        };
        let left = self.vertices[key].prev;
        self.insert_between(left, Some(key), insertion.into().into_polyline())
    }

    /// Remove one vertex
    ///
    /// An interior vertex leaves its neighbours joined by one segment recomputed
    /// from them; an endpoint is simply trimmed. Returns the detached vertex as a
    /// one-vertex chain.
    pub fn remove_at(&mut self, vertex: VertexRef) -> Option<Polyline<V, S>> {
        let key = self.vertex_key(vertex)?;
        Some(self.remove_run(key, key))
    }

    /// Remove the vertices strictly between `start` and `end`
    ///
    /// A missing or foreign bound means the corresponding list end. When both
    /// bounds are the same vertex this is [`Polyline::remove_at`].
    pub fn remove_between(
        &mut self,
        start: Option<VertexRef>,
        end: Option<VertexRef>,
    ) -> Option<Polyline<V, S>> {
        if let Some(same) = start.filter(|s| Some(*s) == end) {
            return self.remove_at(same);
        }
        let span = self.exclusive_span(start, end)?;
        self.splice(span, None).removed
    }

    /// Remove `start..=end`; a missing bound means the corresponding list end
    pub fn remove_from_to(
        &mut self,
        start: Option<VertexRef>,
        end: Option<VertexRef>,
    ) -> Option<Polyline<V, S>> {
        let span = self.inclusive_span(start, end)?;
        self.splice(span, None).removed
    }

    /// Drop everything before `vertex`, which becomes the head
    ///
    /// Returns the discarded prefix, or `None` if nothing was trimmed.
    pub fn trim_before(&mut self, vertex: VertexRef) -> Option<Polyline<V, S>> {
        let key = self.vertex_key(vertex)?;
        let last = self.vertices[key].prev?;
        let first = self.head?;
        Some(self.remove_run(first, last))
    }

    /// Drop everything after `vertex`, which becomes the tail
    pub fn trim_after(&mut self, vertex: VertexRef) -> Option<Polyline<V, S>> {
        let key = self.vertex_key(vertex)?;
        let first = self.vertices[key].next?;
        let last = self.tail?;
        Some(self.remove_run(first, last))
    }

    /// Replace one vertex
    pub fn replace_at(
        &mut self,
        vertex: VertexRef,
        insertion: impl Into<Insertion<V, S>>,
    ) -> Replacement<V, S> {
        let Some(key) = self.vertex_key(vertex) else {
            return Replacement::default();
        };
        let span = Span {
            left: self.vertices[key].prev,
            right: self.vertices[key].next,
            run: Some((key, key)),
        };
        self.splice(span, Some(insertion.into().into_polyline()))
    }

    /// Replace the vertices strictly between `start` and `end`
    ///
    /// With adjacent bounds nothing is removed and this is a pure insertion.
    pub fn replace_between(
        &mut self,
        start: Option<VertexRef>,
        end: Option<VertexRef>,
        insertion: impl Into<Insertion<V, S>>,
    ) -> Replacement<V, S> {
        if let Some(same) = start.filter(|s| Some(*s) == end) {
            return self.replace_at(same, insertion);
        }
        match self.exclusive_span(start, end) {
            Some(span) => self.splice(span, Some(insertion.into().into_polyline())),
            None => Replacement::default(),
        }
    }

    /// Replace `start..=end`
    pub fn replace_from_to(
        &mut self,
        start: Option<VertexRef>,
        end: Option<VertexRef>,
        insertion: impl Into<Insertion<V, S>>,
    ) -> Replacement<V, S> {
        match self.inclusive_span(start, end) {
            Some(span) => self.splice(span, Some(insertion.into().into_polyline())),
            None => Replacement::default(),
        }
    }
}
