//! Splitting a polyline into independent parts, and partial copies

use super::arena::Key;
use super::{Polyline, VertexRef};
use std::collections::HashSet;

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<V: Clone, S> Polyline<V, S> {
    /// Move everything after `marker` into a new polyline headed by a copy of `marker`
    ///
    /// The segment leaving `marker` moves with the suffix, so no segment is
    /// recomputed and `marker` becomes this polyline's tail.
    fn split_off(&mut self, marker: Key) -> Polyline<V, S> {
        let mut values = vec![self.vertices[marker].value.clone()];
        let mut segments = Vec::new();

        let node = &mut self.vertices[marker];
        node.next = None;
        let mut cursor = node.next_seg.take();
        while let Some(segment) = cursor.and_then(|s| self.segments.remove(s)) {
            segments.push(segment.value);
            let Some(vertex) = self.vertices.remove(segment.next_vert) else {
                break;
            };
            values.push(vertex.value);
            cursor = vertex.next_seg;
        }

        self.tail = Some(marker);
        self.version += 1;
        Polyline::from_parts(values, segments)
    }

    /// Cut at one vertex. See [`Polyline::split_by_many`].
    pub fn split_by_vertex(self, marker: VertexRef) -> Vec<Polyline<V, S>> {
        self.split_by_many(&[marker])
    }

    /// Cut into independent polylines at every marker
    ///
    /// Each marker vertex ends the part on its left and a copy of it starts the
    /// part on its right, so both sides stay separately editable. Markers are
    /// deduplicated and taken in list order; endpoints and handles that are not
    /// in this polyline are ignored. With no usable marker the result is this
    /// polyline alone.
    ///
    /// The first part keeps this polyline's identity, so handles to its vertices
    /// stay valid. Handles into later parts do not carry over.
    pub fn split_by_many(mut self, markers: &[VertexRef]) -> Vec<Polyline<V, S>> {
        let wanted: HashSet<Key> = markers
            .iter()
            .filter_map(|&marker| self.vertex_key(marker))
            .filter(|&key| Some(key) != self.head && Some(key) != self.tail)
            .collect();
        if wanted.is_empty() {
            return vec![self];
        }

        let cuts: Vec<Key> = std::iter::successors(self.head, |&key| self.vertices[key].next)
            .filter(|key| wanted.contains(key))
            .collect();

        // Cutting from the right leaves earlier markers in place
        let mut parts: Vec<Polyline<V, S>> = Vec::with_capacity(cuts.len() + 1);
        for &marker in cuts.iter().rev() {
            parts.push(self.split_off(marker));
        }
        parts.push(self);
        parts.reverse();

        tracing::debug!(parts = parts.len(), "split polyline");
        parts
    }
}

impl<V: Clone, S: Clone> Polyline<V, S> {
    /// Deep copy of `start..=end`
    ///
    /// A missing start means the head; an end that is missing or not reachable
    /// from the start means the tail. A start that is not in this polyline
    /// yields an empty copy.
    pub fn clone_range(&self, start: Option<VertexRef>, end: Option<VertexRef>) -> Polyline<V, S> {
        let first = match start {
            Some(vertex) => self.vertex_key(vertex),
            None => self.head,
        };
        let Some(first) = first else {
            return Polyline::new();
        };
        let last = end
            .and_then(|v| self.vertex_key(v))
            .filter(|&e| self.reaches(first, e));

        let mut values = Vec::new();
        let mut segments = Vec::new();
        let mut cursor = Some(first);
        while let Some(key) = cursor {
            let node = &self.vertices[key];
            values.push(node.value.clone());
            if Some(key) == last {
                break;
            }
            cursor = node.next;
            if let Some(segment) = node.next_seg {
                segments.push(self.segments[segment].value.clone());
            }
        }
        Polyline::from_parts(values, segments)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{Step, assert_consistent, line};

    #[test]
    fn test_split_by_vertex_clones_marker() {
        let l = line(&[0.0, 1.0, 2.0, 3.0]);
        let marker = l.vertex_at(1).unwrap();
        let mut parts = l.split_by_vertex(marker);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].vertices(), vec![0.0, 1.0]);
        assert_eq!(parts[1].vertices(), vec![1.0, 2.0, 3.0]);
        assert_eq!(parts[1].segments(), vec![Step(1.0), Step(1.0)]);
        for part in &parts {
            assert_consistent(part);
        }

        // The marker belongs to the left part only
        assert!(parts[0].contains(marker));
        assert!(parts[1].is_not_in_polyline(marker));
        let right_head = parts[1].first_vertex().unwrap();
        parts[1].update_vertex(right_head, |v| *v = 10.0);
        assert_eq!(parts[0].vertex(marker), Some(&1.0));
    }

    #[test]
    fn test_split_at_endpoint_is_identity() {
        let l = line(&[0.0, 1.0, 2.0]);
        let head = l.first_vertex().unwrap();
        let parts = l.split_by_vertex(head);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].vertices(), vec![0.0, 1.0, 2.0]);

        let l = line(&[0.0, 1.0, 2.0]);
        let tail = l.last_vertex().unwrap();
        assert_eq!(l.split_by_vertex(tail).len(), 1);
    }

    #[test]
    fn test_split_by_many_dedups_and_orders() {
        let l = line(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let a = l.vertex_at(2).unwrap();
        let b = l.vertex_at(4).unwrap();
        let head = l.first_vertex().unwrap();
        let parts = l.split_by_many(&[b, a, b, head]);

        let values: Vec<Vec<f64>> = parts.iter().map(|p| p.vertices()).collect();
        assert_eq!(
            values,
            vec![vec![0.0, 1.0, 2.0], vec![2.0, 3.0, 4.0], vec![4.0, 5.0]]
        );
        // Each right-hand part starts with its own copy of the marker
        let total: usize = parts.iter().map(|p| p.size().vertices).sum();
        assert_eq!(total, 6 + 2);
        let without_copies: usize = parts.iter().skip(1).map(|p| p.size().vertices - 1).sum();
        assert_eq!(parts[0].size().vertices + without_copies, 6);
        for part in &parts {
            assert_consistent(part);
        }
    }

    #[test]
    fn test_split_keeps_left_handles() {
        let l = line(&[0.0, 1.0, 2.0, 3.0]);
        let first = l.first_vertex().unwrap();
        let marker = l.vertex_at(2).unwrap();
        let mut parts = l.split_by_vertex(marker);
        let left = &mut parts[0];
        assert_eq!(left.last_vertex(), Some(marker));
        assert!(left.segment_after(marker).is_none());
        assert!(left.remove_at(first).is_some());
        assert_eq!(left.vertices(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_clone_range() {
        let l = line(&[0.0, 1.0, 2.0, 3.0]);
        let start = l.vertex_at(1).unwrap();
        let end = l.vertex_at(2).unwrap();
        let part = l.clone_range(Some(start), Some(end));
        assert_eq!(part.vertices(), vec![1.0, 2.0]);
        assert_eq!(part.segments(), vec![Step(1.0)]);
        assert_consistent(&part);

        let tail_part = l.clone_range(Some(end), None);
        assert_eq!(tail_part.vertices(), vec![2.0, 3.0]);
        assert_eq!(l.clone_range(None, None), l);
        assert_eq!(l.len(), 4);
    }
}
