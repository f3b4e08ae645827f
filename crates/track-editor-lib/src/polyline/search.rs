//! Predicate-driven node search

use super::{Polyline, SegmentRef, VertexRef};

/// Target a search predicate is evaluated against
///
/// One evaluator can serve several limit shapes: a single number (a speed
/// limit, a distance) or the asymmetric ascent/descent pair used for elevation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Threshold {
    Scalar(f64),
    Elevation {
        max_ascent_rate: f64,
        max_descent_rate: f64,
    },
}

impl Threshold {
    /// The scalar limit, if this is one
    #[inline]
    pub fn scalar(&self) -> Option<f64> {
        match *self {
            Threshold::Scalar(limit) => Some(limit),
            Threshold::Elevation { .. } => None,
        }
    }

    /// Whether a signed rate is outside the limit
    ///
    /// A scalar limit applies to the magnitude; an elevation limit applies the
    /// ascent bound to positive rates and the descent bound to negative ones.
    pub fn is_exceeded_by(&self, rate: f64) -> bool {
        match *self {
            Threshold::Scalar(limit) => rate.abs() > limit,
            Threshold::Elevation {
                max_ascent_rate,
                max_descent_rate,
            } => rate > max_ascent_rate || -rate > max_descent_rate,
        }
    }
}

/// A vertex seen together with its neighbourhood
pub struct VertexView<'a, V, S> {
    line: &'a Polyline<V, S>,
    node: VertexRef,
    value: &'a V,
}

impl<'a, V, S> VertexView<'a, V, S> {
    #[inline]
    pub fn node(&self) -> VertexRef {
        self.node
    }

    #[inline]
    pub fn value(&self) -> &'a V {
        self.value
    }

    pub fn prev_segment(&self) -> Option<&'a S> {
        let line = self.line;
        line.segment_before(self.node).and_then(|s| line.segment(s))
    }

    pub fn next_segment(&self) -> Option<&'a S> {
        let line = self.line;
        line.segment_after(self.node).and_then(|s| line.segment(s))
    }

    pub fn prev_vertex(&self) -> Option<&'a V> {
        let line = self.line;
        line.prev_vertex(self.node).and_then(|v| line.vertex(v))
    }

    pub fn next_vertex(&self) -> Option<&'a V> {
        let line = self.line;
        line.next_vertex(self.node).and_then(|v| line.vertex(v))
    }
}

/// A segment seen together with the vertices it connects
pub struct SegmentView<'a, V, S> {
    line: &'a Polyline<V, S>,
    node: SegmentRef,
    value: &'a S,
}

impl<'a, V, S> SegmentView<'a, V, S> {
    #[inline]
    pub fn node(&self) -> SegmentRef {
        self.node
    }

    #[inline]
    pub fn value(&self) -> &'a S {
        self.value
    }

    pub fn start(&self) -> Option<&'a V> {
        let line = self.line;
        line.segment_start(self.node).and_then(|v| line.vertex(v))
    }

    pub fn end(&self) -> Option<&'a V> {
        let line = self.line;
        line.segment_end(self.node).and_then(|v| line.vertex(v))
    }

    pub fn prev_segment(&self) -> Option<&'a S> {
        let line = self.line;
        line.prev_segment(self.node).and_then(|s| line.segment(s))
    }

    pub fn next_segment(&self) -> Option<&'a S> {
        let line = self.line;
        line.next_segment(self.node).and_then(|s| line.segment(s))
    }
}

impl<V, S> Polyline<V, S> {
    /// View of one vertex, if it is in this polyline
    pub fn vertex_view(&self, vertex: VertexRef) -> Option<VertexView<'_, V, S>> {
        Some(VertexView {
            line: self,
            node: vertex,
            value: self.vertex(vertex)?,
        })
    }

    /// View of one segment, if it is in this polyline
    pub fn segment_view(&self, segment: SegmentRef) -> Option<SegmentView<'_, V, S>> {
        Some(SegmentView {
            line: self,
            node: segment,
            value: self.segment(segment)?,
        })
    }

    /// Every vertex for which `predicate(target, view)` holds, in list order
    pub fn vertex_nodes_by<T>(
        &self,
        target: &T,
        predicate: impl Fn(&T, &VertexView<'_, V, S>) -> bool,
    ) -> Vec<VertexRef> {
        self.iter()
            .map(|(node, value)| VertexView {
                line: self,
                node,
                value,
            })
            .filter(|view| predicate(target, view))
            .map(|view| view.node)
            .collect()
    }

    /// Every segment for which `predicate(target, view)` holds, in list order
    pub fn segment_nodes_by<T>(
        &self,
        target: &T,
        predicate: impl Fn(&T, &SegmentView<'_, V, S>) -> bool,
    ) -> Vec<SegmentRef> {
        self.segment_iter()
            .map(|(node, value)| SegmentView {
                line: self,
                node,
                value,
            })
            .filter(|view| predicate(target, view))
            .map(|view| view.node)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{Step, line};
    use super::*;

    #[test]
    fn test_vertex_nodes_by_scalar() {
        let l = line(&[0.0, 5.0, 1.0, 7.0]);
        let found = l.vertex_nodes_by(&Threshold::Scalar(4.0), |target, view| {
            *view.value() > target.scalar().unwrap_or(f64::INFINITY)
        });
        let values: Vec<f64> = found.iter().map(|&v| *l.vertex(v).unwrap()).collect();
        assert_eq!(values, vec![5.0, 7.0]);
    }

    #[test]
    fn test_vertex_view_neighbourhood() {
        let l = line(&[0.0, 2.0, 3.0]);
        let head = l.vertex_view(l.first_vertex().unwrap()).unwrap();
        assert!(head.prev_segment().is_none());
        assert_eq!(head.next_segment(), Some(&Step(2.0)));
        assert_eq!(head.next_vertex(), Some(&2.0));

        let middle = l.vertex_view(l.vertex_at(1).unwrap()).unwrap();
        assert_eq!(middle.prev_vertex(), Some(&0.0));
        assert_eq!(middle.next_segment(), Some(&Step(1.0)));
    }

    #[test]
    fn test_segment_nodes_by_elevation_threshold() {
        let l = line(&[0.0, 10.0, 9.0, -5.0]);
        let limit = Threshold::Elevation {
            max_ascent_rate: 5.0,
            max_descent_rate: 10.0,
        };
        let found = l.segment_nodes_by(&limit, |target, view| target.is_exceeded_by(view.value().0));
        let steps: Vec<Step> = found.iter().map(|&s| *l.segment(s).unwrap()).collect();
        assert_eq!(steps, vec![Step(10.0), Step(-14.0)]);

        let view = l.segment_view(found[0]).unwrap();
        assert_eq!(view.start(), Some(&0.0));
        assert_eq!(view.end(), Some(&10.0));
        assert!(view.prev_segment().is_none());
    }

    #[test]
    fn test_search_on_empty() {
        let l = line(&[]);
        assert!(l.vertex_nodes_by(&(), |_, _| true).is_empty());
        assert!(l.segment_nodes_by(&(), |_, _| true).is_empty());
    }
}
