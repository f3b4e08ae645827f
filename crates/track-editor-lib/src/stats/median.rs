//! Median, sorted lazily on read

use super::{Edge, Extent, NodeRef, Property, Statistic};
use smallvec::SmallVec;
use std::collections::HashMap;

/// The median and the node(s) it was taken from
///
/// An even count averages the two middle values and lists both nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct MedianValue {
    pub value: f64,
    pub nodes: SmallVec<[NodeRef; 2]>,
}

#[derive(Debug)]
enum Order {
    Sorted(Vec<(f64, NodeRef)>),
    Dirty,
}

/// Median over a polyline range
#[derive(Debug)]
pub struct Median<V, S> {
    property: Property<V, S>,
    extent: Extent,
    values: HashMap<NodeRef, f64>,
    order: Order,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<V, S> Median<V, S> {
    pub fn new(property: Property<V, S>) -> Self {
        Self {
            property,
            extent: Extent::default(),
            values: HashMap::new(),
            order: Order::Dirty,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Current median, sorting first if anything changed since the last read
    pub fn median(&mut self) -> Option<MedianValue> {
        let sorted = self.sorted();
        let count = sorted.len();
        if count == 0 {
            return None;
        }
        let (value, node) = sorted[count / 2];
        if count % 2 == 1 {
            return Some(MedianValue {
                value,
                nodes: SmallVec::from_slice(&[node]),
            });
        }
        let (below, below_node) = sorted[count / 2 - 1];
        Some(MedianValue {
            value: (below + value) / 2.0,
            nodes: SmallVec::from_slice(&[below_node, node]),
        })
    }

    fn sorted(&mut self) -> &[(f64, NodeRef)] {
        if let Order::Dirty = self.order {
            let mut sorted: Vec<(f64, NodeRef)> =
                self.values.iter().map(|(&node, &value)| (value, node)).collect();
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            self.order = Order::Sorted(sorted);
        }
        match &self.order {
            Order::Sorted(sorted) => sorted,
            Order::Dirty => &[],
        }
    }
}

impl<V, S> Statistic<V, S> for Median<V, S> {
    fn property(&self) -> Property<V, S> {
        self.property
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn extent_mut(&mut self) -> &mut Extent {
        &mut self.extent
    }

    fn add_node(&mut self, node: NodeRef, value: f64, _edge: Edge) {
        self.values.insert(node, value);
        self.order = Order::Dirty;
    }

    fn remove_node(&mut self, node: NodeRef, _value: f64) -> bool {
        if self.values.remove(&node).is_some() {
            self.order = Order::Dirty;
        }
        true
    }

    fn clear(&mut self) {
        self.values.clear();
        self.order = Order::Dirty;
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{line, step, value};
    use super::*;

    #[test]
    fn test_odd_and_even_counts() {
        let l = line(&[5.0, 1.0, 3.0]);
        let mut median = Median::new(Property::Vertex(value));
        median.of(&l);
        let result = median.median().unwrap();
        assert_eq!(result.value, 3.0);
        assert_eq!(result.nodes.as_slice(), &[NodeRef::Vertex(l.last_vertex().unwrap())]);

        let l = line(&[5.0, 1.0, 3.0, 8.0]);
        median.of(&l);
        let result = median.median().unwrap();
        assert_eq!(result.value, 4.0);
        assert_eq!(result.nodes.len(), 2);
        assert!(result.nodes.contains(&NodeRef::Vertex(l.first_vertex().unwrap())));
    }

    #[test]
    fn test_empty_has_no_median() {
        let l = line(&[]);
        let mut median = Median::new(Property::Vertex(value));
        median.of(&l);
        assert_eq!(median.median(), None);
    }

    #[test]
    fn test_incremental_edits_resort() {
        let l = line(&[0.0, 10.0, 11.0, 30.0]);
        let mut median = Median::new(Property::Segment(step));
        median.of(&l);
        assert_eq!(median.median().unwrap().value, 10.0);

        assert!(median.remove(&l, l.last_segment().unwrap()));
        assert_eq!(median.count(), 2);
        assert_eq!(median.median().unwrap().value, 5.5);
        assert_eq!(median.extent().last, l.vertex_at(2));
    }
}
