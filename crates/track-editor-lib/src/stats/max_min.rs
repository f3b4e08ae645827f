//! Running maximum and minimum with tie tracking

use super::{Edge, Extent, NodeRef, Property, Statistic};
use crate::polyline::Threshold;
use smallvec::SmallVec;

/// One extreme and every node tied for it
#[derive(Clone, Debug, PartialEq)]
pub struct Extreme {
    pub value: f64,
    pub nodes: SmallVec<[NodeRef; 4]>,
}

impl Extreme {
    fn bootstrap(value: f64) -> Self {
        Self {
            value,
            nodes: SmallVec::new(),
        }
    }

    fn reset_to(&mut self, value: f64, node: NodeRef) {
        self.value = value;
        self.nodes.clear();
        self.nodes.push(node);
    }

    /// Caller-facing copy: an extreme with no nodes reads as 0
    fn exposed(&self) -> Extreme {
        if self.nodes.is_empty() {
            Extreme::bootstrap(0.0)
        } else {
            self.clone()
        }
    }
}

/// Restricts which values a [`MaxMin`] looks at
#[derive(Clone, Copy, Debug)]
pub struct Filter {
    pub target: Threshold,
    pub is_considered: fn(&Threshold, f64) -> bool,
}

/// Largest and smallest value over a polyline range
///
/// Values within `tolerance` of the current extreme count as ties: the node is
/// recorded without moving the extreme.
#[derive(Debug)]
pub struct MaxMin<V, S> {
    property: Property<V, S>,
    extent: Extent,
    tolerance: f64,
    filter: Option<Filter>,
    max: Extreme,
    min: Extreme,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<V, S> MaxMin<V, S> {
    pub fn new(property: Property<V, S>, tolerance: f64) -> Self {
        Self {
            property,
            extent: Extent::default(),
            tolerance: tolerance.abs(),
            filter: None,
            max: Extreme::bootstrap(f64::NEG_INFINITY),
            min: Extreme::bootstrap(f64::INFINITY),
        }
    }

    /// Only values accepted by `filter` are considered
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Current maximum; value 0 with no nodes while empty
    pub fn max(&self) -> Extreme {
        self.max.exposed()
    }

    /// Current minimum; value 0 with no nodes while empty
    pub fn min(&self) -> Extreme {
        self.min.exposed()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.nodes.is_empty() && self.min.nodes.is_empty()
    }

    fn considers(&self, value: f64) -> bool {
        self.filter
            .is_none_or(|filter| (filter.is_considered)(&filter.target, value))
    }
}

impl<V, S> Statistic<V, S> for MaxMin<V, S> {
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
        if !self.considers(value) {
            return;
        }
        let tolerance = self.tolerance;

        if value > self.max.value + tolerance {
            self.max.reset_to(value, node);
        } else if (value - self.max.value).abs() <= tolerance {
            self.max.nodes.push(node);
        }

        if value < self.min.value - tolerance {
            self.min.reset_to(value, node);
        } else if (value - self.min.value).abs() <= tolerance {
            self.min.nodes.push(node);
        }
    }

    /// Dropping a node that is not an extreme is free. Dropping the last node
    /// tied for an extreme leaves no way to know the runner-up.
    fn remove_node(&mut self, node: NodeRef, value: f64) -> bool {
        if !self.considers(value) {
            return true;
        }
        let mut intact = true;
        for extreme in [&mut self.max, &mut self.min] {
            if let Some(index) = extreme.nodes.iter().position(|&n| n == node) {
                extreme.nodes.remove(index);
                intact &= !extreme.nodes.is_empty();
            }
        }
        intact
    }

    fn clear(&mut self) {
        self.max = Extreme::bootstrap(f64::NEG_INFINITY);
        self.min = Extreme::bootstrap(f64::INFINITY);
    }
}
