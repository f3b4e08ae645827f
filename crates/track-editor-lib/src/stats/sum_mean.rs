//! Running count, sum and mean

use super::{Edge, Extent, NodeRef, Property, Statistic};

/// Count and running sum; the building block of the other statistics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SumMean {
    count: usize,
    sum: f64,
}

impl SumMean {
    #[inline]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Take one value back out; a no-op when already empty
    #[inline]
    pub fn remove(&mut self, value: f64) {
        if self.count == 0 {
            return;
        }
        self.count -= 1;
        self.sum = if self.count == 0 { 0.0 } else { self.sum - value };
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// `None` while empty
    #[inline]
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// [`SumMean`] kept over a polyline range
#[derive(Debug)]
pub struct SumMeanStats<V, S> {
    property: Property<V, S>,
    extent: Extent,
    totals: SumMean,
}

impl<V, S> SumMeanStats<V, S> {
    pub fn new(property: Property<V, S>) -> Self {
        Self {
            property,
            extent: Extent::default(),
            totals: SumMean::default(),
        }
    }

    #[inline]
    pub fn totals(&self) -> SumMean {
        self.totals
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.totals.count()
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.totals.sum()
    }

    #[inline]
    pub fn mean(&self) -> Option<f64> {
        self.totals.mean()
    }
}

impl<V, S> Statistic<V, S> for SumMeanStats<V, S> {
    fn property(&self) -> Property<V, S> {
        self.property
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn extent_mut(&mut self) -> &mut Extent {
        &mut self.extent
    }

    fn add_node(&mut self, _node: NodeRef, value: f64, _edge: Edge) {
        self.totals.add(value);
    }

    fn remove_node(&mut self, _node: NodeRef, value: f64) -> bool {
        self.totals.remove(value);
        true
    }

    fn clear(&mut self) {
        self.totals.clear();
    }
}
