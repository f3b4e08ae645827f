//! Population variance over a range or a sliding window

use super::{Edge, Extent, NodeRef, Property, Statistic, SumMean};
use crate::polyline::{Polyline, VertexRef};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Variance {
    Clean(f64),
    Dirty,
}

/// Variance and standard deviation of a polyline range
///
/// Seeded through the [`Statistic`] protocol it covers the tracked range.
/// Seeded with [`StandardDeviationStats::calculate`] it covers a fixed number
/// of nodes that [`StandardDeviationStats::slide_window`] moves one node at a
/// time without a rescan.
#[derive(Debug)]
pub struct StandardDeviationStats<V, S> {
    property: Property<V, S>,
    extent: Extent,
    window: VecDeque<(NodeRef, f64)>,
    window_size: Option<usize>,
    totals: SumMean,
    variance: Variance,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<V, S> StandardDeviationStats<V, S> {
    pub fn new(property: Property<V, S>) -> Self {
        Self {
            property,
            extent: Extent::default(),
            window: VecDeque::new(),
            window_size: None,
            totals: SumMean::default(),
            variance: Variance::Dirty,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.totals.count()
    }

    #[inline]
    pub fn mean(&self) -> Option<f64> {
        self.totals.mean()
    }

    /// Size of the current window, if seeded with `calculate`
    #[inline]
    pub fn window_size(&self) -> Option<usize> {
        self.window_size
    }

    /// Population variance, recomputed first if an edit left it stale
    pub fn variance(&mut self) -> Option<f64> {
        let mean = self.totals.mean()?;
        if let Variance::Clean(variance) = self.variance {
            return Some(variance);
        }
        let variance = self
            .window
            .iter()
            .map(|&(_, value)| (value - mean).powi(2))
            .sum::<f64>()
            / self.window.len() as f64;
        self.variance = Variance::Clean(variance);
        Some(variance)
    }

    pub fn standard_deviation(&mut self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Variance of the `window_size` nodes starting at `start`
    ///
    /// Returns `None` and keeps the previous state if the window is empty or
    /// runs past the tail, or if `start` is not in `line`.
    pub fn calculate(
        &mut self,
        line: &Polyline<V, S>,
        window_size: usize,
        start: VertexRef,
    ) -> Option<f64> {
        if window_size == 0 {
            return None;
        }

        let property = self.property;
        let mut window = VecDeque::with_capacity(window_size);
        let mut totals = SumMean::default();
        let mut cursor = property.node_from(line, start);
        while let Some(node) = cursor {
            if window.len() == window_size {
                break;
            }
            if let Some(value) = property.value_at(line, node).filter(|v| !v.is_nan()) {
                window.push_back((node, value));
                totals.add(value);
            }
            cursor = node.step(line, true);
        }
        if window.len() < window_size {
            return None;
        }

        self.window = window;
        self.totals = totals;
        self.window_size = Some(window_size);
        self.variance = Variance::Dirty;
        self.sync_extent(line);
        self.variance()
    }

    /// Move the window one node forward or backward
    ///
    /// The variance is updated from the leaving and entering values alone.
    /// Returns `None` without changing anything if there is no window or no
    /// node left to take in.
    pub fn slide_window(&mut self, line: &Polyline<V, S>, forward: bool) -> Option<f64> {
        self.window_size?;
        let variance = self.variance()?;
        let property = self.property;

        let edge = if forward {
            self.window.back()
        } else {
            self.window.front()
        };
        let mut cursor = edge.and_then(|&(node, _)| node.step(line, forward));
        let (node_in, value_in) = loop {
            let node = cursor?;
            match property.value_at(line, node) {
                Some(value) if !value.is_nan() => break (node, value),
                Some(_) => cursor = node.step(line, forward),
                None => return None,
            }
        };

        let n = self.window.len() as f64;
        let mean_out = self.totals.mean()?;
        let leaving = if forward {
            self.window.pop_front()
        } else {
            self.window.pop_back()
        };
        let Some((_, value_out)) = leaving else {
            return None;
        };
        self.totals.remove(value_out);
        self.totals.add(value_in);
        if forward {
            self.window.push_back((node_in, value_in));
        } else {
            self.window.push_front((node_in, value_in));
        }
        let mean_in = self.totals.mean()?;

        let variance = if n < 2.0 {
            0.0
        } else {
            let delta = (value_in - mean_in).powi(2) - (value_out - mean_out).powi(2);
            (variance + delta / (n - 1.0)).max(0.0)
        };
        self.variance = Variance::Clean(variance);
        self.sync_extent(line);
        Some(variance)
    }

    fn sync_extent(&mut self, line: &Polyline<V, S>) {
        self.extent = Extent {
            first: self.window.front().and_then(|&(n, _)| n.leading_vertex(line)),
            last: self.window.back().and_then(|&(n, _)| n.trailing_vertex(line)),
        };
    }
}

impl<V, S> Statistic<V, S> for StandardDeviationStats<V, S> {
    fn property(&self) -> Property<V, S> {
        self.property
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn extent_mut(&mut self) -> &mut Extent {
        &mut self.extent
    }

    fn add_node(&mut self, node: NodeRef, value: f64, edge: Edge) {
        match edge {
            Edge::Front => self.window.push_front((node, value)),
            Edge::Back => self.window.push_back((node, value)),
        }
        self.totals.add(value);
        self.variance = Variance::Dirty;
    }

    fn remove_node(&mut self, node: NodeRef, value: f64) -> bool {
        let leaving = if self.window.front().is_some_and(|&(n, _)| n == node) {
            self.window.pop_front()
        } else if self.window.back().is_some_and(|&(n, _)| n == node) {
            self.window.pop_back()
        } else {
            None
        };
        if leaving.is_none() {
            return false;
        }
        self.totals.remove(value);
        self.variance = Variance::Dirty;
        true
    }

    fn clear(&mut self) {
        self.window.clear();
        self.window_size = None;
        self.totals.clear();
        self.variance = Variance::Dirty;
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{line, step, value};
    use super::*;

    const DATA: [f64; 25] = [
        -7.0, 8.0, -9.0, -9.0, 6.0, 3.0, 2.0, -8.0, 0.0, 9.0, 1.0, 7.0, -6.0, -5.0, 9.0, 9.0,
        -1.0, -7.0, -9.0, -9.0, -6.0, 9.0, 0.0, 4.0, 6.0,
    ];

    #[test]
    fn test_full_range_population_variance() {
        let l = line(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        stats.of(&l);
        assert_eq!(stats.mean(), Some(5.0));
        assert!((stats.variance().unwrap() - 4.0).abs() < 1e-12);
        assert!((stats.standard_deviation().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(stats.window_size(), None);
    }

    #[test]
    fn test_window_and_slide() {
        let l = line(&DATA);
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        let variance = stats.calculate(&l, 20, l.vertex_at(2).unwrap()).unwrap();
        assert!((variance - 47.41).abs() < 1e-6);
        assert_eq!(stats.extent().first, l.vertex_at(2));
        assert_eq!(stats.extent().last, l.vertex_at(21));

        let slid = stats.slide_window(&l, true).unwrap();
        assert!((slid - 43.7875).abs() < 1e-6);
        assert_eq!(stats.extent().first, l.vertex_at(3));

        let mut fresh = StandardDeviationStats::new(Property::Vertex(value));
        let recomputed = fresh.calculate(&l, 20, l.vertex_at(3).unwrap()).unwrap();
        assert!((slid - recomputed).abs() < 1e-6);

        let back = stats.slide_window(&l, false).unwrap();
        assert!((back - 47.41).abs() < 1e-6);
    }

    #[test]
    fn test_slide_matches_recompute_along_the_line() {
        let l = line(&DATA);
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        stats.calculate(&l, 7, l.first_vertex().unwrap()).unwrap();
        for position in 1..=(DATA.len() - 7) {
            let slid = stats.slide_window(&l, true).unwrap();
            let mut fresh = StandardDeviationStats::new(Property::Vertex(value));
            let recomputed = fresh
                .calculate(&l, 7, l.vertex_at(position).unwrap())
                .unwrap();
            assert!((slid - recomputed).abs() < 1e-6, "position {position}");
        }
    }

    #[test]
    fn test_slide_past_end_keeps_state() {
        let l = line(&DATA);
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        let variance = stats.calculate(&l, 20, l.vertex_at(5).unwrap()).unwrap();
        assert_eq!(stats.slide_window(&l, true), None);
        assert_eq!(stats.variance(), Some(variance));
        assert_eq!(stats.extent().last, l.last_vertex());
    }

    #[test]
    fn test_slide_before_head_keeps_state() {
        let l = line(&DATA);
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        let variance = stats.calculate(&l, 20, l.first_vertex().unwrap()).unwrap();
        assert_eq!(stats.slide_window(&l, false), None);
        assert_eq!(stats.variance(), Some(variance));
        assert_eq!(stats.count(), 20);
        assert_eq!(stats.extent().first, l.first_vertex());
        assert_eq!(stats.extent().last, l.vertex_at(19));
    }

    #[test]
    fn test_invalid_window_keeps_previous_window() {
        let l = line(&[1.0, 2.0, 3.0]);
        let head = l.first_vertex().unwrap();
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        let variance = stats.calculate(&l, 3, head).unwrap();
        assert!((variance - 2.0 / 3.0).abs() < 1e-12);
        let extent = stats.extent();

        let other = line(&[1.0, 2.0]);
        assert_eq!(stats.calculate(&l, 10, head), None);
        assert_eq!(stats.calculate(&l, 0, head), None);
        assert_eq!(stats.calculate(&l, 2, other.first_vertex().unwrap()), None);

        assert_eq!(stats.variance(), Some(variance));
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.window_size(), Some(3));
        assert_eq!(stats.mean(), Some(2.0));
        assert_eq!(stats.extent(), extent);
    }

    #[test]
    fn test_invalid_windows() {
        let l = line(&DATA);
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        assert_eq!(stats.calculate(&l, 0, l.first_vertex().unwrap()), None);
        assert_eq!(stats.calculate(&l, 30, l.first_vertex().unwrap()), None);
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.slide_window(&l, true), None);

        let other = line(&[1.0, 2.0]);
        assert_eq!(stats.calculate(&l, 2, other.first_vertex().unwrap()), None);
    }

    #[test]
    fn test_segment_window() {
        let l = line(&[0.0, 1.0, 3.0, 6.0, 10.0]);
        let mut stats = StandardDeviationStats::new(Property::Segment(step));
        // Steps 1, 2, 3 then 4
        let variance = stats.calculate(&l, 3, l.first_vertex().unwrap()).unwrap();
        assert!((variance - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.extent().last, l.vertex_at(3));
        let slid = stats.slide_window(&l, true).unwrap();
        assert!((slid - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.mean(), Some(3.0));
    }

    #[test]
    fn test_remove_end_and_middle() {
        let l = line(&[1.0, 2.0, 3.0, 10.0]);
        let mut stats = StandardDeviationStats::new(Property::Vertex(value));
        stats.of(&l);
        assert!(stats.remove(&l, l.last_segment().unwrap()));
        assert!((stats.variance().unwrap() - 2.0 / 3.0).abs() < 1e-12);

        stats.of(&l);
        let middle = l.segment_after(l.vertex_at(1).unwrap()).unwrap();
        assert!(!stats.remove(&l, middle));
        assert_eq!(stats.variance(), None);
        stats.update(&l);
        assert_eq!(stats.count(), 4);
        assert_eq!(stats.mean(), Some(4.0));
    }
}
