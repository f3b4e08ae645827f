//! Splitting a track where recording was interrupted

use super::{Track, TrackSegment};
use crate::polyline::SegmentView;

/// What counts as an interruption between two consecutive points
#[derive(Clone, Copy, Debug)]
struct GapLimits {
    max_distance: f64,
    max_duration: f64,
}

impl GapLimits {
    fn is_gap(&self, segment: &TrackSegment) -> bool {
        segment.length > self.max_distance
            || segment.duration.is_some_and(|d| d > self.max_duration)
    }
}

fn is_gap(limits: &GapLimits, view: &SegmentView<'_, super::TrackPoint, TrackSegment>) -> bool {
    limits.is_gap(view.value())
}

/// Cut a track at every jump longer than `max_distance` meters or
/// `max_duration` seconds
///
/// The jump itself belongs to no part. Parts keep the track name, numbered
/// from the second one on.
pub fn split_on_gaps(mut track: Track, max_distance: f64, max_duration: f64) -> Vec<Track> {
    #[cfg(feature = "profiling")]
    profiling::scope!("track::split_on_gaps");
    let limits = GapLimits {
        max_distance,
        max_duration,
    };

    // A jump at either end only detaches one point
    while let Some(head) = track.line.first_vertex() {
        let leading = track.line.first_segment().and_then(|s| track.line.segment(s));
        if !leading.is_some_and(|s| limits.is_gap(s)) {
            break;
        }
        track.line.remove_at(head);
    }
    while let Some(tail) = track.line.last_vertex() {
        let trailing = track.line.last_segment().and_then(|s| track.line.segment(s));
        if !trailing.is_some_and(|s| limits.is_gap(s)) {
            break;
        }
        track.line.remove_at(tail);
    }

    let markers: Vec<_> = track
        .line
        .segment_nodes_by(&limits, is_gap)
        .into_iter()
        .filter_map(|segment| track.line.segment_start(segment))
        .collect();
    if markers.is_empty() {
        return vec![track];
    }

    let name = track.name.take();
    let parts = track.line.split_by_many(&markers);
    let count = parts.len();
    tracing::debug!(parts = count, "split {} on gaps", name.as_deref().unwrap_or("unnamed track"));

    parts
        .into_iter()
        .enumerate()
        .map(|(index, mut line)| {
            if index > 0 {
                // Head is the copy of the marker; the gap segment leaves with it
                if let Some(head) = line.first_vertex() {
                    line.remove_at(head);
                }
            }
            let name = match (&name, index) {
                (Some(name), 0) => Some(name.clone()),
                (Some(name), _) => Some(format!("{name} #{}", index + 1)),
                (None, _) => None,
            };
            Track { name, line }
        })
        .collect()
}
