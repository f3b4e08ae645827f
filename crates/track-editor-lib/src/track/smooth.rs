//! Removing GPS spikes
//!
//! A spike is a single bad fix: the segments on both sides of it break a
//! physical limit that the track otherwise respects. Each pass finds every
//! offending point and removes it; points next to a removal are left for the
//! next pass, when their segments have been recomputed.

use super::{Track, TrackPoint, TrackSegment};
use crate::polyline::{Threshold, VertexView};
use crate::utils;
use std::collections::HashSet;

type PointView<'a> = VertexView<'a, TrackPoint, TrackSegment>;

/// Remove points reached or left faster than `max_speed` m/s
///
/// Returns the number of points removed.
pub fn smooth_speed(track: &mut Track, max_speed: f64, max_passes: usize) -> usize {
    smooth_by(track, &Threshold::Scalar(max_speed), max_passes, speed_spike)
}

/// Remove points where the heading turns faster than `max_angular_speed` deg/s
pub fn smooth_angular_speed(track: &mut Track, max_angular_speed: f64, max_passes: usize) -> usize {
    smooth_by(
        track,
        &Threshold::Scalar(max_angular_speed),
        max_passes,
        sharp_turn,
    )
}

/// Remove points climbing faster than `max_ascent_rate` or dropping faster
/// than `max_descent_rate`, both in m/s
pub fn smooth_elevation_rate(
    track: &mut Track,
    max_ascent_rate: f64,
    max_descent_rate: f64,
    max_passes: usize,
) -> usize {
    let limit = Threshold::Elevation {
        max_ascent_rate,
        max_descent_rate,
    };
    smooth_by(track, &limit, max_passes, elevation_spike)
}

fn smooth_by(
    track: &mut Track,
    limit: &Threshold,
    max_passes: usize,
    offends: fn(&Threshold, &PointView<'_>) -> bool,
) -> usize {
    #[cfg(feature = "profiling")]
    profiling::scope!("track::smooth_by");

    let mut removed = 0;
    for pass in 0..max_passes {
        if track.len() <= 2 {
            break;
        }
        let found = track.line.vertex_nodes_by(limit, offends);
        if found.is_empty() {
            break;
        }

        let mut touched = HashSet::new();
        let mut removed_this_pass = 0;
        for vertex in found {
            if touched.contains(&vertex) || track.len() <= 2 {
                continue;
            }
            touched.extend(track.line.prev_vertex(vertex));
            touched.extend(track.line.next_vertex(vertex));
            if track.line.remove_at(vertex).is_some() {
                removed_this_pass += 1;
            }
        }
        tracing::debug!(pass, removed = removed_this_pass, ?limit, "smoothing pass");
        removed += removed_this_pass;
    }
    removed
}

/// Both flanking segments (or the only one, at an end) exceed the limit
fn spike(limit: &Threshold, view: &PointView<'_>, rate: fn(&TrackSegment) -> Option<f64>) -> bool {
    let exceeds = |segment: &TrackSegment| rate(segment).is_some_and(|r| limit.is_exceeded_by(r));
    match (view.prev_segment(), view.next_segment()) {
        (Some(before), Some(after)) => exceeds(before) && exceeds(after),
        (Some(only), None) | (None, Some(only)) => exceeds(only),
        (None, None) => false,
    }
}

fn speed_spike(limit: &Threshold, view: &PointView<'_>) -> bool {
    spike(limit, view, |s| s.speed)
}

fn elevation_spike(limit: &Threshold, view: &PointView<'_>) -> bool {
    spike(limit, view, |s| s.elevation_rate)
}

fn sharp_turn(limit: &Threshold, view: &PointView<'_>) -> bool {
    let (Some(before), Some(after)) = (view.prev_segment(), view.next_segment()) else {
        return false;
    };
    // Standing still has no heading
    if before.length == 0.0 || after.length == 0.0 {
        return false;
    }
    let Some(elapsed) = before
        .duration
        .zip(after.duration)
        .map(|(a, b)| (a + b) / 2.0)
        .filter(|t| *t > 0.0)
    else {
        return false;
    };
    limit.is_exceeded_by(utils::bearing_delta(before.bearing, after.bearing) / elapsed)
}
