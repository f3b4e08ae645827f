//! Trimming junk recorded before and after the real activity
//!
//! GPS loggers left running while travelling to or from the start often leave
//! a few points separated from the track by a long jump. Every segment longer
//! than the trigger distance cuts the track into runs; the run with the most
//! points is the activity and everything around it is dropped.

use super::Track;
use crate::polyline::VertexRef;

/// Keep only the longest run of points between long jumps
///
/// Ties go to the earliest run. Returns the number of points removed.
pub fn trim_cruft(track: &mut Track, trigger_distance: f64) -> usize {
    #[cfg(feature = "profiling")]
    profiling::scope!("track::trim_cruft");

    let Some((first, last)) = longest_run(track, trigger_distance) else {
        return 0;
    };
    let before = track.len();
    track.line.trim_before(first);
    track.line.trim_after(last);

    let removed = before - track.len();
    if removed > 0 {
        tracing::debug!(
            removed,
            kept = track.len(),
            "trimmed cruft from {}",
            track.name.as_deref().unwrap_or("unnamed track")
        );
    }
    removed
}

fn longest_run(track: &Track, trigger_distance: f64) -> Option<(VertexRef, VertexRef)> {
    let line = &track.line;
    let mut run_start = line.first_vertex()?;
    let mut run_len = 1;
    let mut best = (run_start, line.last_vertex()?, 0);

    for (segment, value) in line.segment_iter() {
        if value.length <= trigger_distance {
            run_len += 1;
            continue;
        }
        let (Some(start), Some(end)) = (line.segment_start(segment), line.segment_end(segment))
        else {
            continue;
        };
        if run_len > best.2 {
            best = (run_start, start, run_len);
        }
        run_start = end;
        run_len = 1;
    }
    if run_len > best.2 {
        best = (run_start, line.last_vertex()?, run_len);
    }
    Some((best.0, best.1))
}
