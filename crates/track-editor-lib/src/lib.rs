//! Track Editor Library - Editable Polylines and Incremental Statistics for GPS Tracks
//!
//! The core is a polyline that keeps two cross-linked chains: the vertices and
//! the segments derived from each adjacent vertex pair. Every structural edit
//! recomputes exactly the segments it creates, so derived data (length, speed,
//! bearing) is never stale. Statistics follow a range of that polyline and can
//! be fed incrementally as it is edited.
//!
//! # Architecture
//!
//! - **[`Polyline`]**: the dual linked list, with insert/remove/replace/split
//! - **[`stats`]**: max/min with ties, median, variance (range or sliding window), sum/mean
//! - **[`Track`]**: GPS points on a polyline, plus GPX input and output
//! - **[`track`]**: cruft trimming, gap splitting, smoothing, activity and reports
//!
//! # Performance Characteristics
//!
//! - **Edits**: O(k) for k vertices inserted or removed, no reindexing
//! - **Sliding variance**: O(1) per step
//! - **Median**: O(n log n) on first read after an edit, O(1) otherwise

pub mod polyline;
pub mod stats;
pub mod track;
pub mod utils;

// Public API exports
pub use polyline::{Insertion, Polyline, Replacement, SegmentRef, SegmentValue, Size, VertexRef};
pub use track::{CleanConfig, Track, TrackPoint, TrackReport, TrackSegment, Units};

/// Error types for the track library
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty track")]
    EmptyTrack,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;
