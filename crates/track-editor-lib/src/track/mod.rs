//! GPS tracks on top of the polyline engine
//!
//! A [`Track`] is a [`Polyline`] of [`TrackPoint`]s whose segments carry the
//! values derived from each pair of consecutive points: length, bearing,
//! duration, speed and elevation rate. The cleanup passes in the submodules
//! only use the public polyline operations.

mod activity;
mod clean;
mod cruft;
mod report;
mod smooth;
mod split;
mod units;

pub use activity::ActivityType;
pub use clean::{CleanConfig, CleanSummary, clean_track, clean_tracks};
pub use cruft::trim_cruft;
pub use report::{ReportDisplay, TrackReport};
pub use smooth::{smooth_angular_speed, smooth_elevation_rate, smooth_speed};
pub use split::split_on_gaps;
pub use units::Units;

use crate::polyline::{Polyline, SegmentValue};
use crate::{Result, TrackError, utils};
use geo::Point;
use rayon::prelude::*;
use std::io::{Read, Write};
use std::path::Path;

/// One GPS fix
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    /// Longitude in `x`, latitude in `y`, degrees
    pub position: Point<f64>,
    /// Meters above sea level
    pub elevation: Option<f64>,
    /// Unix seconds
    pub timestamp: Option<f64>,
}

impl TrackPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            position: Point::new(lon, lat),
            elevation: None,
            timestamp: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Read a GPX waypoint; `None` if its coordinates are not usable
    pub fn from_waypoint(waypoint: &gpx::Waypoint) -> Option<Self> {
        let position = waypoint.point();
        if !utils::is_valid_coordinate(&position) {
            tracing::warn!(
                "Skipping point with invalid coordinates: ({}, {})",
                position.y(),
                position.x()
            );
            return None;
        }
        Some(Self {
            position,
            elevation: waypoint.elevation.filter(|e| e.is_finite()),
            timestamp: waypoint.time.map(utils::gpx_time_to_seconds),
        })
    }

    pub fn to_waypoint(&self) -> gpx::Waypoint {
        let mut waypoint = gpx::Waypoint::new(self.position);
        waypoint.elevation = self.elevation;
        waypoint.time = self.timestamp.and_then(utils::seconds_to_gpx_time);
        waypoint
    }

    /// Elevation as a plain number, `NaN` when unknown
    pub fn elevation_value(&self) -> f64 {
        self.elevation.unwrap_or(f64::NAN)
    }
}

/// Values derived from two consecutive points
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackSegment {
    /// Great-circle length in meters
    pub length: f64,
    /// Initial bearing in degrees, `[0, 360)`
    pub bearing: f64,
    /// Seconds between the two timestamps
    pub duration: Option<f64>,
    /// Meters per second, if the duration is positive
    pub speed: Option<f64>,
    /// Elevation change in meters
    pub height: Option<f64>,
    /// Elevation change per second, if the duration is positive
    pub elevation_rate: Option<f64>,
}

impl SegmentValue<TrackPoint> for TrackSegment {
    fn between(start: &TrackPoint, end: &TrackPoint) -> Self {
        let duration = start.timestamp.zip(end.timestamp).map(|(a, b)| b - a);
        let moving = duration.filter(|d| *d > 0.0);
        let length = utils::haversine_distance(start.position, end.position);
        let height = start.elevation.zip(end.elevation).map(|(a, b)| b - a);
        Self {
            length,
            bearing: utils::initial_bearing(start.position, end.position),
            duration,
            speed: moving.map(|d| length / d),
            height,
            elevation_rate: height.zip(moving).map(|(h, d)| h / d),
        }
    }
}

impl TrackSegment {
    pub fn length_value(&self) -> f64 {
        self.length
    }

    /// Speed as a plain number, `NaN` when unknown
    pub fn speed_value(&self) -> f64 {
        self.speed.unwrap_or(f64::NAN)
    }

    /// Elevation rate as a plain number, `NaN` when unknown
    pub fn elevation_rate_value(&self) -> f64 {
        self.elevation_rate.unwrap_or(f64::NAN)
    }
}

/// A named sequence of GPS points
#[derive(Clone, Debug, Default)]
pub struct Track {
    pub name: Option<String>,
    pub line: Polyline<TrackPoint, TrackSegment>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    pub fn new(name: Option<String>, points: impl IntoIterator<Item = TrackPoint>) -> Self {
        Self {
            name,
            line: Polyline::from_vertices(points),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.line.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Copies of every point in order
    pub fn points(&self) -> Vec<TrackPoint> {
        self.line.vertices()
    }

    /// Total length in meters
    pub fn distance(&self) -> f64 {
        self.line.segment_iter().map(|(_, s)| s.length).sum()
    }

    /// Seconds between the first and last timestamped points
    pub fn duration(&self) -> Option<f64> {
        let mut stamps = self.line.iter().filter_map(|(_, p)| p.timestamp);
        let first = stamps.next()?;
        Some(stamps.last().map_or(0.0, |last| last - first))
    }

    /// Build from one GPX track segment, skipping unusable points
    pub fn from_gpx_segment(name: Option<String>, segment: &gpx::TrackSegment) -> Self {
        Self::new(
            name,
            segment.points.iter().filter_map(TrackPoint::from_waypoint),
        )
    }

    pub fn to_gpx_track(&self) -> gpx::Track {
        let mut segment = gpx::TrackSegment::default();
        segment.points = self.line.iter().map(|(_, p)| p.to_waypoint()).collect();
        let mut track = gpx::Track::default();
        track.name = self.name.clone();
        track.segments.push(segment);
        track
    }

    /// One track per non-empty GPX track segment
    pub fn from_gpx(gpx: &gpx::Gpx) -> Result<Vec<Track>> {
        let tracks: Vec<Track> = gpx
            .tracks
            .iter()
            .flat_map(|track| {
                track
                    .segments
                    .iter()
                    .map(|segment| Self::from_gpx_segment(track.name.clone(), segment))
            })
            .filter(|track| !track.is_empty())
            .collect();
        if tracks.is_empty() {
            return Err(TrackError::EmptyTrack);
        }
        Ok(tracks)
    }

    pub fn to_gpx(tracks: &[Track]) -> gpx::Gpx {
        gpx::Gpx {
            version: gpx::GpxVersion::Gpx11,
            creator: Some(env!("CARGO_PKG_NAME").to_string()),
            tracks: tracks.iter().map(Track::to_gpx_track).collect(),
            ..Default::default()
        }
    }

    pub fn parse_gpx<R: Read>(reader: R) -> Result<Vec<Track>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::parse_gpx");
        let gpx = gpx::read(reader)?;
        Self::from_gpx(&gpx)
    }

    pub fn emit_gpx<W: Write>(tracks: &[Track], writer: W) -> Result<()> {
        gpx::write(&Self::to_gpx(tracks), writer)?;
        Ok(())
    }

    pub fn read_gpx(path: impl AsRef<Path>) -> Result<Vec<Track>> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::parse_gpx(std::io::BufReader::new(file))
    }

    pub fn write_gpx(path: impl AsRef<Path>, tracks: &[Track]) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        Self::emit_gpx(tracks, std::io::BufWriter::new(file))
    }

    /// Load GPX files in parallel, failing on the first unreadable one
    pub fn load_files<P: AsRef<Path> + Send + Sync>(paths: &[P]) -> Result<Vec<Vec<Track>>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::load_files");
        paths.par_iter().map(|path| Self::read_gpx(path)).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Points heading north from the origin, `step` meters apart, one per second
    pub(crate) fn walk(count: usize, step: f64) -> Vec<TrackPoint> {
        let degrees = (step / utils::EARTH_RADIUS_M).to_degrees();
        (0..count)
            .map(|i| {
                TrackPoint::new(0.0, i as f64 * degrees)
                    .with_timestamp(i as f64)
                    .with_elevation(100.0)
            })
            .collect()
    }

    #[test]
    fn test_segment_derivation() {
        let a = TrackPoint::new(0.0, 0.0)
            .with_timestamp(0.0)
            .with_elevation(10.0);
        let b = TrackPoint::new(0.0, 0.001)
            .with_timestamp(10.0)
            .with_elevation(15.0);
        let s = TrackSegment::between(&a, &b);
        assert!((s.length - 111.19).abs() < 0.01);
        assert!(s.bearing.abs() < 1e-9);
        assert_eq!(s.duration, Some(10.0));
        assert!((s.speed.unwrap() - 11.119).abs() < 0.001);
        assert_eq!(s.height, Some(5.0));
        assert_eq!(s.elevation_rate, Some(0.5));
    }

    #[test]
    fn test_segment_without_time() {
        let a = TrackPoint::new(0.0, 0.0);
        let b = TrackPoint::new(0.001, 0.0).with_timestamp(3.0);
        let s = TrackSegment::between(&a, &b);
        assert_eq!(s.duration, None);
        assert_eq!(s.speed, None);
        assert!(s.speed_value().is_nan());
        assert!((s.bearing - 90.0).abs() < 1e-6);

        // Same timestamp: known duration, no speed
        let c = TrackPoint::new(0.0, 0.0).with_timestamp(3.0);
        let s = TrackSegment::between(&c, &b);
        assert_eq!(s.duration, Some(0.0));
        assert_eq!(s.speed, None);
    }

    #[test]
    fn test_track_totals() {
        let track = Track::new(Some("walk".to_string()), walk(11, 10.0));
        assert_eq!(track.len(), 11);
        assert!((track.distance() - 100.0).abs() < 1e-6);
        assert_eq!(track.duration(), Some(10.0));
        assert_eq!(Track::default().duration(), None);
    }

    #[test]
    fn test_gpx_round_trip() {
        let track = Track::new(Some("morning".to_string()), walk(5, 25.0));
        let mut buffer = Vec::new();
        Track::emit_gpx(std::slice::from_ref(&track), &mut buffer).unwrap();

        let parsed = Track::parse_gpx(buffer.as_slice()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name.as_deref(), Some("morning"));
        assert_eq!(parsed[0].len(), 5);
        for (a, b) in parsed[0].points().iter().zip(track.points()) {
            assert!((a.position.y() - b.position.y()).abs() < 1e-9);
            assert_eq!(a.elevation, b.elevation);
            assert!((a.timestamp.unwrap() - b.timestamp.unwrap()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_gpx_without_points_is_empty() {
        let gpx = Track::to_gpx(&[Track::default()]);
        assert!(matches!(Track::from_gpx(&gpx), Err(TrackError::EmptyTrack)));
    }

    #[test]
    fn test_invalid_waypoint_skipped() {
        let mut segment = gpx::TrackSegment::default();
        segment
            .points
            .push(gpx::Waypoint::new(Point::new(200.0, 0.0)));
        segment.points.push(gpx::Waypoint::new(Point::new(1.0, 1.0)));
        let track = Track::from_gpx_segment(None, &segment);
        assert_eq!(track.len(), 1);
    }
}
