//! Per-track summary built from the statistics engine

use super::units::Clock;
use super::{ActivityType, Track, TrackPoint, TrackSegment, Units};
use crate::polyline::{SegmentView, Threshold};
use crate::stats::{Filter, MaxMin, Median, Property, StandardDeviationStats, Statistic};
use std::fmt;

/// Speeds this close count as the same maximum or minimum, m/s
const SPEED_TIE_TOLERANCE: f64 = 0.05;

/// Slower segments are stops and do not count as moving, m/s
const MOVING_SPEED: f64 = 0.3;

/// Segment lengths this many standard deviations from the mean are outliers
const OUTLIER_SIGMA: f64 = 3.0;

/// Summary statistics of one track
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackReport {
    pub name: Option<String>,
    pub points: usize,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: Option<f64>,
    /// Fastest moving speed in m/s, and how many segments share it
    pub max_speed: Option<f64>,
    pub max_speed_segments: usize,
    /// Slowest moving speed in m/s, and how many segments share it
    pub min_speed: Option<f64>,
    pub min_speed_segments: usize,
    pub median_speed: Option<f64>,
    pub min_elevation: Option<f64>,
    pub max_elevation: Option<f64>,
    pub mean_segment_length: Option<f64>,
    pub segment_length_std_dev: Option<f64>,
    /// Segments whose length is far from the mean
    pub length_outliers: usize,
    pub activity: ActivityType,
}

fn is_moving(target: &Threshold, speed: f64) -> bool {
    target.scalar().is_some_and(|min| speed >= min)
}

/// Target for the outlier search: the mean and the allowed deviation
#[derive(Clone, Copy)]
struct Spread {
    mean: f64,
    limit: f64,
}

fn is_outlier(spread: &Spread, view: &SegmentView<'_, TrackPoint, TrackSegment>) -> bool {
    (view.value().length - spread.mean).abs() > spread.limit
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackReport {
    pub fn new(track: &Track) -> Self {
        let line = &track.line;

        let mut speeds = MaxMin::new(
            Property::Segment(TrackSegment::speed_value),
            SPEED_TIE_TOLERANCE,
        )
        .with_filter(Filter {
            target: Threshold::Scalar(MOVING_SPEED),
            is_considered: is_moving,
        });
        speeds.of(line);
        let (max_speed, min_speed) = (speeds.max(), speeds.min());

        let mut median = Median::new(Property::Segment(TrackSegment::speed_value));
        median.of(line);

        let mut elevations = MaxMin::new(Property::Vertex(TrackPoint::elevation_value), 0.0);
        elevations.of(line);

        let mut lengths = StandardDeviationStats::new(Property::Segment(TrackSegment::length_value));
        lengths.of(line);
        let mean_segment_length = lengths.mean();
        let segment_length_std_dev = lengths.standard_deviation();
        let length_outliers = match mean_segment_length.zip(segment_length_std_dev) {
            Some((mean, sd)) if sd > 0.0 => line
                .segment_nodes_by(
                    &Spread {
                        mean,
                        limit: OUTLIER_SIGMA * sd,
                    },
                    is_outlier,
                )
                .len(),
            _ => 0,
        };

        Self {
            name: track.name.clone(),
            points: track.len(),
            distance: track.distance(),
            duration: track.duration(),
            max_speed: (!max_speed.nodes.is_empty()).then_some(max_speed.value),
            max_speed_segments: max_speed.nodes.len(),
            min_speed: (!min_speed.nodes.is_empty()).then_some(min_speed.value),
            min_speed_segments: min_speed.nodes.len(),
            median_speed: median.median().map(|m| m.value),
            min_elevation: (!elevations.is_empty()).then(|| elevations.min().value),
            max_elevation: (!elevations.is_empty()).then(|| elevations.max().value),
            mean_segment_length,
            segment_length_std_dev,
            length_outliers,
            activity: ActivityType::of_track(track),
        }
    }

    /// Human-readable multi-line summary
    pub fn render(&self, units: Units) -> String {
        self.display(units).to_string()
    }

    /// [`Display`](fmt::Display) adapter for [`TrackReport::render`]
    pub fn display(&self, units: Units) -> ReportDisplay<'_> {
        ReportDisplay {
            report: self,
            units,
        }
    }
}

/// A [`TrackReport`] formatted in some [`Units`]
pub struct ReportDisplay<'a> {
    report: &'a TrackReport,
    units: Units,
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (report, units) = (self.report, self.units);
        let speed = |mps: f64| format!("{:.1} {}", units.speed(mps), units.speed_unit());

        writeln!(f, "{}", report.name.as_deref().unwrap_or("(unnamed)"))?;
        writeln!(f, "  points:        {}", report.points)?;
        writeln!(
            f,
            "  distance:      {:.2} {}",
            units.distance(report.distance),
            units.distance_unit()
        )?;
        if let Some(duration) = report.duration {
            writeln!(f, "  duration:      {}", Clock(duration))?;
        }
        if let Some(max) = report.max_speed {
            writeln!(
                f,
                "  max speed:     {} (x{})",
                speed(max),
                report.max_speed_segments
            )?;
        }
        if let Some(min) = report.min_speed {
            writeln!(
                f,
                "  min speed:     {} (x{})",
                speed(min),
                report.min_speed_segments
            )?;
        }
        if let Some(median) = report.median_speed {
            writeln!(f, "  median speed:  {}", speed(median))?;
        }
        if let Some((low, high)) = report.min_elevation.zip(report.max_elevation) {
            writeln!(
                f,
                "  elevation:     {:.0} .. {:.0} {}",
                units.length(low),
                units.length(high),
                units.length_unit()
            )?;
        }
        if let Some((mean, sd)) = report.mean_segment_length.zip(report.segment_length_std_dev) {
            writeln!(
                f,
                "  segment:       {:.1} ± {:.1} {} ({} outliers)",
                units.length(mean),
                units.length(sd),
                units.length_unit(),
                report.length_outliers
            )?;
        }
        writeln!(f, "  activity:      {}", report.activity)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::walk;
    use super::*;

    #[test]
    fn test_report_of_steady_walk() {
        let track = Track::new(Some("steady".to_string()), walk(11, 1.5));
        let report = TrackReport::new(&track);
        assert_eq!(report.points, 11);
        assert!((report.distance - 15.0).abs() < 1e-6);
        assert_eq!(report.duration, Some(10.0));
        assert!((report.max_speed.unwrap() - 1.5).abs() < 1e-6);
        assert_eq!(report.max_speed_segments, 10);
        assert_eq!(report.min_speed_segments, 10);
        assert!((report.median_speed.unwrap() - 1.5).abs() < 1e-6);
        assert_eq!(report.min_elevation, Some(100.0));
        assert_eq!(report.max_elevation, Some(100.0));
        assert_eq!(report.length_outliers, 0);
        assert_eq!(report.activity, ActivityType::Walking);
    }

    #[test]
    fn test_report_counts_outliers_and_stops() {
        let mut points = walk(30, 10.0);
        // One long step
        for p in points.iter_mut().skip(20) {
            p.position = geo::Point::new(p.position.x(), p.position.y() + 0.001);
        }
        // A stop: same place for a second
        points[10].position = points[9].position;
        let track = Track::new(None, points);
        let report = TrackReport::new(&track);
        assert_eq!(report.length_outliers, 1);
        assert!(report.min_speed.unwrap() >= MOVING_SPEED);
        assert!(report.max_speed.unwrap() > 100.0);
        assert_eq!(report.max_speed_segments, 1);
    }

    #[test]
    fn test_report_without_times() {
        let track = Track::new(None, [TrackPoint::new(0.0, 0.0), TrackPoint::new(0.0, 0.001)]);
        let report = TrackReport::new(&track);
        assert_eq!(report.duration, None);
        assert_eq!(report.max_speed, None);
        assert_eq!(report.median_speed, None);
        assert_eq!(report.min_elevation, None);
        assert_eq!(report.activity, ActivityType::Unknown);

        let text = report.render(Units::Imperial);
        assert!(text.contains("(unnamed)"));
        assert!(text.contains("mi"));
        assert!(!text.contains("max speed"));
    }

    #[test]
    fn test_render_metric() {
        let track = Track::new(Some("loop".to_string()), walk(11, 100.0));
        let text = TrackReport::new(&track).render(Units::Metric);
        assert!(text.starts_with("loop\n"));
        assert!(text.contains("1.00 km"));
        assert!(text.contains("0:00:10"));
        assert!(text.contains("360.0 km/h"));
    }

    #[test]
    fn test_display_writes_every_line() {
        let track = Track::new(Some("loop".to_string()), walk(11, 100.0));
        let report = TrackReport::new(&track);
        let mut text = String::new();
        std::fmt::Write::write_fmt(&mut text, format_args!("{}", report.display(Units::Metric)))
            .unwrap();
        assert_eq!(text, report.render(Units::Metric));
        assert!(text.lines().last().unwrap().contains("activity"));
        assert_eq!(text.lines().count(), 10);
    }
}
