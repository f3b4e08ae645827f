//! End-to-end cleanup scenarios, from GPX text to cleaned tracks

use track_editor_lib::track::{clean_track, smooth_elevation_rate, split_on_gaps, trim_cruft};
use track_editor_lib::utils::EARTH_RADIUS_M;
use track_editor_lib::{CleanConfig, Track, TrackReport};

/// 2024-05-01T08:00:00Z
const START: f64 = 1_714_550_400.0;

struct Fix {
    north: f64,
    elevation: f64,
    seconds: u32,
}

/// A ride heading north from the equator, one fix per second, 10 m apart
fn ride(count: usize) -> Vec<Fix> {
    (0..count)
        .map(|i| Fix {
            north: i as f64 * 10.0,
            elevation: 100.0,
            seconds: i as u32,
        })
        .collect()
}

fn to_gpx(name: &str, fixes: &[Fix]) -> String {
    let points: String = fixes
        .iter()
        .map(|fix| {
            let lat = (fix.north / EARTH_RADIUS_M).to_degrees();
            let s = fix.seconds;
            format!(
                "<trkpt lat=\"{lat:.10}\" lon=\"0.0\"><ele>{:.1}</ele>\
                 <time>2024-05-01T{:02}:{:02}:{:02}Z</time></trkpt>\n",
                fix.elevation,
                8 + s / 3600,
                s / 60 % 60,
                s % 60
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <gpx version=\"1.1\" creator=\"test\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n\
         <trk><name>{name}</name><trkseg>\n{points}</trkseg></trk></gpx>\n"
    )
}

fn parse(name: &str, fixes: &[Fix]) -> Track {
    let mut tracks = Track::parse_gpx(to_gpx(name, fixes).as_bytes()).unwrap();
    assert_eq!(tracks.len(), 1);
    tracks.remove(0)
}

#[test]
fn test_cruft_before_activity_is_trimmed() {
    let mut fixes = ride(9);
    for fix in fixes.iter_mut().skip(4) {
        fix.north += 1_000.0;
    }
    let mut track = parse("commute", &fixes);
    let first_kept = track.points()[4];

    assert_eq!(trim_cruft(&mut track, 500.0), 4);
    assert_eq!(track.len(), 5);
    assert_eq!(track.points()[0], first_kept);
    assert_eq!(track.line.size().segments, 4);
}

#[test]
fn test_pause_splits_track() {
    let mut fixes = ride(20);
    for fix in fixes.iter_mut().skip(12) {
        fix.seconds += 3_600;
    }
    let track = parse("ride", &fixes);

    let parts = split_on_gaps(track, 250.0, 600.0);
    let sizes: Vec<usize> = parts.iter().map(Track::len).collect();
    assert_eq!(sizes, vec![12, 8]);
    assert_eq!(parts[0].name.as_deref(), Some("ride"));
    assert_eq!(parts[1].name.as_deref(), Some("ride #2"));
    assert_eq!(parts[1].points()[0].timestamp, Some(START + 3_612.0));
    assert!(parts.iter().all(|p| p.line.size().segments == p.len() - 1));
}

#[test]
fn test_elevation_spike_is_smoothed() {
    let mut fixes = ride(30);
    fixes[15].elevation += 50.0;
    let mut track = parse("hill", &fixes);

    assert_eq!(smooth_elevation_rate(&mut track, 10.0, 15.0, 5), 1);
    assert_eq!(track.len(), 29);
    assert!(track.points().iter().all(|p| p.elevation == Some(100.0)));
}

#[test]
fn test_clean_then_report() {
    let mut fixes = ride(30);
    fixes[15].elevation += 50.0;
    let (parts, summary) = clean_track(parse("hill", &fixes), &CleanConfig::default()).unwrap();
    assert_eq!(summary.spikes_removed, 1);
    assert_eq!(parts.len(), 1);

    let report = TrackReport::new(&parts[0]);
    assert_eq!(report.points, 29);
    assert!((report.distance - 290.0).abs() < 0.01);
    assert_eq!(report.duration, Some(29.0));
    assert_eq!(report.min_elevation, Some(100.0));
    assert_eq!(report.max_elevation, Some(100.0));
}

#[test]
fn test_cleaned_file_round_trip() {
    let mut fixes = ride(12);
    for fix in fixes.iter_mut().skip(6) {
        fix.seconds += 3_600;
    }
    let (parts, _) = clean_track(parse("loop", &fixes), &CleanConfig::default()).unwrap();
    assert_eq!(parts.len(), 2);

    let path = std::env::temp_dir().join(format!("track-cleanup-{}.gpx", std::process::id()));
    Track::write_gpx(&path, &parts).unwrap();
    let reread = Track::read_gpx(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(reread.len(), 2);
    assert_eq!(reread[1].name.as_deref(), Some("loop #2"));
    for (original, copy) in parts.iter().zip(&reread) {
        assert_eq!(original.len(), copy.len());
        for (a, b) in original.points().iter().zip(copy.points()) {
            assert!((a.position.y() - b.position.y()).abs() < 1e-9);
            assert_eq!(a.elevation, b.elevation);
            assert_eq!(a.timestamp, b.timestamp);
        }
    }
}
