use crate::error::CliError;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use track_editor_lib::{CleanConfig, Units};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Editor - Clean up and summarize GPX tracks
pub struct Settings {
    /// More log output (-v for debug, -vv for trace); RUST_LOG takes precedence
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Trim cruft, remove spikes and split on gaps; writes one GPX file per input
    Clean(CleanArgs),
    /// Print a summary of every track
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// GPX files to clean
    #[clap(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Directory the cleaned files are written to
    #[clap(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// JSON file with cleanup limits; flags below override it
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Jump that separates cruft from the activity, meters
    #[clap(long)]
    pub cruft_trigger_distance: Option<f64>,

    /// Jump that splits a track, meters
    #[clap(long)]
    pub split_gap_distance: Option<f64>,

    /// Pause that splits a track, seconds
    #[clap(long)]
    pub split_gap_duration: Option<f64>,

    /// Speed limit for spike removal, m/s
    #[clap(long)]
    pub max_speed: Option<f64>,

    /// Turn rate limit for spike removal, degrees per second
    #[clap(long)]
    pub max_angular_speed: Option<f64>,

    /// Climb rate limit for spike removal, m/s
    #[clap(long)]
    pub max_ascent_rate: Option<f64>,

    /// Drop rate limit for spike removal, m/s
    #[clap(long)]
    pub max_descent_rate: Option<f64>,

    /// Smoothing passes per smoother
    #[clap(long)]
    pub max_passes: Option<usize>,

    /// Drop parts with fewer points
    #[clap(long)]
    pub min_track_points: Option<usize>,
}

impl CleanArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn clean_config(&self) -> Result<CleanConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => CleanConfig::default(),
        };

        let overrides = [
            (&mut config.cruft_trigger_distance, self.cruft_trigger_distance),
            (&mut config.split_gap_distance, self.split_gap_distance),
            (&mut config.split_gap_duration, self.split_gap_duration),
            (&mut config.max_speed, self.max_speed),
            (&mut config.max_angular_speed, self.max_angular_speed),
            (&mut config.max_ascent_rate, self.max_ascent_rate),
            (&mut config.max_descent_rate, self.max_descent_rate),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(passes) = self.max_passes {
            config.max_passes = passes;
        }
        if let Some(points) = self.min_track_points {
            config.min_track_points = points;
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<CleanConfig, CliError> {
    let file = std::fs::File::open(path)?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// GPX files to summarize
    #[clap(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Print reports as JSON
    #[clap(long, default_value = "false")]
    pub json: bool,

    /// Use miles, feet and mph
    #[clap(long, default_value = "false")]
    pub imperial: bool,
}

impl StatsArgs {
    pub fn units(&self) -> Units {
        if self.imperial {
            Units::Imperial
        } else {
            Units::Metric
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_with_overrides() {
        let settings = Settings::try_parse_from([
            "track-editor",
            "-v",
            "clean",
            "a.gpx",
            "b.gpx",
            "--output",
            "out",
            "--max-speed",
            "30",
            "--max-passes",
            "2",
        ])
        .unwrap();
        assert_eq!(settings.verbose, 1);
        let Command::Clean(args) = settings.command else {
            panic!("expected clean");
        };
        assert_eq!(args.inputs.len(), 2);
        let config = args.clean_config().unwrap();
        assert_eq!(config.max_speed, 30.0);
        assert_eq!(config.max_passes, 2);
        assert_eq!(
            config.split_gap_distance,
            CleanConfig::default().split_gap_distance
        );
    }

    #[test]
    fn test_invalid_override_rejected() {
        let settings = Settings::try_parse_from([
            "track-editor",
            "clean",
            "a.gpx",
            "-o",
            "out",
            "--max-ascent-rate=-1",
        ])
        .unwrap();
        let Command::Clean(args) = settings.command else {
            panic!("expected clean");
        };
        assert!(matches!(args.clean_config(), Err(CliError::Track(_))));
    }

    #[test]
    fn test_config_file_with_partial_fields() {
        let path = std::env::temp_dir().join(format!("track-editor-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "max_speed": 12.5, "min_track_points": 10 }"#).unwrap();
        let settings = Settings::try_parse_from([
            "track-editor",
            "clean",
            "a.gpx",
            "-o",
            "out",
            "--config",
            path.to_str().unwrap(),
            "--min-track-points",
            "4",
        ])
        .unwrap();
        let Command::Clean(args) = settings.command else {
            panic!("expected clean");
        };
        let config = args.clean_config().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.max_speed, 12.5);
        assert_eq!(config.min_track_points, 4);
        assert_eq!(config.max_passes, CleanConfig::default().max_passes);
    }

    #[test]
    fn test_parse_stats() {
        let settings =
            Settings::try_parse_from(["track-editor", "stats", "a.gpx", "--imperial"]).unwrap();
        let Command::Stats(args) = settings.command else {
            panic!("expected stats");
        };
        assert!(!args.json);
        assert_eq!(args.units(), Units::Imperial);
        assert!(Settings::try_parse_from(["track-editor", "stats"]).is_err());
    }
}
