//! Subcommand implementations

use crate::error::CliError;
use crate::settings::{CleanArgs, StatsArgs};
use std::path::{Path, PathBuf};
use track_editor_lib::track::{CleanSummary, clean_tracks};
use track_editor_lib::{Track, TrackReport};

/// Load every input, attaching the path to any failure
fn load(inputs: &[PathBuf]) -> Result<Vec<Vec<Track>>, CliError> {
    match Track::load_files(inputs) {
        Ok(loaded) => Ok(loaded),
        // Parallel loading only reports that something failed; find the culprit
        Err(_) => {
            let mut loaded = Vec::with_capacity(inputs.len());
            for path in inputs {
                let tracks = Track::read_gpx(path).map_err(|source| CliError::Input {
                    path: path.clone(),
                    source,
                })?;
                loaded.push(tracks);
            }
            Ok(loaded)
        }
    }
}

/// Where the cleaned version of `input` goes
fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());
    output_dir.join(format!("{stem}.gpx"))
}

pub fn clean(args: &CleanArgs) -> Result<(), CliError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("commands::clean");
    let config = args.clean_config()?;
    std::fs::create_dir_all(&args.output)?;

    for (input, tracks) in args.inputs.iter().zip(load(&args.inputs)?) {
        let results = clean_tracks(tracks, &config)?;
        let mut total = CleanSummary::default();
        let mut cleaned = Vec::new();
        for (parts, summary) in results {
            total.input_points += summary.input_points;
            total.cruft_removed += summary.cruft_removed;
            total.spikes_removed += summary.spikes_removed;
            total.parts += summary.parts;
            total.dropped_parts += summary.dropped_parts;
            cleaned.extend(parts);
        }

        if cleaned.is_empty() {
            tracing::warn!("Nothing left of {} after cleaning", input.display());
            continue;
        }
        let path = output_path(input, &args.output);
        Track::write_gpx(&path, &cleaned)?;
        let kept: usize = cleaned.iter().map(Track::len).sum();
        tracing::info!(
            kept,
            removed = total.input_points - kept.min(total.input_points),
            parts = total.parts,
            "{} -> {}",
            input.display(),
            path.display()
        );
    }
    Ok(())
}

pub fn stats(args: &StatsArgs) -> Result<(), CliError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("commands::stats");
    let reports: Vec<TrackReport> = load(&args.inputs)?
        .iter()
        .flatten()
        .map(TrackReport::new)
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let units = args.units();
        for report in &reports {
            print!("{}", report.display(units));
        }
    }
    Ok(())
}
