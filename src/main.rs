use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, ValueHint};
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod csv_export;
mod errors;
mod geo_math;
mod gpx_reader;
mod moving_data;
mod report_aggregator;
mod report_printer;
mod sliding_window;
mod track_analyzer;
mod track_model;

use config::{AnalyzerConfig, MovingConfig};
use errors::FileError;
use report_aggregator::{aggregate, summarize, FileSummary, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "Distance, speed and gradient statistics for GPX tracks", long_about = None)]
struct Cli {
    /// GPX files or directories to analyse
    #[arg(required = true, value_hint = ValueHint::AnyPath)]
    inputs: Vec<PathBuf>,

    /// Trailing points used to smooth speed and elevation
    #[arg(long, default_value_t = 3)]
    window: usize,

    /// Speed (km/h) at or below which time counts as stopped
    #[arg(long, default_value_t = 1.0)]
    stopped_speed: f64,

    /// Print every file's report before the combined one
    #[arg(long, action = ArgAction::SetTrue)]
    per_file: bool,

    /// Write per-file summaries to this CSV path
    #[arg(long, value_hint = ValueHint::FilePath)]
    csv: Option<PathBuf>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    jobs: Option<usize>,

    /// Debug logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(-1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer_config = AnalyzerConfig {
        window_capacity: cli.window,
    };
    let moving_config = MovingConfig {
        stopped_speed_threshold_kmh: cli.stopped_speed,
    };

    let paths = gpx_reader::collect_gpx_paths(&cli.inputs)?;
    if paths.is_empty() {
        return Err("no GPX files to analyse".into());
    }

    let jobs = cli.jobs.unwrap_or_else(num_cpus::get).max(1);
    info!("Analysing {} file(s) on {} thread(s)", paths.len(), jobs);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let summaries: Vec<FileSummary> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| analyse_path(path, &analyzer_config, &moving_config))
            .collect::<Result<Vec<_>, FileError>>()
    })?;

    if let Some(csv_path) = &cli.csv {
        csv_export::write_summaries(csv_path, &summaries)?;
        info!("Wrote summary CSV: {}", csv_path.display());
    }

    match aggregate(&summaries)? {
        Report::Single(summary) => println!("{}", report_printer::render_single(summary)),
        Report::Combined(combined) => {
            if cli.per_file {
                for summary in &summaries {
                    println!("{}\n", report_printer::render_single(summary));
                }
            }
            println!("{}", report_printer::render_combined(&combined));
        }
    }

    Ok(())
}

fn analyse_path(
    path: &Path,
    analyzer_config: &AnalyzerConfig,
    moving_config: &MovingConfig,
) -> Result<FileSummary, FileError> {
    let shown = path.display().to_string();

    let track_file = gpx_reader::read_track_file(path).map_err(|source| FileError::Read {
        path: shown.clone(),
        source,
    })?;
    let summary = summarize(&track_file, analyzer_config, moving_config).map_err(|source| {
        FileError::Analysis {
            path: shown.clone(),
            source,
        }
    })?;

    if summary.stats.invalid_time {
        warn!("{}: missing or pre-1970 timestamps, time totals ignored", shown);
    }
    info!(
        "Processed {} ({} point(s), {:.1} km)",
        shown,
        track_file.point_count(),
        summary.total_distance_m() / 1000.0
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CLIMB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="45.0000" lon="7.0000"><ele>500</ele><time>2022-05-01T08:00:00Z</time></trkpt>
    <trkpt lat="45.0010" lon="7.0000"><ele>506</ele><time>2022-05-01T08:00:30Z</time></trkpt>
    <trkpt lat="45.0020" lon="7.0000"><ele>512</ele><time>2022-05-01T08:01:00Z</time></trkpt>
    <trkpt lat="45.0030" lon="7.0000"><ele>518</ele><time>2022-05-01T08:01:30Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

    #[test]
    fn test_cli_parses_options() {
        let cli = Cli::try_parse_from([
            "gpx-stats", "--window", "5", "--per-file", "--csv", "out.csv", "a.gpx", "dir",
        ])
        .unwrap();

        assert_eq!(cli.window, 5);
        assert!(cli.per_file);
        assert_eq!(cli.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.stopped_speed, 1.0);
    }

    #[test]
    fn test_cli_requires_inputs() {
        assert!(Cli::try_parse_from(["gpx-stats"]).is_err());
    }

    #[test]
    fn test_analyse_path_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climb.gpx");
        fs::write(&path, CLIMB).unwrap();

        let summary =
            analyse_path(&path, &AnalyzerConfig::default(), &MovingConfig::default()).unwrap();

        assert!(!summary.stats.invalid_time);
        assert!(summary.stats.max_up_slope.value > 0.0);
        assert!(!summary.stats.max_down_slope.is_recorded());
        assert!(summary.stats.max_speed.value > 0.0);
        assert_eq!(summary.elevation_bounds.unwrap().max_m, 518.0);
        assert_eq!(summary.time_totals().unwrap().total_s, 90.0);
    }

    #[test]
    fn test_analyse_path_reports_unparsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gpx");
        fs::write(&path, "<gpx").unwrap();

        let err = analyse_path(&path, &AnalyzerConfig::default(), &MovingConfig::default()).unwrap_err();
        assert!(matches!(err, FileError::Read { .. }));
        assert!(err.to_string().contains("broken.gpx"));
    }

    #[test]
    fn test_run_writes_csv_for_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.gpx"), CLIMB).unwrap();
        fs::write(dir.path().join("two.gpx"), CLIMB).unwrap();
        let csv_path = dir.path().join("out.csv");

        let cli = Cli::try_parse_from([
            "gpx-stats".to_string(),
            "--jobs".to_string(),
            "2".to_string(),
            "--csv".to_string(),
            csv_path.display().to_string(),
            dir.path().display().to_string(),
        ])
        .unwrap();
        run(cli).unwrap();

        let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
        let files: Vec<String> = rdr.records().map(|r| r.unwrap()[0].to_string()).collect();

        // Parallel analysis keeps the sorted input order
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("one.gpx"));
        assert!(files[1].ends_with("two.gpx"));
    }
}
