/// GPX input: file discovery, parsing with the gpx crate, and conversion
/// into the in-memory track model.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gpx::{read, Gpx, Time};
use time::OffsetDateTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::ReadError;
use crate::track_model::{GeoPoint, Track, TrackFile, TrackSegment};

pub fn read_track_file(path: &Path) -> Result<TrackFile, ReadError> {
    let file = File::open(path)?;
    let file_name = path.display().to_string();
    parse_track_file(BufReader::new(file), &file_name)
}

pub fn parse_track_file<R: BufRead>(reader: R, file_name: &str) -> Result<TrackFile, ReadError> {
    let gpx = read(reader)?;
    let track_file = from_gpx(gpx, file_name);

    debug!(
        "{}: {} track(s), {} point(s)",
        file_name,
        track_file.tracks.len(),
        track_file.point_count()
    );
    Ok(track_file)
}

pub fn from_gpx(gpx: Gpx, file_name: &str) -> TrackFile {
    let metadata = gpx.metadata.unwrap_or_default();

    let tracks: Vec<Track> = gpx
        .tracks
        .into_iter()
        .map(|track| Track {
            name: track.name,
            segments: track
                .segments
                .into_iter()
                .map(|segment| TrackSegment {
                    points: segment
                        .points
                        .iter()
                        .map(|pt| {
                            GeoPoint::new(
                                pt.point().y(),
                                pt.point().x(),
                                pt.elevation,
                                pt.time.as_ref().and_then(to_utc),
                            )
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let name = metadata
        .name
        .or_else(|| tracks.iter().find_map(|t| t.name.clone()));

    TrackFile {
        file_name: file_name.to_string(),
        name,
        description: metadata.description,
        author: metadata.author.and_then(|a| a.name),
        tracks,
    }
}

/// Expands directories into the GPX files they contain. Explicit file paths pass through untouched.
pub fn collect_gpx_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ReadError> {
    let mut paths = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input) {
            let entry = entry?;
            if entry.file_type().is_file() && is_gpx(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }

        if found.is_empty() {
            warn!("no GPX files found under {}", input.display());
        }
        found.sort();
        paths.extend(found);
    }

    Ok(paths)
}

fn is_gpx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gpx"))
        .unwrap_or(false)
}

// Time::format renders six-digit years that chrono refuses, so go through the epoch instead
fn to_utc(time: &Time) -> Option<DateTime<Utc>> {
    let odt: OffsetDateTime = time.clone().into();
    DateTime::<Utc>::from_timestamp(odt.unix_timestamp(), odt.nanosecond())
}
