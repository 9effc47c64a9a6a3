/// Report Aggregator
///
/// Builds one summary per analysed file and folds several of them into a
/// combined summary. The fold only uses min, max and sum, with file-name
/// tie-breaks, so the result does not depend on the order files arrive in.
use tracing::debug;

use crate::config::{AnalyzerConfig, MovingConfig};
use crate::errors::AnalysisError;
use crate::moving_data::{compute_moving_data, elevation_bounds, ElevationBounds, MovingData};
use crate::track_analyzer::{
    analyze_file, RunningStats, MAX_DOWN_SLOPE_SENTINEL, MAX_SPEED_SENTINEL, MAX_UP_SLOPE_SENTINEL,
};
use crate::track_model::TrackFile;

#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub file_name: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub stats: RunningStats,
    pub moving: MovingData,
    pub elevation_bounds: Option<ElevationBounds>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeTotals {
    pub moving_s: f64,
    pub stopped_s: f64,
    pub total_s: f64,
}

impl FileSummary {
    pub fn new(
        file: &TrackFile,
        stats: RunningStats,
        moving: MovingData,
        elevation_bounds: Option<ElevationBounds>,
    ) -> Self {
        FileSummary {
            file_name: file.file_name.clone(),
            name: file.name.clone(),
            description: file.description.clone(),
            author: file.author.clone(),
            stats,
            moving,
            elevation_bounds,
        }
    }

    /// `None` when any timestamp in the file was missing or before the epoch
    pub fn time_totals(&self) -> Option<TimeTotals> {
        if self.stats.invalid_time {
            return None;
        }
        Some(TimeTotals {
            moving_s: self.moving.moving_time_s,
            stopped_s: self.moving.stopped_time_s,
            total_s: self.moving.total_time_s(),
        })
    }

    pub fn total_distance_m(&self) -> f64 {
        self.moving.moving_distance_m
    }
}

/// Analyzes a parsed file and attaches the moving data and elevation bounds
pub fn summarize(
    file: &TrackFile,
    analyzer_config: &AnalyzerConfig,
    moving_config: &MovingConfig,
) -> Result<FileSummary, AnalysisError> {
    let stats = analyze_file(file, analyzer_config)?;
    let moving = compute_moving_data(&file.tracks, moving_config);
    let bounds = elevation_bounds(&file.tracks);

    Ok(FileSummary::new(file, stats, moving, bounds))
}

/// An extreme value and the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced {
    pub value: f64,
    pub file: String,
}

impl Sourced {
    fn new(value: f64, file: &str) -> Self {
        Sourced {
            value,
            file: file.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSummary {
    pub file_count: usize,
    pub min_elevation: Option<Sourced>,
    pub max_elevation: Option<Sourced>,
    pub min_gradient: Option<Sourced>,
    pub max_gradient: Option<Sourced>,
    pub max_speed: Option<Sourced>,
    pub max_stretch: Option<Sourced>,
    pub total_distance_m: f64,
    pub moving_time_s: f64,
    pub stopped_time_s: f64,
    /// Files left out of the time sums, sorted
    pub ignored_time_files: Vec<String>,
}

impl CombinedSummary {
    pub fn from_file(summary: &FileSummary) -> Self {
        let file = summary.file_name.as_str();
        let recorded = |e: &crate::track_analyzer::Extremum| {
            e.is_recorded().then(|| Sourced::new(e.value, file))
        };
        let time = summary.time_totals();

        CombinedSummary {
            file_count: 1,
            min_elevation: summary.elevation_bounds.map(|b| Sourced::new(b.min_m, file)),
            max_elevation: summary.elevation_bounds.map(|b| Sourced::new(b.max_m, file)),
            min_gradient: recorded(&summary.stats.max_down_slope),
            max_gradient: recorded(&summary.stats.max_up_slope),
            max_speed: recorded(&summary.stats.max_speed),
            max_stretch: Some(Sourced::new(summary.total_distance_m(), file)),
            total_distance_m: summary.total_distance_m(),
            moving_time_s: time.map_or(0.0, |t| t.moving_s),
            stopped_time_s: time.map_or(0.0, |t| t.stopped_s),
            ignored_time_files: if time.is_none() {
                vec![summary.file_name.clone()]
            } else {
                Vec::new()
            },
        }
    }

    pub fn merge(self, other: CombinedSummary) -> Self {
        let mut ignored = self.ignored_time_files;
        ignored.extend(other.ignored_time_files);
        ignored.sort();

        CombinedSummary {
            file_count: self.file_count + other.file_count,
            min_elevation: pick_min(self.min_elevation, other.min_elevation),
            max_elevation: pick_max(self.max_elevation, other.max_elevation),
            min_gradient: pick_min(self.min_gradient, other.min_gradient),
            max_gradient: pick_max(self.max_gradient, other.max_gradient),
            max_speed: pick_max(self.max_speed, other.max_speed),
            max_stretch: pick_max(self.max_stretch, other.max_stretch),
            total_distance_m: self.total_distance_m + other.total_distance_m,
            moving_time_s: self.moving_time_s + other.moving_time_s,
            stopped_time_s: self.stopped_time_s + other.stopped_time_s,
            ignored_time_files: ignored,
        }
    }

    pub fn fold<'a, I>(summaries: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a FileSummary>,
    {
        summaries
            .into_iter()
            .map(CombinedSummary::from_file)
            .reduce(CombinedSummary::merge)
    }

    pub fn total_time_s(&self) -> f64 {
        self.moving_time_s + self.stopped_time_s
    }

    pub fn min_gradient_value(&self) -> f64 {
        self.min_gradient.as_ref().map_or(MAX_DOWN_SLOPE_SENTINEL, |s| s.value)
    }

    pub fn max_gradient_value(&self) -> f64 {
        self.max_gradient.as_ref().map_or(MAX_UP_SLOPE_SENTINEL, |s| s.value)
    }

    pub fn max_speed_value(&self) -> f64 {
        self.max_speed.as_ref().map_or(MAX_SPEED_SENTINEL, |s| s.value)
    }
}

// Ties go to the smaller file name so merge stays commutative
fn pick_max(a: Option<Sourced>, b: Option<Sourced>) -> Option<Sourced> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => {
            if a.value > b.value || (a.value == b.value && a.file <= b.file) {
                Some(a)
            } else {
                Some(b)
            }
        }
    }
}

fn pick_min(a: Option<Sourced>, b: Option<Sourced>) -> Option<Sourced> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(a), Some(b)) => {
            if a.value < b.value || (a.value == b.value && a.file <= b.file) {
                Some(a)
            } else {
                Some(b)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report<'a> {
    Single(&'a FileSummary),
    Combined(CombinedSummary),
}

/// One file passes straight through; several are folded together
pub fn aggregate(summaries: &[FileSummary]) -> Result<Report<'_>, AnalysisError> {
    match summaries {
        [] => Err(AnalysisError::InvalidInput("no file summaries to report".into())),
        [single] => Ok(Report::Single(single)),
        many => {
            debug!("combining {} file summaries", many.len());
            CombinedSummary::fold(many)
                .map(Report::Combined)
                .ok_or_else(|| AnalysisError::InsufficientData("empty fold".into()))
        }
    }
}
