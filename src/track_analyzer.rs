/// Windowed Track Analyzer
///
/// Walks one file's points through a small trailing window and keeps the
/// running extrema (max speed, steepest climb, steepest descent) together
/// with the point where each was seen.
///
/// Elevation and speed are both smoothed over the window so a single noisy
/// sample cannot produce a spike on its own.
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::errors::AnalysisError;
use crate::geo_math::{distance, mean};
use crate::sliding_window::SlidingWindow;
use crate::track_model::{GeoPoint, TrackFile, TrackPointSample, TrackSegment};

pub const MAX_SPEED_SENTINEL: f64 = 0.0;
pub const MAX_UP_SLOPE_SENTINEL: f64 = 0.0;
pub const MAX_DOWN_SLOPE_SENTINEL: f64 = -100.0;

const MS_TO_KMH: f64 = 3.6;

/// A running extreme value. `location` stays `None` until a real sample replaces the sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub value: f64,
    pub location: Option<TrackPointSample>,
}

impl Extremum {
    fn sentinel(value: f64) -> Self {
        Extremum { value, location: None }
    }

    pub fn is_recorded(&self) -> bool {
        self.location.is_some()
    }

    fn offer_max(&mut self, value: f64, at: TrackPointSample) {
        if value > self.value {
            *self = Extremum { value, location: Some(at) };
        }
    }

    fn offer_min(&mut self, value: f64, at: TrackPointSample) {
        // The -100 sentinel sits below any slope that passes the filters,
        // so the first descent always registers.
        if !self.is_recorded() || value < self.value {
            *self = Extremum { value, location: Some(at) };
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    pub max_speed: Extremum,
    pub max_up_slope: Extremum,
    pub max_down_slope: Extremum,
    pub invalid_time: bool,
}

impl Default for RunningStats {
    fn default() -> Self {
        RunningStats {
            max_speed: Extremum::sentinel(MAX_SPEED_SENTINEL),
            max_up_slope: Extremum::sentinel(MAX_UP_SLOPE_SENTINEL),
            max_down_slope: Extremum::sentinel(MAX_DOWN_SLOPE_SENTINEL),
            invalid_time: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerState {
    Empty,
    Warming,
    Steady,
}

pub struct TrackAnalyzer {
    window: SlidingWindow<GeoPoint>,
    stats: RunningStats,
    next_index: usize,
    segment_start: bool,
}

impl TrackAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        Ok(TrackAnalyzer {
            window: SlidingWindow::new(config.window_capacity)?,
            stats: RunningStats::default(),
            next_index: 0,
            segment_start: true,
        })
    }

    pub fn state(&self) -> AnalyzerState {
        if self.window.is_empty() {
            AnalyzerState::Empty
        } else if self.window.is_full() {
            AnalyzerState::Steady
        } else {
            AnalyzerState::Warming
        }
    }

    /// Marks the next point as the opening point of a segment. The window
    /// carries over, so later points still see the previous segment's tail.
    pub fn begin_segment(&mut self) {
        self.segment_start = true;
    }

    /// Feeds one point. Steps that cannot be evaluated are skipped, never fatal.
    pub fn push(&mut self, point: GeoPoint) {
        let sample = TrackPointSample {
            point,
            index: self.next_index,
        };
        self.next_index += 1;

        if !point.has_valid_time() && !self.stats.invalid_time {
            debug!("point {} has no valid timestamp, time data marked invalid", sample.index);
            self.stats.invalid_time = true;
        }

        if self.segment_start || self.state() == AnalyzerState::Empty {
            self.segment_start = false;
            self.window.push(point);
            return;
        }

        if let (Ok(newest), Some(ts)) = (self.window.newest(), point.timestamp) {
            if newest.timestamp.map_or(false, |prev| ts <= prev) {
                debug!("point {} is not later than the one before it", sample.index);
            }
        }

        if let Err(e) = self.evaluate(sample) {
            debug!("point {}: slope skipped, {}", sample.index, e);
        }

        self.window.push(point);
    }

    pub fn analyze_segment(&mut self, segment: &TrackSegment) {
        self.begin_segment();

        if let Err(e) = check_segment(segment) {
            debug!("segment adds no extrema: {}", e);
        }

        for &point in &segment.points {
            self.push(point);
        }

        debug!(
            "segment of {} point(s) done, window holds {}/{}",
            segment.points.len(),
            self.window.len(),
            self.window.capacity()
        );
    }

    pub fn finish(self) -> RunningStats {
        self.stats
    }

    fn evaluate(&mut self, sample: TrackPointSample) -> Result<(), AnalysisError> {
        let last_point = *self.window.oldest()?;
        let snapshot = self.window.snapshot();

        match window_speed(&snapshot) {
            Ok(speed) => self.stats.max_speed.offer_max(speed, sample),
            Err(e) => debug!("point {}: speed skipped, {}", sample.index, e),
        }

        let dist = distance(
            sample.point.latitude,
            sample.point.longitude,
            last_point.latitude,
            last_point.longitude,
        );
        let elevation_diff = elevation_diff(&sample.point, &snapshot)?;

        if let Some(slope) = slope_percent(elevation_diff, dist) {
            if slope < 0.0 {
                self.stats.max_down_slope.offer_min(slope, sample);
            } else {
                self.stats.max_up_slope.offer_max(slope, sample);
            }
        }

        Ok(())
    }
}

/// A segment needs two points before its own points can yield speed or slope
pub fn check_segment(segment: &TrackSegment) -> Result<(), AnalysisError> {
    if segment.points.len() < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "segment with {} point(s) cannot yield speed or slope",
            segment.points.len()
        )));
    }
    Ok(())
}

/// Runs the analyzer over every segment of a file
pub fn analyze_file(file: &TrackFile, config: &AnalyzerConfig) -> Result<RunningStats, AnalysisError> {
    let mut analyzer = TrackAnalyzer::new(config)?;

    for track in &file.tracks {
        for segment in &track.segments {
            analyzer.analyze_segment(segment);
        }
    }

    let stats = analyzer.finish();
    debug!(
        "{}: max speed {:.2} km/h, up {:.2}%, down {:.2}%, invalid time {}",
        file.file_name,
        stats.max_speed.value,
        stats.max_up_slope.value,
        stats.max_down_slope.value,
        stats.invalid_time
    );
    Ok(stats)
}

/// Mean of the newest `len(window)` elevations (incoming point included)
/// minus the mean of the window itself.
pub fn elevation_diff(incoming: &GeoPoint, window: &[GeoPoint]) -> Result<f64, AnalysisError> {
    if window.is_empty() {
        return Err(AnalysisError::EmptyWindow);
    }

    let window_elevations = window
        .iter()
        .map(|p| p.elevation)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| AnalysisError::InsufficientData("window point without elevation".into()))?;
    let incoming_elevation = incoming
        .elevation
        .ok_or_else(|| AnalysisError::InsufficientData("incoming point without elevation".into()))?;

    let mut left = Vec::with_capacity(window_elevations.len());
    left.extend_from_slice(&window_elevations[1..]);
    left.push(incoming_elevation);

    Ok(mean(&left)? - mean(&window_elevations)?)
}

/// Mean speed in km/h over consecutive window pairs.
/// Stationary pairs and pairs without forward-moving time are left out.
pub fn window_speed(window: &[GeoPoint]) -> Result<f64, AnalysisError> {
    let speeds: Vec<f64> = window
        .windows(2)
        .filter_map(|pair| {
            let (older, newer) = (&pair[0], &pair[1]);
            let dist = distance(older.latitude, older.longitude, newer.latitude, newer.longitude);
            let elapsed = elapsed_seconds(older, newer)?;

            if dist <= 0.0 || elapsed <= 0.0 {
                return None;
            }
            Some(dist / elapsed * MS_TO_KMH)
        })
        .collect();

    if speeds.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "no usable point pair among {} window point(s)",
            window.len()
        )));
    }

    mean(&speeds)
}

/// Gradient in percent, or `None` when the step is flat, stationary or implausibly steep
pub fn slope_percent(elevation_diff: f64, distance: f64) -> Option<f64> {
    if distance > 0.0 && elevation_diff != 0.0 && elevation_diff.abs() < distance {
        Some(100.0 * elevation_diff / distance)
    } else {
        None
    }
}

fn elapsed_seconds(older: &GeoPoint, newer: &GeoPoint) -> Option<f64> {
    let (a, b) = (older.timestamp?, newer.timestamp?);
    let delta = b.signed_duration_since(a);
    Some(delta.num_milliseconds() as f64 / 1000.0)
}
