/// In-memory track model shared by the reader, the analyzer and the reports
use chrono::{DateTime, Utc};
use geo::{point, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, elevation: Option<f64>, timestamp: Option<DateTime<Utc>>) -> Self {
        GeoPoint {
            latitude,
            longitude,
            elevation,
            timestamp,
        }
    }

    pub fn to_point(&self) -> Point<f64> {
        point!(x: self.longitude, y: self.latitude)
    }

    /// A missing timestamp counts as invalid, same as one before 1970-01-01
    pub fn has_valid_time(&self) -> bool {
        matches!(self.timestamp, Some(ts) if ts.timestamp() >= 0)
    }
}

/// A point together with its position in the file-wide traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPointSample {
    pub point: GeoPoint,
    pub index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TrackSegment {
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    pub name: Option<String>,
    pub segments: Vec<TrackSegment>,
}

/// A parsed recording plus the metadata passed through to the reports
#[derive(Debug, Clone, Default)]
pub struct TrackFile {
    pub file_name: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub tracks: Vec<Track>,
}

impl TrackFile {
    pub fn point_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .map(|s| s.points.len())
            .sum()
    }
}
