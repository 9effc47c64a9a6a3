/// Moving/stopped split and elevation bounds for a whole file.
/// These totals come straight from the raw points; the windowed analyzer
/// never recomputes them.
use geo::HaversineDistance;

use crate::config::MovingConfig;
use crate::track_model::{GeoPoint, Track};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovingData {
    pub moving_time_s: f64,
    pub stopped_time_s: f64,
    pub moving_distance_m: f64,
    pub stopped_distance_m: f64,
}

impl MovingData {
    pub fn total_time_s(&self) -> f64 {
        self.moving_time_s + self.stopped_time_s
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationBounds {
    pub min_m: f64,
    pub max_m: f64,
}

pub fn compute_moving_data(tracks: &[Track], config: &MovingConfig) -> MovingData {
    let mut data = MovingData::default();

    for segment in tracks.iter().flat_map(|t| t.segments.iter()) {
        for pair in segment.points.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let dist = distance_3d(prev, cur);
            let seconds = match (prev.timestamp, cur.timestamp) {
                (Some(a), Some(b)) => b.signed_duration_since(a).num_milliseconds() as f64 / 1000.0,
                _ => 0.0,
            };

            let speed_kmh = if seconds > 0.0 {
                (dist / 1000.0) / (seconds / 3600.0)
            } else {
                0.0
            };

            if speed_kmh <= config.stopped_speed_threshold_kmh {
                data.stopped_time_s += seconds.max(0.0);
                data.stopped_distance_m += dist;
            } else {
                data.moving_time_s += seconds;
                data.moving_distance_m += dist;
            }
        }
    }

    data
}

/// Lowest and highest elevation over every point that carries one
pub fn elevation_bounds(tracks: &[Track]) -> Option<ElevationBounds> {
    tracks
        .iter()
        .flat_map(|t| t.segments.iter())
        .flat_map(|s| s.points.iter())
        .filter_map(|p| p.elevation)
        .fold(None, |acc: Option<ElevationBounds>, ele| match acc {
            None => Some(ElevationBounds { min_m: ele, max_m: ele }),
            Some(b) => Some(ElevationBounds {
                min_m: b.min_m.min(ele),
                max_m: b.max_m.max(ele),
            }),
        })
}

fn distance_3d(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let flat = a.to_point().haversine_distance(&b.to_point());
    match (a.elevation, b.elevation) {
        (Some(ea), Some(eb)) => (flat * flat + (eb - ea).powi(2)).sqrt(),
        _ => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_model::TrackSegment;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn pt(lat: f64, ele: Option<f64>, secs: i64) -> GeoPoint {
        GeoPoint::new(lat, 0.0, ele, Utc.timestamp_opt(1_000_000 + secs, 0).single())
    }

    fn tracks(points: Vec<GeoPoint>) -> Vec<Track> {
        vec![Track {
            name: None,
            segments: vec![TrackSegment { points }],
        }]
    }

    #[test]
    fn test_moving_and_stopped_split() {
        let t = tracks(vec![
            pt(0.0, None, 0),
            pt(0.001, None, 10),  // ~40 km/h
            pt(0.001, None, 70),  // standing still for a minute
            pt(0.002, None, 80),  // moving again
        ]);
        let data = compute_moving_data(&t, &MovingConfig::default());

        assert_eq!(data.moving_time_s, 20.0);
        assert_eq!(data.stopped_time_s, 60.0);
        assert_eq!(data.total_time_s(), 80.0);
        assert_eq!(data.stopped_distance_m, 0.0);
        assert_relative_eq!(data.moving_distance_m, 222.4, max_relative = 0.01);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let t = tracks(vec![pt(0.0, None, 0), pt(0.001, None, 10)]);
        let slow = MovingConfig { stopped_speed_threshold_kmh: 100.0 };
        let data = compute_moving_data(&t, &slow);

        assert_eq!(data.moving_time_s, 0.0);
        assert_eq!(data.stopped_time_s, 10.0);
    }

    #[test]
    fn test_missing_time_counts_as_stopped() {
        let t = tracks(vec![
            GeoPoint::new(0.0, 0.0, None, None),
            GeoPoint::new(0.001, 0.0, None, None),
        ]);
        let data = compute_moving_data(&t, &MovingConfig::default());

        assert_eq!(data.total_time_s(), 0.0);
        assert!(data.stopped_distance_m > 0.0);
    }

    #[test]
    fn test_distance_includes_climb() {
        let flat = distance_3d(&pt(0.0, Some(0.0), 0), &pt(0.001, Some(0.0), 10));
        let steep = distance_3d(&pt(0.0, Some(0.0), 0), &pt(0.001, Some(50.0), 10));
        assert!(steep > flat);
    }

    #[test]
    fn test_elevation_bounds() {
        let t = tracks(vec![pt(0.0, Some(12.0), 0), pt(0.0, None, 1), pt(0.0, Some(-3.5), 2), pt(0.0, Some(40.0), 3)]);
        let bounds = elevation_bounds(&t).unwrap();

        assert_eq!(bounds.min_m, -3.5);
        assert_eq!(bounds.max_m, 40.0);
        assert!(elevation_bounds(&tracks(vec![pt(0.0, None, 0)])).is_none());
    }
}
