/// Per-file summary rows written with the csv crate
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::report_aggregator::FileSummary;
use crate::track_analyzer::Extremum;

#[derive(Debug, Serialize)]
struct SummaryRow {
    filename: String,
    name: String,
    moving_time_s: Option<f64>,
    stopped_time_s: Option<f64>,
    total_time_s: Option<f64>,
    min_elevation_m: Option<f64>,
    max_elevation_m: Option<f64>,
    max_down_gradient_percent: f64,
    max_down_gradient_lat: Option<f64>,
    max_down_gradient_lon: Option<f64>,
    max_up_gradient_percent: f64,
    max_up_gradient_lat: Option<f64>,
    max_up_gradient_lon: Option<f64>,
    total_distance_km: f64,
    max_speed_kmh: f64,
    max_speed_lat: Option<f64>,
    max_speed_lon: Option<f64>,
    invalid_time: bool,
    stopped_distance_km: f64,
}

impl From<&FileSummary> for SummaryRow {
    fn from(s: &FileSummary) -> Self {
        let time = s.time_totals();
        let lat = |e: &Extremum| e.location.map(|l| l.point.latitude);
        let lon = |e: &Extremum| e.location.map(|l| l.point.longitude);

        SummaryRow {
            filename: s.file_name.clone(),
            name: s.name.clone().unwrap_or_default(),
            moving_time_s: time.map(|t| t.moving_s),
            stopped_time_s: time.map(|t| t.stopped_s),
            total_time_s: time.map(|t| t.total_s),
            min_elevation_m: s.elevation_bounds.map(|b| b.min_m),
            max_elevation_m: s.elevation_bounds.map(|b| b.max_m),
            max_down_gradient_percent: s.stats.max_down_slope.value,
            max_down_gradient_lat: lat(&s.stats.max_down_slope),
            max_down_gradient_lon: lon(&s.stats.max_down_slope),
            max_up_gradient_percent: s.stats.max_up_slope.value,
            max_up_gradient_lat: lat(&s.stats.max_up_slope),
            max_up_gradient_lon: lon(&s.stats.max_up_slope),
            total_distance_km: s.total_distance_m() / 1000.0,
            max_speed_kmh: s.stats.max_speed.value,
            max_speed_lat: lat(&s.stats.max_speed),
            max_speed_lon: lon(&s.stats.max_speed),
            invalid_time: s.stats.invalid_time,
            stopped_distance_km: s.moving.stopped_distance_m / 1000.0,
        }
    }
}

pub fn write_summaries(path: &Path, summaries: &[FileSummary]) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = Writer::from_path(path)?;

    for summary in summaries {
        wtr.serialize(SummaryRow::from(summary))?;
    }

    wtr.flush()?;
    Ok(())
}
