/// Human-readable single-file and combined reports
use crate::report_aggregator::{CombinedSummary, FileSummary, Sourced};
use crate::track_analyzer::Extremum;

const SECONDS_PER_DAY: u64 = 86_400;

pub fn render_single(summary: &FileSummary) -> String {
    let mut lines = vec!["== GPX File stats ==".to_string(), String::new()];

    lines.push(format!("Filename: {}", summary.file_name));
    lines.push(format!("Name: {}", summary.name.as_deref().unwrap_or("")));
    lines.push(format!("Description: {}", summary.description.as_deref().unwrap_or("")));
    lines.push(format!("Author: {}", summary.author.as_deref().unwrap_or("")));
    lines.push(String::new());

    match summary.time_totals() {
        Some(t) => {
            lines.push(format!("Moving time: {}", format_duration(t.moving_s)));
            lines.push(format!("Stopped time: {}", format_duration(t.stopped_s)));
            lines.push(format!("Total time: {}", format_duration(t.total_s)));
        }
        None => lines.push("Time is invalid for this GPX file".to_string()),
    }
    lines.push(String::new());

    match summary.elevation_bounds {
        Some(b) => {
            lines.push(format!("Minimum elevation: {:.2}m", b.min_m));
            lines.push(format!("Maximum elevation: {:.2}m", b.max_m));
        }
        None => {
            lines.push("Minimum elevation: n/a".to_string());
            lines.push("Maximum elevation: n/a".to_string());
        }
    }

    let stats = &summary.stats;
    lines.push(format!(
        "Max down gradient: {:.2}% {}",
        stats.max_down_slope.value,
        location(&stats.max_down_slope)
    ));
    lines.push(format!(
        "Max up gradient: {:.2}% {}",
        stats.max_up_slope.value,
        location(&stats.max_up_slope)
    ));
    lines.push(String::new());

    lines.push(format!("Total distance: {:.2} km", summary.total_distance_m() / 1000.0));
    lines.push(format!(
        "Maximum speed: {:.2} km/h {}",
        stats.max_speed.value,
        location(&stats.max_speed)
    ));

    lines.join("\n")
}

pub fn render_combined(combined: &CombinedSummary) -> String {
    let mut lines = vec!["== GPX combined stats ==".to_string(), String::new()];

    lines.push(format!("Files: {}", combined.file_count));
    lines.push(format!("Moving time: {}", format_duration(combined.moving_time_s)));
    lines.push(format!("Stopped time: {}", format_duration(combined.stopped_time_s)));
    lines.push(format!("Total time: {}", format_duration(combined.total_time_s())));

    if !combined.ignored_time_files.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Files with erroneous timestamps (ignored in the counting): [{}]",
            combined.ignored_time_files.join(", ")
        ));
    }
    lines.push(String::new());

    lines.push(format!("Minimum elevation: {}", sourced(&combined.min_elevation, None, "m")));
    lines.push(format!("Maximum elevation: {}", sourced(&combined.max_elevation, None, "m")));
    lines.push(format!(
        "Max down gradient: {}",
        sourced(&combined.min_gradient, Some(combined.min_gradient_value()), "%")
    ));
    lines.push(format!(
        "Max up gradient: {}",
        sourced(&combined.max_gradient, Some(combined.max_gradient_value()), "%")
    ));
    lines.push(String::new());

    lines.push(format!("Total distance: {:.2} km", combined.total_distance_m / 1000.0));
    let stretch_km = combined.max_stretch.as_ref().map(|s| Sourced {
        value: s.value / 1000.0,
        file: s.file.clone(),
    });
    lines.push(format!("Max stretch: {}", sourced(&stretch_km, None, " km")));
    lines.push(format!(
        "Maximum speed: {}",
        sourced(&combined.max_speed, Some(combined.max_speed_value()), " km/h")
    ));

    lines.join("\n")
}

/// `HH:MM:SS`, with a leading day count once the span reaches a full day
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / SECONDS_PER_DAY;
    let rest = total % SECONDS_PER_DAY;
    let clock = format!("{:02}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);

    if days > 0 {
        format!("{}d {}", days, clock)
    } else {
        clock
    }
}

fn location(extremum: &Extremum) -> String {
    match extremum.location {
        Some(sample) => {
            let p = sample.point;
            let ele = p
                .elevation
                .map(|e| format!("{:.2}m", e))
                .unwrap_or_else(|| "-".to_string());
            format!("({:.6}, {:.6}, {}) at point {}", p.latitude, p.longitude, ele, sample.index)
        }
        None => "(not recorded)".to_string(),
    }
}

fn sourced(value: &Option<Sourced>, sentinel: Option<f64>, unit: &str) -> String {
    match (value, sentinel) {
        (Some(s), _) => format!("{:.2}{} ({})", s.value, unit, s.file),
        (None, Some(v)) => format!("{:.2}{} (not recorded)", v, unit),
        (None, None) => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moving_data::{ElevationBounds, MovingData};
    use crate::track_analyzer::RunningStats;
    use crate::track_model::{GeoPoint, TrackPointSample};

    fn file(name: &str, invalid_time: bool) -> FileSummary {
        let mut stats = RunningStats::default();
        stats.max_up_slope = Extremum {
            value: 7.25,
            location: Some(TrackPointSample {
                point: GeoPoint::new(46.5, 6.6, Some(410.0), None),
                index: 12,
            }),
        };
        stats.invalid_time = invalid_time;

        FileSummary {
            file_name: name.to_string(),
            name: Some("Morning ride".into()),
            description: None,
            author: Some("Jo".into()),
            stats,
            moving: MovingData {
                moving_time_s: 3_725.0,
                stopped_time_s: 60.0,
                moving_distance_m: 25_340.0,
                stopped_distance_m: 3.0,
            },
            elevation_bounds: Some(ElevationBounds { min_m: 372.0, max_m: 512.5 }),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(3_725.0), "01:02:05");
        assert_eq!(format_duration(86_399.6), "1d 00:00:00");
        assert_eq!(format_duration(2.0 * 86_400.0 + 61.0), "2d 00:01:01");
        assert_eq!(format_duration(-5.0), "00:00:00");
    }

    #[test]
    fn test_single_report() {
        let text = render_single(&file("ride.gpx", false));

        assert!(text.starts_with("== GPX File stats =="));
        assert!(text.contains("Filename: ride.gpx"));
        assert!(text.contains("Name: Morning ride"));
        assert!(text.contains("Author: Jo"));
        assert!(text.contains("Moving time: 01:02:05"));
        assert!(text.contains("Total time: 01:03:05"));
        assert!(text.contains("Minimum elevation: 372.00m"));
        assert!(text.contains("Maximum elevation: 512.50m"));
        assert!(text.contains("Max up gradient: 7.25% (46.500000, 6.600000, 410.00m) at point 12"));
        assert!(text.contains("Max down gradient: -100.00% (not recorded)"));
        assert!(text.contains("Total distance: 25.34 km"));
        assert!(text.contains("Maximum speed: 0.00 km/h (not recorded)"));
    }

    #[test]
    fn test_single_report_invalid_time() {
        let text = render_single(&file("old.gpx", true));
        assert!(text.contains("Time is invalid for this GPX file"));
        assert!(!text.contains("Moving time"));
    }

    #[test]
    fn test_combined_report() {
        let files = vec![file("a.gpx", false), file("b.gpx", true)];
        let combined = CombinedSummary::fold(&files).unwrap();
        let text = render_combined(&combined);

        assert!(text.starts_with("== GPX combined stats =="));
        assert!(text.contains("Files: 2"));
        assert!(text.contains("Moving time: 01:02:05"));
        assert!(text.contains("(ignored in the counting): [b.gpx]"));
        assert!(text.contains("Maximum elevation: 512.50m (a.gpx)"));
        assert!(text.contains("Max up gradient: 7.25% (a.gpx)"));
        assert!(text.contains("Max down gradient: -100.00% (not recorded)"));
        assert!(text.contains("Total distance: 50.68 km"));
        assert!(text.contains("Max stretch: 25.34 km (a.gpx)"));
    }
}
