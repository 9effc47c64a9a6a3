/// Geodesic and averaging primitives shared by the analyzer
use crate::errors::AnalysisError;

pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

fn hsin(theta: f64) -> f64 {
    (theta / 2.0).sin().powi(2)
}

/// Great-circle distance in metres between two lat/lon pairs given in degrees
pub fn distance(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let la1 = lat_a.to_radians();
    let lo1 = lon_a.to_radians();
    let la2 = lat_b.to_radians();
    let lo2 = lon_b.to_radians();

    let h = hsin(la2 - la1) + la1.cos() * la2.cos() * hsin(lo2 - lo1);

    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.min(1.0).sqrt().asin()
}

/// Arithmetic mean rounded to the nearest integer.
///
/// Fails with `InvalidInput` on an empty slice instead of dividing by zero.
pub fn mean(values: &[f64]) -> Result<f64, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::InvalidInput("mean of an empty sequence".into()));
    }

    let total: f64 = values.iter().sum();
    Ok((total / values.len() as f64).round())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_distance_coincident_points() {
        assert_eq!(distance(52.5, 13.4, 52.5, 13.4), 0.0);
        assert_eq!(distance(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let d = distance(10.0, 20.0, 11.0, 20.0);
        assert_relative_eq!(d, 111_195.0, max_relative = 0.01);
    }

    #[test]
    fn test_distance_antipodal() {
        let d = distance(0.0, 0.0, 0.0, 180.0);
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_RADIUS_M, max_relative = 1e-9);
    }

    #[test]
    fn test_mean_rounds() {
        assert_eq!(mean(&[1.0, 2.0]).unwrap(), 2.0); // 1.5 rounds away from zero
        assert_eq!(mean(&[100.0, 101.0, 101.0]).unwrap(), 101.0);
        assert_eq!(mean(&[-1.0, -2.0]).unwrap(), -2.0);
    }

    #[test]
    fn test_mean_empty_is_invalid_input() {
        assert!(matches!(mean(&[]), Err(AnalysisError::InvalidInput(_))));
    }

    proptest! {
        #[test]
        fn prop_distance_symmetric(
            lat_a in -90.0f64..90.0, lon_a in -180.0f64..180.0,
            lat_b in -90.0f64..90.0, lon_b in -180.0f64..180.0,
        ) {
            let ab = distance(lat_a, lon_a, lat_b, lon_b);
            let ba = distance(lat_b, lon_b, lat_a, lon_a);
            prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
            prop_assert!(ab >= 0.0);
        }

        #[test]
        fn prop_mean_single_is_rounded(x in -10_000.0f64..10_000.0) {
            prop_assert_eq!(mean(&[x]).unwrap(), x.round());
        }

        #[test]
        fn prop_mean_of_integers_within_bounds(values in prop::collection::vec(-5_000i32..5_000, 1..20)) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let m = mean(&values).unwrap();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(m >= lo && m <= hi);
        }
    }
}
