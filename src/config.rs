/// Tunables for the windowed track analysis
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Number of trailing points kept for speed and elevation smoothing
    pub window_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            window_capacity: 3,
        }
    }
}

/// Tunables for the moving/stopped split
#[derive(Debug, Clone)]
pub struct MovingConfig {
    pub stopped_speed_threshold_kmh: f64,
}

impl Default for MovingConfig {
    fn default() -> Self {
        MovingConfig {
            stopped_speed_threshold_kmh: 1.0,
        }
    }
}
