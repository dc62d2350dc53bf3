use std::path::PathBuf;
use std::time::Duration;

use crate::telemetry::constants::{alerts, host, possession, report, smoothing};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Distance below which the closest entity holds the ball
    pub possession_distance: f32,
    /// Height above which the high-ball hook fires
    pub high_ball_height: f32,
    /// Speed above which the fast-ball hook fires
    pub fast_ball_speed: f32,
    /// Fraction of the record a high/fast ball must exceed to be logged
    pub near_record_ratio: f32,
    /// Cadence of the change-gated background report
    pub report_interval: Duration,
    /// Moving-average window per continuous command channel
    pub smoothing_window: usize,
    /// Snapshot rate used by the replay driver
    pub tick_rate: u32,
    /// JSON-lines snapshot file to replay instead of the scripted match
    pub replay_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            possession_distance: possession::DISTANCE_THRESHOLD,
            high_ball_height: alerts::HIGH_BALL_HEIGHT,
            fast_ball_speed: alerts::FAST_BALL_SPEED,
            near_record_ratio: alerts::NEAR_RECORD_RATIO,
            report_interval: Duration::from_millis(report::INTERVAL_MS),
            smoothing_window: smoothing::WINDOW,
            tick_rate: host::TICK_RATE,
            replay_path: None,
        }
    }
}

/// Parse a positive finite float, warning and returning `None` otherwise
fn parse_positive(name: &str, raw: &str) -> Option<f32> {
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        Ok(_) => {
            tracing::warn!("{} must be a positive number, using default", name);
            None
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            None
        }
    }
}

impl EngineConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("BALLWATCH_POSSESSION_DISTANCE") {
            if let Some(v) = parse_positive("BALLWATCH_POSSESSION_DISTANCE", &raw) {
                config.possession_distance = v;
            }
        }

        if let Ok(raw) = std::env::var("BALLWATCH_HIGH_BALL_HEIGHT") {
            if let Some(v) = parse_positive("BALLWATCH_HIGH_BALL_HEIGHT", &raw) {
                config.high_ball_height = v;
            }
        }

        if let Ok(raw) = std::env::var("BALLWATCH_FAST_BALL_SPEED") {
            if let Some(v) = parse_positive("BALLWATCH_FAST_BALL_SPEED", &raw) {
                config.fast_ball_speed = v;
            }
        }

        if let Ok(raw) = std::env::var("BALLWATCH_NEAR_RECORD_RATIO") {
            if let Ok(parsed) = raw.parse::<f32>() {
                if (0.0..=1.0).contains(&parsed) {
                    config.near_record_ratio = parsed;
                } else {
                    tracing::warn!("BALLWATCH_NEAR_RECORD_RATIO must be 0.0-1.0, using default");
                }
            } else {
                tracing::warn!("Invalid BALLWATCH_NEAR_RECORD_RATIO '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("BALLWATCH_REPORT_INTERVAL_MS") {
            if let Ok(parsed) = raw.parse::<u64>() {
                if parsed > 0 {
                    config.report_interval = Duration::from_millis(parsed);
                } else {
                    tracing::warn!("BALLWATCH_REPORT_INTERVAL_MS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid BALLWATCH_REPORT_INTERVAL_MS '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("BALLWATCH_SMOOTHING_WINDOW") {
            if let Ok(parsed) = raw.parse::<usize>() {
                if parsed <= 64 {
                    config.smoothing_window = parsed;
                } else {
                    tracing::warn!("BALLWATCH_SMOOTHING_WINDOW must be 0-64, using default");
                }
            } else {
                tracing::warn!("Invalid BALLWATCH_SMOOTHING_WINDOW '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("BALLWATCH_TICK_RATE") {
            if let Ok(parsed) = raw.parse::<u32>() {
                if parsed > 0 && parsed <= 1000 {
                    config.tick_rate = parsed;
                } else {
                    tracing::warn!("BALLWATCH_TICK_RATE must be 1-1000, using default");
                }
            } else {
                tracing::warn!("Invalid BALLWATCH_TICK_RATE '{}', using default", raw);
            }
        }

        if let Ok(path) = std::env::var("BALLWATCH_REPLAY_PATH") {
            config.replay_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if !self.possession_distance.is_finite() || self.possession_distance <= 0.0 {
            return Err("possession_distance must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.near_record_ratio) {
            return Err("near_record_ratio must be within 0.0-1.0".to_string());
        }
        if self.report_interval.is_zero() {
            return Err("report_interval cannot be 0".to_string());
        }
        if self.tick_rate == 0 {
            return Err("tick_rate must be at least 1".to_string());
        }
        Ok(())
    }

    /// Duration of one host tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.tick_rate.max(1) as u64)
    }
}
