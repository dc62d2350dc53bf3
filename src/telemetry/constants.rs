/// Possession detection constants
pub mod possession {
    /// Distance below which the closest entity is considered to hold the ball
    pub const DISTANCE_THRESHOLD: f32 = 200.0;
}

/// High/fast ball alert constants
pub mod alerts {
    /// Ball height (world units) above which the high-ball hook fires
    pub const HIGH_BALL_HEIGHT: f32 = 300.0;
    /// Ball speed (world units/s) above which the fast-ball hook fires
    pub const FAST_BALL_SPEED: f32 = 2000.0;
    /// Fraction of the current record a value must exceed to be logged
    pub const NEAR_RECORD_RATIO: f32 = 0.95;
}

/// Periodic report constants
pub mod report {
    /// Background report cadence in milliseconds
    pub const INTERVAL_MS: u64 = 5_000;
}

/// Command smoothing constants
pub mod smoothing {
    /// Moving-average window per continuous channel
    pub const WINDOW: usize = 1;
    /// Number of continuous channels in a controller command
    pub const CHANNELS: usize = 5;
}

/// Host-side constants used by the replay driver
pub mod host {
    /// Snapshot rate in Hz
    pub const TICK_RATE: u32 = 120;
    /// Number of teams in a match
    pub const TEAM_COUNT: usize = 2;
}

/// Display name prefixed to every line handed to the log sink
pub const ENGINE_NAME: &str = "Ball Tracker";
