//! Running ball extrema (peak height and speed) for the current match

use crate::telemetry::snapshot::BallState;

/// Outcome of feeding one sample into the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordUpdate {
    pub new_height_record: bool,
    pub new_speed_record: bool,
}

/// Monotonic max-tracking for ball height and speed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtremaTracker {
    max_height: f32,
    max_speed: f32,
}

impl ExtremaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Feed the current tick's ball state.
    ///
    /// Only a strictly greater value counts as a record; equal values leave the
    /// record untouched. NaN samples never compare greater and are ignored.
    pub fn observe(&mut self, ball: &BallState) -> RecordUpdate {
        let height = ball.height();
        let speed = ball.speed();
        let mut update = RecordUpdate::default();

        if height > self.max_height {
            self.max_height = height;
            update.new_height_record = true;
        }
        if speed > self.max_speed {
            self.max_speed = speed;
            update.new_speed_record = true;
        }

        update
    }

    /// Whether `height` is within `ratio` of the current height record
    pub fn height_near_record(&self, height: f32, ratio: f32) -> bool {
        height > self.max_height * ratio
    }

    /// Whether `speed` is within `ratio` of the current speed record
    pub fn speed_near_record(&self, speed: f32, ratio: f32) -> bool {
        speed > self.max_speed * ratio
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
