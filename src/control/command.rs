use serde::{Deserialize, Serialize};
use std::fmt;

use crate::telemetry::constants::smoothing::CHANNELS;

/// Outgoing controller command
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ControllerCommand {
    /// -1.0 (left) to 1.0 (right)
    pub steer: f32,
    /// -1.0 (reverse) to 1.0 (forward)
    pub throttle: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub jump: bool,
    pub boost: bool,
    pub handbrake: bool,
    #[serde(default)]
    pub use_item: bool,
}

impl ControllerCommand {
    /// Continuous channels in fixed order: steer, throttle, pitch, yaw, roll
    pub fn analog(&self) -> [f32; CHANNELS] {
        [self.steer, self.throttle, self.pitch, self.yaw, self.roll]
    }

    /// Copy with the continuous channels replaced, booleans untouched
    pub fn with_analog(&self, values: [f32; CHANNELS]) -> Self {
        let [steer, throttle, pitch, yaw, roll] = values;
        Self {
            steer,
            throttle,
            pitch,
            yaw,
            roll,
            ..*self
        }
    }
}

impl fmt::Display for ControllerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cmd(T:{:.1} S:{:.1} P:{:.1} J:{})",
            self.throttle, self.steer, self.pitch, self.jump
        )
    }
}
