//! Moving-average smoothing for outgoing controller commands
//!
//! Each continuous channel keeps its own bounded history. Button channels are
//! never averaged so jumps and boosts stay frame-exact.

use std::collections::VecDeque;

use crate::control::command::ControllerCommand;
use crate::telemetry::constants::smoothing::CHANNELS;

/// Bounded FIFO of recent samples for one channel
#[derive(Debug, Clone)]
pub struct ChannelHistory {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl ChannelHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, evicting the oldest once capacity is reached
    pub fn push(&mut self, value: f32) {
        if self.capacity == 0 {
            return;
        }
        self.samples.push_back(value);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Arithmetic mean, or `None` when the history is empty
    pub fn mean(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f32 = self.samples.iter().sum();
        Some(sum / self.samples.len() as f32)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Per-channel moving-average filter
#[derive(Debug, Clone)]
pub struct CommandSmoother {
    channels: [ChannelHistory; CHANNELS],
    window: usize,
}

impl CommandSmoother {
    /// Create a smoother with `window` samples per channel. A window of 0
    /// keeps no history and passes commands through unchanged.
    pub fn new(window: usize) -> Self {
        Self {
            channels: std::array::from_fn(|_| ChannelHistory::new(window)),
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record the command and return it with smoothed analog channels
    pub fn filter(&mut self, command: ControllerCommand) -> ControllerCommand {
        let raw = command.analog();
        let mut smoothed = raw;

        for ((history, value), out) in self.channels.iter_mut().zip(raw).zip(smoothed.iter_mut()) {
            history.push(value);
            *out = history.mean().unwrap_or(value);
        }

        command.with_analog(smoothed)
    }

    /// Samples currently held per channel
    pub fn depth(&self) -> usize {
        self.channels[0].len()
    }
}

impl Default for CommandSmoother {
    fn default() -> Self {
        Self::new(crate::telemetry::constants::smoothing::WINDOW)
    }
}
