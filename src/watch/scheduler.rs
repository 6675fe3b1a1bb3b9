//! Adaptive poll interval.
//!
//! One state variable. Real changes halve the interval down to the floor;
//! everything else holds it. The interval never grows back.

use std::time::Duration;

/// What a poll cycle concluded, from the scheduler's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// 304, a no-op 200, a silent baseline, or a failed fetch.
    Quiet,
    RealChange,
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    current: Duration,
    floor: Duration,
}

impl PollScheduler {
    pub fn new(initial: Duration, floor: Duration) -> Self {
        Self {
            current: initial.max(floor),
            floor,
        }
    }

    /// Apply one cycle's outcome. Returns true if the interval moved.
    pub fn record(&mut self, activity: Activity) -> bool {
        match activity {
            Activity::Quiet => false,
            Activity::RealChange => {
                let next = (self.current / 2).max(self.floor);
                let moved = next != self.current;
                self.current = next;
                moved
            }
        }
    }

    pub fn next_wait(&self) -> Duration {
        self.current
    }

    pub fn next_wait_secs(&self) -> f64 {
        self.current.as_secs_f64()
    }

    pub fn floor(&self) -> Duration {
        self.floor
    }
}
