use std::time::Duration;

/// Engine time in seconds, driven by whoever owns the clock.
///
/// Timers compare against this instead of wall-clock time so that gesture and
/// throttle behavior can be replayed deterministically.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms as f64 / 1000.0)
    }

    pub fn after(self, delay: Duration) -> Self {
        Time(self.0 + delay.as_secs_f64())
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}
