//! Auto-hide deadline for the control overlay
//!
//! There is at most one pending deadline. Arming replaces it, so a burst of
//! pointer movement never leaves older deadlines behind to hide the overlay
//! early.

use std::time::Duration;
use tokio::time::Instant;

/// Idle time after the last pointer movement before controls hide
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct ControlsTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ControlsTimer {
    pub fn new() -> Self {
        Self::with_delay(CONTROLS_HIDE_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the countdown from `now`, replacing any pending deadline
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the pending deadline has passed at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

impl Default for ControlsTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearming_replaces_deadline() {
        let start = Instant::now();
        let mut timer = ControlsTimer::new();
        assert!(!timer.is_due(start + Duration::from_secs(60)));

        timer.arm(start);
        timer.arm(start + Duration::from_millis(1000));

        assert_eq!(timer.deadline(), Some(start + Duration::from_millis(4000)));
        assert!(!timer.is_due(start + Duration::from_millis(3500)));
        assert!(timer.is_due(start + Duration::from_millis(4000)));
    }

    #[test]
    fn test_disarm() {
        let start = Instant::now();
        let mut timer = ControlsTimer::with_delay(Duration::from_millis(10));
        timer.arm(start);
        timer.disarm();
        assert!(timer.deadline().is_none());
        assert!(!timer.is_due(start + Duration::from_secs(1)));
    }
}
