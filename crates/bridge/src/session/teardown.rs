// Deferred teardown timer for an editor session.
//
// At most one deadline is pending. Scheduling replaces the previous deadline
// instead of stacking a second one; a fired deadline is consumed.

use std::time::Duration;

use tokio::time::Instant;

/// Grace period between the last preview detaching and teardown.
pub const DEFAULT_TEARDOWN_DELAY: Duration = Duration::from_millis(60_000);

#[derive(Debug, Default)]
pub struct TeardownTimer {
    deadline: Option<Instant>,
    /// How many times a deadline has been (re)scheduled over the timer's life.
    schedules: u64,
}

impl TeardownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending deadline and arm a new one at `now + delay`.
    pub fn schedule_at(&mut self, now: Instant, delay: Duration) -> Instant {
        let deadline = now + delay;
        self.deadline = Some(deadline);
        self.schedules = self.schedules.saturating_add(1);
        deadline
    }

    /// Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn schedule_count(&self) -> u64 {
        self.schedules
    }

    pub fn is_due_at(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consume the deadline if it has elapsed. Returns true when it fired.
    pub fn fire_at(&mut self, now: Instant) -> bool {
        if self.is_due_at(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
