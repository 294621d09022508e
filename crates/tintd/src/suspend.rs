//! Single-slot timer that re-enables the worker after a suspension.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

/// Handle identifying one armed suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendTimer {
    id: u64,
    deadline: Instant,
}

impl SuspendTimer {
    /// Monotonically increasing identifier; a re-armed timer never reuses one.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Instant at which the suspension ends.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// Holds at most one pending suspension.
///
/// Arming replaces whatever was pending, so a superseded timer can never fire.
#[derive(Debug, Default)]
pub struct SuspendScheduler {
    pending: Option<SuspendTimer>,
    next_id: u64,
}

impl SuspendScheduler {
    /// Creates a scheduler with nothing pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            next_id: 0,
        }
    }

    /// Arms a timer ending `duration` after `now`.
    ///
    /// Returns the timer it replaced, if any.
    pub fn arm(&mut self, now: Instant, duration: Duration) -> Option<SuspendTimer> {
        let timer = SuspendTimer {
            id: self.next_id,
            deadline: now + duration,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.replace(timer)
    }

    /// Disarms the pending timer, returning it.
    pub const fn cancel(&mut self) -> Option<SuspendTimer> {
        self.pending.take()
    }

    /// Whether a suspension is armed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the armed timer.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|timer| timer.deadline)
    }

    /// Time left before the armed timer fires, saturating at zero.
    #[must_use]
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Disarms and returns the timer if its deadline has passed.
    pub fn take_expired(&mut self, now: Instant) -> Option<SuspendTimer> {
        if self.pending.is_some_and(|timer| timer.deadline <= now) {
            self.pending.take()
        } else {
            None
        }
    }
}

/// Converts a whole number of minutes into a [`Duration`].
#[must_use]
pub fn minutes(count: NonZeroU32) -> Duration {
    Duration::from_secs(u64::from(count.get()) * 60)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn mins(count: u32) -> NonZeroU32 {
        NonZeroU32::new(count).expect("test durations are non-zero")
    }

    #[rstest]
    fn rearming_replaces_the_pending_timer() {
        let start = Instant::now();
        let mut scheduler = SuspendScheduler::new();
        assert!(scheduler.arm(start, minutes(mins(30))).is_none());
        let replaced = scheduler
            .arm(start, minutes(mins(60)))
            .expect("first timer should be replaced");
        assert_eq!(replaced.deadline(), start + Duration::from_secs(1800));
        assert!(
            scheduler
                .take_expired(start + Duration::from_secs(1800))
                .is_none(),
            "superseded deadline must not fire"
        );
        let fired = scheduler
            .take_expired(start + Duration::from_secs(3600))
            .expect("second timer fires at its own deadline");
        assert_ne!(fired.id(), replaced.id());
        assert!(!scheduler.is_pending());
    }

    #[rstest]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut scheduler = SuspendScheduler::new();
        scheduler.arm(start, minutes(mins(10)));
        assert!(scheduler.cancel().is_some());
        assert!(scheduler.deadline().is_none());
        assert!(scheduler.take_expired(start + minutes(mins(10))).is_none());
    }

    #[rstest]
    fn remaining_time_saturates() {
        let start = Instant::now();
        let mut scheduler = SuspendScheduler::new();
        scheduler.arm(start, minutes(mins(1)));
        assert_eq!(
            scheduler.time_remaining(start + Duration::from_secs(20)),
            Some(Duration::from_secs(40))
        );
        assert_eq!(
            scheduler.time_remaining(start + Duration::from_secs(90)),
            Some(Duration::ZERO)
        );
    }
}
