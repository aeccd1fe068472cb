//! Pause-aware animation time
//!
//! An [`AnimationClock`] turns raw clock readings into *effective elapsed time*:
//! the reading minus the start time minus every interval spent paused. While
//! paused the value holds still, and resuming commits the pause interval, so
//! the value carries on from exactly where it stopped.
//!
//! Readings earlier than one already seen are treated as the latest reading,
//! so effective time never runs backwards under clock skew.

/// Effective-time bookkeeping for one animated phase
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    start: f64,
    paused_total: f64,
    pause_start: f64,
    paused: bool,
    latest: f64,
}

impl AnimationClock {
    /// Start a running clock at `now`
    pub fn new(now: f64) -> Self {
        Self {
            start: now,
            paused_total: 0.0,
            pause_start: now,
            paused: false,
            latest: now,
        }
    }

    /// Start a clock at `now` that is already paused
    pub fn new_paused(now: f64) -> Self {
        Self {
            paused: true,
            ..Self::new(now)
        }
    }

    /// Whether the clock is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Total time committed as paused so far
    pub fn paused_total(&self) -> f64 {
        self.paused_total
    }

    /// Pause at `now`; no-op if already paused
    pub fn pause(&mut self, now: f64) {
        let now = self.observe(now);
        if !self.paused {
            self.pause_start = now;
            self.paused = true;
        }
    }

    /// Resume at `now`, committing the pause interval; no-op if running
    pub fn resume(&mut self, now: f64) {
        let now = self.observe(now);
        if self.paused {
            self.paused_total += now - self.pause_start;
            self.paused = false;
        }
    }

    /// Flip between paused and running, returning the new paused flag
    pub fn toggle(&mut self, now: f64) -> bool {
        if self.paused {
            self.resume(now);
        } else {
            self.pause(now);
        }
        self.paused
    }

    /// Effective elapsed time at `now`
    pub fn elapsed(&mut self, now: f64) -> f64 {
        let now = self.observe(now);
        let reference = if self.paused { self.pause_start } else { now };
        (reference - self.start - self.paused_total).max(0.0)
    }

    fn observe(&mut self, now: f64) -> f64 {
        if now > self.latest {
            self.latest = now;
        }
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_running_clock_tracks_wall_time() {
        let mut clock = AnimationClock::new(10.0);
        assert_relative_eq!(clock.elapsed(10.0), 0.0);
        assert_relative_eq!(clock.elapsed(12.5), 2.5);
    }

    #[test]
    fn test_pause_does_not_count() {
        let mut clock = AnimationClock::new(0.0);
        let before = clock.elapsed(3.0);
        assert!(clock.toggle(3.0));

        // Time stands still while paused
        assert_relative_eq!(clock.elapsed(7.0), before);

        assert!(!clock.toggle(8.0));
        assert_relative_eq!(clock.elapsed(8.0), before, epsilon = 1e-9);
        assert_relative_eq!(clock.elapsed(9.0), before + 1.0, epsilon = 1e-9);
        assert_relative_eq!(clock.paused_total(), 5.0);
    }

    #[test]
    fn test_repeated_toggles_stay_continuous() {
        let mut clock = AnimationClock::new(0.0);
        let mut now = 0.0;
        let mut expected = 0.0;
        for _ in 0..50 {
            now += 0.1;
            expected += 0.1;
            assert_relative_eq!(clock.elapsed(now), expected, epsilon = 1e-9);
            clock.toggle(now);
            now += 0.37;
            clock.toggle(now);
            assert_relative_eq!(clock.elapsed(now), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_starts_paused() {
        let mut clock = AnimationClock::new_paused(4.0);
        assert!(clock.is_paused());
        assert_relative_eq!(clock.elapsed(9.0), 0.0);
        clock.resume(9.0);
        assert_relative_eq!(clock.elapsed(10.0), 1.0);
    }

    #[test]
    fn test_clock_skew_never_runs_backwards() {
        let mut clock = AnimationClock::new(0.0);
        assert_relative_eq!(clock.elapsed(5.0), 5.0);
        assert_relative_eq!(clock.elapsed(4.0), 5.0);
        // A skewed resume does not produce a negative pause interval
        clock.pause(5.0);
        clock.resume(3.0);
        assert_relative_eq!(clock.paused_total(), 0.0);
        assert_relative_eq!(clock.elapsed(6.0), 6.0);
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let mut clock = AnimationClock::new(0.0);
        clock.pause(1.0);
        clock.pause(2.0);
        clock.resume(3.0);
        clock.resume(4.0);
        assert_relative_eq!(clock.paused_total(), 2.0);
        assert_relative_eq!(clock.elapsed(5.0), 3.0);
    }
}
