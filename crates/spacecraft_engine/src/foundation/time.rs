//! Time management utilities
//!
//! Every controller is driven by a single reading per frame. The reading comes
//! from a [`Clock`], which lets tests substitute synthetic time for the wall
//! clock.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of time readings in seconds
pub trait Clock {
    /// Current reading in seconds
    fn now(&self) -> f64;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Create a clock reading zero now
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually driven clock for tests and offline runs
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: Cell<f64>,
}

impl ManualClock {
    /// Create a clock at the given reading
    pub fn new(seconds: f64) -> Self {
        Self { seconds: Cell::new(seconds) }
    }

    /// Set the reading
    pub fn set(&self, seconds: f64) {
        self.seconds.set(seconds);
    }

    /// Move the reading forward (or backward, to simulate skew)
    pub fn advance(&self, seconds: f64) {
        self.seconds.set(self.seconds.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.seconds.get()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

// Lets a test keep a handle on a clock it has handed to the engine
impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Guard that never reports a reading earlier than one it already reported
#[derive(Debug)]
pub struct MonotonicClock<C: Clock> {
    inner: C,
    latest: Cell<f64>,
}

impl<C: Clock> MonotonicClock<C> {
    /// Wrap a clock
    pub fn new(inner: C) -> Self {
        let latest = inner.now();
        Self { inner, latest: Cell::new(latest) }
    }

    /// Access the wrapped clock
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> f64 {
        let reading = self.inner.now();
        if reading < self.latest.get() {
            log::warn!(
                "Clock went backwards by {:.6}s, holding previous reading",
                self.latest.get() - reading
            );
        } else {
            self.latest.set(reading);
        }
        self.latest.get()
    }
}

/// Frame timing statistics fed from per-frame clock readings
#[derive(Debug, Clone)]
pub struct Timer {
    last_frame: Option<f64>,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Record a frame at `now` (should be called once per frame)
    pub fn tick(&mut self, now: f64) {
        if let Some(last) = self.last_frame {
            self.delta_time = (now - last).max(0.0) as f32;
            self.total_time += self.delta_time;
        }
        self.last_frame = Some(now);
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total time covered by recorded frames
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS over the recorded frames
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count.saturating_sub(1) as f32 / self.total_time
        } else {
            0.0
        }
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}
