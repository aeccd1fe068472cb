//! Distance-triggered activation of the dancer
//!
//! The dancer only dances while the patrol robot is close, or while the manual
//! override is engaged. The check is level-triggered: every frame the wanted
//! state is recomputed from positions, and the dancer is toggled only when its
//! current state differs.

use log::debug;

use crate::animation::idle::IdleController;
use crate::core::config::ProximityConfig;
use crate::foundation::math::Vec3;

/// Snapshot of one proximity evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityLink {
    /// Distance between the two bodies
    pub distance: f32,
    /// Whether the dancer should be active
    pub wants_active: bool,
}

/// Activation rule linking the patrol robot to the dancer
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityActivation {
    threshold: f32,
    override_active: bool,
}

impl ProximityActivation {
    /// Create from configuration
    pub fn new(config: &ProximityConfig) -> Self {
        Self {
            threshold: config.threshold,
            override_active: config.override_active,
        }
    }

    /// Inclusive activation distance
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether the manual override is engaged
    pub fn override_active(&self) -> bool {
        self.override_active
    }

    /// Flip the manual override, returning the new flag
    pub fn toggle_override(&mut self) -> bool {
        self.override_active = !self.override_active;
        debug!("Dance override {}", if self.override_active { "on" } else { "off" });
        self.override_active
    }

    /// Evaluate the rule for two body positions
    pub fn evaluate(&self, patrol: &Vec3, dancer: &Vec3) -> ProximityLink {
        let distance = (patrol - dancer).norm();
        ProximityLink {
            distance,
            wants_active: distance <= self.threshold || self.override_active,
        }
    }

    /// Bring the dancer in line with `link`, returning whether it was toggled
    pub fn apply(&self, link: &ProximityLink, dancer: &mut IdleController, now: f64) -> bool {
        let active = !dancer.is_paused();
        if active == link.wants_active {
            return false;
        }
        debug!("Proximity at distance {:.3}: dancer {}", link.distance, if link.wants_active { "wakes" } else { "sleeps" });
        dancer.toggle(now);
        true
    }
}

impl Default for ProximityActivation {
    fn default() -> Self {
        Self::new(&ProximityConfig::default())
    }
}
