//! Movement компоненты: navigation provider interface, velocity
//!
//! Архитектура:
//! - AI locomotion пишет destination request в `NavAgent` (high-level intent)
//! - Navigation provider (headless: `physics::movement`) читает его, двигает
//!   актора и отчитывается обратно: `has_arrived`, `velocity`,
//!   `on_navigable_surface`

use bevy::prelude::*;

/// Navigation agent: the locomotion provider's contract
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NavAgent {
    /// Current destination request (None = no path)
    pub destination: Option<Vec3>,
    /// Stop() was requested; destination is kept but not followed
    pub stopped: bool,
    /// Current speed (m/s), may be boosted by Retreat
    pub speed: f32,
    /// Speed the agent was spawned with
    pub base_speed: f32,
    /// Reported by the provider
    pub velocity: Vec3,
    /// Reported by the provider: destination reached within tolerance
    pub has_arrived: bool,
    /// Reported by the provider: agent stands on walkable ground
    pub on_navigable_surface: bool,
    /// Provider-side arrival tolerance (m)
    pub arrival_tolerance: f32,
    /// Provider turns the actor towards its travel direction.
    /// `false` → translate only, heading is owned by the caller (Attack strafing)
    pub update_rotation: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(3.5)
    }
}

impl NavAgent {
    pub fn new(speed: f32) -> Self {
        Self {
            destination: None,
            stopped: false,
            speed,
            base_speed: speed,
            velocity: Vec3::ZERO,
            has_arrived: false,
            on_navigable_surface: true,
            arrival_tolerance: 0.2,
            update_rotation: true,
        }
    }

    /// SetDestination(point). Non-finite points are rejected (no-op).
    ///
    /// Re-requesting the current destination keeps `has_arrived` as is, so
    /// continuous chase requests don't reset arrival every tick.
    pub fn set_destination(&mut self, point: Vec3) -> bool {
        if !point.is_finite() {
            return false;
        }
        self.stopped = false;
        if self.destination != Some(point) {
            self.destination = Some(point);
            self.has_arrived = false;
        }
        true
    }

    /// SetDestination for an optional point: `None` silently no-ops
    pub fn request(&mut self, point: Option<Vec3>) -> bool {
        match point {
            Some(point) => self.set_destination(point),
            None => false,
        }
    }

    /// Stop(): halt in place, drop the path
    pub fn stop(&mut self) {
        self.stopped = true;
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    /// Drop pursuit intent without stopping the agent for good
    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.has_arrived = false;
    }

    pub fn has_path(&self) -> bool {
        !self.stopped && self.destination.is_some() && !self.has_arrived
    }

    pub fn reset_speed(&mut self) {
        self.speed = self.base_speed;
    }
}

/// Линейная скорость актора (m/s)
///
/// Maintained by the provider for bots; set by the host for players. Aim
/// prediction reads it.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LinearVelocity(pub Vec3);
