//! Aim math: spread curve, lead prediction, random error offset.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BotSetupError, SetupResult};

/// Distance (m) → aim error radius (m), piecewise linear, clamped at the ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadCurve {
    /// (distance, radius) sorted by distance
    keys: Vec<(f32, f32)>,
}

impl Default for SpreadCurve {
    fn default() -> Self {
        Self {
            keys: vec![(0.0, 0.1), (20.0, 0.5), (50.0, 2.5), (100.0, 6.0)],
        }
    }
}

impl SpreadCurve {
    pub fn new(mut keys: Vec<(f32, f32)>) -> SetupResult<Self> {
        if keys.is_empty() {
            return Err(BotSetupError::EmptySpreadCurve);
        }
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    pub fn evaluate(&self, distance: f32) -> f32 {
        let (Some(&first), Some(&last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if distance <= first.0 {
            return first.1;
        }
        if distance >= last.0 {
            return last.1;
        }

        for window in self.keys.windows(2) {
            let (d0, r0) = window[0];
            let (d1, r1) = window[1];
            if distance <= d1 {
                let span = d1 - d0;
                if span <= f32::EPSILON {
                    return r1;
                }
                return r0 + (r1 - r0) * (distance - d0) / span;
            }
        }
        last.1
    }
}

/// Lead prediction: `target + velocity × (distance / speed) × accuracy + up × height`
pub fn predict_aim_point(
    target_position: Vec3,
    target_velocity: Vec3,
    distance: f32,
    projectile_speed: f32,
    lead_accuracy: f32,
    aim_height: f32,
) -> Vec3 {
    let time_to_impact = if projectile_speed > 0.0 {
        distance / projectile_speed
    } else {
        0.0
    };
    target_position + target_velocity * time_to_impact * lead_accuracy + Vec3::Y * aim_height
}

/// Uniform point inside the unit sphere (rejection sampling)
pub fn random_in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}
