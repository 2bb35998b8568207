//! Per-bot combat tuning (aim, range, pacing).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::SpreadCurve;
use crate::error::{check_distance, check_threshold, BotSetupError, SetupResult};

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Projectile speed used for lead prediction (m/s)
    pub projectile_speed: f32,
    /// 0 = no lead, 1 = perfect lead
    pub lead_accuracy: f32,
    pub spread: SpreadCurve,
    /// Spread multiplier (0.5 = sharpshooter, 2 = spray)
    pub difficulty_multiplier: f32,
    pub max_shoot_distance: f32,
    /// Muzzle above the feet (m)
    pub muzzle_height: f32,
    /// Line-of-fire check point above the target's feet (m)
    pub line_of_fire_height: f32,
    /// Aim point above the target's feet (m)
    pub aim_height: f32,
    /// Heading slerp rate while shooting (per second)
    pub aim_turn_rate: f32,
    /// Fire cooldown jitter (±fraction)
    pub cooldown_jitter: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            projectile_speed: 60.0,
            lead_accuracy: 0.9,
            spread: SpreadCurve::default(),
            difficulty_multiplier: 1.0,
            max_shoot_distance: 150.0,
            muzzle_height: 1.4,
            line_of_fire_height: 1.2,
            aim_height: 1.3,
            aim_turn_rate: 20.0,
            cooldown_jitter: 0.08,
        }
    }
}

impl CombatTuning {
    pub fn validate(&self) -> SetupResult<()> {
        check_distance("projectile_speed", self.projectile_speed)?;
        check_distance("max_shoot_distance", self.max_shoot_distance)?;
        check_threshold("lead_accuracy", self.lead_accuracy)?;
        check_threshold("cooldown_jitter", self.cooldown_jitter)?;
        if self.spread.keys().is_empty() {
            return Err(BotSetupError::EmptySpreadCurve);
        }
        if !(self.difficulty_multiplier.is_finite() && self.difficulty_multiplier >= 0.0) {
            return Err(BotSetupError::InvalidDistance {
                name: "difficulty_multiplier",
                value: self.difficulty_multiplier,
            });
        }
        Ok(())
    }

    /// Aim error radius at `distance`
    pub fn spread_radius(&self, distance: f32) -> f32 {
        self.spread.evaluate(distance) * self.difficulty_multiplier
    }
}
