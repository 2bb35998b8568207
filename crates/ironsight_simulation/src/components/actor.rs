//! Базовые компоненты акторов: Actor, Health, BotId, death markers
//!
//! `Actor` + `Health` together are the health ledger every combatant exposes.
//! The decision core only reads it through [`HealthSource`].

use bevy::prelude::*;

use crate::components::LinearVelocity;

/// Team identifier (`NEUTRAL_TEAM` never counts as an opponent)
pub type TeamId = i32;

pub const NEUTRAL_TEAM: TeamId = -1;

/// Актор (бот, игрок): базовый компонент для живых combatants
///
/// Автоматически добавляет Health, Transform, LinearVelocity через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Transform, LinearVelocity)]
pub struct Actor {
    pub team: TeamId,
}

impl Actor {
    pub fn new(team: TeamId) -> Self {
        Self { team }
    }

    /// Opposing affiliation: different team, and neither side is neutral
    pub fn is_hostile_to(&self, other_team: TeamId) -> bool {
        self.team != other_team && self.team != NEUTRAL_TEAM && other_team != NEUTRAL_TEAM
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        if !self.is_alive() {
            return;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}

/// Typed capability over the health ledger
///
/// Anything that can answer these three questions can be perceived, targeted
/// and damaged.
pub trait HealthSource {
    fn is_dead(&self) -> bool;
    fn team(&self) -> TeamId;
    fn health_fraction(&self) -> f32;
}

/// Read-only view of one combatant's ledger
#[derive(Debug, Clone, Copy)]
pub struct Vitals<'a> {
    pub actor: &'a Actor,
    pub health: &'a Health,
}

impl<'a> Vitals<'a> {
    pub fn new(actor: &'a Actor, health: &'a Health) -> Self {
        Self { actor, health }
    }
}

impl HealthSource for Vitals<'_> {
    fn is_dead(&self) -> bool {
        !self.health.is_alive()
    }

    fn team(&self) -> TeamId {
        self.actor.team
    }

    fn health_fraction(&self) -> f32 {
        self.health.fraction()
    }
}

/// Stable bot id (instigator id for damage, key for replication)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct BotId(pub u64);

/// Компонент-маркер: entity мертв (Health == 0)
///
/// Decision/combat queries filter `Without<Dead>`.
#[derive(Component, Debug)]
pub struct Dead;

/// Post-death linger (animation/cleanup window), then despawn
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    pub remaining: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        health.take_damage(30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        health.take_damage(100); // Saturating sub
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50);
        health.heal(30);
        assert_eq!(health.current, 80);

        health.heal(100); // Clamped to max
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_dead_cannot_heal() {
        let mut health = Health::new(50);
        health.take_damage(50);
        health.heal(20);
        assert_eq!(health.current, 0);
    }

    #[test]
    fn test_vitals_health_source() {
        let actor = Actor::new(1);
        let mut health = Health::new(200);
        health.take_damage(150);

        let vitals = Vitals::new(&actor, &health);
        assert!(!vitals.is_dead());
        assert_eq!(vitals.team(), 1);
        assert!((vitals.health_fraction() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hostility() {
        let bot = Actor::new(1);
        assert!(bot.is_hostile_to(0));
        assert!(!bot.is_hostile_to(1));
        assert!(!bot.is_hostile_to(NEUTRAL_TEAM));
        assert!(!Actor::new(NEUTRAL_TEAM).is_hostile_to(0));
    }
}
