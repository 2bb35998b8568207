//! AI Events: squad alerts и state transitions
//!
//! Alert channel: бот, вошедший в Chase/Attack, шлёт `AllyAlert`; relay
//! доставляет его союзникам в радиусе (в том же тике, после Decision).

use bevy::prelude::*;

use crate::ai::BotState;
use crate::components::TeamId;

/// Squad alert: "я вижу цель здесь"
#[derive(Event, Debug, Clone)]
pub struct AllyAlert {
    /// Бот-отправитель (не получает свой alert)
    pub sender: Entity,
    pub team: TeamId,
    /// Позиция отправителя (центр радиуса)
    pub origin: Vec3,
    pub radius: f32,
    /// Позиция цели на момент alert'а
    pub target_position: Vec3,
    /// Handle цели (receiver может его adopt'нуть)
    pub target: Option<Entity>,
}

/// Decision engine сменил состояние бота
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotStateChanged {
    pub entity: Entity,
    pub from: BotState,
    pub to: BotState,
}
