//! Bot brain components (state machine, target tracking, memory, config).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{check_distance, check_interval, check_threshold, BotSetupError, SetupResult};

/// Компонент-маркер: автономный бот
///
/// Автоматически добавляет brain компоненты через Required Components.
/// `NavAgent` и `Loadout` НЕ required: их отсутствие: configuration error,
/// который ловит setup (brain отключается).
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(BotState, BotConfig, TargetTracker, TargetMemory, PatrolCursor, PerceptionTimers)]
pub struct Bot;

/// Bot FSM состояния (priority-evaluated every tick)
#[derive(
    Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize,
)]
#[reflect(Component)]
pub enum BotState {
    /// Patrol: обход маршрута (initial/default/fallback)
    #[default]
    Patrol,
    /// Chase: цель видна, но дальше дистанции атаки
    Chase,
    /// Attack: цель видна и в пределах ideal combat distance
    Attack,
    /// Search: цель потеряна, идём к last known position
    Search,
    /// Retreat: мало здоровья, к аптечке или прочь от угрозы
    Retreat,
    /// GoToAmmo: мало патронов, к ближайшему ammo pickup
    GoToAmmo,
}

impl BotState {
    /// States in which the combat resolver may fire
    pub fn is_engaging(&self) -> bool {
        matches!(self, Self::Attack | Self::Chase | Self::Retreat)
    }

    /// States that carry a pursuit (entering them triggers an alert)
    pub fn is_pursuit(&self) -> bool {
        matches!(self, Self::Attack | Self::Chase)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patrol => "Patrol",
            Self::Chase => "Chase",
            Self::Attack => "Attack",
            Self::Search => "Search",
            Self::Retreat => "Retreat",
            Self::GoToAmmo => "GoToAmmo",
        }
    }
}

/// Current target (non-owning) + latest perception result
///
/// `visible` и `distance` обновляются только perception sampler'ом.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct TargetTracker {
    pub target: Option<Entity>,
    pub visible: bool,
    /// Eye-to-target distance at the last sample (meters)
    pub distance: f32,
}

impl TargetTracker {
    pub fn clear(&mut self) {
        self.target = None;
        self.visible = false;
        self.distance = 0.0;
    }

    pub fn set_target(&mut self, target: Entity) {
        if self.target != Some(target) {
            self.target = Some(target);
            self.visible = false;
        }
    }
}

/// Last-known target position with decay
#[derive(Component, Debug, Clone, PartialEq)]
pub struct TargetMemory {
    pub last_known_position: Option<Vec3>,
    /// Seconds since the target was last seen (INFINITY = never)
    pub time_since_last_seen: f32,
}

impl Default for TargetMemory {
    fn default() -> Self {
        Self {
            last_known_position: None,
            time_since_last_seen: f32::INFINITY,
        }
    }
}

impl TargetMemory {
    /// Visible sample or ally alert: refresh position and timestamp
    pub fn record_sighting(&mut self, position: Vec3) {
        self.last_known_position = Some(position);
        self.time_since_last_seen = 0.0;
    }

    pub fn age(&mut self, dt: f32) {
        self.time_since_last_seen += dt;
    }

    /// Position valid only inside the search window
    pub fn recall(&self, search_window: f32) -> Option<Vec3> {
        if self.time_since_last_seen < search_window {
            self.last_known_position
        } else {
            None
        }
    }

    pub fn forget(&mut self) {
        *self = Self::default();
    }
}

/// Patrol cursor: index into `PatrolRoute` + direction
///
/// `index == None` → route not started yet (patrol picks the nearest waypoint).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatrolCursor {
    pub index: Option<usize>,
    /// +1 forward, -1 backward (chosen once at spawn)
    pub direction: i8,
}

impl Default for PatrolCursor {
    fn default() -> Self {
        Self {
            index: None,
            direction: 1,
        }
    }
}

impl PatrolCursor {
    pub fn new(direction: i8) -> Self {
        Self {
            index: None,
            direction: if direction < 0 { -1 } else { 1 },
        }
    }

    /// Advance to the next waypoint index.
    ///
    /// At a route end the direction flips (ping-pong); a single-point route
    /// stays on index 0.
    pub fn advance(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            self.index = None;
            return None;
        }

        let current = match self.index {
            Some(index) if index < len => index,
            _ => {
                self.index = Some(0);
                return self.index;
            }
        };

        if len == 1 {
            self.index = Some(0);
            return self.index;
        }

        let mut next = current as isize + self.direction as isize;
        if next < 0 || next >= len as isize {
            self.direction = -self.direction;
            next = current as isize + self.direction as isize;
        }

        self.index = Some(next as usize);
        self.index
    }

    pub fn reset(&mut self) {
        self.index = None;
    }
}

/// Per-bot perception throttle timers (count down to zero, then sample)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PerceptionTimers {
    pub acquisition: f32,
    pub visibility: f32,
}

/// Why the brain is off
#[derive(Debug, Clone, PartialEq)]
pub enum DisableReason {
    /// Observer process: decision state comes from the host
    NotAuthoritative,
    /// Setup validation failed
    Misconfigured(BotSetupError),
}

/// Компонент-маркер: decision logic отключена для этого бота
///
/// Decision/combat queries filter `Without<BrainDisabled>`.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BrainDisabled {
    pub reason: DisableReason,
}

/// Параметры бота (perception, decision, locomotion)
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    // Perception
    pub view_radius: f32,
    /// Full field of view (degrees)
    pub field_of_view_degrees: f32,
    pub vision_check_interval: f32,
    pub target_acquisition_interval: f32,
    /// Eye point above the feet (meters)
    pub eye_height: f32,
    /// Torso offset above a target's reference point (meters)
    pub torso_offset: f32,

    // Decision
    pub max_search_time: f32,
    pub ideal_combat_distance: f32,
    pub too_close_distance: f32,
    pub give_up_distance: f32,
    /// Enter Attack at distance ≤ ideal × this
    pub attack_enter_factor: f32,
    /// Leave Attack for Chase only at distance > ideal × this
    pub attack_exit_factor: f32,
    pub low_health_threshold: f32,
    pub low_ammo_threshold: f32,

    // Relay
    pub alert_radius: f32,

    // Locomotion
    pub waypoint_tolerance: f32,
    pub retreat_speed_multiplier: f32,
    /// Heading slerp rate (per second) while holding in Attack
    pub turn_rate: f32,
    /// Retreat without a pickup: flee point distance from the threat
    pub flee_distance: f32,
    /// Attack too close: back-off point distance
    pub back_off_distance: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            view_radius: 60.0,
            field_of_view_degrees: 140.0,
            vision_check_interval: 0.2,
            target_acquisition_interval: 0.5,
            eye_height: 1.6,
            torso_offset: 1.0,

            max_search_time: 10.0,
            ideal_combat_distance: 10.0,
            too_close_distance: 4.0,
            give_up_distance: 120.0,
            attack_enter_factor: 1.1,
            attack_exit_factor: 1.3,
            low_health_threshold: 0.2,
            low_ammo_threshold: 0.2,

            alert_radius: 25.0,

            waypoint_tolerance: 1.0,
            retreat_speed_multiplier: 1.5,
            turn_rate: 5.0,
            flee_distance: 8.0,
            back_off_distance: 3.0,
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> SetupResult<()> {
        check_distance("view_radius", self.view_radius)?;
        check_interval("vision_check_interval", self.vision_check_interval)?;
        check_interval("target_acquisition_interval", self.target_acquisition_interval)?;
        check_interval("max_search_time", self.max_search_time)?;
        check_distance("ideal_combat_distance", self.ideal_combat_distance)?;
        check_distance("too_close_distance", self.too_close_distance)?;
        check_distance("give_up_distance", self.give_up_distance)?;
        check_distance("alert_radius", self.alert_radius)?;
        check_distance("waypoint_tolerance", self.waypoint_tolerance)?;
        check_distance("retreat_speed_multiplier", self.retreat_speed_multiplier)?;
        check_threshold("low_health_threshold", self.low_health_threshold)?;
        check_threshold("low_ammo_threshold", self.low_ammo_threshold)?;

        if !(self.field_of_view_degrees > 0.0 && self.field_of_view_degrees <= 360.0) {
            return Err(BotSetupError::InvalidDistance {
                name: "field_of_view_degrees",
                value: self.field_of_view_degrees,
            });
        }
        if self.attack_exit_factor < self.attack_enter_factor {
            return Err(BotSetupError::InvalidDistance {
                name: "attack_exit_factor",
                value: self.attack_exit_factor,
            });
        }

        Ok(())
    }

    pub fn attack_enter_distance(&self) -> f32 {
        self.ideal_combat_distance * self.attack_enter_factor
    }

    pub fn attack_exit_distance(&self) -> f32 {
        self.ideal_combat_distance * self.attack_exit_factor
    }

    /// cos(FOV / 2), compared against dot(forward, to_target)
    pub fn half_fov_cos(&self) -> f32 {
        (self.field_of_view_degrees.to_radians() * 0.5).cos()
    }
}
