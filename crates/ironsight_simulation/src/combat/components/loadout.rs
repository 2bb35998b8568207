//! Weapon loadout: two slots + ammo/reload/switch state machine.
//!
//! Invariant (all slots, every tick): `0 ≤ magazine ≤ capacity`. Reserve is
//! unsigned. Only the combat resolver (and ammo pickups refilling reserves)
//! mutate a loadout.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::CombatTuning;
use crate::error::{check_interval, BotSetupError, SetupResult};

/// Static weapon definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub name: String,
    pub magazine_capacity: u32,
    /// Reserve at spawn (also the ammo pickup refill target)
    pub starting_reserve: u32,
    /// Shots per second
    pub fire_rate: f32,
    /// Seconds
    pub reload_duration: f32,
    pub damage: u32,
}

impl WeaponSpec {
    pub fn rifle() -> Self {
        Self {
            name: "rifle".into(),
            magazine_capacity: 30,
            starting_reserve: 120,
            fire_rate: 8.0,
            reload_duration: 2.2,
            damage: 12,
        }
    }

    pub fn pistol() -> Self {
        Self {
            name: "pistol".into(),
            magazine_capacity: 12,
            starting_reserve: 48,
            fire_rate: 3.0,
            reload_duration: 1.2,
            damage: 18,
        }
    }

    /// Seconds between shots
    pub fn fire_interval(&self) -> f32 {
        1.0 / self.fire_rate
    }

    pub fn validate(&self) -> SetupResult<()> {
        let invalid = |reason| BotSetupError::InvalidWeapon {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if self.magazine_capacity == 0 {
            return Err(invalid("magazine capacity must be > 0"));
        }
        if !(self.fire_rate.is_finite() && self.fire_rate > 0.0) {
            return Err(invalid("fire rate must be > 0"));
        }
        check_interval("reload_duration", self.reload_duration)
    }
}

/// Runtime state of one weapon slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSlot {
    pub spec: WeaponSpec,
    pub magazine: u32,
    pub reserve: u32,
}

impl WeaponSlot {
    /// Full magazine + starting reserve
    pub fn new(spec: WeaponSpec) -> Self {
        Self {
            magazine: spec.magazine_capacity,
            reserve: spec.starting_reserve,
            spec,
        }
    }

    pub fn total(&self) -> u32 {
        self.magazine + self.reserve
    }

    /// Magazine and reserve both empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn can_reload(&self) -> bool {
        self.reserve > 0 && self.magazine < self.spec.magazine_capacity
    }

    /// Reload law: `M' = M + min(C − M, R)`, `R' = R − (M' − M)`
    pub fn finish_reload(&mut self) -> u32 {
        let needed = self.spec.magazine_capacity.saturating_sub(self.magazine);
        let loaded = needed.min(self.reserve);
        self.magazine += loaded;
        self.reserve -= loaded;
        loaded
    }

    /// Ammo pickup: reserve back up to its starting amount (never reduced)
    pub fn refill_reserve(&mut self) {
        self.reserve = self.reserve.max(self.spec.starting_reserve);
    }

    pub fn validate(&self) -> SetupResult<()> {
        self.spec.validate()?;
        if self.magazine > self.spec.magazine_capacity {
            return Err(BotSetupError::InvalidWeapon {
                name: self.spec.name.clone(),
                reason: "magazine exceeds capacity",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum SlotKind {
    Primary,
    Secondary,
}

impl SlotKind {
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// Что сейчас делает оружие (timers decremented every tick)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponAction {
    Ready,
    Reloading { remaining: f32 },
    Switching { remaining: f32 },
}

/// Fire gate evaluated by the resolver, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireReadiness {
    /// Reloading or switching
    Busy,
    /// Active slot dry, other slot has ammo
    SwitchSlots,
    /// Both slots dry
    OutOfAmmo,
    /// Magazine empty, reserve available
    Reload,
    CoolingDown,
    Ready,
}

/// Result of one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadoutTick {
    Idle,
    /// Still reloading/switching (no fire this tick)
    Busy,
    /// Reload completed this tick (no fire this tick)
    ReloadFinished { loaded: u32 },
    /// Switch completed this tick (no fire this tick)
    SwitchFinished,
}

impl LoadoutTick {
    /// The weapon was occupied at the start of this tick
    pub fn was_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Два слота оружия + общий fire/reload/switch state
#[derive(Component, Debug, Clone, PartialEq)]
#[require(CombatTuning)]
pub struct Loadout {
    pub primary: WeaponSlot,
    pub secondary: WeaponSlot,
    pub active: SlotKind,
    pub action: WeaponAction,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    /// Slot switch duration (seconds, fire suppressed)
    pub switch_duration: f32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new(WeaponSpec::rifle(), WeaponSpec::pistol())
    }
}

impl Loadout {
    pub const DEFAULT_SWITCH_DURATION: f32 = 1.0;

    pub fn new(primary: WeaponSpec, secondary: WeaponSpec) -> Self {
        Self {
            primary: WeaponSlot::new(primary),
            secondary: WeaponSlot::new(secondary),
            active: SlotKind::Primary,
            action: WeaponAction::Ready,
            fire_cooldown: 0.0,
            switch_duration: Self::DEFAULT_SWITCH_DURATION,
        }
    }

    pub fn slot(&self, kind: SlotKind) -> &WeaponSlot {
        match kind {
            SlotKind::Primary => &self.primary,
            SlotKind::Secondary => &self.secondary,
        }
    }

    pub fn slot_mut(&mut self, kind: SlotKind) -> &mut WeaponSlot {
        match kind {
            SlotKind::Primary => &mut self.primary,
            SlotKind::Secondary => &mut self.secondary,
        }
    }

    pub fn active_slot(&self) -> &WeaponSlot {
        self.slot(self.active)
    }

    pub fn is_ready(&self) -> bool {
        self.action == WeaponAction::Ready
    }

    /// Advance fire/reload/switch timers by `dt`
    pub fn tick(&mut self, dt: f32) -> LoadoutTick {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

        match self.action {
            WeaponAction::Ready => LoadoutTick::Idle,
            WeaponAction::Reloading { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.action = WeaponAction::Ready;
                    let loaded = self.slot_mut(self.active).finish_reload();
                    LoadoutTick::ReloadFinished { loaded }
                } else {
                    self.action = WeaponAction::Reloading { remaining };
                    LoadoutTick::Busy
                }
            }
            WeaponAction::Switching { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.action = WeaponAction::Ready;
                    LoadoutTick::SwitchFinished
                } else {
                    self.action = WeaponAction::Switching { remaining };
                    LoadoutTick::Busy
                }
            }
        }
    }

    pub fn readiness(&self) -> FireReadiness {
        if !self.is_ready() {
            return FireReadiness::Busy;
        }

        let active = self.active_slot();
        if active.is_empty() {
            return if self.slot(self.active.other()).is_empty() {
                FireReadiness::OutOfAmmo
            } else {
                FireReadiness::SwitchSlots
            };
        }
        if active.magazine == 0 {
            return FireReadiness::Reload;
        }
        if self.fire_cooldown > 0.0 {
            return FireReadiness::CoolingDown;
        }
        FireReadiness::Ready
    }

    /// Starts a reload of the active slot (no-op if busy or nothing to load)
    pub fn start_reload(&mut self) -> bool {
        if !self.is_ready() || !self.active_slot().can_reload() {
            return false;
        }
        self.action = WeaponAction::Reloading {
            remaining: self.active_slot().spec.reload_duration,
        };
        true
    }

    /// Switches to the other slot; fire is suppressed for `switch_duration`
    pub fn start_switch(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.active = self.active.other();
        self.action = WeaponAction::Switching {
            remaining: self.switch_duration,
        };
        true
    }

    /// Spend one round; cooldown = fire interval × jitter. Returns damage.
    pub fn consume_shot(&mut self, cooldown_jitter: f32) -> Option<u32> {
        if self.readiness() != FireReadiness::Ready {
            return None;
        }
        let active = self.active;
        let slot = self.slot_mut(active);
        slot.magazine -= 1;
        let damage = slot.spec.damage;
        self.fire_cooldown = slot.spec.fire_interval() * cooldown_jitter;
        Some(damage)
    }

    /// (Σ magazine + reserve) / (Σ capacity + starting reserve), clamped 0..=1
    pub fn ammo_fraction(&self) -> f32 {
        let current = self.primary.total() + self.secondary.total();
        let max = [&self.primary, &self.secondary]
            .iter()
            .map(|slot| slot.spec.magazine_capacity + slot.spec.starting_reserve)
            .sum::<u32>();
        if max == 0 {
            return 0.0;
        }
        (current as f32 / max as f32).clamp(0.0, 1.0)
    }

    pub fn refill_reserves(&mut self) {
        self.primary.refill_reserve();
        self.secondary.refill_reserve();
    }

    pub fn validate(&self) -> SetupResult<()> {
        self.primary.validate()?;
        self.secondary.validate()?;
        if !(self.switch_duration.is_finite() && self.switch_duration >= 0.0) {
            return Err(BotSetupError::InvalidInterval {
                name: "switch_duration",
                value: self.switch_duration,
            });
        }
        Ok(())
    }
}
