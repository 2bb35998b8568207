//! Setup/configuration errors
//!
//! Nothing here is fatal to a session: a bot whose setup fails gets its brain
//! disabled (see `ai::systems::setup`) and idles in place.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BotSetupError {
    #[error("bot {bot_id}: missing required collaborator `{collaborator}`")]
    MissingCollaborator {
        bot_id: u64,
        collaborator: &'static str,
    },

    #[error("invalid threshold `{name}` = {value} (expected 0..=1)")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("invalid distance `{name}` = {value} (expected > 0)")]
    InvalidDistance { name: &'static str, value: f32 },

    #[error("invalid interval `{name}` = {value} (expected > 0)")]
    InvalidInterval { name: &'static str, value: f32 },

    #[error("weapon `{name}`: {reason}")]
    InvalidWeapon { name: String, reason: &'static str },

    #[error("spread curve needs at least one key")]
    EmptySpreadCurve,

    #[error("spawner has no spawn points")]
    NoSpawnPoints,
}

pub type SetupResult<T> = Result<T, BotSetupError>;

pub(crate) fn check_threshold(name: &'static str, value: f32) -> SetupResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BotSetupError::InvalidThreshold { name, value })
    }
}

pub(crate) fn check_distance(name: &'static str, value: f32) -> SetupResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BotSetupError::InvalidDistance { name, value })
    }
}

pub(crate) fn check_interval(name: &'static str, value: f32) -> SetupResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BotSetupError::InvalidInterval { name, value })
    }
}
