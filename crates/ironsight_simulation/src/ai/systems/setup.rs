//! Brain setup: validate collaborators/config of newly spawned bots.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{Bot, BotConfig, BrainDisabled, DisableReason, PerceptionTimers};
use crate::combat::{CombatTuning, Loadout};
use crate::components::{BotId, NavAgent};
use crate::error::{BotSetupError, SetupResult};
use crate::DeterministicRng;

/// Проверка одного бота (без side effects)
pub fn validate_bot(
    bot_id: u64,
    config: &BotConfig,
    nav: Option<&NavAgent>,
    loadout: Option<&Loadout>,
    tuning: Option<&CombatTuning>,
) -> SetupResult<()> {
    if nav.is_none() {
        return Err(BotSetupError::MissingCollaborator {
            bot_id,
            collaborator: "NavAgent",
        });
    }
    let Some(loadout) = loadout else {
        return Err(BotSetupError::MissingCollaborator {
            bot_id,
            collaborator: "Loadout",
        });
    };

    config.validate()?;
    loadout.validate()?;
    if let Some(tuning) = tuning {
        tuning.validate()?;
    }
    Ok(())
}

/// Система: setup новых ботов (Perception, first)
///
/// Invalid bot → configuration warning + `BrainDisabled`; the session keeps
/// running. Valid bot → perception timers get a random phase so bots don't
/// all sample on the same tick.
pub fn configure_new_bots(
    mut commands: Commands,
    mut new_bots: Query<
        (
            Entity,
            Option<&BotId>,
            &BotConfig,
            Option<&NavAgent>,
            Option<&Loadout>,
            Option<&CombatTuning>,
            &mut PerceptionTimers,
        ),
        Added<Bot>,
    >,
    mut rng: ResMut<DeterministicRng>,
) {
    for (entity, bot_id, config, nav, loadout, tuning, mut timers) in new_bots.iter_mut() {
        let id = bot_id.map(|id| id.0).unwrap_or(entity.to_bits());

        if let Err(err) = validate_bot(id, config, nav, loadout, tuning) {
            crate::log_warning(&format!("⚠️ Bot {:?} brain disabled: {}", entity, err));
            commands.entity(entity).insert(BrainDisabled {
                reason: DisableReason::Misconfigured(err),
            });
            continue;
        }

        timers.acquisition = rng.rng.gen_range(0.0..config.target_acquisition_interval);
        timers.visibility = rng.rng.gen_range(0.0..config.vision_check_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_missing_nav_agent() {
        let loadout = Loadout::default();
        let result = validate_bot(3, &BotConfig::default(), None, Some(&loadout), None);
        assert_eq!(
            result,
            Err(BotSetupError::MissingCollaborator {
                bot_id: 3,
                collaborator: "NavAgent"
            })
        );
    }

    #[test]
    fn test_missing_loadout() {
        let nav = NavAgent::default();
        let result = validate_bot(3, &BotConfig::default(), Some(&nav), None, None);
        assert!(matches!(
            result,
            Err(BotSetupError::MissingCollaborator { collaborator: "Loadout", .. })
        ));
    }

    #[test]
    fn test_misconfigured_bot_gets_disabled() {
        let mut world = World::new();
        world.insert_resource(DeterministicRng::new(1));

        let broken = world.spawn((Bot, Loadout::default())).id();
        let healthy = world
            .spawn((Bot, Loadout::default(), NavAgent::default()))
            .id();

        world.run_system_once(configure_new_bots).expect("setup runs");

        let disabled = world.get::<BrainDisabled>(broken).expect("brain disabled");
        assert!(matches!(disabled.reason, DisableReason::Misconfigured(_)));
        assert!(world.get::<BrainDisabled>(healthy).is_none());

        let timers = world.get::<PerceptionTimers>(healthy).expect("timers");
        assert!(timers.acquisition >= 0.0 && timers.acquisition < 0.5);
        assert!(timers.visibility >= 0.0 && timers.visibility < 0.2);
    }
}
