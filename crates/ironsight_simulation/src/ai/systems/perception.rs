//! Perception sampler (combatant index, stale target cleanup, throttled visibility).
//!
//! Cheap checks run every tick; the expensive ones (closest-enemy scan,
//! obstruction trace) run on per-bot timers.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::ai::{Bot, BotConfig, BrainDisabled, PerceptionTimers, TargetMemory, TargetTracker};
use crate::components::{Actor, Dead, Health, HealthSource, LinearVelocity, TeamId, Vitals};
use crate::physics::Occluders;
use crate::schedules::SimClock;

/// Snapshot одного combatant'а на начало тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combatant {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    pub team: TeamId,
    pub alive: bool,
}

/// Read-only candidate list for this tick
///
/// Rebuilt at the start of Perception; decision, relay, locomotion and combat
/// read positions from here instead of querying other bots' Transforms.
#[derive(Resource, Debug, Default)]
pub struct CombatantIndex {
    combatants: Vec<Combatant>,
    slots: HashMap<Entity, usize>,
}

impl CombatantIndex {
    pub fn from_combatants(mut combatants: Vec<Combatant>) -> Self {
        combatants.sort_by_key(|combatant| combatant.entity.index());
        let slots = combatants
            .iter()
            .enumerate()
            .map(|(slot, combatant)| (combatant.entity, slot))
            .collect();
        Self { combatants, slots }
    }

    pub fn get(&self, entity: Entity) -> Option<&Combatant> {
        self.slots.get(&entity).map(|&slot| &self.combatants[slot])
    }

    /// Only living combatants (dead or despawned → None)
    pub fn living(&self, entity: Entity) -> Option<&Combatant> {
        self.get(entity).filter(|combatant| combatant.alive)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Closest living candidate of an opposing affiliation
    pub fn closest_hostile(&self, seeker: Entity, team: TeamId, from: Vec3) -> Option<&Combatant> {
        let seeker_actor = Actor::new(team);
        self.combatants
            .iter()
            .filter(|candidate| candidate.entity != seeker && candidate.alive)
            .filter(|candidate| seeker_actor.is_hostile_to(candidate.team))
            .min_by(|a, b| {
                a.position
                    .distance_squared(from)
                    .total_cmp(&b.position.distance_squared(from))
            })
    }
}

/// Viewer side of a visibility query
#[derive(Debug, Clone, Copy)]
pub struct Viewpoint {
    pub entity: Entity,
    pub position: Vec3,
    pub forward: Vec3,
}

/// Visibility = distance ≤ view radius AND inside the FOV cone AND the
/// eye → torso trace hits nothing that isn't rooted at the target.
pub fn is_target_visible(
    viewer: &Viewpoint,
    target: &Combatant,
    config: &BotConfig,
    occluders: &Occluders,
) -> bool {
    if viewer.position.distance(target.position) > config.view_radius {
        return false;
    }

    // FOV cone (planar): стоя вплотную угол не определён: считаем в конусе
    let to_target = Vec3::new(
        target.position.x - viewer.position.x,
        0.0,
        target.position.z - viewer.position.z,
    );
    let forward = Vec3::new(viewer.forward.x, 0.0, viewer.forward.z);
    if let (Some(to_target), Some(forward)) = (to_target.try_normalize(), forward.try_normalize()) {
        if forward.dot(to_target) < config.half_fov_cos() {
            return false;
        }
    }

    let eye = viewer.position + Vec3::Y * config.eye_height;
    let torso = target.position + Vec3::Y * config.torso_offset;
    occluders.segment_clear(eye, torso, &[target.entity, viewer.entity])
}

/// Система: пересобрать CombatantIndex (Perception)
pub fn refresh_combatant_index(
    mut index: ResMut<CombatantIndex>,
    combatants: Query<(Entity, &Transform, &Actor, &Health, Option<&LinearVelocity>)>,
) {
    let snapshot = combatants
        .iter()
        .map(|(entity, transform, actor, health, velocity)| {
            let vitals = Vitals::new(actor, health);
            Combatant {
                entity,
                position: transform.translation,
                velocity: velocity.map(|v| v.0).unwrap_or(Vec3::ZERO),
                team: vitals.team(),
                alive: !vitals.is_dead(),
            }
        })
        .collect();

    *index = CombatantIndex::from_combatants(snapshot);
}

/// Система: снять ссылки на мёртвые/despawned цели (каждый тик, без trace)
///
/// Memory is kept: the bot still searches the last known position.
pub fn invalidate_stale_targets(
    mut bots: Query<(Entity, &mut TargetTracker), (With<Bot>, Without<Dead>, Without<BrainDisabled>)>,
    index: Res<CombatantIndex>,
) {
    for (entity, mut tracker) in bots.iter_mut() {
        let Some(target) = tracker.target else {
            continue;
        };

        if index.living(target).is_none() {
            tracker.clear();
            crate::log(&format!("👻 {:?}: target {:?} is gone, cleared", entity, target));
        }
    }
}

/// Система: throttled acquisition + visibility, memory update
pub fn sample_perception(
    mut bots: Query<
        (
            Entity,
            &Transform,
            &Actor,
            &BotConfig,
            &mut TargetTracker,
            &mut TargetMemory,
            &mut PerceptionTimers,
        ),
        (With<Bot>, Without<Dead>, Without<BrainDisabled>),
    >,
    index: Res<CombatantIndex>,
    occluders: Res<Occluders>,
    clock: Res<SimClock>,
) {
    let dt = clock.dt;

    for (entity, transform, actor, config, mut tracker, mut memory, mut timers) in bots.iter_mut() {
        let position = transform.translation;

        // 1. Target acquisition (closest living enemy)
        timers.acquisition -= dt;
        if timers.acquisition <= 0.0 {
            timers.acquisition = config.target_acquisition_interval;
            match index.closest_hostile(entity, actor.team, position) {
                Some(candidate) => tracker.set_target(candidate.entity),
                None => tracker.clear(),
            }
        }

        // 2. Visibility (no candidate → no trace)
        let target = tracker.target.and_then(|target| index.living(target)).copied();
        match target {
            Some(target) => {
                tracker.distance = position.distance(target.position);

                timers.visibility -= dt;
                if timers.visibility <= 0.0 {
                    timers.visibility = config.vision_check_interval;
                    let viewer = Viewpoint {
                        entity,
                        position,
                        forward: *transform.forward(),
                    };
                    tracker.visible = is_target_visible(&viewer, &target, config, &occluders);
                }

                // 3. Memory
                if tracker.visible {
                    memory.record_sighting(target.position);
                } else {
                    memory.age(dt);
                }
            }
            None => {
                tracker.visible = false;
                memory.age(dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::NEUTRAL_TEAM;
    use crate::physics::Occluder;
    use bevy::math::bounding::Aabb3d;

    fn combatant(index: u32, position: Vec3, team: TeamId, alive: bool) -> Combatant {
        Combatant {
            entity: Entity::from_raw(index),
            position,
            velocity: Vec3::ZERO,
            team,
            alive,
        }
    }

    fn viewer_at_origin_facing_x() -> Viewpoint {
        Viewpoint {
            entity: Entity::from_raw(100),
            position: Vec3::ZERO,
            forward: Vec3::X,
        }
    }

    #[test]
    fn test_closest_hostile_skips_allies_dead_and_neutral() {
        let seeker = Entity::from_raw(0);
        let index = CombatantIndex::from_combatants(vec![
            combatant(0, Vec3::ZERO, 1, true),
            combatant(1, Vec3::new(1.0, 0.0, 0.0), 1, true), // союзник
            combatant(2, Vec3::new(2.0, 0.0, 0.0), 0, false), // мёртв
            combatant(3, Vec3::new(3.0, 0.0, 0.0), NEUTRAL_TEAM, true),
            combatant(4, Vec3::new(9.0, 0.0, 0.0), 0, true),
            combatant(5, Vec3::new(5.0, 0.0, 0.0), 0, true),
        ]);

        let closest = index.closest_hostile(seeker, 1, Vec3::ZERO).expect("enemy exists");
        assert_eq!(closest.entity, Entity::from_raw(5));
    }

    #[test]
    fn test_living_lookup() {
        let index = CombatantIndex::from_combatants(vec![
            combatant(1, Vec3::ZERO, 0, true),
            combatant(2, Vec3::ZERO, 0, false),
        ]);
        assert!(index.living(Entity::from_raw(1)).is_some());
        assert!(index.living(Entity::from_raw(2)).is_none());
        assert!(index.get(Entity::from_raw(2)).is_some());
        assert!(index.living(Entity::from_raw(3)).is_none());
    }

    #[test]
    fn test_clear_line_is_visible() {
        let config = BotConfig::default();
        let target = combatant(1, Vec3::new(20.0, 0.0, 0.0), 0, true);
        assert!(is_target_visible(
            &viewer_at_origin_facing_x(),
            &target,
            &config,
            &Occluders::default()
        ));
    }

    #[test]
    fn test_blocker_hides_target() {
        let config = BotConfig::default();
        let target = combatant(1, Vec3::new(20.0, 0.0, 0.0), 0, true);
        let occluders = Occluders {
            volumes: vec![Occluder {
                entity: Entity::from_raw(50),
                aabb: Aabb3d::new(Vec3::new(10.0, 1.5, 0.0), Vec3::new(0.5, 1.5, 2.0)),
                root: None,
            }],
        };

        assert!(!is_target_visible(&viewer_at_origin_facing_x(), &target, &config, &occluders));
    }

    #[test]
    fn test_out_of_range_or_behind() {
        let config = BotConfig::default();
        let far = combatant(1, Vec3::new(61.0, 0.0, 0.0), 0, true);
        let behind = combatant(2, Vec3::new(-10.0, 0.0, 0.0), 0, true);
        let viewer = viewer_at_origin_facing_x();

        assert!(!is_target_visible(&viewer, &far, &config, &Occluders::default()));
        assert!(!is_target_visible(&viewer, &behind, &config, &Occluders::default()));
    }
}
