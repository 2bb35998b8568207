//! Kinematic navigation provider для ботов
//!
//! Архитектура:
//! - Locomotion adapter пишет `NavAgent.destination` (intent)
//! - Эта система двигает Transform по прямой к destination (no pathfinding)
//! - Обратно отчитывается: velocity, has_arrived, on_navigable_surface
//! - Поворачивает актора по ходу движения, если `update_rotation`
//!
//! Детерминизм: fixed timestep (`SimClock::dt`), никакого wall clock.

use bevy::prelude::*;

use crate::components::{Dead, LinearVelocity, NavAgent};
use crate::schedules::SimClock;

/// Walkable floor band: the headless world is flat, floor at y=0
const NAVIGABLE_HEIGHT: f32 = 0.5;

/// Heading to face a planar travel direction (None if degenerate)
pub fn planar_heading(direction: Vec3) -> Option<Dir3> {
    Dir3::new(Vec3::new(direction.x, 0.0, direction.z)).ok()
}

/// Один шаг kinematic интеграции к destination.
///
/// Returns the new translation; updates the agent's reported fields.
pub fn step_agent(agent: &mut NavAgent, translation: Vec3, dt: f32) -> Vec3 {
    agent.on_navigable_surface = translation.y.abs() <= NAVIGABLE_HEIGHT;

    let destination = match agent.destination {
        Some(destination) if !agent.stopped => destination,
        _ => {
            agent.velocity = Vec3::ZERO;
            return translation;
        }
    };

    let mut to_destination = destination - translation;
    to_destination.y = 0.0;
    let distance = to_destination.length();

    if distance <= agent.arrival_tolerance {
        agent.has_arrived = true;
        agent.velocity = Vec3::ZERO;
        return translation;
    }

    let direction = to_destination / distance;
    let step = (agent.speed * dt).min(distance);

    agent.velocity = direction * agent.speed;
    if distance - step <= agent.arrival_tolerance {
        agent.has_arrived = true;
    }

    translation + direction * step
}

/// Система: navigation provider step (Movement set, after combat)
///
/// Dead actors don't move.
pub fn integrate_nav_agents(
    mut agents: Query<(&mut NavAgent, &mut Transform, &mut LinearVelocity), Without<Dead>>,
    clock: Res<SimClock>,
) {
    for (mut agent, mut transform, mut velocity) in agents.iter_mut() {
        let next = step_agent(&mut agent, transform.translation, clock.dt);

        if next != transform.translation {
            if agent.update_rotation {
                if let Some(heading) = planar_heading(next - transform.translation) {
                    transform.look_to(heading, Vec3::Y);
                }
            }
            transform.translation = next;
        }

        velocity.0 = agent.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_towards_destination() {
        let mut agent = NavAgent::new(2.0);
        agent.set_destination(Vec3::new(10.0, 0.0, 0.0));

        let next = step_agent(&mut agent, Vec3::ZERO, 0.5);
        assert!((next.x - 1.0).abs() < 1e-5);
        assert_eq!(agent.velocity, Vec3::new(2.0, 0.0, 0.0));
        assert!(!agent.has_arrived);
    }

    #[test]
    fn test_arrival_does_not_overshoot() {
        let mut agent = NavAgent::new(10.0);
        agent.set_destination(Vec3::new(1.0, 0.0, 0.0));

        let next = step_agent(&mut agent, Vec3::ZERO, 1.0);
        assert!((next.x - 1.0).abs() < 1e-5);
        assert!(agent.has_arrived);

        let again = step_agent(&mut agent, next, 1.0);
        assert_eq!(again, next);
        assert_eq!(agent.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_stopped_agent_holds() {
        let mut agent = NavAgent::new(5.0);
        agent.set_destination(Vec3::new(10.0, 0.0, 0.0));
        agent.stop();

        let next = step_agent(&mut agent, Vec3::ZERO, 1.0);
        assert_eq!(next, Vec3::ZERO);
        assert_eq!(agent.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_navigable_surface_flag() {
        let mut agent = NavAgent::default();
        step_agent(&mut agent, Vec3::new(0.0, 3.0, 0.0), 0.1);
        assert!(!agent.on_navigable_surface);

        step_agent(&mut agent, Vec3::ZERO, 0.1);
        assert!(agent.on_navigable_surface);
    }

    #[test]
    fn test_heading_follows_travel_unless_disabled() {
        use bevy::ecs::system::RunSystemOnce;

        let mut world = World::new();
        world.insert_resource(SimClock::default());

        let mut walker = NavAgent::new(3.0);
        walker.set_destination(Vec3::new(10.0, 0.0, 0.0));
        let walker = world
            .spawn((walker, Transform::default(), LinearVelocity::default()))
            .id();

        // Пятится к +Z, продолжая смотреть в -Z
        let mut strafer = NavAgent::new(3.0);
        strafer.set_destination(Vec3::new(0.0, 0.0, 10.0));
        strafer.update_rotation = false;
        let strafer = world
            .spawn((strafer, Transform::default(), LinearVelocity::default()))
            .id();

        world.run_system_once(integrate_nav_agents).expect("movement runs");

        let walked = world.get::<Transform>(walker).expect("transform");
        assert!(walked.forward().dot(Vec3::X) > 0.99);

        let strafed = world.get::<Transform>(strafer).expect("transform");
        assert!(strafed.translation.z > 0.0);
        assert!(strafed.forward().dot(Vec3::NEG_Z) > 0.99);
    }

    #[test]
    fn test_planar_heading() {
        assert_eq!(planar_heading(Vec3::Y), None);
        assert_eq!(planar_heading(Vec3::new(0.0, 5.0, -2.0)), Some(Dir3::NEG_Z));
    }
}
