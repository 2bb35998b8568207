//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: health ledger (Actor, Health, HealthSource), bot identity, death markers
//! - movement: navigation provider contract (NavAgent, LinearVelocity)
//! - world: patrol routes, blocking volumes

pub mod actor;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use world::*;
