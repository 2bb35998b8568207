//! AI systems (perception → decision → relay → locomotion)

pub mod decision;
pub mod locomotion;
pub mod perception;
pub mod relay;
pub mod setup;

// Re-export all systems
pub use decision::*;
pub use locomotion::*;
pub use perception::*;
pub use relay::*;
pub use setup::*;
