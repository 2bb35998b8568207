//! Combat components

pub mod loadout;
pub mod tuning;


// Re-export all components
pub use loadout::*;
pub use tuning::*;
