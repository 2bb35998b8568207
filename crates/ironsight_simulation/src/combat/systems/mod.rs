//! Combat systems (resolver → hit-scan → health ledger → deaths)

pub mod damage;
pub mod projectile;
pub mod resolver;


// Re-export all systems
pub use damage::*;
pub use projectile::*;
pub use resolver::*;
