//! Players: resources, status flags, cards and AI personality.

pub mod personality;
pub mod player;

pub use personality::Personality;
pub use player::{Player, ReductionFlags};
