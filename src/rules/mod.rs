//! The rules engine.
//!
//! `Engine` owns the game state, the decision queue, the card catalog and
//! the AI policy. Each submodule adds the rules for one part of the turn:
//!
//! - `turn`: start, roll, resolve and end
//! - `cascade`: post-roll card options and heal-face spending
//! - `health`: damage, healing, death and damage reduction
//! - `inside`: entering and leaving the contested area
//! - `market`: buying, refreshing, refunds and duplicates
//! - `resources`: points, currency and card collection primitives

mod cascade;
pub mod engine;
mod health;
mod inside;
mod market;
mod resources;
mod turn;

pub use engine::{Engine, GameResult};
