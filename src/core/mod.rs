//! Core engine types: players, state, RNG, configuration and errors.

pub mod config;
pub mod error;
pub mod history;
pub mod player;
pub mod rng;
pub mod state;

pub use config::{ControlKind, GameConfig, SeatConfig};
pub use error::{EngineError, Result};
pub use history::DecisionRecord;
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use state::{GameState, PlayerIds, SiegeClock, TurnFlags};
