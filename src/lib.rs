//! # siege-dice
//!
//! A rules engine for a multiplayer siege dice game: players roll six dice
//! up to three times, score sets of numbers, heal, collect currency and
//! attack whoever holds the contested inside area. Currency buys modifier
//! cards that hook into fixed points of the turn.
//!
//! ## Design Principles
//!
//! 1. **Decisions drive everything**: every step of a turn is a `Decision`
//!    on a FIFO queue. Resolving it runs one `GameOption` and enqueues the
//!    successors. The queue is never left empty.
//!
//! 2. **Explicit context**: the `Engine` owns the state, the queue, the card
//!    catalog and the AI policy. Rules take it as `&mut self`; nothing
//!    reaches for a global.
//!
//! 3. **Cards are data**: the engine asks the `CardCatalog` which held
//!    cards react to a trigger point instead of checking card ids inline.
//!
//! 4. **Reproducible**: all randomness comes from one seeded ChaCha stream,
//!    so a seed replays a whole game.
//!
//! ## Modules
//!
//! - `core`: seats, state, siege clock, RNG, configuration, errors
//! - `players`: player resources and AI personality
//! - `dice`: the dice tray and face summaries
//! - `cards`: card definitions, the catalog seam and the market
//! - `decision`: decisions, options and the decision queue
//! - `rules`: the engine and the turn rules
//! - `ai`: decision policies
//! - `events`: presentation intents drained by a front end
//! - `session`: the top-level owner of an engine
//!
//! ## Example
//!
//! ```
//! use siege_dice::{GameConfig, GameSession};
//!
//! let mut session = GameSession::new(GameConfig::all_ai(3).with_seed(7)).unwrap();
//! let outcome = session.play_until_game_over(20_000).unwrap();
//! assert!(outcome.result.is_some());
//! ```

pub mod ai;
pub mod cards;
pub mod core;
pub mod decision;
pub mod dice;
pub mod events;
pub mod players;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    ControlKind, DecisionRecord, EngineError, GameConfig, GameRng, GameState, PlayerId, PlayerMap,
    Result, SeatConfig, SiegeClock,
};

pub use crate::players::{Personality, Player};

pub use crate::dice::{DiceState, DiceSummary, Face};

pub use crate::cards::{
    AttributeFamily, Card, CardAttribute, CardCatalog, CardDefinition, CardId, CardKind,
    CardRegistry, Market, TriggerPoint,
};

pub use crate::decision::{
    ArgumentSpec, DamageClaim, Decision, DecisionId, DecisionKind, DecisionQueue, GameOption,
};

pub use crate::rules::{Engine, GameResult};

pub use crate::ai::{AiChoice, DecisionPolicy, DefaultPolicy, HeuristicPolicy};

pub use crate::events::GameEvent;

pub use crate::session::{GameOutcome, GameSession};
