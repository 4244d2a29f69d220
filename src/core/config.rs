//! Game configuration.
//!
//! A `GameConfig` fixes the seats and every rules constant the engine reads.
//! It is plain serde data so a front end can load it from any format; the
//! engine itself never touches files.
//!
//! ```
//! use siege_dice::core::{ControlKind, GameConfig};
//!
//! let config = GameConfig::new()
//!     .with_seat("Ada", ControlKind::Human)
//!     .with_seat("Bot", ControlKind::Ai)
//!     .with_win_points(15)
//!     .with_seed(99);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.seat_count(), 2);
//! ```

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// Who answers a seat's decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    /// Waits for `submit_decision` (or the timeout default in timed mode).
    Human,
    /// Answered by the engine's decision policy after the think time.
    Ai,
}

/// One seat at the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatConfig {
    pub name: String,
    pub control: ControlKind,
}

impl SeatConfig {
    pub fn new(name: impl Into<String>, control: ControlKind) -> Self {
        Self {
            name: name.into(),
            control,
        }
    }
}

/// Complete rules configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seats in turn order.
    pub seats: Vec<SeatConfig>,

    /// Points needed to win.
    pub win_points: i32,
    pub max_health: i32,
    pub starting_health: i32,
    pub starting_currency: i32,

    /// Extra win gate: winners must have spent more than this many hours
    /// inside. Zero disables the gate.
    pub min_siege_hours: u32,

    /// Dice rolled on a standard turn.
    pub num_dice: usize,
    /// Hard ceiling on dice in play, including card bonuses.
    pub max_dice: usize,
    /// Roll batches per standard turn.
    pub max_rolls: u8,

    pub enter_inside_points: i32,
    pub start_turn_inside_points: i32,
    pub refresh_cost: i32,
    /// Face-up cards in the market.
    pub card_visibility: usize,
    pub rebirth_health: i32,
    /// Points a SkullCollector copy earns per death.
    pub skull_collecting_points: i32,

    /// Seconds a human has before the default option fires (timed mode only).
    pub decision_time: f32,
    /// Seconds before an AI decision is committed during `tick`.
    pub ai_think_time: f32,
    pub timed_turns: bool,

    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seats: Vec::new(),
            win_points: 20,
            max_health: 10,
            starting_health: 10,
            starting_currency: 0,
            min_siege_hours: 0,
            num_dice: 6,
            max_dice: 8,
            max_rolls: 3,
            enter_inside_points: 1,
            start_turn_inside_points: 2,
            refresh_cost: 2,
            card_visibility: 3,
            rebirth_health: 10,
            skull_collecting_points: 2,
            decision_time: 5.0,
            ai_think_time: 0.25,
            timed_turns: false,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Default rules with no seats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default rules with `count` AI seats.
    #[must_use]
    pub fn all_ai(count: usize) -> Self {
        (0..count).fold(Self::new(), |config, i| {
            config.with_seat(format!("Player {}", i + 1), ControlKind::Ai)
        })
    }

    #[must_use]
    pub fn with_seat(mut self, name: impl Into<String>, control: ControlKind) -> Self {
        self.seats.push(SeatConfig::new(name, control));
        self
    }

    #[must_use]
    pub fn with_win_points(mut self, points: i32) -> Self {
        self.win_points = points;
        self
    }

    #[must_use]
    pub fn with_max_health(mut self, health: i32) -> Self {
        self.max_health = health;
        self.starting_health = self.starting_health.min(health);
        self
    }

    #[must_use]
    pub fn with_starting_currency(mut self, currency: i32) -> Self {
        self.starting_currency = currency;
        self
    }

    #[must_use]
    pub fn with_min_siege_hours(mut self, hours: u32) -> Self {
        self.min_siege_hours = hours;
        self
    }

    #[must_use]
    pub fn with_timed_turns(mut self, decision_time: f32) -> Self {
        self.timed_turns = true;
        self.decision_time = decision_time;
        self
    }

    #[must_use]
    pub fn with_ai_think_time(mut self, seconds: f32) -> Self {
        self.ai_think_time = seconds;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// Check the configuration is playable.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if self.seats.is_empty() || self.seats.len() > 8 {
            return invalid(format!("{} seats; expected 1 to 8", self.seats.len()));
        }
        if self.max_health <= 0 || self.starting_health <= 0 {
            return invalid("health values must be positive".into());
        }
        if self.starting_health > self.max_health {
            return invalid(format!(
                "starting health {} exceeds max health {}",
                self.starting_health, self.max_health
            ));
        }
        if self.num_dice > self.max_dice {
            return invalid(format!(
                "{} dice exceeds the {} dice limit",
                self.num_dice, self.max_dice
            ));
        }
        if self.win_points <= 0 {
            return invalid("win points must be positive".into());
        }
        if self.decision_time <= 0.0 || self.ai_think_time < 0.0 {
            return invalid("timers must be non-negative and decisions must allow time".into());
        }
        Ok(())
    }
}
