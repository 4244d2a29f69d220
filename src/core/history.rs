//! Resolved decision records.
//!
//! Every resolution appends one record to `GameState::history`, a persistent
//! `im::Vector`, so snapshots of the state share the log cheaply.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::decision::{DecisionId, DecisionKind, GameOption};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: DecisionId,
    pub kind: DecisionKind,
    pub player: Option<PlayerId>,
    pub option: GameOption,
    pub argument: i32,
    /// Index of the game on this table, starting at 0.
    pub game: u32,
    pub day: u32,
    pub hour: u32,
}

impl std::fmt::Display for DecisionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let who = self
            .player
            .map_or_else(|| "System".to_string(), |p| p.to_string());
        write!(
            f,
            "[day {} hour {}] {} {:?}: {}",
            self.day, self.hour, who, self.kind, self.option
        )?;
        if self.argument != 0 {
            write!(f, " ({})", self.argument)?;
        }
        Ok(())
    }
}
