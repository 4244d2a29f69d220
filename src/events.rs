//! Presentation events.
//!
//! The engine pushes an event after each visible state change and never
//! waits on the consumer. A front end drains them with
//! `Engine::drain_events` and animates at its own pace.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardKind};
use crate::core::PlayerId;
use crate::decision::{DecisionId, DecisionKind};
use crate::dice::{DiceSummary, Face};
use crate::rules::GameResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TurnStarted {
        player: PlayerId,
        day: u32,
        hour: u32,
    },
    DiceRolled {
        player: PlayerId,
        dice: Vec<(usize, Face)>,
    },
    DieHeld {
        die: usize,
        held: bool,
    },
    /// A card set a die to a face, or consumed it (`None`).
    DieChanged {
        die: usize,
        face: Option<Face>,
    },
    DiceResolved {
        player: PlayerId,
        summary: DiceSummary,
    },
    HealthChanged {
        player: PlayerId,
        delta: i32,
        health: i32,
    },
    DamageNegated {
        player: PlayerId,
        amount: i32,
    },
    PointsChanged {
        player: PlayerId,
        delta: i32,
        points: i32,
    },
    CurrencyChanged {
        player: PlayerId,
        delta: i32,
        currency: i32,
    },
    Attack {
        player: PlayerId,
        damage: i32,
    },
    EnteredInside {
        player: PlayerId,
    },
    LeftInside {
        player: PlayerId,
    },
    PlayerDied {
        player: PlayerId,
    },
    PlayerReborn {
        player: PlayerId,
    },
    CardBought {
        player: PlayerId,
        card: CardId,
        kind: CardKind,
        cost: i32,
        /// Previous owner when bought from an enemy.
        from: Option<PlayerId>,
    },
    CardRemoved {
        player: PlayerId,
        card: CardId,
        kind: CardKind,
    },
    MarketRefreshed {
        discarded: usize,
    },
    DecisionPresented {
        decision: DecisionId,
        kind: DecisionKind,
        player: Option<PlayerId>,
    },
    GameOver {
        result: GameResult,
    },
}
