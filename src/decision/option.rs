//! Options: the atomic commands a decision can resolve to.
//!
//! An option is a tagged command, not a closure. The payload names the
//! players, cards or amounts involved and the engine resolves it against the
//! current state in one central match.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardId, CardKind};
use crate::core::PlayerId;
use crate::dice::Face;

/// Damage waiting on a reduction decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageClaim {
    pub target: PlayerId,
    pub source: Option<PlayerId>,
    pub amount: i32,
}

impl DamageClaim {
    #[must_use]
    pub fn new(target: PlayerId, source: Option<PlayerId>, amount: i32) -> Self {
        Self {
            target,
            source,
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOption {
    // === Turn flow ===
    StartTurn,
    Roll,
    KeepRolls,
    Resolve,
    Stay(PlayerId),
    Leave(PlayerId),
    EndTurn,
    NewGame,

    // === Market ===
    FinishedBrowsing,
    RefreshCards,
    BuyCard(CardId),
    BuyCardInstantly(CardId),
    DontBuy,

    // === Damage reduction ===
    IgnoreDamageReduction(DamageClaim),
    PayToBecomeInvulnerable(DamageClaim),
    GainPayToReduceDamage(DamageClaim),
    /// Argument: points of damage bought off at 2 currency each.
    PayToReduceDamage(DamageClaim),
    GainRollToReduceDamage(DamageClaim),
    RollToReduceDamage(DamageClaim),

    // === Post-roll changes ===
    IgnoreSpecialRollChanges,
    GainExtraRoll,
    PayToGainExtraRoll,
    GainChangeDieResult,
    PayToGainChangeDieResult,
    GainChangeDieResultToOne,
    GainRerollThrees,
    /// Argument: face index for the selected die.
    ChangeDieResult,
    ChangeDieResultToValue(Face),

    // === Enemy die changes ===
    IgnoreEnemyRollChanges(PlayerId),
    GainRerollEnemyDie(PlayerId),
    RerollEnemyDie(PlayerId),

    // === Special die usage ===
    IgnoreSpecialDieUsage,
    GainHealEnemy,
    GainReduceVenom,
    GainReviveDeadDice,
    /// Argument: the enemy's seat index.
    ChooseEnemyToHeal,
    /// Argument: heal faces spent.
    HealEnemy,
    ReduceVenomLevel,
    ReviveDeadDice,

    // === Card management ===
    DuplicateCard { card: CardId, target: CardKind },
    FinishedDuplicating,
    RefundCard(CardId),
    FinishedRefunding,
}

impl GameOption {
    /// Short display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        use GameOption::*;
        match self {
            StartTurn => "Start Turn",
            Roll => "Roll",
            KeepRolls => "Keep Rolls",
            Resolve => "Resolve",
            Stay(_) => "Stay",
            Leave(_) => "Leave",
            EndTurn => "End Turn",
            NewGame => "New Game",
            FinishedBrowsing => "Finished Browsing",
            RefreshCards => "Refresh Cards",
            BuyCard(_) => "Buy Card",
            BuyCardInstantly(_) => "Buy Card Instantly",
            DontBuy => "Don't Buy",
            IgnoreDamageReduction(_) => "Take Damage",
            PayToBecomeInvulnerable(_) => "Become Invulnerable",
            GainPayToReduceDamage(_) => "Pay to Reduce Damage",
            PayToReduceDamage(_) => "Pay",
            GainRollToReduceDamage(_) => "Roll to Reduce Damage",
            RollToReduceDamage(_) => "Roll",
            IgnoreSpecialRollChanges => "Continue",
            GainExtraRoll => "Extra Roll",
            PayToGainExtraRoll => "Pay for Extra Roll",
            GainChangeDieResult => "Change Die",
            PayToGainChangeDieResult => "Pay to Change Die",
            GainChangeDieResultToOne => "Change Die to One",
            GainRerollThrees => "Reroll Threes",
            ChangeDieResult => "Set Die",
            ChangeDieResultToValue(_) => "Set Die",
            IgnoreEnemyRollChanges(_) => "Continue",
            GainRerollEnemyDie(_) => "Reroll Enemy Die",
            RerollEnemyDie(_) => "Reroll",
            IgnoreSpecialDieUsage => "Continue",
            GainHealEnemy => "Heal Enemy",
            GainReduceVenom => "Reduce Venom",
            GainReviveDeadDice => "Revive Dice",
            ChooseEnemyToHeal => "Choose Enemy",
            HealEnemy => "Heal",
            ReduceVenomLevel => "Reduce Venom",
            ReviveDeadDice => "Revive",
            DuplicateCard { .. } => "Duplicate",
            FinishedDuplicating => "Continue",
            RefundCard(_) => "Refund",
            FinishedRefunding => "Continue",
        }
    }
}

impl std::fmt::Display for GameOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GameOption::*;
        match self {
            Stay(p) | Leave(p) => write!(f, "{} ({})", self.name(), p),
            BuyCard(c) | BuyCardInstantly(c) | RefundCard(c) => write!(f, "{} {}", self.name(), c),
            ChangeDieResultToValue(face) => write!(f, "{} to {}", self.name(), face),
            DuplicateCard { target, .. } => write!(f, "{} {:?}", self.name(), target),
            _ => f.write_str(self.name()),
        }
    }
}

/// What argument a decision accepts alongside its option.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentSpec {
    /// Discrete decision: the argument is ignored.
    #[default]
    Ignored,
    /// Any value in `min..=max`.
    Range { min: i32, max: i32 },
    /// One of a fixed set of values (seat indices).
    OneOf(SmallVec<[i32; 8]>),
}

impl ArgumentSpec {
    #[must_use]
    pub fn accepts(&self, argument: i32) -> bool {
        match self {
            ArgumentSpec::Ignored => true,
            ArgumentSpec::Range { min, max } => (*min..=*max).contains(&argument),
            ArgumentSpec::OneOf(values) => values.contains(&argument),
        }
    }

    /// Smallest and largest accepted values, for error reports.
    #[must_use]
    pub fn bounds(&self) -> (i32, i32) {
        match self {
            ArgumentSpec::Ignored => (i32::MIN, i32::MAX),
            ArgumentSpec::Range { min, max } => (*min, *max),
            ArgumentSpec::OneOf(values) => (
                values.iter().copied().min().unwrap_or(0),
                values.iter().copied().max().unwrap_or(0),
            ),
        }
    }
}
