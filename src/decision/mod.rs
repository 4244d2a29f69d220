//! Decisions: pending choice points in the turn flow.
//!
//! ## Decision
//!
//! A decision names the responding player (or `None` for the table), the
//! legal options, a default option and argument used on timeout, and three
//! flags:
//!
//! - `is_discrete`: only an option is needed, no numeric argument
//! - `is_necessary`: part of the forced turn flow and cannot be skipped
//! - `is_sequential`: belongs to the acting player's ordinary sequence,
//!   as opposed to an interjection by another player
//!
//! Decisions are built by one factory per [`DecisionKind`], enqueued on the
//! [`DecisionQueue`] and resolved exactly once.

mod option;
mod queue;

pub use option::{ArgumentSpec, DamageClaim, GameOption};
pub use queue::DecisionQueue;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::cards::{CardId, CardKind};
use crate::core::PlayerId;
use crate::dice::{DieIndices, Face};

/// Seconds a human has to respond when timed turns are on.
pub const DEFAULT_DECISION_TIME: f32 = 5.0;

/// Option lists; most decisions offer two to four.
pub type Options = SmallVec<[GameOption; 4]>;

/// Identifier of one enqueued decision, unique within an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecisionId(pub u32);

impl DecisionId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decision({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionKind {
    StartTurn,
    FirstRoll,
    IntermediateRoll,
    NoMoreRolls,
    LeaveOrStay,
    BrowseCards,
    BuyCardInstantly,
    EndTurn,
    NewGame,
    SpecialDamageReduction,
    PayToReduceDamage,
    RollToReduceDamage,
    SpecialRollChange,
    ChangeDieResult,
    ChangeDieResultToValue,
    SpecialDieUsage,
    ChooseEnemyToHeal,
    HealEnemy,
    ReduceVenomLevel,
    ReduceDeadDice,
    GainRerollEnemyDie,
    RerollEnemyDie,
    SetCardBeingDuplicatedFirstTime,
    ChangeCardBeingDuplicated,
    RefundCards,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Assigned by the queue on enqueue.
    pub id: DecisionId,
    pub kind: DecisionKind,
    pub player: Option<PlayerId>,
    pub description: String,
    pub options: Options,
    pub default_option: usize,
    pub default_argument: i32,
    pub argument: ArgumentSpec,
    pub time_to_respond: f32,
    pub is_discrete: bool,
    pub is_necessary: bool,
    pub is_sequential: bool,
    /// AI scratch: dice not yet committed to hold or reroll.
    pub undecided_dice: DieIndices,
    resolved: bool,
}

impl Decision {
    /// A discrete, optional, sequential decision defaulting to its first
    /// option. Factories adjust from here.
    pub fn new(
        kind: DecisionKind,
        player: Option<PlayerId>,
        description: impl Into<String>,
        options: Options,
    ) -> Self {
        debug_assert!(!options.is_empty(), "{:?} built without options", kind);
        Self {
            id: DecisionId::new(0),
            kind,
            player,
            description: description.into(),
            options,
            default_option: 0,
            default_argument: 0,
            argument: ArgumentSpec::Ignored,
            time_to_respond: DEFAULT_DECISION_TIME,
            is_discrete: true,
            is_necessary: false,
            is_sequential: true,
            undecided_dice: DieIndices::new(),
            resolved: false,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, is_discrete: bool, is_necessary: bool, is_sequential: bool) -> Self {
        self.is_discrete = is_discrete;
        self.is_necessary = is_necessary;
        self.is_sequential = is_sequential;
        self
    }

    /// Accept a numeric argument with the given default.
    #[must_use]
    pub fn with_argument(mut self, spec: ArgumentSpec, default: i32) -> Self {
        self.argument = spec;
        self.default_argument = default;
        self
    }

    #[must_use]
    pub fn default_choice(&self) -> (&GameOption, i32) {
        let index = self.default_option.min(self.options.len().saturating_sub(1));
        (&self.options[index], self.default_argument)
    }

    #[must_use]
    pub fn offers(&self, option: &GameOption) -> bool {
        self.options.contains(option)
    }

    /// First offered option matching a predicate.
    pub fn find_option(&self, predicate: impl Fn(&GameOption) -> bool) -> Option<&GameOption> {
        self.options.iter().find(|o| predicate(o))
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    // === Turn flow ===

    pub fn start_turn(player: PlayerId) -> Self {
        Self::new(DecisionKind::StartTurn, Some(player), "Start Turn", smallvec![GameOption::StartTurn])
            .with_flags(true, true, true)
    }

    pub fn first_roll(player: PlayerId) -> Self {
        Self::new(DecisionKind::FirstRoll, Some(player), "Roll Dice", smallvec![GameOption::Roll])
            .with_flags(true, true, true)
    }

    /// Roll again or keep the current results. `undecided` seeds the AI
    /// working set with the unheld dice.
    pub fn intermediate_roll(player: PlayerId, undecided: DieIndices) -> Self {
        let mut decision = Self::new(
            DecisionKind::IntermediateRoll,
            Some(player),
            "Hold dice and roll again, or keep the results",
            smallvec![GameOption::Roll, GameOption::KeepRolls],
        )
        .with_flags(true, false, true);
        decision.undecided_dice = undecided;
        decision
    }

    pub fn no_more_rolls(player: PlayerId) -> Self {
        Self::new(DecisionKind::NoMoreRolls, Some(player), "Resolve Dice", smallvec![GameOption::Resolve])
            .with_flags(true, true, true)
    }

    pub fn leave_or_stay(player: PlayerId) -> Self {
        Self::new(
            DecisionKind::LeaveOrStay,
            Some(player),
            "Leave or stay inside?",
            smallvec![GameOption::Stay(player), GameOption::Leave(player)],
        )
        .with_flags(true, false, true)
    }

    /// Browse the market. Buy options are rebuilt from the live state when
    /// the decision is presented, so the list given here may be stale.
    pub fn browse_cards(player: PlayerId, can_refresh: bool, buyable: &[CardId]) -> Self {
        let mut options: Options = smallvec![GameOption::FinishedBrowsing];
        if can_refresh {
            options.push(GameOption::RefreshCards);
        }
        options.extend(buyable.iter().map(|c| GameOption::BuyCard(*c)));
        Self::new(DecisionKind::BrowseCards, Some(player), "Browse Cards", options)
            .with_flags(true, true, true)
    }

    pub fn buy_card_instantly(player: PlayerId, card: CardId) -> Self {
        Self::new(
            DecisionKind::BuyCardInstantly,
            Some(player),
            format!("Buy {} before anyone else?", card),
            smallvec![GameOption::DontBuy, GameOption::BuyCardInstantly(card)],
        )
        .with_flags(true, false, false)
    }

    pub fn end_turn(player: PlayerId) -> Self {
        Self::new(DecisionKind::EndTurn, Some(player), "End Turn", smallvec![GameOption::EndTurn])
            .with_flags(true, true, true)
    }

    pub fn new_game() -> Self {
        Self::new(DecisionKind::NewGame, None, "Game Over. Play again?", smallvec![GameOption::NewGame])
            .with_flags(true, false, false)
    }

    // === Damage reduction ===

    /// `reductions` are the eligible reduction options; "take the damage"
    /// is always offered first and is the default.
    pub fn special_damage_reduction(claim: DamageClaim, reductions: &[GameOption]) -> Self {
        let mut options: Options = smallvec![GameOption::IgnoreDamageReduction(claim)];
        options.extend(reductions.iter().cloned());
        Self::new(
            DecisionKind::SpecialDamageReduction,
            Some(claim.target),
            format!("Reduce {} incoming damage?", claim.amount),
            options,
        )
        .with_flags(true, false, false)
    }

    pub fn pay_to_reduce_damage(claim: DamageClaim, max: i32) -> Self {
        Self::new(
            DecisionKind::PayToReduceDamage,
            Some(claim.target),
            "Pay 2 currency per point of damage prevented",
            smallvec![GameOption::PayToReduceDamage(claim)],
        )
        .with_flags(false, false, true)
        .with_argument(ArgumentSpec::Range { min: 0, max: max.max(0) }, 0)
    }

    pub fn roll_to_reduce_damage(claim: DamageClaim) -> Self {
        Self::new(
            DecisionKind::RollToReduceDamage,
            Some(claim.target),
            "Roll: each heal prevents one damage",
            smallvec![GameOption::RollToReduceDamage(claim)],
        )
        .with_flags(true, false, false)
    }

    // === Post-roll cascade ===

    pub fn special_roll_change(player: PlayerId, changes: &[GameOption]) -> Self {
        let mut options: Options = smallvec![GameOption::IgnoreSpecialRollChanges];
        options.extend(changes.iter().cloned());
        Self::new(DecisionKind::SpecialRollChange, Some(player), "Use a card to change the roll?", options)
            .with_flags(true, false, true)
    }

    /// Set the selected die to any face; the argument is the face index.
    pub fn change_die_result(player: PlayerId) -> Self {
        Self::new(
            DecisionKind::ChangeDieResult,
            Some(player),
            "Choose a die and its new face",
            smallvec![GameOption::ChangeDieResult],
        )
        .with_flags(false, false, true)
        .with_argument(
            ArgumentSpec::Range {
                min: 0,
                max: Face::COUNT as i32 - 1,
            },
            0,
        )
    }

    pub fn change_die_result_to_value(player: PlayerId, face: Face) -> Self {
        Self::new(
            DecisionKind::ChangeDieResultToValue,
            Some(player),
            format!("Choose a die to change to {}", face),
            smallvec![GameOption::ChangeDieResultToValue(face)],
        )
        .with_flags(true, false, true)
    }

    pub fn special_die_usage(player: PlayerId, usages: &[GameOption]) -> Self {
        let mut options: Options = smallvec![GameOption::IgnoreSpecialDieUsage];
        options.extend(usages.iter().cloned());
        Self::new(DecisionKind::SpecialDieUsage, Some(player), "Spend heal dice on a card?", options)
            .with_flags(true, false, true)
    }

    pub fn choose_enemy_to_heal(player: PlayerId, enemies: &[PlayerId]) -> Self {
        let seats: SmallVec<[i32; 8]> = enemies.iter().map(|p| p.index() as i32).collect();
        let default = seats.first().copied().unwrap_or(0);
        Self::new(
            DecisionKind::ChooseEnemyToHeal,
            Some(player),
            "Choose an enemy to heal",
            smallvec![GameOption::ChooseEnemyToHeal],
        )
        .with_flags(false, false, true)
        .with_argument(ArgumentSpec::OneOf(seats), default)
    }

    fn spend_heal_dice(kind: DecisionKind, player: PlayerId, option: GameOption, max: i32) -> Self {
        let description = format!("Spend up to {} heal dice", max);
        Self::new(kind, Some(player), description, smallvec![option])
            .with_flags(false, false, true)
            .with_argument(ArgumentSpec::Range { min: 1, max: max.max(1) }, 1)
    }

    pub fn heal_enemy(player: PlayerId, max: i32) -> Self {
        Self::spend_heal_dice(DecisionKind::HealEnemy, player, GameOption::HealEnemy, max)
    }

    pub fn reduce_venom_level(player: PlayerId, max: i32) -> Self {
        Self::spend_heal_dice(DecisionKind::ReduceVenomLevel, player, GameOption::ReduceVenomLevel, max)
    }

    pub fn reduce_dead_dice(player: PlayerId, max: i32) -> Self {
        Self::spend_heal_dice(DecisionKind::ReduceDeadDice, player, GameOption::ReviveDeadDice, max)
    }

    /// Offered to an enemy holding a die-rerolling card.
    pub fn gain_reroll_enemy_die(enemy: PlayerId) -> Self {
        Self::new(
            DecisionKind::GainRerollEnemyDie,
            Some(enemy),
            "Reroll one of the active player's dice?",
            smallvec![
                GameOption::IgnoreEnemyRollChanges(enemy),
                GameOption::GainRerollEnemyDie(enemy)
            ],
        )
        .with_flags(true, false, true)
    }

    pub fn reroll_enemy_die(enemy: PlayerId) -> Self {
        Self::new(
            DecisionKind::RerollEnemyDie,
            Some(enemy),
            "Choose a die to reroll",
            smallvec![GameOption::RerollEnemyDie(enemy)],
        )
        .with_flags(true, false, true)
    }

    // === Card management ===

    /// Pick the enemy card a Duplicate copies. The first pick is free;
    /// changing it later costs currency.
    pub fn duplicate_card(player: PlayerId, card: CardId, targets: &[CardKind], first_time: bool) -> Self {
        let kind = if first_time {
            DecisionKind::SetCardBeingDuplicatedFirstTime
        } else {
            DecisionKind::ChangeCardBeingDuplicated
        };
        let mut options: Options = smallvec![GameOption::FinishedDuplicating];
        options.extend(
            targets
                .iter()
                .map(|target| GameOption::DuplicateCard { card, target: *target }),
        );
        Self::new(kind, Some(player), "Choose an enemy card to duplicate", options)
            .with_flags(true, false, false)
    }

    pub fn refund_cards(player: PlayerId, cards: &[CardId]) -> Self {
        let mut options: Options = smallvec![GameOption::FinishedRefunding];
        options.extend(cards.iter().map(|c| GameOption::RefundCard(*c)));
        Self::new(DecisionKind::RefundCards, Some(player), "Return cards for a refund?", options)
            .with_flags(true, false, true)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.player {
            Some(p) => write!(f, "{} {:?} for {}", self.id, self.kind, p),
            None => write!(f, "{} {:?}", self.id, self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_flags() {
        let p = PlayerId::new(0);
        let start = Decision::start_turn(p);
        assert!(start.is_discrete && start.is_necessary && start.is_sequential);

        let roll = Decision::intermediate_roll(p, DieIndices::from_slice(&[0, 2]));
        assert!(!roll.is_necessary);
        assert_eq!(roll.undecided_dice.as_slice(), &[0, 2]);
        assert_eq!(roll.default_choice().0, &GameOption::Roll);

        let game = Decision::new_game();
        assert_eq!(game.player, None);
        assert!(!game.is_sequential);
    }

    #[test]
    fn test_leave_or_stay_defaults_to_stay() {
        let p = PlayerId::new(2);
        let decision = Decision::leave_or_stay(p);
        assert_eq!(decision.default_choice().0, &GameOption::Stay(p));
        assert!(decision.offers(&GameOption::Leave(p)));
    }

    #[test]
    fn test_pay_to_reduce_argument() {
        let claim = DamageClaim::new(PlayerId::new(1), None, 4);
        let decision = Decision::pay_to_reduce_damage(claim, 2);
        assert!(!decision.is_discrete);
        assert!(decision.argument.accepts(0));
        assert!(decision.argument.accepts(2));
        assert!(!decision.argument.accepts(3));
    }

    #[test]
    fn test_choose_enemy_argument_is_seat() {
        let decision = Decision::choose_enemy_to_heal(PlayerId::new(0), &[PlayerId::new(2), PlayerId::new(3)]);
        assert_eq!(decision.default_argument, 2);
        assert!(decision.argument.accepts(3));
        assert!(!decision.argument.accepts(1));
    }

    #[test]
    fn test_reduction_offers_ignore_first() {
        let claim = DamageClaim::new(PlayerId::new(1), Some(PlayerId::new(0)), 3);
        let decision = Decision::special_damage_reduction(
            claim,
            &[GameOption::GainRollToReduceDamage(claim)],
        );
        assert_eq!(decision.options.len(), 2);
        assert_eq!(decision.default_choice().0, &GameOption::IgnoreDamageReduction(claim));
        assert_eq!(decision.player, Some(claim.target));
    }

    #[test]
    fn test_duplicate_kinds() {
        let p = PlayerId::new(0);
        let card = CardId::new(9);
        let first = Decision::duplicate_card(p, card, &[CardKind::Gallant], true);
        assert_eq!(first.kind, DecisionKind::SetCardBeingDuplicatedFirstTime);
        assert!(first.offers(&GameOption::DuplicateCard { card, target: CardKind::Gallant }));

        let change = Decision::duplicate_card(p, card, &[], false);
        assert_eq!(change.kind, DecisionKind::ChangeCardBeingDuplicated);
        assert_eq!(change.options.len(), 1);
    }
}
