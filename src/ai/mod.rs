//! AI decision policies.
//!
//! A policy is a pure function from a presented decision and the table
//! state to a choice. It never mutates anything: dice holds are returned as
//! part of the choice and applied by the engine before the option resolves.
//!
//! - `DecisionPolicy`: the seam the engine asks
//! - `HeuristicPolicy`: hand-authored rules keyed by decision kind
//! - `DefaultPolicy`: always takes the decision's default

mod browse;
mod dice;
mod reactions;

use serde::{Deserialize, Serialize};

use crate::cards::{AttributeFamily, CardAttribute, CardCatalog, CardKind};
use crate::core::{GameState, PlayerId};
use crate::decision::{Decision, DecisionKind, GameOption};
use crate::players::Player;

/// What an AI seat answers: an offered option, its argument, and
/// optionally the held flag for every die in the tray.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiChoice {
    pub option: GameOption,
    pub argument: i32,
    pub holds: Option<Vec<bool>>,
}

impl AiChoice {
    #[must_use]
    pub fn new(option: GameOption, argument: i32) -> Self {
        Self {
            option,
            argument,
            holds: None,
        }
    }

    /// The decision's default option and argument.
    #[must_use]
    pub fn default_for(decision: &Decision) -> Self {
        let (option, argument) = decision.default_choice();
        Self::new(option.clone(), argument)
    }

    #[must_use]
    pub fn with_holds(mut self, holds: Vec<bool>) -> Self {
        self.holds = Some(holds);
        self
    }
}

/// Chooses for AI-controlled seats.
pub trait DecisionPolicy: std::fmt::Debug + Send + Sync {
    /// Pick one of `decision`'s offered options.
    fn choose(&self, decision: &Decision, state: &GameState, catalog: &dyn CardCatalog) -> AiChoice;
}

/// Takes the default of every decision.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPolicy;

impl DecisionPolicy for DefaultPolicy {
    fn choose(&self, decision: &Decision, _state: &GameState, _catalog: &dyn CardCatalog) -> AiChoice {
        AiChoice::default_for(decision)
    }
}

/// Personality-driven rules for every decision kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicPolicy;

impl DecisionPolicy for HeuristicPolicy {
    fn choose(&self, decision: &Decision, state: &GameState, catalog: &dyn CardCatalog) -> AiChoice {
        let Some(player) = decision.player else {
            return AiChoice::default_for(decision);
        };
        let view = AiView {
            decision,
            state,
            catalog,
            id: player,
            player: state.player(player),
        };

        use DecisionKind as K;
        let choice = match decision.kind {
            K::IntermediateRoll => dice::intermediate_roll(&view),
            K::SpecialRollChange => dice::special_roll_change(&view),
            K::ChangeDieResult => dice::change_die_result(&view),
            K::ChangeDieResultToValue => dice::change_die_to_value(&view),
            K::RerollEnemyDie => dice::reroll_enemy_die(&view),

            K::BrowseCards => browse::browse_cards(&view),
            K::BuyCardInstantly => browse::buy_card_instantly(&view),
            K::SetCardBeingDuplicatedFirstTime | K::ChangeCardBeingDuplicated => {
                browse::duplicate_card(&view)
            }

            K::LeaveOrStay => reactions::leave_or_stay(&view),
            K::SpecialDamageReduction => reactions::special_damage_reduction(&view),
            K::PayToReduceDamage => reactions::pay_to_reduce_damage(&view),
            K::GainRerollEnemyDie => reactions::gain_reroll_enemy_die(&view),
            K::SpecialDieUsage => reactions::special_die_usage(&view),
            K::ChooseEnemyToHeal => reactions::choose_enemy_to_heal(&view),
            K::HealEnemy | K::ReduceVenomLevel | K::ReduceDeadDice => reactions::spend_all_heals(&view),

            K::StartTurn
            | K::FirstRoll
            | K::NoMoreRolls
            | K::EndTurn
            | K::NewGame
            | K::RollToReduceDamage
            | K::RefundCards => None,
        };

        match choice {
            Some(choice) if decision.offers(&choice.option) => choice,
            Some(choice) => {
                tracing::warn!("AI picked {} which {} does not offer", choice.option, decision);
                AiChoice::default_for(decision)
            }
            None => AiChoice::default_for(decision),
        }
    }
}

/// Everything a heuristic reads, borrowed for one choice.
pub(crate) struct AiView<'a> {
    pub decision: &'a Decision,
    pub state: &'a GameState,
    pub catalog: &'a dyn CardCatalog,
    pub id: PlayerId,
    pub player: &'a Player,
}

impl AiView<'_> {
    fn win_points(&self) -> i32 {
        self.state.config.win_points
    }

    fn is_inside(&self) -> bool {
        self.state.is_inside(self.id)
    }

    fn prefers(&self, a: AttributeFamily, b: AttributeFamily) -> bool {
        self.player.personality.prefers(a, b)
    }

    fn offered(&self, option: &GameOption) -> Option<AiChoice> {
        self.decision
            .offers(option)
            .then(|| AiChoice::new(option.clone(), 0))
    }

    fn card_has(&self, kind: CardKind, attribute: CardAttribute) -> bool {
        self.catalog
            .attributes_of(kind)
            .is_some_and(|attributes| attributes.contains_key(&attribute))
    }

    fn card_value(&self, kind: CardKind, attribute: CardAttribute) -> i32 {
        self.catalog.attribute(kind, attribute)
    }

    fn cost(&self, kind: CardKind) -> i32 {
        self.catalog.cost_to_player(kind, self.player)
    }
}
