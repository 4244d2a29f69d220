//! The engine context: state, decision queue, card catalog and AI policy.
//!
//! ## Driving the engine
//!
//! - `tick(dt)` is the wall-clock driver. It presents the head decision and
//!   resolves it once the AI think time (AI seats) or the response time
//!   (humans, timed mode only) has elapsed.
//! - `step()` resolves the head decision immediately: AI seats ask the
//!   policy, everyone else takes the default.
//! - `submit_decision` is the human input boundary.
//!
//! Every resolution goes through `resolve`, which validates the decision id,
//! the option and the argument before anything is mutated. The option then
//! runs and enqueues its successors. The queue is never left empty: game
//! over substitutes a NewGame decision.

use serde::{Deserialize, Serialize};

use crate::ai::{AiChoice, DecisionPolicy, HeuristicPolicy};
use crate::cards::{CardCatalog, CardRegistry};
use crate::core::{DecisionRecord, EngineError, GameConfig, GameState, PlayerId, Result};
use crate::decision::{Decision, DecisionId, DecisionKind, DecisionQueue, GameOption};
use crate::dice::Face;
use crate::events::GameEvent;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Nobody survived.
    Draw,
    /// Several players crossed the line on the same turn.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    pub(crate) state: GameState,
    pub(crate) queue: DecisionQueue,
    pub(crate) catalog: Box<dyn CardCatalog>,
    pub(crate) policy: Box<dyn DecisionPolicy>,
    pub(crate) events: Vec<GameEvent>,
    elapsed: f32,
    paused: bool,
}

impl Engine {
    /// Validate the configuration, deal the table and queue the first turn.
    pub fn new(
        config: GameConfig,
        catalog: Box<dyn CardCatalog>,
        policy: Box<dyn DecisionPolicy>,
    ) -> Result<Self> {
        config.validate()?;
        let state = GameState::new(config, catalog.as_ref());
        let mut engine = Self {
            state,
            queue: DecisionQueue::new(),
            catalog,
            policy,
            events: Vec::new(),
            elapsed: 0.0,
            paused: false,
        };
        let first = engine.state.turn_player;
        tracing::info!("{} starts; {} seats", first, engine.state.seat_count());
        engine.queue.enqueue(Decision::start_turn(first));
        Ok(engine)
    }

    /// The standard card catalog with the heuristic AI.
    pub fn standard(config: GameConfig) -> Result<Self> {
        Self::new(
            config,
            Box::new(CardRegistry::standard()),
            Box::new(HeuristicPolicy),
        )
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for scenario setup.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn queue(&self) -> &DecisionQueue {
        &self.queue
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CardCatalog {
        self.catalog.as_ref()
    }

    #[must_use]
    pub fn current_decision(&self) -> Option<&Decision> {
        self.queue.current()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Take every event pushed since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    // === Presentation ===

    /// Present the head decision, or return the one already presented.
    pub fn present(&mut self) -> Result<&Decision> {
        if self.queue.current().is_none() {
            self.elapsed = 0.0;
            let (id, kind, player) = {
                let decision = self.queue.present_next()?;
                (decision.id, decision.kind, decision.player)
            };
            self.refresh_options(kind, player);
            self.emit(GameEvent::DecisionPresented {
                decision: id,
                kind,
                player,
            });
        }
        self.queue.present_next()
    }

    /// Options that depend on live state are rebuilt on presentation, and
    /// the response time follows the table configuration.
    fn refresh_options(&mut self, kind: DecisionKind, player: Option<PlayerId>) {
        let decision_time = self.state.config.decision_time;
        if let Some(current) = self.queue.current_mut() {
            current.time_to_respond = decision_time;
        }
        let Some(player) = player else { return };
        let options = match kind {
            DecisionKind::BrowseCards => self.browse_options(player),
            DecisionKind::IntermediateRoll => {
                let undecided = self.state.dice.unheld_indices();
                if let Some(current) = self.queue.current_mut() {
                    current.undecided_dice = undecided;
                }
                return;
            }
            _ => return,
        };
        if let Some(current) = self.queue.current_mut() {
            current.options = options;
        }
    }

    // === Driving ===

    /// Advance the clock by `dt` seconds and resolve the presented decision
    /// if its timer has run out. Returns the record when something resolved.
    pub fn tick(&mut self, dt: f32) -> Result<Option<DecisionRecord>> {
        if self.paused {
            return Ok(None);
        }
        let (player, time_to_respond) = {
            let decision = self.present()?;
            (decision.player, decision.time_to_respond)
        };
        self.elapsed += dt;

        let think_time = self.state.config.ai_think_time;
        let timed = self.state.config.timed_turns;
        let is_ai = player.is_some_and(|p| self.state.player(p).is_ai());
        if is_ai {
            if self.elapsed >= think_time {
                return self.step().map(Some);
            }
        } else if timed && self.elapsed >= time_to_respond {
            tracing::debug!("decision timed out; taking the default");
            return self.resolve_default().map(Some);
        }
        Ok(None)
    }

    /// Resolve the head decision now: the policy for AI seats, the default
    /// for humans and the table.
    pub fn step(&mut self) -> Result<DecisionRecord> {
        let decision = self.present()?.clone();
        let is_ai = decision.player.is_some_and(|p| self.state.player(p).is_ai());
        let choice = if is_ai {
            let choice = self.policy.choose(&decision, &self.state, self.catalog.as_ref());
            tracing::debug!(
                "AI {} picks {} ({}) for {:?}",
                decision.player.map_or_else(String::new, |p| p.to_string()),
                choice.option,
                choice.argument,
                decision.kind
            );
            choice
        } else {
            AiChoice::default_for(&decision)
        };
        self.commit(decision.id, choice)
    }

    /// Resolve the presented decision with its default option and argument.
    pub fn resolve_default(&mut self) -> Result<DecisionRecord> {
        let (id, option, argument) = {
            let decision = self.present()?;
            let (option, argument) = decision.default_choice();
            (decision.id, option.clone(), argument)
        };
        self.resolve(id, option, argument)
    }

    fn commit(&mut self, id: DecisionId, choice: AiChoice) -> Result<DecisionRecord> {
        if let Some(holds) = &choice.holds {
            for (die, held) in holds.iter().enumerate() {
                if self.state.dice.is_held(die) != *held {
                    self.set_held(die, *held);
                }
            }
        }
        self.resolve(id, choice.option, choice.argument)
    }

    /// Human input: resolve decision `id` with an offered option.
    ///
    /// Stale or invalid submissions are rejected and leave the state and
    /// the queue untouched.
    pub fn submit_decision(
        &mut self,
        id: DecisionId,
        option: GameOption,
        argument: i32,
    ) -> Result<DecisionRecord> {
        self.present()?;
        self.resolve(id, option, argument).map_err(|err| {
            tracing::warn!("rejected submission for {}: {}", id, err);
            err
        })
    }

    /// Human input by option position.
    pub fn submit_option_index(
        &mut self,
        id: DecisionId,
        index: usize,
        argument: i32,
    ) -> Result<DecisionRecord> {
        let option = self
            .present()?
            .options
            .get(index)
            .cloned()
            .ok_or_else(|| EngineError::IllegalOption {
                decision: id,
                option: format!("#{}", index),
            })?;
        self.submit_decision(id, option, argument)
    }

    fn validate(&self, id: DecisionId, option: &GameOption, argument: i32) -> Result<()> {
        let current = match self.queue.current() {
            Some(current) if current.id == id => current,
            _ => return Err(self.queue.rejection(id)),
        };
        if current.is_resolved() {
            return Err(EngineError::InvalidDecisionState { decision: id });
        }
        if !current.offers(option) {
            return Err(EngineError::IllegalOption {
                decision: id,
                option: option.to_string(),
            });
        }
        if !current.argument.accepts(argument) {
            let (min, max) = current.argument.bounds();
            return Err(EngineError::ArgumentOutOfRange {
                decision: id,
                argument,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Resolve the presented decision. Exactly-once: a second attempt with
    /// the same id is rejected as `InvalidDecisionState`.
    pub(crate) fn resolve(
        &mut self,
        id: DecisionId,
        option: GameOption,
        argument: i32,
    ) -> Result<DecisionRecord> {
        self.validate(id, &option, argument)?;
        let mut decision = self
            .queue
            .take_current()
            .ok_or(EngineError::UnknownDecision { decision: id })?;
        decision.mark_resolved();
        self.elapsed = 0.0;

        tracing::debug!("resolve {} with {} ({})", decision, option, argument);
        let record = DecisionRecord {
            decision: id,
            kind: decision.kind,
            player: decision.player,
            option: option.clone(),
            argument,
            game: self.state.games_played,
            day: self.state.clock.day,
            hour: self.state.clock.hour,
        };
        self.state.history.push_back(record.clone());

        self.apply_option(&decision, option, argument);

        debug_assert!(
            !self.queue.is_empty(),
            "{:?} resolved without enqueueing a successor",
            decision.kind
        );
        if self.queue.is_empty() {
            tracing::error!("{:?} left the decision queue empty", decision.kind);
        }
        Ok(record)
    }

    /// The central dispatch from option to rule.
    fn apply_option(&mut self, decision: &Decision, option: GameOption, argument: i32) {
        use GameOption as O;

        let actor = decision.player.unwrap_or(self.state.turn_player);
        match option {
            O::StartTurn => self.start_turn(),
            O::Roll => self.roll(),
            O::KeepRolls => self.keep_rolls(),
            O::Resolve => self.resolve_dice(),
            O::Stay(player) => tracing::debug!("{} stays inside", player),
            O::Leave(player) => self.leave_inside(player, true),
            O::EndTurn => self.end_turn(),
            O::NewGame => self.new_game(),

            O::FinishedBrowsing => self.finished_browsing(actor),
            O::RefreshCards => self.refresh_cards(actor),
            O::BuyCard(card) => {
                self.buy_card(actor, card);
                self.continue_turn(actor, |p, engine| engine.browse_decision(p));
            }
            O::BuyCardInstantly(card) => {
                self.buy_card(actor, card);
            }
            O::DontBuy => self.check_quick_deal(),

            O::IgnoreDamageReduction(claim) => self.take_damage(claim),
            O::PayToBecomeInvulnerable(claim) => self.become_invulnerable(claim),
            O::GainPayToReduceDamage(claim) => self.offer_pay_to_reduce(claim),
            O::PayToReduceDamage(claim) => self.pay_to_reduce(claim, argument),
            O::GainRollToReduceDamage(claim) => self.offer_roll_to_reduce(claim),
            O::RollToReduceDamage(claim) => self.roll_to_reduce(claim),

            O::IgnoreSpecialRollChanges => {
                self.state.turn.finished_roll_changes = true;
                self.advance_post_roll();
            }
            O::GainExtraRoll => self.gain_extra_roll(false),
            O::PayToGainExtraRoll => self.gain_extra_roll(true),
            O::GainChangeDieResult => self.gain_change_die(false),
            O::PayToGainChangeDieResult => self.gain_change_die(true),
            O::GainChangeDieResultToOne => self.gain_change_die_to_one(),
            O::GainRerollThrees => self.gain_reroll_threes(),
            O::ChangeDieResult => self.change_selected_die(Face::from_index(argument.max(0) as usize)),
            O::ChangeDieResultToValue(face) => self.change_selected_die(Some(face)),

            O::IgnoreEnemyRollChanges(_) => self.advance_post_roll(),
            O::GainRerollEnemyDie(enemy) => self.gain_reroll_enemy_die(enemy),
            O::RerollEnemyDie(enemy) => self.reroll_enemy_die(enemy),

            O::IgnoreSpecialDieUsage => {
                self.state.turn.finished_die_usage = true;
                self.advance_post_roll();
            }
            O::GainHealEnemy => self.offer_heal_enemy(actor),
            O::GainReduceVenom => self.offer_reduce_venom(actor),
            O::GainReviveDeadDice => self.offer_revive_dead_dice(actor),
            O::ChooseEnemyToHeal => self.choose_enemy_to_heal(actor, argument),
            O::HealEnemy => self.heal_enemy(actor, argument),
            O::ReduceVenomLevel => self.reduce_venom(actor, argument),
            O::ReviveDeadDice => self.revive_dead_dice(actor, argument),

            O::DuplicateCard { card, target } => {
                let pays = decision.kind == DecisionKind::ChangeCardBeingDuplicated;
                self.duplicate_card(actor, card, target, pays);
            }
            O::FinishedDuplicating => tracing::debug!("{} keeps their duplicate", actor),
            O::RefundCard(card) => self.refund_card(actor, card),
            O::FinishedRefunding => tracing::debug!("{} finished refunding", actor),
        }
    }

    /// True once the captured turn player can no longer continue their
    /// turn: they died, the turn moved on, or the game ended.
    pub(crate) fn turn_interrupted(&self, turn: PlayerId) -> bool {
        self.state.is_game_over()
            || self.state.turn_player != turn
            || !self.state.player(turn).is_alive()
    }

    /// Enqueue the next step of `turn`'s flow unless the turn was cut short.
    pub(crate) fn continue_turn(
        &mut self,
        turn: PlayerId,
        next: impl FnOnce(PlayerId, &Self) -> Decision,
    ) {
        if self.turn_interrupted(turn) {
            tracing::debug!("{}'s turn was interrupted", turn);
            return;
        }
        let decision = next(turn, self);
        self.queue.enqueue(decision);
    }

    // === Dice input ===

    /// Set one die's held flag and report it.
    pub fn set_held(&mut self, die: usize, held: bool) -> bool {
        if !self.state.dice.hold(die, held) {
            return false;
        }
        self.emit(GameEvent::DieHeld { die, held });
        true
    }

    /// A click on a die. While a card is picking a single die the click
    /// selects it; during a roll decision it toggles the hold.
    pub fn click_die(&mut self, die: usize) -> bool {
        if die >= self.state.dice.len() {
            return false;
        }
        if self.state.turn.single_die_only {
            self.state.dice.select_single(die);
            self.emit(GameEvent::DieHeld { die, held: false });
            return true;
        }
        let rolling = self
            .queue
            .current()
            .is_some_and(|d| d.kind == DecisionKind::IntermediateRoll);
        if !rolling {
            return false;
        }
        let held = !self.state.dice.is_held(die);
        self.set_held(die, held)
    }
}
