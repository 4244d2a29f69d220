//! The post-roll cascade.
//!
//! Between the last roll and resolution the engine offers, in order:
//!
//! 1. the turn player's roll changes (extra rolls, die changes, rerolls),
//! 2. one DieKing reroll per enemy per turn, in seat order,
//! 3. the turn player's heal-face spending.
//!
//! Every branch loops back through [`Engine::advance_post_roll`], so the
//! cascade only ends with NoMoreRolls once all three report nothing left.

use crate::cards::registry::{
    COSTLY_ROLL_COST, DIE_CASTER_COST, HEALTHCARE_FEE, ROCK_AND_ROLLER_ROLLS,
};
use crate::cards::{CardId, CardKind, TriggerPoint};
use crate::core::PlayerId;
use crate::decision::{Decision, GameOption, Options};
use crate::dice::Face;
use crate::events::GameEvent;

use super::Engine;

impl Engine {
    /// Offer the next cascade decision, or NoMoreRolls when none is left.
    pub(crate) fn advance_post_roll(&mut self) {
        let turn = self.state.turn_player;
        if self.turn_interrupted(turn) {
            return;
        }

        if !self.state.turn.finished_roll_changes {
            let changes = self.roll_change_options(turn);
            if !changes.is_empty() {
                self.queue
                    .enqueue(Decision::special_roll_change(turn, &changes));
                return;
            }
            self.state.turn.finished_roll_changes = true;
        }

        if !self.state.dice.is_empty() {
            for enemy in self.state.living_ids() {
                if self.state.finished_enemy_die_change[enemy] {
                    continue;
                }
                self.state.finished_enemy_die_change[enemy] = true;
                if enemy != turn && self.has_card(enemy, CardKind::DieKing) {
                    self.queue.enqueue(Decision::gain_reroll_enemy_die(enemy));
                    return;
                }
            }
        }

        if !self.state.turn.finished_die_usage {
            let usages = self.die_usage_options(turn);
            if !usages.is_empty() {
                self.queue
                    .enqueue(Decision::special_die_usage(turn, &usages));
                return;
            }
        }

        self.state.turn.single_die_only = false;
        self.queue.enqueue(Decision::no_more_rolls(turn));
    }

    /// Roll changes the turn player's cards allow right now, in catalog
    /// order.
    pub(crate) fn roll_change_options(&self, player: PlayerId) -> Options {
        let mut options = Options::new();
        if self.state.dice.is_empty() {
            return options;
        }
        let holder = self.state.player(player);
        let currency = holder.currency();
        let summary = self.state.dice.summary();
        for (kind, _) in self.triggered(player, TriggerPoint::PostRoll) {
            let option = match kind {
                CardKind::RockAndRoller if holder.extra_rolls > 0 => GameOption::GainExtraRoll,
                CardKind::CostlyRoll if currency >= COSTLY_ROLL_COST => GameOption::PayToGainExtraRoll,
                CardKind::DieForger => GameOption::GainChangeDieResult,
                CardKind::OneToOne if !self.state.turn.changed_to_one => {
                    GameOption::GainChangeDieResultToOne
                }
                CardKind::DieCaster if currency >= DIE_CASTER_COST => {
                    GameOption::PayToGainChangeDieResult
                }
                CardKind::TertiaryAllergy if summary.has(Face::Threes) => GameOption::GainRerollThrees,
                _ => continue,
            };
            options.push(option);
        }
        options
    }

    /// Ways to spend heal faces. Dead dice and venom can be worked off
    /// without holding the card that caused them.
    pub(crate) fn die_usage_options(&self, player: PlayerId) -> Options {
        let mut options = Options::new();
        if self.heal_dice() == 0 {
            return options;
        }
        let flags = &self.state.turn;
        let healthcare = self
            .triggered(player, TriggerPoint::DieUsage)
            .iter()
            .any(|(kind, _)| *kind == CardKind::AggressiveHealthcare);
        if healthcare
            && !flags.used_aggressive_healthcare
            && !self.state.healable_enemies(player).is_empty()
        {
            options.push(GameOption::GainHealEnemy);
        }
        let holder = self.state.player(player);
        if !flags.negated_die_die && holder.dead_dice > 0 {
            options.push(GameOption::GainReviveDeadDice);
        }
        if !flags.negated_venom && holder.venom > 0 {
            options.push(GameOption::GainReduceVenom);
        }
        options
    }

    fn heal_dice(&self) -> i32 {
        self.state.dice.summary().count(Face::Heal)
    }

    /// Blank `count` heal faces.
    fn consume_heal_dice(&mut self, count: i32) {
        for _ in 0..count {
            let Some(die) = self.state.dice.first_with_face(Face::Heal) else {
                break;
            };
            self.state.dice.set_face(die, None);
            self.emit(GameEvent::DieChanged { die, face: None });
        }
    }

    /// Make the first unheld die (or the first die) the only selectable one.
    fn select_first_die(&mut self) {
        self.state.turn.single_die_only = true;
        let die = self.state.dice.first_unheld().unwrap_or(0);
        self.state.dice.select_single(die);
    }

    // === Roll changes ===

    pub(crate) fn gain_extra_roll(&mut self, paid: bool) {
        let turn = self.state.turn_player;
        if paid {
            if !self.pay(turn, COSTLY_ROLL_COST) {
                self.advance_post_roll();
                return;
            }
            tracing::debug!("{} buys an extra roll", turn);
        } else {
            let player = self.state.player_mut(turn);
            player.extra_rolls -= 1;
            let physical = player
                .cards
                .iter()
                .filter(|card| card.kind == CardKind::RockAndRoller)
                .count() as i32;
            let spent: Option<CardId> = if player.extra_rolls <= (physical - 1) * ROCK_AND_ROLLER_ROLLS {
                player.first_card_of(CardKind::RockAndRoller)
            } else {
                None
            };
            tracing::debug!("{} uses an extra roll", turn);
            if let Some(card) = spent {
                self.discard_card(turn, card);
            }
        }
        self.state.dice.grant_extra_roll();
        let undecided = self.state.dice.unheld_indices();
        self.queue.enqueue(Decision::intermediate_roll(turn, undecided));
    }

    pub(crate) fn gain_change_die(&mut self, paid: bool) {
        let turn = self.state.turn_player;
        if paid {
            if !self.pay(turn, DIE_CASTER_COST) {
                self.advance_post_roll();
                return;
            }
        } else if let Some(card) = self.state.player(turn).first_card_of(CardKind::DieForger) {
            self.discard_card(turn, card);
        }
        self.select_first_die();
        self.queue.enqueue(Decision::change_die_result(turn));
    }

    pub(crate) fn gain_change_die_to_one(&mut self) {
        let turn = self.state.turn_player;
        self.state.turn.changed_to_one = true;
        self.select_first_die();
        self.queue
            .enqueue(Decision::change_die_result_to_value(turn, Face::Ones));
    }

    /// Hold everything but the threes and grant one more roll.
    pub(crate) fn gain_reroll_threes(&mut self) {
        let turn = self.state.turn_player;
        for die in 0..self.state.dice.len() {
            let keep = self.state.dice.result(die) != Some(Face::Threes);
            self.state.dice.hold(die, keep);
        }
        self.state.dice.grant_extra_roll();
        let undecided = self.state.dice.unheld_indices();
        self.queue.enqueue(Decision::intermediate_roll(turn, undecided));
    }

    /// Set the selected die (the first unheld one) to `face`.
    pub(crate) fn change_selected_die(&mut self, face: Option<Face>) {
        if let (Some(face), Some(die)) = (face, self.state.dice.first_unheld()) {
            tracing::debug!("die {} set to {}", die, face);
            self.state.dice.set_face(die, Some(face));
            self.emit(GameEvent::DieChanged {
                die,
                face: Some(face),
            });
        }
        self.state.turn.single_die_only = false;
        self.advance_post_roll();
    }

    // === Enemy die changes ===

    pub(crate) fn gain_reroll_enemy_die(&mut self, enemy: PlayerId) {
        self.select_first_die();
        self.queue.enqueue(Decision::reroll_enemy_die(enemy));
    }

    /// Reroll the selected die. A DieKing that rolls a heal is lost.
    pub(crate) fn reroll_enemy_die(&mut self, enemy: PlayerId) {
        if let Some(die) = self.state.dice.first_unheld() {
            let rolled = self.state.dice.roll_indices(&[die], &mut self.state.rng);
            let landed_heal = rolled.iter().any(|(_, face)| *face == Face::Heal);
            tracing::debug!("{} rerolls die {}: {:?}", enemy, die, rolled);
            self.emit(GameEvent::DiceRolled {
                player: enemy,
                dice: rolled,
            });
            if landed_heal {
                if let Some(card) = self.state.player(enemy).first_card_of(CardKind::DieKing) {
                    tracing::info!("{}'s Die King rolled a heal and is lost", enemy);
                    self.discard_card(enemy, card);
                }
            }
        }
        self.state.turn.single_die_only = false;
        self.advance_post_roll();
    }

    // === Special die usage ===

    pub(crate) fn offer_heal_enemy(&mut self, actor: PlayerId) {
        self.state.turn.used_aggressive_healthcare = true;
        let healable = self.state.healable_enemies(actor);
        if healable.is_empty() {
            self.advance_post_roll();
            return;
        }
        self.queue
            .enqueue(Decision::choose_enemy_to_heal(actor, &healable));
    }

    /// The argument is the enemy's seat index.
    pub(crate) fn choose_enemy_to_heal(&mut self, actor: PlayerId, seat: i32) {
        let healable = self.state.healable_enemies(actor);
        let enemy = healable
            .iter()
            .copied()
            .find(|p| p.index() as i32 == seat)
            .or_else(|| healable.first().copied());
        let Some(enemy) = enemy else {
            self.advance_post_roll();
            return;
        };
        self.state.turn.enemy_to_heal = Some(enemy);
        let max = self.heal_dice().min(self.state.player(enemy).health_deficit());
        self.queue.enqueue(Decision::heal_enemy(actor, max));
    }

    /// Spend heal faces on the chosen enemy, then charge them for it.
    pub(crate) fn heal_enemy(&mut self, actor: PlayerId, amount: i32) {
        let Some(enemy) = self.state.turn.enemy_to_heal.take() else {
            self.advance_post_roll();
            return;
        };
        let max = self.heal_dice().min(self.state.player(enemy).health_deficit());
        let amount = amount.clamp(0, max);
        if amount > 0 {
            self.consume_heal_dice(amount);
            self.change_health(enemy, Some(actor), amount);
            let fee = self.state.player(enemy).currency().min(HEALTHCARE_FEE * amount);
            self.adjust_currency(enemy, -fee);
            self.gain_currency(actor, fee);
            tracing::info!("{} heals {} for {} and takes {}", actor, enemy, amount, fee);
        }
        self.advance_post_roll();
    }

    pub(crate) fn offer_reduce_venom(&mut self, actor: PlayerId) {
        self.state.turn.negated_venom = true;
        let max = self.heal_dice().min(self.state.player(actor).venom);
        self.queue.enqueue(Decision::reduce_venom_level(actor, max));
    }

    pub(crate) fn reduce_venom(&mut self, actor: PlayerId, amount: i32) {
        let amount = amount.clamp(0, self.heal_dice().min(self.state.player(actor).venom));
        self.consume_heal_dice(amount);
        self.state.player_mut(actor).venom -= amount;
        tracing::debug!("{} works off {} venom", actor, amount);
        self.advance_post_roll();
    }

    pub(crate) fn offer_revive_dead_dice(&mut self, actor: PlayerId) {
        self.state.turn.negated_die_die = true;
        let max = self.heal_dice().min(self.state.player(actor).dead_dice);
        self.queue.enqueue(Decision::reduce_dead_dice(actor, max));
    }

    pub(crate) fn revive_dead_dice(&mut self, actor: PlayerId, amount: i32) {
        let amount = amount.clamp(0, self.heal_dice().min(self.state.player(actor).dead_dice));
        self.consume_heal_dice(amount);
        self.state.player_mut(actor).dead_dice -= amount;
        tracing::debug!("{} revives {} dead dice", actor, amount);
        self.advance_post_roll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::decision::DecisionKind;

    fn engine(seats: usize) -> Engine {
        let mut e = Engine::standard(GameConfig::all_ai(seats).with_seed(17)).unwrap();
        e.state_mut().turn_player = PlayerId::new(0);
        e
    }

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    fn set_dice(e: &mut Engine, faces: &[Face]) {
        e.state_mut().dice.init(faces.len(), 3);
        e.state_mut().dice.set_faces(faces);
    }

    fn last_kind(e: &Engine) -> Option<DecisionKind> {
        e.queue().iter().last().map(|d| d.kind)
    }

    #[test]
    fn test_no_cards_goes_straight_to_resolve() {
        let mut e = engine(3);
        set_dice(&mut e, &[Face::Ones, Face::Heal]);
        e.keep_rolls();
        assert_eq!(last_kind(&e), Some(DecisionKind::NoMoreRolls));
        assert!(e.state().turn.finished_roll_changes);
    }

    #[test]
    fn test_empty_tray_still_reaches_resolve() {
        let mut e = engine(2);
        e.grant_card(p(0), CardKind::DieForger);
        set_dice(&mut e, &[]);
        e.keep_rolls();
        assert_eq!(last_kind(&e), Some(DecisionKind::NoMoreRolls));
    }

    #[test]
    fn test_rock_and_roller_is_consumed() {
        let mut e = engine(2);
        e.grant_card(p(0), CardKind::RockAndRoller);
        set_dice(&mut e, &[Face::Twos, Face::Damage]);
        e.keep_rolls();
        assert_eq!(last_kind(&e), Some(DecisionKind::SpecialRollChange));

        e.gain_extra_roll(false);
        assert!(e.state().dice.can_roll());
        assert_eq!(last_kind(&e), Some(DecisionKind::IntermediateRoll));
        assert!(e.state().player(p(0)).has_card(CardKind::RockAndRoller));

        e.gain_extra_roll(false);
        assert!(!e.state().player(p(0)).has_card(CardKind::RockAndRoller));
        assert_eq!(e.state().player(p(0)).extra_rolls, 0);
    }

    #[test]
    fn test_costly_roll_needs_currency() {
        let mut e = engine(2);
        e.grant_card(p(0), CardKind::CostlyRoll);
        set_dice(&mut e, &[Face::Twos]);
        assert!(e.roll_change_options(p(0)).is_empty());

        e.adjust_currency(p(0), 1);
        assert_eq!(e.roll_change_options(p(0)).as_slice(), &[GameOption::PayToGainExtraRoll]);
        e.gain_extra_roll(true);
        assert_eq!(e.state().player(p(0)).currency(), 0);
    }

    #[test]
    fn test_die_forger_changes_one_die() {
        let mut e = engine(2);
        e.grant_card(p(0), CardKind::DieForger);
        set_dice(&mut e, &[Face::Twos, Face::Damage, Face::Heal]);

        e.gain_change_die(false);
        assert!(e.state().turn.single_die_only);
        assert!(!e.state().player(p(0)).has_card(CardKind::DieForger));
        assert_eq!(last_kind(&e), Some(DecisionKind::ChangeDieResult));

        e.state_mut().dice.select_single(1);
        e.change_selected_die(Some(Face::Currency));
        assert_eq!(e.state().dice.result(1), Some(Face::Currency));
        assert!(!e.state().turn.single_die_only);
    }

    #[test]
    fn test_one_to_one_once_per_turn() {
        let mut e = engine(2);
        e.grant_card(p(0), CardKind::OneToOne);
        set_dice(&mut e, &[Face::Twos]);
        assert_eq!(e.roll_change_options(p(0)).as_slice(), &[GameOption::GainChangeDieResultToOne]);

        e.gain_change_die_to_one();
        e.change_selected_die(Some(Face::Ones));
        assert_eq!(e.state().dice.result(0), Some(Face::Ones));
        assert!(e.roll_change_options(p(0)).is_empty());
    }

    #[test]
    fn test_reroll_threes_holds_the_rest() {
        let mut e = engine(2);
        e.grant_card(p(0), CardKind::TertiaryAllergy);
        set_dice(&mut e, &[Face::Threes, Face::Ones, Face::Threes]);
        e.state_mut().dice.exhaust_rolls();

        e.gain_reroll_threes();
        let dice = &e.state().dice;
        assert_eq!(dice.unheld_indices().as_slice(), &[0, 2]);
        assert!(dice.can_roll());
    }

    #[test]
    fn test_die_king_offered_once_per_enemy() {
        let mut e = engine(3);
        e.grant_card(p(2), CardKind::DieKing);
        set_dice(&mut e, &[Face::Twos, Face::Damage]);

        e.keep_rolls();
        let head = e.queue().iter().last().unwrap();
        assert_eq!(head.kind, DecisionKind::GainRerollEnemyDie);
        assert_eq!(head.player, Some(p(2)));

        e.advance_post_roll();
        assert_eq!(last_kind(&e), Some(DecisionKind::NoMoreRolls));
    }

    #[test]
    fn test_enemy_reroll_changes_one_die() {
        let mut e = engine(3);
        e.grant_card(p(2), CardKind::DieKing);
        set_dice(&mut e, &[Face::Twos, Face::Damage]);

        e.gain_reroll_enemy_die(p(2));
        e.reroll_enemy_die(p(2));
        assert_eq!(e.state().dice.result(1), Some(Face::Damage));
        let landed = e.state().dice.result(0);
        assert_eq!(
            e.state().player(p(2)).has_card(CardKind::DieKing),
            landed != Some(Face::Heal)
        );
    }

    #[test]
    fn test_aggressive_healthcare_flow() {
        let mut e = engine(3);
        e.grant_card(p(0), CardKind::AggressiveHealthcare);
        e.state_mut().player_mut(p(1)).set_health(7);
        e.adjust_currency(p(1), 5);
        set_dice(&mut e, &[Face::Heal, Face::Heal, Face::Ones]);
        assert_eq!(e.die_usage_options(p(0)).as_slice(), &[GameOption::GainHealEnemy]);

        e.offer_heal_enemy(p(0));
        assert_eq!(last_kind(&e), Some(DecisionKind::ChooseEnemyToHeal));
        e.choose_enemy_to_heal(p(0), 1);
        e.heal_enemy(p(0), 2);

        assert_eq!(e.state().player(p(1)).health(), 9);
        assert_eq!(e.state().player(p(1)).currency(), 1);
        assert_eq!(e.state().player(p(0)).currency(), 4);
        assert_eq!(e.state().dice.summary().count(Face::Heal), 0);
        assert!(e.die_usage_options(p(0)).is_empty());
    }

    #[test]
    fn test_work_off_venom_and_dead_dice() {
        let mut e = engine(2);
        e.state_mut().player_mut(p(0)).venom = 2;
        e.state_mut().player_mut(p(0)).dead_dice = 1;
        set_dice(&mut e, &[Face::Heal, Face::Heal, Face::Heal]);
        assert_eq!(
            e.die_usage_options(p(0)).as_slice(),
            &[GameOption::GainReviveDeadDice, GameOption::GainReduceVenom]
        );

        e.offer_reduce_venom(p(0));
        e.reduce_venom(p(0), 5);
        assert_eq!(e.state().player(p(0)).venom, 0);

        e.offer_revive_dead_dice(p(0));
        e.revive_dead_dice(p(0), 1);
        assert_eq!(e.state().player(p(0)).dead_dice, 0);
        assert_eq!(e.state().dice.summary().count(Face::Heal), 0);
    }
}
