//! The sequential turn flow.
//!
//! StartTurn → FirstRoll → IntermediateRoll ⟲ → post-roll cascade →
//! NoMoreRolls → resolve → LeaveOrStay → BrowseCards → EndTurn.
//!
//! Resolution order is fixed: card bonuses and set points first, then heal
//! (outside only), then currency, then damage. Damage goes last because it
//! can kill, and a winning heal must land before that.

use crate::cards::registry::{
    COUNTING_CARDS_POINTS, DAMAGE_FOR_TWO_DAMAGE, FULL_HOUSE_POINTS, GOOD_INVESTMENTS_RATE,
    HEDGE_FUND_PAYOUT, ONE_LOVE_POINTS,
};
use crate::cards::{CardId, CardKind, TriggerPoint};
use crate::core::{PlayerId, PlayerIds, TurnFlags};
use crate::decision::Decision;
use crate::dice::Face;
use crate::events::GameEvent;

use super::{Engine, GameResult};

impl Engine {
    // === Start ===

    pub(crate) fn start_turn(&mut self) {
        let turn = self.state.turn_player;
        if !self.state.player(turn).is_alive() {
            tracing::warn!("{} is dead at the start of their turn; passing", turn);
            self.end_turn();
            return;
        }

        self.state.turn = TurnFlags::default();
        self.state.damage_this_turn.fill(0);
        self.state.finished_enemy_die_change.fill(false);
        self.state.bought_instantly.fill(false);
        for (_, player) in self.state.players.iter_mut() {
            player.reduction.invulnerable = false;
            player.reduction.has_had_invulnerability_option = false;
        }
        self.state.entered_this_turn.clear();

        let clock = &self.state.clock;
        tracing::info!("day {} hour {}: {}'s turn", clock.day, clock.hour, turn);
        self.emit(GameEvent::TurnStarted {
            player: turn,
            day: self.state.clock.day,
            hour: self.state.clock.hour,
        });

        let mut extra_rolls = 0;
        let mut extra_dice = 0;
        let mut inside_bonus = 0;
        for (kind, count) in self.triggered(turn, TriggerPoint::StartTurn) {
            match kind {
                CardKind::HedgeFund => self.pay_hedge_funds(turn, count),
                CardKind::HighRoller => extra_rolls += count,
                CardKind::DiceCloning => extra_dice += count,
                CardKind::Institutionalized => inside_bonus += count,
                _ => {}
            }
        }

        if self.state.is_inside(turn) {
            let points = self.state.config.start_turn_inside_points + inside_bonus;
            self.add_points(turn, points);
            self.state.player_mut(turn).siege_days += 1;
        }

        let config = &self.state.config;
        let mut dice = config.num_dice as i32 + extra_dice;
        if self.state.extra_turn {
            dice -= self.state.extra_turn_number;
            self.state.extra_turn = false;
        }
        dice -= self.state.player(turn).dead_dice;
        let dice = dice.clamp(0, config.max_dice as i32) as usize;
        let rolls = u8::try_from(i32::from(config.max_rolls) + extra_rolls).unwrap_or(u8::MAX);

        self.state.dice.init(dice, rolls);
        tracing::debug!("{} rolls {} dice, {} batches", turn, dice, rolls);
        self.queue.enqueue(Decision::first_roll(turn));
    }

    /// Pay every HedgeFund copy, then age the physical cards and drop the
    /// expired ones.
    fn pay_hedge_funds(&mut self, player: PlayerId, copies: i32) {
        self.gain_currency(player, HEDGE_FUND_PAYOUT * copies);
        let expired: Vec<CardId> = self
            .state
            .player_mut(player)
            .cards
            .iter_mut()
            .filter(|card| card.kind == CardKind::HedgeFund)
            .filter_map(|card| {
                card.counter -= 1;
                (card.counter <= 0).then_some(card.id)
            })
            .collect();
        for card in expired {
            tracing::debug!("{}'s Hedge Fund {} expired", player, card);
            self.discard_card(player, card);
        }
    }

    // === Rolling ===

    /// Roll the unheld dice, then either offer another roll or move on.
    pub(crate) fn roll(&mut self) {
        let turn = self.state.turn_player;
        match self.state.dice.roll_batch(&mut self.state.rng) {
            Some(rolled) => {
                tracing::debug!("{} rolled {:?}", turn, rolled);
                self.emit(GameEvent::DiceRolled {
                    player: turn,
                    dice: rolled,
                });
            }
            None => tracing::warn!("{} has no rolls left", turn),
        }

        if !self.state.dice.all_held() && self.state.dice.can_roll() {
            let undecided = self.state.dice.unheld_indices();
            self.queue.enqueue(Decision::intermediate_roll(turn, undecided));
        } else {
            self.keep_rolls();
        }
    }

    /// Stop rolling and enter the post-roll cascade.
    pub(crate) fn keep_rolls(&mut self) {
        self.state.dice.exhaust_rolls();
        self.advance_post_roll();
    }

    // === Resolution ===

    pub(crate) fn resolve_dice(&mut self) {
        let turn = self.state.turn_player;
        self.state.turn.rolls_resolved = true;
        self.state.turn.single_die_only = false;
        self.state.dice.hold_all(true);
        let summary = self.state.dice.summary();
        tracing::info!("{} resolves {}", turn, summary);
        self.emit(GameEvent::DiceResolved {
            player: turn,
            summary,
        });

        let mut points = 0;
        for (kind, count) in self.triggered(turn, TriggerPoint::ResolveBonus) {
            match kind {
                CardKind::FullHouse if summary.has_every_face() => {
                    points += FULL_HOUSE_POINTS * count;
                }
                CardKind::CountingCards if Face::NUMBERS.iter().all(|f| summary.has(*f)) => {
                    points += COUNTING_CARDS_POINTS * count;
                }
                _ => {}
            }
        }

        points += summary.set_points();
        let mut damage = summary.count(Face::Damage);
        let set_cards = self.triggered(turn, TriggerPoint::SetScored);
        for face in Face::NUMBERS.into_iter().filter(|f| summary.count(*f) >= 3) {
            for &(kind, count) in &set_cards {
                match (kind, face) {
                    (CardKind::OneLove, Face::Ones) => points += ONE_LOVE_POINTS * count,
                    (CardKind::OneMore, Face::Ones) => {
                        self.state.extra_turn = true;
                        self.state.extra_turn_number += 1;
                        tracing::info!("{} earned one more turn", turn);
                    }
                    (CardKind::DamageForTwo, Face::Twos) => damage += DAMAGE_FOR_TWO_DAMAGE * count,
                    _ => {}
                }
            }
        }
        self.add_points(turn, points);

        let heals = summary.count(Face::Heal);
        if heals > 0 && !self.state.is_inside(turn) {
            self.change_health(turn, None, heals);
        }
        self.gain_currency(turn, summary.count(Face::Currency));

        for (kind, count) in self.triggered(turn, TriggerPoint::DamageBonus) {
            match kind {
                CardKind::Aggressive if self.state.is_inside(turn) => damage += count,
                CardKind::HiddenWeapon => damage += count,
                _ => {}
            }
        }
        if damage > 0 {
            self.attack(turn, damage);
            if self.turn_interrupted(turn) {
                return;
            }
        }

        if !self.state.turn.dealt_damage {
            for (kind, count) in self.triggered(turn, TriggerPoint::Peaceful) {
                if kind == CardKind::Pacifist {
                    self.add_points(turn, count);
                }
            }
        }

        if self.state.inside_has_free_slot() && !self.state.is_inside(turn) {
            self.enter_inside(turn);
        }
        if self.turn_interrupted(turn) {
            return;
        }

        let hit_inside: PlayerIds = self
            .state
            .inside
            .iter()
            .rev()
            .copied()
            .filter(|p| {
                self.state.damage_this_turn[*p] > 0 && !self.state.entered_this_turn.contains(p)
            })
            .collect();
        for player in hit_inside {
            self.queue.enqueue(Decision::leave_or_stay(player));
        }
        self.continue_turn(turn, |player, engine| engine.browse_decision(player));
    }

    /// Build the per-target damage for this attack, then apply it target by
    /// target in seat order.
    fn attack(&mut self, turn: PlayerId, mut damage: i32) {
        for (kind, count) in self.triggered(turn, TriggerPoint::Attack) {
            match kind {
                CardKind::SpikeySides => {
                    let next = self.state.next_living(turn).filter(|p| *p != turn);
                    let previous = self.state.previous_living(turn).filter(|p| *p != turn);
                    if let Some(next) = next {
                        self.state.damage_this_turn[next] += count;
                    }
                    if let Some(previous) = previous.filter(|p| Some(*p) != next) {
                        self.state.damage_this_turn[previous] += count;
                    }
                }
                CardKind::Gallant => {
                    self.add_points(turn, count);
                }
                CardKind::CollateralDamage => damage += count,
                CardKind::Institutionalized if self.state.is_inside(turn) => damage += count,
                _ => {}
            }
        }
        tracing::info!("{} attacks for {}", turn, damage);
        self.emit(GameEvent::Attack {
            player: turn,
            damage,
        });

        let splash = self
            .triggered(turn, TriggerPoint::DamageTargeting)
            .iter()
            .any(|(kind, _)| *kind == CardKind::SplashDamage);
        let targets = if splash {
            self.state.others_living(turn)
        } else if self.state.is_inside(turn) {
            self.state.outside_ids()
        } else {
            self.state.inside.iter().copied().collect()
        };
        for target in targets {
            self.state.damage_this_turn[target] += damage;
        }

        for target in self.state.living_ids() {
            if self.state.damage_this_turn[target] == 1 && self.has_card(target, CardKind::StrongArmour) {
                self.state.damage_this_turn[target] = 0;
            }
        }

        let seats: Vec<PlayerId> = self.state.players.player_ids().collect();
        for target in seats {
            let amount = self.state.damage_this_turn[target];
            if amount <= 0 || !self.state.player(target).is_alive() {
                continue;
            }
            let sneaks_out = self.state.is_inside(target)
                && amount >= self.state.player(target).health()
                && self.has_card(target, CardKind::Sneaky);
            if sneaks_out {
                tracing::info!("{} sneaks out before a lethal hit", target);
                self.state.damage_this_turn[target] = 0;
                self.leave_inside(target, true);
            } else {
                self.change_health(target, Some(turn), -amount);
                self.state.turn.dealt_damage = true;
            }
            if self.turn_interrupted(turn) {
                return;
            }
        }
    }

    // === End ===

    pub(crate) fn end_turn(&mut self) {
        let turn = self.state.turn_player;
        self.state.turn.has_ended = true;

        for (kind, count) in self.triggered(turn, TriggerPoint::EndTurn) {
            match kind {
                CardKind::Pathetic => {
                    if self.state.least_points_players().as_slice() == [turn] {
                        self.add_points(turn, count);
                    }
                }
                CardKind::GoodInvestments => {
                    let currency = self.state.player(turn).currency();
                    self.add_points(turn, currency / GOOD_INVESTMENTS_RATE);
                }
                CardKind::Resourceful => {
                    if self.state.player(turn).currency() == 0 {
                        self.adjust_currency(turn, 1);
                    }
                }
                _ => {}
            }
        }

        let venom = self.state.player(turn).venom;
        if venom > 0 && self.state.player(turn).is_alive() {
            tracing::debug!("{} suffers {} venom", turn, venom);
            self.change_health(turn, None, -venom);
        }

        if let Some(result) = self.check_for_winner() {
            self.end_game(result);
            return;
        }

        if !self.state.extra_turn || !self.state.player(turn).is_alive() {
            self.state.extra_turn = false;
            self.state.extra_turn_number = 0;
            if let Some(next) = self.state.next_living(turn) {
                self.state.turn_player = next;
            }
        }
        self.state.turn.has_ended = false;

        let next = self.state.turn_player;
        self.offer_duplicate_changes(next);

        for player in self.state.inside.clone() {
            self.state.player_mut(player).siege_hours += 1;
        }
        let living = self.state.living_count();
        if self.state.clock.advance(next, living) {
            tracing::info!("day {} begins", self.state.clock.day);
        }

        self.queue.enqueue(Decision::start_turn(next));
    }

    /// Each Duplicate the new turn player holds may be repointed, one
    /// currency per card already offered.
    fn offer_duplicate_changes(&mut self, player: PlayerId) {
        let targets = self.duplicate_targets(player);
        if targets.is_empty() {
            return;
        }
        let currency = self.state.player(player).currency();
        let duplicates: Vec<CardId> = self
            .state
            .player(player)
            .cards
            .iter()
            .filter(|card| card.kind == CardKind::Duplicate)
            .map(|card| card.id)
            .collect();
        for (i, card) in duplicates.into_iter().enumerate() {
            if currency > i as i32 {
                self.queue
                    .enqueue_priority(Decision::duplicate_card(player, card, &targets, false));
            }
        }
    }

    /// Zero survivors is a draw, one survivor wins, otherwise everyone at the
    /// win line (and past the siege gate, if any) wins together.
    pub(crate) fn check_for_winner(&self) -> Option<GameResult> {
        let living = self.state.living_ids();
        match living.as_slice() {
            [] => return Some(GameResult::Draw),
            [sole] => return Some(GameResult::Winner(*sole)),
            _ => {}
        }

        let config = &self.state.config;
        let winners: Vec<PlayerId> = living
            .into_iter()
            .filter(|id| {
                let player = self.state.player(*id);
                player.points() >= config.win_points
                    && (config.min_siege_hours == 0 || player.siege_hours > config.min_siege_hours)
            })
            .collect();
        match winners.len() {
            0 => None,
            1 => Some(GameResult::Winner(winners[0])),
            _ => Some(GameResult::Winners(winners)),
        }
    }

    pub(crate) fn end_game(&mut self, result: GameResult) {
        tracing::info!("game over: {:?}", result);
        self.state.result = Some(result.clone());
        self.emit(GameEvent::GameOver { result });
        self.queue.clear_all();
        self.queue.enqueue(Decision::new_game());
    }

    /// Reset the table in place and queue the first turn.
    pub(crate) fn new_game(&mut self) {
        self.state.reset(self.catalog.as_ref());
        let first = self.state.turn_player;
        tracing::info!("game {} starts with {}", self.state.games_played + 1, first);
        self.queue.enqueue(Decision::start_turn(first));
    }
}
