//! Health changes, death and the damage-reduction sub-flow.
//!
//! ## Health changes
//!
//! Every heal and every hit goes through [`Engine::change_health`]. A hit is
//! checked in this order:
//!
//! 1. Temporary invulnerability negates it.
//! 2. Strong Armour negates a hit of exactly one.
//! 3. If the target holds an eligible reduction card, the hit is suspended
//!    and a priority SpecialDamageReduction decision is inserted. The hit is
//!    re-applied (possibly reduced) when the target chooses.
//! 4. Otherwise it lands, with the attacker's on-hit cards.
//!
//! Death is an explicit check after the change lands, never a side effect of
//! setting a field.

use crate::cards::registry::{INSURANCE_RATE, INVULNERABILITY_COST};
use crate::cards::{CardKind, TriggerPoint};
use crate::core::PlayerId;
use crate::decision::{DamageClaim, Decision, GameOption, Options};
use crate::dice::Face;
use crate::events::GameEvent;

use super::Engine;

impl Engine {
    /// Apply a health change to `target`. Returns true when it landed;
    /// false when the target is dead, the hit was negated or the hit is
    /// waiting on a reduction decision.
    pub(crate) fn change_health(
        &mut self,
        target: PlayerId,
        source: Option<PlayerId>,
        delta: i32,
    ) -> bool {
        let player = self.state.player(target);
        if !player.is_alive() {
            tracing::debug!("{} is dead; health change ignored", target);
            return false;
        }
        let mut delta = delta.min(player.health_deficit());

        if delta < 0 {
            let amount = -delta;
            if player.reduction.invulnerable {
                tracing::info!("{} is invulnerable and avoids {} damage", target, amount);
                self.emit(GameEvent::DamageNegated { player: target, amount });
                return false;
            }
            if amount == 1 && self.has_card(target, CardKind::StrongArmour) {
                tracing::debug!("{}'s Strong Armour stops 1 damage", target);
                self.emit(GameEvent::DamageNegated { player: target, amount });
                return false;
            }

            let claim = DamageClaim::new(target, source, amount);
            let reductions = self.damage_reduction_options(claim);
            if !reductions.is_empty() {
                self.state.player_mut(target).incoming_damage = amount;
                self.queue
                    .enqueue_priority(Decision::special_damage_reduction(claim, &reductions));
                return false;
            }

            if amount >= 2 {
                let donors = self.count_card(target, CardKind::BloodDonor);
                self.gain_currency(target, donors);
            }
            if let Some(source) = source.filter(|s| *s != target) {
                self.apply_on_hit(source, target);
            }
        } else if delta > 0 {
            let vitality = self.count_card(target, CardKind::Vitality);
            if vitality > 0 && delta < player.health_deficit() {
                delta += vitality;
            }
        }

        let player = self.state.player_mut(target);
        player.reduction.reset_after_change();
        player.incoming_damage = 0;
        if delta == 0 {
            return true;
        }

        let before = player.health();
        if before + delta <= 0 {
            self.lethal(target);
        } else {
            let health = player.set_health(before + delta);
            tracing::debug!("{} health {:+} ({})", target, health - before, health);
            self.emit(GameEvent::HealthChanged {
                player: target,
                delta: health - before,
                health,
            });
        }
        true
    }

    /// Attacker cards that fire when a hit from `source` lands.
    fn apply_on_hit(&mut self, source: PlayerId, target: PlayerId) {
        let die_die = self.count_card(source, CardKind::DieDie);
        let venom = self.count_card(source, CardKind::VenomousBite);
        let victim = self.state.player_mut(target);
        victim.dead_dice += die_die;
        victim.venom += venom;
        if die_die > 0 {
            tracing::info!("{} loses {} dice to {}", target, die_die, source);
        }
        if venom > 0 {
            tracing::info!("{} is poisoned by {} (+{} venom)", target, source, venom);
        }

        let spite = self.count_card(target, CardKind::Spiteful);
        if spite > 0 {
            self.add_points(source, -spite);
        }
    }

    /// Health would reach zero: pay out skull collectors, then either
    /// rebirth or death.
    fn lethal(&mut self, player: PlayerId) {
        let collectors: Vec<(PlayerId, i32)> = self
            .state
            .players
            .iter()
            .map(|(id, p)| (id, self.catalog.count_card(p, CardKind::SkullCollector)))
            .filter(|(_, count)| *count > 0)
            .collect();
        let skull_points = self.state.config.skull_collecting_points;
        for (collector, count) in collectors {
            self.add_points(collector, skull_points * count);
        }

        if self.has_card(player, CardKind::Rebirth) {
            self.rebirth(player);
            return;
        }

        let before = self.state.player(player).health();
        self.state.player_mut(player).set_health(0);
        self.emit(GameEvent::HealthChanged {
            player,
            delta: -before,
            health: 0,
        });
        tracing::info!("{} died", player);
        self.emit(GameEvent::PlayerDied { player });
        self.remove_all_cards(player);
        self.kill_player(player);
    }

    fn rebirth(&mut self, player: PlayerId) {
        let lost = self.state.player(player).points();
        self.state.player_mut(player).reset_points();
        if lost > 0 {
            self.emit(GameEvent::PointsChanged {
                player,
                delta: -lost,
                points: 0,
            });
        }
        if self.state.is_inside(player) {
            self.leave_inside(player, true);
        }

        let rebirth_health = self.state.config.rebirth_health;
        let p = self.state.player_mut(player);
        let before = p.health();
        let health = p.set_health(rebirth_health);
        self.emit(GameEvent::HealthChanged {
            player,
            delta: health - before,
            health,
        });
        tracing::info!("{} was reborn", player);
        self.emit(GameEvent::PlayerReborn { player });
        self.remove_all_cards(player);
    }

    /// Clean up after a death: pivot, inside area, pending decisions and,
    /// for the turn player, the rest of the turn.
    pub(crate) fn kill_player(&mut self, player: PlayerId) {
        if self.state.clock.pivot == player {
            if let Some(next) = self.state.next_living(player) {
                self.state.clock.pivot = next;
            }
        }

        if self.state.is_inside(player) {
            self.state.turn.inside_died = true;
            self.leave_inside(player, true);
        }
        if self.state.inside.len() > self.state.max_inside() {
            if let Some(last) = self.state.inside.last().copied() {
                self.leave_inside(last, false);
            }
        }

        self.queue.clear_for_player(player);

        if player == self.state.turn_player && !self.state.turn.has_ended {
            self.end_turn();
        }
    }

    // === Damage reduction ===

    /// Reduction options `claim.target` may take against this hit, in
    /// catalog order.
    pub(crate) fn damage_reduction_options(&self, claim: DamageClaim) -> Options {
        let player = self.state.player(claim.target);
        let currency = player.currency();
        let flags = player.reduction;
        let mut options = Options::new();
        for (kind, _) in self.triggered(claim.target, TriggerPoint::DamageReduction) {
            match kind {
                CardKind::HealthInsurance
                    if !flags.has_paid_to_reduce
                        && currency >= INSURANCE_RATE
                        && -INSURANCE_RATE * (player.health() - claim.amount - 1) <= currency =>
                {
                    options.push(GameOption::GainPayToReduceDamage(claim));
                }
                CardKind::TemporaryInvulnerability
                    if !flags.has_had_invulnerability_option && currency >= INVULNERABILITY_COST =>
                {
                    options.push(GameOption::PayToBecomeInvulnerable(claim));
                }
                CardKind::HeartyRoll if !flags.has_rolled_to_reduce => {
                    options.push(GameOption::GainRollToReduceDamage(claim));
                }
                _ => {}
            }
        }
        options
    }

    /// Decline every reduction and take the hit.
    pub(crate) fn take_damage(&mut self, claim: DamageClaim) {
        self.state.player_mut(claim.target).reduction.spend_all();
        self.change_health(claim.target, claim.source, -claim.amount);
    }

    pub(crate) fn become_invulnerable(&mut self, claim: DamageClaim) {
        let target = claim.target;
        if !self.pay(target, INVULNERABILITY_COST) {
            self.take_damage(claim);
            return;
        }
        let player = self.state.player_mut(target);
        player.reduction.invulnerable = true;
        player.reduction.has_had_invulnerability_option = true;
        player.incoming_damage = 0;
        tracing::info!("{} is invulnerable for the rest of the turn", target);
        self.emit(GameEvent::DamageNegated {
            player: target,
            amount: claim.amount,
        });
    }

    /// Most damage `claim.target` can currently buy off.
    fn max_insured(&self, claim: DamageClaim) -> i32 {
        let currency = self.state.player(claim.target).currency();
        claim.amount.min(currency / INSURANCE_RATE).max(0)
    }

    pub(crate) fn offer_pay_to_reduce(&mut self, claim: DamageClaim) {
        let max = self.max_insured(claim);
        self.queue
            .enqueue_priority(Decision::pay_to_reduce_damage(claim, max));
    }

    pub(crate) fn pay_to_reduce(&mut self, claim: DamageClaim, reduction: i32) {
        let reduction = reduction.clamp(0, self.max_insured(claim));
        if reduction > 0 {
            self.pay(claim.target, INSURANCE_RATE * reduction);
            tracing::info!("{} pays to prevent {} damage", claim.target, reduction);
        }
        self.state.player_mut(claim.target).reduction.has_paid_to_reduce = true;
        self.change_health(claim.target, claim.source, -(claim.amount - reduction));
    }

    /// Borrow the tray: one die per point of incoming damage.
    pub(crate) fn offer_roll_to_reduce(&mut self, claim: DamageClaim) {
        let max_dice = self.state.config.max_dice;
        let dice = usize::try_from(claim.amount).unwrap_or(0).min(max_dice);
        self.state.dice.init(dice, 1);
        self.queue
            .enqueue_priority(Decision::roll_to_reduce_damage(claim));
    }

    pub(crate) fn roll_to_reduce(&mut self, claim: DamageClaim) {
        let rolled = self.state.dice.roll_all(&mut self.state.rng);
        let heals = rolled.iter().filter(|(_, face)| *face == Face::Heal).count() as i32;
        self.emit(GameEvent::DiceRolled {
            player: claim.target,
            dice: rolled,
        });
        tracing::info!("{} rolls away {} damage", claim.target, heals.min(claim.amount));
        self.state.player_mut(claim.target).reduction.has_rolled_to_reduce = true;
        self.change_health(claim.target, claim.source, -(claim.amount - heals).max(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::decision::DecisionKind;

    fn engine(seats: usize) -> Engine {
        let mut e = Engine::standard(GameConfig::all_ai(seats).with_seed(9)).unwrap();
        e.state_mut().turn_player = PlayerId::new(0);
        e
    }

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut e = engine(2);
        e.state_mut().player_mut(p(1)).set_health(8);
        assert!(e.change_health(p(1), None, 5));
        assert_eq!(e.state().player(p(1)).health(), 10);
    }

    #[test]
    fn test_vitality_boosts_partial_heal() {
        let mut e = engine(2);
        e.grant_card(p(1), CardKind::Vitality);
        e.state_mut().player_mut(p(1)).set_health(4);
        e.change_health(p(1), None, 2);
        assert_eq!(e.state().player(p(1)).health(), 7);
    }

    #[test]
    fn test_strong_armour_stops_single_point() {
        let mut e = engine(2);
        e.grant_card(p(1), CardKind::StrongArmour);
        assert!(!e.change_health(p(1), Some(p(0)), -1));
        assert_eq!(e.state().player(p(1)).health(), 10);
        assert!(e.change_health(p(1), Some(p(0)), -2));
        assert_eq!(e.state().player(p(1)).health(), 8);
    }

    #[test]
    fn test_lethal_hit_kills_and_strips_cards() {
        let mut e = engine(3);
        e.grant_card(p(1), CardKind::Thrifty);
        e.state_mut().player_mut(p(1)).set_health(3);

        assert!(e.change_health(p(1), Some(p(0)), -5));
        let victim = e.state().player(p(1));
        assert!(!victim.is_alive());
        assert_eq!(victim.health(), 0);
        assert!(victim.cards.is_empty());
    }

    #[test]
    fn test_dead_player_ignores_changes() {
        let mut e = engine(3);
        e.state_mut().player_mut(p(2)).set_health(0);
        assert!(!e.change_health(p(2), None, 4));
        assert_eq!(e.state().player(p(2)).health(), 0);
    }

    #[test]
    fn test_rebirth_restores_health_and_zeroes_points() {
        let mut e = engine(3);
        e.grant_card(p(1), CardKind::Rebirth);
        e.add_points(p(1), 7);
        e.change_health(p(1), None, -20);

        let reborn = e.state().player(p(1));
        assert!(reborn.is_alive());
        assert_eq!(reborn.health(), 10);
        assert_eq!(reborn.points(), 0);
        assert!(reborn.cards.is_empty());
    }

    #[test]
    fn test_skull_collector_paid_on_death() {
        let mut e = engine(3);
        e.grant_card(p(2), CardKind::SkullCollector);
        e.change_health(p(1), None, -20);
        assert_eq!(e.state().player(p(2)).points(), 2);
    }

    #[test]
    fn test_on_hit_cards_mark_the_victim() {
        let mut e = engine(3);
        e.grant_card(p(0), CardKind::DieDie);
        e.grant_card(p(0), CardKind::VenomousBite);
        e.grant_card(p(1), CardKind::Spiteful);
        e.add_points(p(0), 3);

        e.change_health(p(1), Some(p(0)), -2);
        let victim = e.state().player(p(1));
        assert_eq!((victim.dead_dice, victim.venom), (1, 1));
        assert_eq!(e.state().player(p(0)).points(), 2);
    }

    #[test]
    fn test_blood_donor_pays_on_big_hits() {
        let mut e = engine(2);
        e.grant_card(p(1), CardKind::BloodDonor);
        e.change_health(p(1), None, -1);
        assert_eq!(e.state().player(p(1)).currency(), 0);
        e.change_health(p(1), None, -2);
        assert_eq!(e.state().player(p(1)).currency(), 1);
    }

    #[test]
    fn test_reduction_card_suspends_the_hit() {
        let mut e = engine(2);
        e.grant_card(p(1), CardKind::HeartyRoll);

        assert!(!e.change_health(p(1), Some(p(0)), -4));
        assert_eq!(e.state().player(p(1)).health(), 10);
        assert_eq!(e.state().player(p(1)).incoming_damage, 4);

        let head = e.present().unwrap();
        assert_eq!(head.kind, DecisionKind::SpecialDamageReduction);
        assert_eq!(head.player, Some(p(1)));
        assert_eq!(head.options.len(), 2);
    }

    #[test]
    fn test_declining_reduction_applies_full_damage() {
        let mut e = engine(2);
        e.grant_card(p(1), CardKind::HeartyRoll);
        e.change_health(p(1), Some(p(0)), -4);

        let claim = DamageClaim::new(p(1), Some(p(0)), 4);
        e.take_damage(claim);
        assert_eq!(e.state().player(p(1)).health(), 6);
        assert!(!e.state().player(p(1)).reduction.has_rolled_to_reduce);
    }

    #[test]
    fn test_insurance_pays_per_point() {
        let mut e = engine(2);
        e.grant_card(p(1), CardKind::HealthInsurance);
        e.adjust_currency(p(1), 5);
        let claim = DamageClaim::new(p(1), None, 3);

        assert_eq!(e.damage_reduction_options(claim).as_slice(), &[GameOption::GainPayToReduceDamage(claim)]);
        e.pay_to_reduce(claim, 9);
        assert_eq!(e.state().player(p(1)).currency(), 1);
        assert_eq!(e.state().player(p(1)).health(), 9);
    }

    #[test]
    fn test_invulnerability_negates_until_next_turn() {
        let mut e = engine(2);
        e.grant_card(p(1), CardKind::TemporaryInvulnerability);
        e.adjust_currency(p(1), 2);
        let claim = DamageClaim::new(p(1), Some(p(0)), 3);

        e.become_invulnerable(claim);
        assert!(e.state().player(p(1)).reduction.invulnerable);
        assert_eq!(e.state().player(p(1)).currency(), 0);
        assert!(!e.change_health(p(1), Some(p(0)), -6));
        assert_eq!(e.state().player(p(1)).health(), 10);
    }

    #[test]
    fn test_roll_to_reduce_never_heals() {
        let mut e = engine(2);
        let claim = DamageClaim::new(p(1), None, 2);
        e.offer_roll_to_reduce(claim);
        assert_eq!(e.state().dice.len(), 2);

        e.roll_to_reduce(claim);
        let health = e.state().player(p(1)).health();
        assert!((8..=10).contains(&health));
        assert!(e.state().dice.all_held() || !e.state().dice.can_roll());
    }
}
