//! Buying, refreshing, refunding and duplicating cards.
//!
//! Which cards may be bought is decided when BrowseCards is presented; the
//! handlers here re-check ownership and price and refuse anything stale.

use crate::cards::{CardId, CardKind, InstantEffect};
use crate::core::PlayerId;
use crate::decision::{Decision, Options};
use crate::events::GameEvent;

use super::Engine;

impl Engine {
    // === Browsing ===

    /// Live BrowseCards decision for `player`: refresh when the pile has
    /// cards and the player can pay, one buy per affordable card on offer.
    pub(crate) fn browse_decision(&self, player: PlayerId) -> Decision {
        let buyer = self.state.player(player);
        let can_refresh = !self.state.market.draw_pile().is_empty()
            && buyer.currency() >= self.state.config.refresh_cost;
        let buyable: Vec<CardId> = self
            .state
            .cards_available_to(player)
            .into_iter()
            .filter(|(_, card)| self.catalog.cost_to_player(card.kind, buyer) <= buyer.currency())
            .map(|(_, card)| card.id)
            .collect();
        Decision::browse_cards(player, can_refresh, &buyable)
    }

    pub(crate) fn browse_options(&self, player: PlayerId) -> Options {
        self.browse_decision(player).options
    }

    pub(crate) fn finished_browsing(&mut self, actor: PlayerId) {
        let player = self.state.player(actor);
        if self.has_card(actor, CardKind::FreeReturns) && !player.cards.is_empty() {
            self.continue_turn(actor, |p, engine| {
                let held: Vec<CardId> = engine.state.player(p).cards.iter().map(|c| c.id).collect();
                Decision::refund_cards(p, &held)
            });
        }
        self.continue_turn(actor, |p, _| Decision::end_turn(p));
    }

    /// Discard the face-up cards for the refresh price and browse again.
    pub(crate) fn refresh_cards(&mut self, actor: PlayerId) {
        let cost = self.state.config.refresh_cost;
        if self.state.market.draw_pile().is_empty() || !self.pay(actor, cost) {
            tracing::warn!("{} cannot refresh the market", actor);
            self.continue_turn(actor, |p, engine| engine.browse_decision(p));
            return;
        }

        let discarded = self.state.market.refresh(self.state.config.card_visibility);
        tracing::debug!("{} refreshed the market ({} discarded)", actor, discarded);
        self.emit(GameEvent::MarketRefreshed { discarded });
        self.market_moved();
        self.continue_turn(actor, |p, engine| engine.browse_decision(p));
    }

    /// Draw pile top changed: rebuild an empty pile and give Quick Deal
    /// holders a fresh chance at the next card.
    fn market_moved(&mut self) {
        self.state.market.replenish(&mut self.state.rng);
        self.state.bought_instantly.fill(false);
        self.check_quick_deal();
    }

    // === Buying ===

    /// Buy `card` from the draw pile or from an enemy's collection.
    ///
    /// Returns false, changing nothing, when the card is not for sale or
    /// the buyer cannot pay for it.
    pub(crate) fn buy_card(&mut self, buyer: PlayerId, card: CardId) -> bool {
        let from_market = self.state.market.position(card).is_some();
        let owner = if from_market {
            None
        } else {
            match self.state.card_owner(card) {
                Some(owner) if owner != buyer => Some(owner),
                _ => {
                    tracing::warn!("{} is not for sale to {}", card, buyer);
                    return false;
                }
            }
        };
        let kind = match owner {
            None => self.state.market.position(card).and_then(|i| self.state.market.peek(i)),
            Some(owner) => self.state.player(owner).card(card),
        }
        .map(|c| c.kind);
        let Some(kind) = kind else { return false };

        let cost = self.catalog.cost_to_player(kind, self.state.player(buyer));
        if self.state.player(buyer).currency() < cost {
            tracing::warn!("{} cannot afford {:?} ({})", buyer, kind, cost);
            return false;
        }

        let mercantile = self.count_card(buyer, CardKind::Mercantile);
        if mercantile > 0 {
            self.add_points(buyer, mercantile);
        }
        self.pay(buyer, cost);

        let bought = match owner {
            None => self.state.market.take(card),
            Some(owner) => {
                let taken = self.remove_card(owner, card);
                self.adjust_currency(owner, cost);
                taken
            }
        };
        let Some(mut bought) = bought else { return false };

        tracing::info!("{} bought {:?} for {}", buyer, kind, cost);
        self.emit(GameEvent::CardBought {
            player: buyer,
            card,
            kind,
            cost,
            from: owner,
        });

        if let Some(effect) = self.catalog.instant_effect(kind) {
            self.state.market.discard(bought);
            self.apply_instant(buyer, effect);
        } else {
            bought.duplicating = None;
            self.add_card(buyer, bought);
            if kind == CardKind::Duplicate {
                let targets = self.duplicate_targets(buyer);
                if !targets.is_empty() {
                    self.queue
                        .enqueue_priority(Decision::duplicate_card(buyer, card, &targets, true));
                }
            }
        }

        if from_market {
            self.market_moved();
        }
        true
    }

    fn apply_instant(&mut self, buyer: PlayerId, effect: InstantEffect) {
        if effect.points != 0 {
            self.add_points(buyer, effect.points);
        }
        if effect.currency > 0 {
            self.gain_currency(buyer, effect.currency);
        }

        if effect.steal_currency > 0 {
            let mut stolen = 0;
            for victim in self.state.others_living(buyer) {
                stolen -= self.adjust_currency(victim, -effect.steal_currency);
            }
            self.gain_currency(buyer, stolen);
        }

        if effect.damage_others > 0 {
            for victim in self.state.others_living(buyer) {
                self.change_health(victim, Some(buyer), -effect.damage_others);
            }
        }
        if effect.damage_inside > 0 {
            let occupants: Vec<PlayerId> =
                self.state.inside.iter().copied().filter(|p| *p != buyer).collect();
            for victim in occupants {
                self.change_health(victim, Some(buyer), -effect.damage_inside);
            }
        }

        if effect.health != 0 {
            self.change_health(buyer, None, effect.health);
        }

        if effect.extra_turn {
            if buyer == self.state.turn_player {
                self.state.extra_turn = true;
                tracing::info!("{} earned another turn", buyer);
            } else {
                tracing::debug!("{} bought an extra turn outside their turn", buyer);
            }
        }

        if effect.enter_inside && self.state.player(buyer).is_alive() && !self.state.is_inside(buyer) {
            if !self.state.inside_has_free_slot() {
                if let Some(last) = self.state.inside.last().copied() {
                    self.leave_inside(last, false);
                }
            }
            self.enter_inside(buyer);
        }
    }

    /// Offer the first card past the face-up ones to the first living Quick
    /// Deal holder, other than the turn player, who has not had the offer
    /// since the market last moved and can afford it.
    pub(crate) fn check_quick_deal(&mut self) {
        let visibility = self.state.config.card_visibility;
        let Some(next) = self.state.market.peek(visibility).map(|c| (c.id, c.kind)) else {
            return;
        };
        let (card, kind) = next;
        let turn = self.state.turn_player;

        let buyer = self.state.living_ids().into_iter().find(|p| {
            *p != turn
                && !self.state.bought_instantly[*p]
                && self.has_card(*p, CardKind::QuickDeal)
                && self.catalog.cost_to_player(kind, self.state.player(*p))
                    <= self.state.player(*p).currency()
        });
        if let Some(buyer) = buyer {
            tracing::debug!("{} may buy {:?} instantly", buyer, kind);
            self.state.bought_instantly[buyer] = true;
            self.queue.enqueue_priority(Decision::buy_card_instantly(buyer, card));
        }
    }

    // === Refunds ===

    /// Return a held card at its base cost while Free Returns is held,
    /// then offer the remaining cards again.
    pub(crate) fn refund_card(&mut self, actor: PlayerId, card: CardId) {
        if !self.has_card(actor, CardKind::FreeReturns) {
            tracing::warn!("{} has nothing to refund with", actor);
            return;
        }
        let Some(removed) = self.remove_card(actor, card) else {
            tracing::warn!("{} does not hold {}", actor, card);
            return;
        };
        let refund = self.catalog.definition(removed.kind).map_or(0, |d| d.base_cost);
        tracing::debug!("{} returned {:?} for {}", actor, removed.kind, refund);
        self.state.market.discard(removed);
        self.adjust_currency(actor, refund);

        let player = self.state.player(actor);
        if player.is_alive() && self.has_card(actor, CardKind::FreeReturns) {
            let held: Vec<CardId> = player.cards.iter().map(|c| c.id).collect();
            self.queue.enqueue_priority(Decision::refund_cards(actor, &held));
        }
    }

    // === Duplicates ===

    /// Kinds a Duplicate held by `player` can copy: every kind a living
    /// enemy holds, in catalog order, Duplicate itself excluded.
    pub(crate) fn duplicate_targets(&self, player: PlayerId) -> Vec<CardKind> {
        let held: Vec<CardKind> = self
            .state
            .enemy_cards(player)
            .into_iter()
            .map(|(_, card)| card.kind)
            .collect();
        self.catalog
            .kinds()
            .iter()
            .copied()
            .filter(|kind| *kind != CardKind::Duplicate && held.contains(kind))
            .collect()
    }

    /// Point `card` at `target`. Changing an existing copy costs currency.
    pub(crate) fn duplicate_card(&mut self, actor: PlayerId, card: CardId, target: CardKind, pays: bool) {
        let is_duplicate = self
            .state
            .player(actor)
            .card(card)
            .is_some_and(|c| c.kind == CardKind::Duplicate);
        if !is_duplicate || !self.duplicate_targets(actor).contains(&target) {
            tracing::warn!("{} cannot duplicate {:?} with {}", actor, target, card);
            return;
        }
        if pays && !self.pay(actor, crate::cards::registry::DUPLICATE_CHANGE_COST) {
            tracing::warn!("{} cannot pay to change their duplicate", actor);
            return;
        }
        if let Some(held) = self.state.player_mut(actor).card_mut(card) {
            held.duplicating = Some(target);
        }
        tracing::debug!("{} now duplicates {:?}", actor, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::decision::{DecisionKind, GameOption};

    fn engine(seats: usize) -> Engine {
        let mut e = Engine::standard(GameConfig::all_ai(seats).with_seed(17)).unwrap();
        e.state_mut().turn_player = PlayerId::new(0);
        e
    }

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    fn market_card(e: &Engine, kind: CardKind) -> CardId {
        e.state()
            .market
            .draw_pile()
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.id)
            .unwrap()
    }

    fn fund(e: &mut Engine, player: PlayerId, amount: i32) {
        e.state_mut().player_mut(player).change_currency(amount);
    }

    #[test]
    fn test_browse_lists_only_affordable_visible_cards() {
        let mut e = engine(3);
        let options = e.browse_options(p(0));
        assert_eq!(options.as_slice(), &[GameOption::FinishedBrowsing]);

        fund(&mut e, p(0), 50);
        let options = e.browse_options(p(0));
        assert_eq!(options[1], GameOption::RefreshCards);
        assert_eq!(options.len(), 2 + e.state().config.card_visibility);
    }

    #[test]
    fn test_buy_pays_and_keeps_passive_card() {
        let mut e = engine(3);
        fund(&mut e, p(0), 10);
        let card = market_card(&e, CardKind::Thrifty);

        assert!(e.buy_card(p(0), card));
        assert_eq!(e.state().player(p(0)).currency(), 7);
        assert!(e.state().player(p(0)).has_card(CardKind::Thrifty));
        assert!(e.state().market.position(card).is_none());
        assert!(!e.buy_card(p(1), card));
    }

    #[test]
    fn test_cannot_overspend() {
        let mut e = engine(3);
        fund(&mut e, p(0), 2);
        let card = market_card(&e, CardKind::WellRenowned);
        assert!(!e.buy_card(p(0), card));
        assert_eq!(e.state().player(p(0)).currency(), 2);
        assert!(e.state().market.position(card).is_some());
    }

    #[test]
    fn test_instant_applies_and_is_discarded() {
        let mut e = engine(3);
        fund(&mut e, p(0), 4);
        let grenade = market_card(&e, CardKind::GloriousGrenade);

        assert!(e.buy_card(p(0), grenade));
        assert_eq!(e.state().player(p(0)).points(), 2);
        assert_eq!(e.state().player(p(1)).health(), 8);
        assert_eq!(e.state().player(p(2)).health(), 8);
        assert!(e.state().player(p(0)).cards.is_empty());
        assert!(e.state().market.discard_pile().iter().any(|c| c.id == grenade));
    }

    #[test]
    fn test_mercantile_scores_each_purchase() {
        let mut e = engine(3);
        e.grant_card(p(0), CardKind::Mercantile);
        fund(&mut e, p(0), 10);
        let card = market_card(&e, CardKind::Sneaky);
        e.buy_card(p(0), card);
        assert_eq!(e.state().player(p(0)).points(), 1);
    }

    #[test]
    fn test_bargainer_buys_from_enemy_and_pays_them() {
        let mut e = engine(3);
        e.grant_card(p(0), CardKind::Bargainer);
        let armour = e.grant_card(p(1), CardKind::StrongArmour);
        fund(&mut e, p(0), 5);

        assert!(e.browse_options(p(0)).contains(&GameOption::BuyCard(armour)));
        assert!(e.buy_card(p(0), armour));
        assert!(e.state().player(p(0)).has_card(CardKind::StrongArmour));
        assert!(!e.state().player(p(1)).has_card(CardKind::StrongArmour));
        assert_eq!(e.state().player(p(1)).currency(), 3);
        assert_eq!(e.state().player(p(0)).currency(), 2);
    }

    #[test]
    fn test_refresh_discards_face_up_cards() {
        let mut e = engine(3);
        fund(&mut e, p(0), 2);
        let top = e.state().market.peek(0).unwrap().id;
        let before = e.state().market.draw_pile().len();

        e.refresh_cards(p(0));
        assert_eq!(e.state().player(p(0)).currency(), 0);
        assert_eq!(e.state().market.draw_pile().len(), before - 3);
        assert!(e.state().market.position(top).is_none());
        assert_eq!(e.queue().iter().last().map(|d| d.kind), Some(DecisionKind::BrowseCards));
    }

    #[test]
    fn test_quick_deal_offers_next_card_once() {
        let mut e = engine(3);
        e.grant_card(p(2), CardKind::QuickDeal);
        fund(&mut e, p(2), 20);

        e.check_quick_deal();
        let offer = e.queue().iter().next().unwrap();
        assert_eq!(offer.kind, DecisionKind::BuyCardInstantly);
        assert_eq!(offer.player, Some(p(2)));
        let expected = e.state().market.peek(3).unwrap().id;
        assert!(offer.offers(&GameOption::BuyCardInstantly(expected)));

        let queued = e.queue().len();
        e.check_quick_deal();
        assert_eq!(e.queue().len(), queued);
    }

    #[test]
    fn test_turn_player_never_gets_quick_deal() {
        let mut e = engine(2);
        e.grant_card(p(0), CardKind::QuickDeal);
        fund(&mut e, p(0), 20);
        let queued = e.queue().len();
        e.check_quick_deal();
        assert_eq!(e.queue().len(), queued);
    }

    #[test]
    fn test_free_returns_refunds_base_cost() {
        let mut e = engine(3);
        e.grant_card(p(0), CardKind::FreeReturns);
        let thrifty = e.grant_card(p(0), CardKind::Thrifty);

        e.finished_browsing(p(0));
        let kinds: Vec<DecisionKind> = e.queue().iter().map(|d| d.kind).collect();
        assert!(kinds.ends_with(&[DecisionKind::RefundCards, DecisionKind::EndTurn]));

        e.refund_card(p(0), thrifty);
        assert_eq!(e.state().player(p(0)).currency(), 3);
        assert!(!e.state().player(p(0)).has_card(CardKind::Thrifty));
        assert_eq!(e.queue().iter().next().map(|d| d.kind), Some(DecisionKind::RefundCards));
    }

    #[test]
    fn test_duplicate_copies_enemy_card() {
        let mut e = engine(3);
        e.grant_card(p(1), CardKind::Counterfeiting);
        fund(&mut e, p(0), 5);
        let duplicate = market_card(&e, CardKind::Duplicate);

        assert!(e.buy_card(p(0), duplicate));
        let offer = e.queue().iter().next().unwrap();
        assert_eq!(offer.kind, DecisionKind::SetCardBeingDuplicatedFirstTime);
        assert_eq!(e.duplicate_targets(p(0)), vec![CardKind::Counterfeiting]);

        e.duplicate_card(p(0), duplicate, CardKind::Counterfeiting, false);
        assert_eq!(e.state().player(p(0)).currency(), 0);
        assert_eq!(e.gain_currency(p(0), 1), 2);
    }

    #[test]
    fn test_changing_duplicate_costs_currency() {
        let mut e = engine(3);
        e.grant_card(p(1), CardKind::Thrifty);
        e.grant_card(p(2), CardKind::Sneaky);
        let duplicate = e.grant_card(p(0), CardKind::Duplicate);
        e.duplicate_card(p(0), duplicate, CardKind::Thrifty, false);

        e.duplicate_card(p(0), duplicate, CardKind::Sneaky, true);
        let card = e.state().player(p(0)).card(duplicate).unwrap();
        assert_eq!(card.duplicating, Some(CardKind::Thrifty));

        fund(&mut e, p(0), 1);
        e.duplicate_card(p(0), duplicate, CardKind::Sneaky, true);
        let card = e.state().player(p(0)).card(duplicate).unwrap();
        assert_eq!(card.duplicating, Some(CardKind::Sneaky));
        assert_eq!(e.state().player(p(0)).currency(), 0);
    }

    #[test]
    fn test_invasion_pushes_occupant_out() {
        let mut e = engine(3);
        e.enter_inside(p(1));
        fund(&mut e, p(0), 2);
        let invasion = market_card(&e, CardKind::Invasion);

        assert!(e.buy_card(p(0), invasion));
        assert!(e.state().is_inside(p(0)));
        assert!(!e.state().is_inside(p(1)));
    }
}
