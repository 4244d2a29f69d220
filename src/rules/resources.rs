//! Points, currency and card collection changes.
//!
//! Thin wrappers over the `Player` primitives that add the card hooks and
//! push presentation events.

use crate::cards::{Card, CardId, CardKind, TriggerPoint, TriggeredCards};
use crate::core::PlayerId;
use crate::events::GameEvent;

use super::Engine;

impl Engine {
    /// Cards `player` holds for a trigger point, in catalog order.
    pub(crate) fn triggered(&self, player: PlayerId, point: TriggerPoint) -> TriggeredCards {
        self.catalog.cards_with_trigger(self.state.player(player), point)
    }

    pub(crate) fn count_card(&self, player: PlayerId, kind: CardKind) -> i32 {
        self.catalog.count_card(self.state.player(player), kind)
    }

    pub(crate) fn has_card(&self, player: PlayerId, kind: CardKind) -> bool {
        self.catalog.has_card(self.state.player(player), kind)
    }

    /// Returns the change actually applied (dead players score nothing).
    pub(crate) fn add_points(&mut self, player: PlayerId, delta: i32) -> i32 {
        let applied = self.state.player_mut(player).add_points(delta);
        if applied != 0 {
            let points = self.state.player(player).points();
            tracing::debug!("{} {:+} points ({})", player, applied, points);
            self.emit(GameEvent::PointsChanged {
                player,
                delta: applied,
                points,
            });
        }
        applied
    }

    /// Raw currency change, clamped at zero. No card bonuses.
    pub(crate) fn adjust_currency(&mut self, player: PlayerId, delta: i32) -> i32 {
        let applied = self.state.player_mut(player).change_currency(delta);
        if applied != 0 {
            let currency = self.state.player(player).currency();
            self.emit(GameEvent::CurrencyChanged {
                player,
                delta: applied,
                currency,
            });
        }
        applied
    }

    /// Currency income. Counterfeiting adds one per copy to any gain.
    pub(crate) fn gain_currency(&mut self, player: PlayerId, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let bonus = self.count_card(player, CardKind::Counterfeiting);
        self.adjust_currency(player, amount + bonus)
    }

    /// Spend currency. An overdraft is refused and logged; nothing changes.
    pub(crate) fn pay(&mut self, player: PlayerId, amount: i32) -> bool {
        if amount <= 0 {
            return true;
        }
        if self.state.player_mut(player).spend(amount).is_err() {
            return false;
        }
        let currency = self.state.player(player).currency();
        self.emit(GameEvent::CurrencyChanged {
            player,
            delta: -amount,
            currency,
        });
        true
    }

    /// Add a card to a collection, running its on-add hook.
    pub(crate) fn add_card(&mut self, player: PlayerId, mut card: Card) {
        self.catalog.on_add(&mut self.state.players[player], &mut card);
        self.state.players[player].cards.push(card);
    }

    /// Detach a card, running its on-remove hook. The caller decides where
    /// the card goes next.
    pub(crate) fn remove_card(&mut self, player: PlayerId, card: CardId) -> Option<Card> {
        let removed = self.state.players[player].take_card(card)?;
        self.catalog.on_remove(&mut self.state.players[player], &removed);
        tracing::debug!("{} lost {:?}", player, removed.kind);
        self.emit(GameEvent::CardRemoved {
            player,
            card: removed.id,
            kind: removed.kind,
        });
        Some(removed)
    }

    /// Remove a card and put it on the discard pile.
    pub(crate) fn discard_card(&mut self, player: PlayerId, card: CardId) {
        if let Some(removed) = self.remove_card(player, card) {
            self.state.market.discard(removed);
        }
    }

    pub(crate) fn remove_all_cards(&mut self, player: PlayerId) {
        let ids: Vec<CardId> = self.state.player(player).cards.iter().map(|c| c.id).collect();
        for id in ids {
            self.discard_card(player, id);
        }
    }

    /// Give `player` a card of `kind` without paying for it, taking it from
    /// the market when one is available. Used for table setup.
    pub fn grant_card(&mut self, player: PlayerId, kind: CardKind) -> CardId {
        let in_market = self
            .state
            .market
            .draw_pile()
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.id);
        let card = match in_market.and_then(|id| self.state.market.take(id)) {
            Some(card) => card,
            None => Card::new(self.fresh_card_id(), kind),
        };
        let id = card.id;
        self.add_card(player, card);
        id
    }

    fn fresh_card_id(&self) -> CardId {
        let market = &self.state.market;
        let highest = market
            .draw_pile()
            .iter()
            .chain(market.discard_pile())
            .chain(self.state.players.values().flat_map(|p| p.cards.iter()))
            .map(|c| c.id.raw())
            .max()
            .unwrap_or(0);
        CardId::new(highest + 1)
    }
}
