//! The shared card market.
//!
//! A draw pile whose top cards are face up, and a discard pile. When the
//! draw pile runs out it is rebuilt by shuffling the discards.

use serde::{Deserialize, Serialize};

use super::definition::CardKind;
use super::instance::{Card, CardId};
use crate::core::GameRng;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    draw: Vec<Card>,
    discard: Vec<Card>,
}

impl Market {
    /// One physical card per kind listed, shuffled.
    pub fn new(deck: &[CardKind], rng: &mut GameRng) -> Self {
        let mut draw: Vec<Card> = deck
            .iter()
            .enumerate()
            .map(|(i, kind)| Card::new(CardId::new(i as u32 + 1), *kind))
            .collect();
        rng.shuffle(&mut draw);
        Self {
            draw,
            discard: Vec::new(),
        }
    }

    #[must_use]
    pub fn draw_pile(&self) -> &[Card] {
        &self.draw
    }

    #[must_use]
    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    /// The top `count` cards, or fewer if the pile is short.
    #[must_use]
    pub fn visible(&self, count: usize) -> &[Card] {
        &self.draw[..count.min(self.draw.len())]
    }

    /// Card at a draw pile position.
    #[must_use]
    pub fn peek(&self, position: usize) -> Option<&Card> {
        self.draw.get(position)
    }

    #[must_use]
    pub fn position(&self, card: CardId) -> Option<usize> {
        self.draw.iter().position(|c| c.id == card)
    }

    /// Remove a card from anywhere in the draw pile.
    pub fn take(&mut self, card: CardId) -> Option<Card> {
        let position = self.position(card)?;
        Some(self.draw.remove(position))
    }

    /// Put a card on the discard pile, clearing its per-owner state.
    pub fn discard(&mut self, mut card: Card) {
        card.duplicating = None;
        card.counter = 0;
        self.discard.push(card);
    }

    /// Discard the top `count` cards. Returns how many moved.
    pub fn refresh(&mut self, count: usize) -> usize {
        let moved = count.min(self.draw.len());
        let cards: Vec<Card> = self.draw.drain(..moved).collect();
        self.discard.extend(cards);
        moved
    }

    /// Shuffle the discards back in when the draw pile is empty.
    ///
    /// Returns true if the pile was rebuilt.
    pub fn replenish(&mut self, rng: &mut GameRng) -> bool {
        if !self.draw.is_empty() || self.discard.is_empty() {
            return false;
        }
        self.draw.append(&mut self.discard);
        rng.shuffle(&mut self.draw);
        true
    }
}
