//! Card instances: a physical card in the market or in front of a player.

use serde::{Deserialize, Serialize};

use super::definition::CardKind;

/// Unique identifier of one physical card in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// A card in play.
///
/// `duplicating` is only set on Duplicate cards and names the enemy card
/// kind the copy currently counts as. `counter` holds per-card countdowns
/// (HedgeFund payouts left).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
    #[serde(default)]
    pub duplicating: Option<CardKind>,
    #[serde(default)]
    pub counter: i32,
}

impl Card {
    #[must_use]
    pub fn new(id: CardId, kind: CardKind) -> Self {
        Self {
            id,
            kind,
            duplicating: None,
            counter: 0,
        }
    }

    /// True if this card is, or currently duplicates, `kind`.
    #[must_use]
    pub fn counts_as(&self, kind: CardKind) -> bool {
        self.kind == kind || self.duplicating == Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_display() {
        assert_eq!(CardId::new(12).to_string(), "Card(12)");
        assert_eq!(CardId::new(12).raw(), 12);
    }

    #[test]
    fn test_duplicate_counts_as_target() {
        let mut copy = Card::new(CardId::new(1), CardKind::Duplicate);
        assert!(copy.counts_as(CardKind::Duplicate));
        assert!(!copy.counts_as(CardKind::HiddenWeapon));

        copy.duplicating = Some(CardKind::HiddenWeapon);
        assert!(copy.counts_as(CardKind::HiddenWeapon));
    }
}
