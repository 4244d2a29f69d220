//! Card attributes and the families they roll up into.
//!
//! Attributes are what the AI reads when it browses the market: an instant
//! card advertises how many points, how much health or how much damage it
//! carries, and passive cards advertise what they are good for. Each
//! attribute belongs to exactly one [`AttributeFamily`].
//!
//! Instant attributes carry signed magnitudes. `DamageInstant` is the health
//! change the card inflicts on its targets, so it is negative.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single tagged property of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardAttribute {
    PointsInstant,
    HealthInstant,
    DamageInstant,
    CurrencyInstant,
    EnterInside,
    ExtraTurn,
    PointsBonus,
    HealthBonus,
    DamageBonus,
    CurrencyBonus,
    DamageReduction,
    CurrencyHoarding,
    WeakenEnemies,
    DiceControl,
    MarketControl,
    /// Always worth buying when affordable.
    NoBrainer,
}

impl CardAttribute {
    #[must_use]
    pub const fn family(self) -> AttributeFamily {
        use CardAttribute::*;
        match self {
            PointsInstant | PointsBonus => AttributeFamily::Points,
            HealthInstant | HealthBonus | DamageReduction => AttributeFamily::Health,
            DamageInstant | DamageBonus => AttributeFamily::Damage,
            CurrencyInstant | CurrencyBonus => AttributeFamily::Currency,
            CurrencyHoarding => AttributeFamily::CurrencyHoarding,
            WeakenEnemies => AttributeFamily::WeakenEnemies,
            DiceControl => AttributeFamily::DiceControl,
            EnterInside | ExtraTurn | MarketControl | NoBrainer => AttributeFamily::Other,
        }
    }
}

/// Broad grouping of attributes.
///
/// The first four are the resource families an AI personality ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeFamily {
    Points,
    Damage,
    Health,
    Currency,
    CurrencyHoarding,
    WeakenEnemies,
    DiceControl,
    Other,
}

impl AttributeFamily {
    /// The families a personality orders by preference.
    pub const RESOURCES: [AttributeFamily; 4] = [
        AttributeFamily::Points,
        AttributeFamily::Damage,
        AttributeFamily::Health,
        AttributeFamily::Currency,
    ];
}

/// Attribute table of one card. Flags are stored with value 1.
pub type Attributes = FxHashMap<CardAttribute, i32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_families() {
        assert_eq!(CardAttribute::PointsInstant.family(), AttributeFamily::Points);
        assert_eq!(CardAttribute::DamageInstant.family(), AttributeFamily::Damage);
        assert_eq!(CardAttribute::DamageReduction.family(), AttributeFamily::Health);
        assert_eq!(CardAttribute::NoBrainer.family(), AttributeFamily::Other);
    }

    #[test]
    fn test_attribute_table() {
        let mut attrs = Attributes::default();
        attrs.insert(CardAttribute::PointsInstant, 3);
        attrs.insert(CardAttribute::NoBrainer, 1);

        assert_eq!(attrs.get(&CardAttribute::PointsInstant), Some(&3));
        assert!(attrs.contains_key(&CardAttribute::NoBrainer));
        assert!(!attrs.contains_key(&CardAttribute::DiceControl));
    }
}
