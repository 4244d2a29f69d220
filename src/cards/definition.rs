//! Card definitions: the static record behind every card kind.
//!
//! A definition is data only: base cost, attribute tags, the trigger points
//! the card reacts to, and for instant cards the effect applied on purchase.
//! The behaviour behind a trigger lives in the rules engine and is selected
//! by [`CardKind`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{AttributeFamily, Attributes, CardAttribute};
use super::trigger::TriggerPoint;

/// Every modifier card in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardKind {
    FreeReturns,
    DiceCloning,
    Vitality,
    GoodInvestments,
    Aggressive,
    Counterfeiting,
    StrongArmour,
    Rebirth,
    FullHouse,
    CollateralDamage,
    OneLove,
    HiddenWeapon,
    Resourceful,
    DamageForTwo,
    BloodDonor,
    Gallant,
    Healthy,
    Thrifty,
    Mercantile,
    Pathetic,
    Sneaky,
    SplashDamage,
    SpikeySides,
    CountingCards,
    Institutionalized,
    Foresight,
    HedgeFund,
    SkullCollector,
    Pacifist,
    OneMore,
    HighRoller,
    Spiteful,
    GloriousGrenade,
    MoraleBoost,
    Prestigious,
    Tourniquet,
    Masochistic,
    MinorVictory,
    Martyrish,
    Sacrifice,
    Honorable,
    InstantDividend,
    RobinHood,
    NonStop,
    MinorSelfDestruct,
    WellRenowned,
    TearGas,
    Invasion,
    HealthInsurance,
    TemporaryInvulnerability,
    HeartyRoll,
    RockAndRoller,
    CostlyRoll,
    DieForger,
    OneToOne,
    DieCaster,
    TertiaryAllergy,
    DieKing,
    AggressiveHealthcare,
    DieDie,
    VenomousBite,
    Bargainer,
    QuickDeal,
    Duplicate,
}

/// One-shot effect of an instant card, applied to the buyer on purchase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantEffect {
    pub points: i32,
    /// Health change for the buyer (negative hurts).
    pub health: i32,
    pub currency: i32,
    /// Damage to every other living player.
    pub damage_others: i32,
    /// Damage to every player inside other than the buyer.
    pub damage_inside: i32,
    /// Currency taken from each other living player.
    pub steal_currency: i32,
    pub extra_turn: bool,
    pub enter_inside: bool,
}

impl InstantEffect {
    #[must_use]
    pub const fn points(points: i32) -> Self {
        Self {
            points,
            health: 0,
            currency: 0,
            damage_others: 0,
            damage_inside: 0,
            steal_currency: 0,
            extra_turn: false,
            enter_inside: false,
        }
    }

    #[must_use]
    pub const fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    #[must_use]
    pub const fn with_currency(mut self, currency: i32) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub const fn with_damage_others(mut self, damage: i32) -> Self {
        self.damage_others = damage;
        self
    }

    #[must_use]
    pub const fn with_damage_inside(mut self, damage: i32) -> Self {
        self.damage_inside = damage;
        self
    }

    #[must_use]
    pub const fn with_steal(mut self, currency: i32) -> Self {
        self.steal_currency = currency;
        self
    }

    #[must_use]
    pub const fn with_extra_turn(mut self) -> Self {
        self.extra_turn = true;
        self
    }

    #[must_use]
    pub const fn with_enter_inside(mut self) -> Self {
        self.enter_inside = true;
        self
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use siege_dice::cards::{CardAttribute, CardDefinition, CardKind, InstantEffect};
///
/// let card = CardDefinition::new(CardKind::Prestigious, "Prestigious", 5)
///     .instant(InstantEffect::points(3));
///
/// assert_eq!(card.attribute(CardAttribute::PointsInstant), 3);
/// assert!(card.is_instant());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDefinition {
    pub kind: CardKind,
    pub name: String,
    pub base_cost: i32,
    pub attributes: Attributes,
    pub triggers: SmallVec<[TriggerPoint; 2]>,
    pub instant: Option<InstantEffect>,
}

impl CardDefinition {
    #[must_use]
    pub fn new(kind: CardKind, name: impl Into<String>, base_cost: i32) -> Self {
        Self {
            kind,
            name: name.into(),
            base_cost,
            attributes: Attributes::default(),
            triggers: SmallVec::new(),
            instant: None,
        }
    }

    /// Tag the card with an attribute value.
    #[must_use]
    pub fn with_attr(mut self, attribute: CardAttribute, value: i32) -> Self {
        self.attributes.insert(attribute, value);
        self
    }

    /// Tag the card with a flag attribute.
    #[must_use]
    pub fn with_flag(self, attribute: CardAttribute) -> Self {
        self.with_attr(attribute, 1)
    }

    #[must_use]
    pub fn on(mut self, point: TriggerPoint) -> Self {
        self.triggers.push(point);
        self
    }

    /// Make this an instant card and derive its instant attributes.
    #[must_use]
    pub fn instant(mut self, effect: InstantEffect) -> Self {
        use CardAttribute::*;

        if effect.points != 0 {
            self.attributes.insert(PointsInstant, effect.points);
        }
        if effect.health != 0 {
            self.attributes.insert(HealthInstant, effect.health);
        }
        if effect.currency != 0 || effect.steal_currency != 0 {
            self.attributes
                .insert(CurrencyInstant, effect.currency + effect.steal_currency);
        }
        let damage = effect.damage_others + effect.damage_inside;
        if damage != 0 {
            self.attributes.insert(DamageInstant, -damage);
        }
        if effect.enter_inside {
            self.attributes.insert(EnterInside, 1);
        }
        if effect.extra_turn {
            self.attributes.insert(ExtraTurn, 1);
        }
        self.instant = Some(effect);
        self.on(TriggerPoint::Instant)
    }

    #[must_use]
    pub fn is_instant(&self) -> bool {
        self.instant.is_some()
    }

    /// Attribute value, or 0 when absent.
    #[must_use]
    pub fn attribute(&self, attribute: CardAttribute) -> i32 {
        self.attributes.get(&attribute).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has_attribute(&self, attribute: CardAttribute) -> bool {
        self.attributes.contains_key(&attribute)
    }

    #[must_use]
    pub fn in_family(&self, family: AttributeFamily) -> bool {
        self.attributes.keys().any(|a| a.family() == family)
    }

    #[must_use]
    pub fn reacts_to(&self, point: TriggerPoint) -> bool {
        self.triggers.contains(&point)
    }
}
