//! The card catalog seam and the standard catalog.
//!
//! The rules engine never looks card data up directly; it goes through
//! [`CardCatalog`], which answers cost and attribute queries, lists the
//! cards a player holds for a trigger point, and runs the add/remove hooks.
//! [`CardRegistry::standard`] is the catalog the game ships with.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::attributes::{AttributeFamily, Attributes, CardAttribute};
use super::definition::{CardDefinition, CardKind, InstantEffect};
use super::instance::Card;
use super::trigger::TriggerPoint;
use crate::players::Player;

/// Turns a HedgeFund card pays out before it expires.
pub const HEDGE_FUND_TURNS: i32 = 3;
/// Rolls granted per RockAndRoller card.
pub const ROCK_AND_ROLLER_ROLLS: i32 = 2;
/// Max health granted per Healthy card.
pub const HEALTHY_MAX_HEALTH: i32 = 2;
/// Currency per HedgeFund copy at the start of each turn.
pub const HEDGE_FUND_PAYOUT: i32 = 2;
pub const COSTLY_ROLL_COST: i32 = 1;
pub const DIE_CASTER_COST: i32 = 2;
/// TemporaryInvulnerability price.
pub const INVULNERABILITY_COST: i32 = 2;
/// HealthInsurance price per point of damage prevented.
pub const INSURANCE_RATE: i32 = 2;
/// Changing what a Duplicate copies costs this much per card already
/// offered this turn.
pub const DUPLICATE_CHANGE_COST: i32 = 1;
/// Currency taken from an enemy per point healed with AggressiveHealthcare.
pub const HEALTHCARE_FEE: i32 = 2;
/// Bonus for showing every face at resolution.
pub const FULL_HOUSE_POINTS: i32 = 9;
/// Bonus for showing a one, a two and a three.
pub const COUNTING_CARDS_POINTS: i32 = 2;
pub const ONE_LOVE_POINTS: i32 = 2;
pub const DAMAGE_FOR_TWO_DAMAGE: i32 = 2;
/// GoodInvestments pays a point per this much currency held.
pub const GOOD_INVESTMENTS_RATE: i32 = 6;

/// (kind, copies held) pairs returned for a trigger point.
pub type TriggeredCards = SmallVec<[(CardKind, i32); 4]>;

/// Capability queries the engine makes about cards.
pub trait CardCatalog: std::fmt::Debug {
    fn definition(&self, kind: CardKind) -> Option<&CardDefinition>;

    /// Every kind in catalog order. Trigger dispatch follows this order.
    fn kinds(&self) -> &[CardKind];

    /// Kinds making up a fresh draw pile, before shuffling.
    fn deck(&self) -> Vec<CardKind> {
        self.kinds().to_vec()
    }

    fn has_card(&self, player: &Player, kind: CardKind) -> bool {
        player.has_card(kind)
    }

    fn count_card(&self, player: &Player, kind: CardKind) -> i32 {
        player.count_card(kind)
    }

    /// Price after the player's discounts.
    fn cost_to_player(&self, kind: CardKind, player: &Player) -> i32 {
        let base = self.definition(kind).map_or(0, |d| d.base_cost);
        (base - player.count_card(CardKind::Thrifty)).max(0)
    }

    fn attributes_of(&self, kind: CardKind) -> Option<&Attributes> {
        self.definition(kind).map(|d| &d.attributes)
    }

    fn attribute(&self, kind: CardKind, attribute: CardAttribute) -> i32 {
        self.definition(kind).map_or(0, |d| d.attribute(attribute))
    }

    fn in_family(&self, kind: CardKind, family: AttributeFamily) -> bool {
        self.definition(kind).is_some_and(|d| d.in_family(family))
    }

    fn instant_effect(&self, kind: CardKind) -> Option<InstantEffect> {
        self.definition(kind).and_then(|d| d.instant)
    }

    fn name(&self, kind: CardKind) -> String {
        self.definition(kind)
            .map_or_else(|| format!("{:?}", kind), |d| d.name.clone())
    }

    /// Cards `player` holds that react to `point`, in catalog order.
    fn cards_with_trigger(&self, player: &Player, point: TriggerPoint) -> TriggeredCards {
        self.kinds()
            .iter()
            .filter(|kind| self.definition(**kind).is_some_and(|d| d.reacts_to(point)))
            .filter_map(|kind| {
                let count = self.count_card(player, *kind);
                (count > 0).then_some((*kind, count))
            })
            .collect()
    }

    /// True if any held card has an attribute in `family`.
    fn holds_family(&self, player: &Player, family: AttributeFamily) -> bool {
        player.cards.iter().any(|card| {
            self.in_family(card.kind, family)
                || card.duplicating.is_some_and(|k| self.in_family(k, family))
        })
    }

    /// Runs when a card joins a player's collection.
    fn on_add(&self, player: &mut Player, card: &mut Card) {
        match card.kind {
            CardKind::HedgeFund => card.counter = HEDGE_FUND_TURNS,
            CardKind::RockAndRoller => player.extra_rolls += ROCK_AND_ROLLER_ROLLS,
            CardKind::Foresight => player.visibility_bonus += 1,
            CardKind::Healthy => player.adjust_max_health(HEALTHY_MAX_HEALTH),
            _ => {}
        }
    }

    /// Runs after a card has left a player's collection.
    fn on_remove(&self, player: &mut Player, card: &Card) {
        match card.kind {
            CardKind::RockAndRoller => {
                let left = player.count_card(CardKind::RockAndRoller) * ROCK_AND_ROLLER_ROLLS;
                player.extra_rolls = player.extra_rolls.min(left);
            }
            CardKind::Foresight => {
                player.visibility_bonus = player.visibility_bonus.saturating_sub(1);
            }
            CardKind::Healthy => player.adjust_max_health(-HEALTHY_MAX_HEALTH),
            _ => {}
        }
    }
}

/// Registry of card definitions in registration order.
///
/// ## Example
///
/// ```
/// use siege_dice::cards::{CardCatalog, CardKind, CardRegistry};
///
/// let catalog = CardRegistry::standard();
/// let grenade = catalog.definition(CardKind::GloriousGrenade).unwrap();
/// assert!(grenade.is_instant());
/// assert_eq!(catalog.deck().len(), catalog.len());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    definitions: FxHashMap<CardKind, CardDefinition>,
    order: Vec<CardKind>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition.
    ///
    /// Panics if the kind is already registered.
    pub fn register(&mut self, card: CardDefinition) {
        if self.definitions.contains_key(&card.kind) {
            panic!("Card {:?} already registered", card.kind);
        }
        self.order.push(card.kind);
        self.definitions.insert(card.kind, card);
    }

    #[must_use]
    pub fn with(mut self, card: CardDefinition) -> Self {
        self.register(card);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.order.iter().filter_map(|k| self.definitions.get(k))
    }

    /// Kinds matching a predicate, in registration order.
    pub fn find(&self, predicate: impl Fn(&CardDefinition) -> bool) -> Vec<CardKind> {
        self.iter().filter(|d| predicate(d)).map(|d| d.kind).collect()
    }

    /// The full standard deck.
    #[must_use]
    pub fn standard() -> Self {
        use CardAttribute::*;
        use CardKind::*;
        use TriggerPoint as T;

        let card = CardDefinition::new;
        let instant = InstantEffect::points;

        Self::new()
            .with(card(FreeReturns, "Free Returns", 3).with_flag(CurrencyBonus))
            .with(
                card(DiceCloning, "Dice Cloning", 7)
                    .with_flag(DiceControl)
                    .with_flag(NoBrainer)
                    .on(T::StartTurn),
            )
            .with(card(Vitality, "Vitality", 4).with_flag(HealthBonus))
            .with(
                card(GoodInvestments, "Good Investments", 5)
                    .with_flag(PointsBonus)
                    .with_flag(CurrencyHoarding)
                    .with_flag(NoBrainer)
                    .on(T::EndTurn),
            )
            .with(
                card(Aggressive, "Aggressive", 4)
                    .with_flag(DamageBonus)
                    .with_flag(WeakenEnemies)
                    .on(T::DamageBonus),
            )
            .with(card(Counterfeiting, "Counterfeiting", 5).with_flag(CurrencyBonus))
            .with(card(StrongArmour, "Strong Armour", 3).with_flag(DamageReduction))
            .with(card(Rebirth, "Rebirth", 7).with_flag(HealthBonus))
            .with(card(FullHouse, "Full House", 4).with_flag(PointsBonus).on(T::ResolveBonus))
            .with(
                card(CollateralDamage, "Collateral Damage", 4)
                    .with_flag(DamageBonus)
                    .with_flag(WeakenEnemies)
                    .on(T::Attack),
            )
            .with(card(OneLove, "One Love", 3).with_flag(PointsBonus).on(T::SetScored))
            .with(
                card(HiddenWeapon, "Hidden Weapon", 5)
                    .with_flag(DamageBonus)
                    .with_flag(WeakenEnemies)
                    .on(T::DamageBonus),
            )
            .with(card(Resourceful, "Resourceful", 2).with_flag(CurrencyBonus).on(T::EndTurn))
            .with(card(DamageForTwo, "Damage for Two", 3).with_flag(DamageBonus).on(T::SetScored))
            .with(card(BloodDonor, "Blood Donor", 3).with_flag(CurrencyBonus))
            .with(card(Gallant, "Gallant", 4).with_flag(PointsBonus).on(T::Attack))
            .with(card(Healthy, "Healthy", 4).with_flag(HealthBonus))
            .with(card(Thrifty, "Thrifty", 3).with_flag(CurrencyHoarding))
            .with(
                card(Mercantile, "Mercantile", 5)
                    .with_flag(PointsBonus)
                    .with_flag(CurrencyHoarding),
            )
            .with(card(Pathetic, "Pathetic", 2).with_flag(PointsBonus).on(T::EndTurn))
            .with(card(Sneaky, "Sneaky", 4).with_flag(DamageReduction))
            .with(
                card(SplashDamage, "Splash Damage", 6)
                    .with_flag(DamageBonus)
                    .with_flag(WeakenEnemies)
                    .on(T::DamageTargeting),
            )
            .with(
                card(SpikeySides, "Spikey Sides", 4)
                    .with_flag(DamageBonus)
                    .with_flag(WeakenEnemies)
                    .on(T::Attack),
            )
            .with(card(CountingCards, "Counting Cards", 3).with_flag(PointsBonus).on(T::ResolveBonus))
            .with(
                card(Institutionalized, "Institutionalized", 4)
                    .with_flag(PointsBonus)
                    .with_flag(DamageBonus)
                    .on(T::StartTurn)
                    .on(T::Attack),
            )
            .with(card(Foresight, "Foresight", 3).with_flag(MarketControl))
            .with(card(HedgeFund, "Hedge Fund", 4).with_flag(CurrencyBonus).on(T::StartTurn))
            .with(
                card(SkullCollector, "Skull Collector", 5)
                    .with_flag(PointsBonus)
                    .with_flag(WeakenEnemies),
            )
            .with(card(Pacifist, "Pacifist", 3).with_flag(PointsBonus).on(T::Peaceful))
            .with(
                card(OneMore, "One More", 6)
                    .with_flag(ExtraTurn)
                    .with_flag(DiceControl)
                    .on(T::SetScored),
            )
            .with(card(HighRoller, "High Roller", 5).with_flag(DiceControl).on(T::StartTurn))
            .with(card(Spiteful, "Spiteful", 3).with_flag(WeakenEnemies))
            .with(
                card(GloriousGrenade, "Glorious Grenade", 4)
                    .with_flag(WeakenEnemies)
                    .instant(instant(2).with_damage_others(2)),
            )
            .with(card(MoraleBoost, "Morale Boost", 3).instant(instant(0).with_health(3)))
            .with(card(Prestigious, "Prestigious", 5).instant(instant(3)))
            .with(card(Tourniquet, "Tourniquet", 2).instant(instant(0).with_health(2)))
            .with(card(Masochistic, "Masochistic", 3).instant(instant(4).with_health(-2)))
            .with(card(MinorVictory, "Minor Victory", 3).instant(instant(2)))
            .with(card(Martyrish, "Martyrish", 2).instant(instant(2).with_health(-3)))
            .with(card(Sacrifice, "Sacrifice", 2).instant(instant(3).with_health(-4)))
            .with(card(Honorable, "Honorable", 4).instant(instant(2).with_health(2)))
            .with(
                card(InstantDividend, "Instant Dividend", 2)
                    .instant(instant(1).with_currency(3)),
            )
            .with(
                card(RobinHood, "Robin Hood", 3)
                    .with_flag(WeakenEnemies)
                    .instant(instant(0).with_steal(1)),
            )
            .with(card(NonStop, "Non Stop", 7).instant(instant(0).with_extra_turn()))
            .with(
                card(MinorSelfDestruct, "Minor Self Destruct", 3)
                    .with_flag(WeakenEnemies)
                    .instant(instant(0).with_health(-2).with_damage_others(3)),
            )
            .with(card(WellRenowned, "Well Renowned", 8).instant(instant(5)))
            .with(
                card(TearGas, "Tear Gas", 3)
                    .with_flag(WeakenEnemies)
                    .instant(instant(0).with_damage_inside(1)),
            )
            .with(card(Invasion, "Invasion", 2).instant(instant(0).with_enter_inside()))
            .with(
                card(HealthInsurance, "Health Insurance", 3)
                    .with_flag(DamageReduction)
                    .with_flag(CurrencyHoarding)
                    .on(T::DamageReduction),
            )
            .with(
                card(TemporaryInvulnerability, "Temporary Invulnerability", 4)
                    .with_flag(DamageReduction)
                    .with_flag(CurrencyHoarding)
                    .on(T::DamageReduction),
            )
            .with(
                card(HeartyRoll, "Hearty Roll", 3)
                    .with_flag(DamageReduction)
                    .on(T::DamageReduction),
            )
            .with(card(RockAndRoller, "Rock and Roller", 2).with_flag(DiceControl).on(T::PostRoll))
            .with(
                card(CostlyRoll, "Costly Roll", 3)
                    .with_flag(DiceControl)
                    .with_flag(CurrencyHoarding)
                    .on(T::PostRoll),
            )
            .with(card(DieForger, "Die Forger", 2).with_flag(DiceControl).on(T::PostRoll))
            .with(
                card(OneToOne, "One to One", 4)
                    .with_flag(DiceControl)
                    .with_flag(PointsBonus)
                    .on(T::PostRoll),
            )
            .with(
                card(DieCaster, "Die Caster", 4)
                    .with_flag(DiceControl)
                    .with_flag(CurrencyHoarding)
                    .on(T::PostRoll),
            )
            .with(card(TertiaryAllergy, "Tertiary Allergy", 2).with_flag(DiceControl).on(T::PostRoll))
            .with(
                card(DieKing, "Die King", 4)
                    .with_flag(DiceControl)
                    .with_flag(WeakenEnemies)
                    .on(T::EnemyRoll),
            )
            .with(
                card(AggressiveHealthcare, "Aggressive Healthcare", 4)
                    .with_flag(WeakenEnemies)
                    .with_flag(CurrencyBonus)
                    .on(T::DieUsage),
            )
            .with(card(DieDie, "Die, Die", 5).with_flag(WeakenEnemies))
            .with(card(VenomousBite, "Venomous Bite", 5).with_flag(WeakenEnemies))
            .with(card(Bargainer, "Bargainer", 4).with_flag(MarketControl))
            .with(card(QuickDeal, "Quick Deal", 3).with_flag(MarketControl))
            .with(card(Duplicate, "Duplicate", 5).with_flag(MarketControl))
    }
}

impl CardCatalog for CardRegistry {
    fn definition(&self, kind: CardKind) -> Option<&CardDefinition> {
        self.definitions.get(&kind)
    }

    fn kinds(&self) -> &[CardKind] {
        &self.order
    }
}
