//! AI personality parameters.
//!
//! Every seat gets a personality at game start, human or not, so the AI can
//! take over any seat. The draws follow fixed ranges:
//!
//! | parameter            | range                              |
//! |----------------------|------------------------------------|
//! | preferences          | shuffled Points/Damage/Health/Currency |
//! | loves_* traits       | 50% each                           |
//! | hates_inside         | 20%                                |
//! | riskiness            | `[0, 1)`                           |
//! | health_worry         | `[2, 7)`                           |
//! | health_happy         | worry + `[1, 5)`, capped at 10     |
//! | too_much_currency    | `[5, 8)`                           |

use serde::{Deserialize, Serialize};

use crate::cards::AttributeFamily;
use crate::core::GameRng;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Resource families, most preferred first.
    pub preferences: [AttributeFamily; 4],
    pub loves_cards: bool,
    pub loves_dice_control: bool,
    pub loves_being_mean: bool,
    pub hates_inside: bool,
    pub riskiness: f64,
    /// Free dice wanted before chasing a pair into a set.
    pub dice_risk: i32,
    /// How many points short of winning still counts as "close".
    pub points_risk: i32,
    /// How close an enemy may get before this player stops refreshing.
    pub enemy_points_risk: i32,
    pub health_worry: i32,
    pub health_happy: i32,
    pub too_much_currency: i32,
}

impl Personality {
    /// Draw a random personality.
    pub fn roll(rng: &mut GameRng) -> Self {
        let mut preferences = AttributeFamily::RESOURCES;
        rng.shuffle(&mut preferences);

        let loves_cards = rng.gen_bool(0.5);
        let loves_dice_control = rng.gen_bool(0.5);
        let loves_being_mean = rng.gen_bool(0.5);
        let hates_inside = rng.gen_bool(0.2);

        let riskiness = rng.gen_unit();
        let health_worry = rng.gen_range(2..7);
        let health_happy = (health_worry + rng.gen_range(1..5)).min(10);
        let too_much_currency = rng.gen_range(5..8);

        Self::from_traits(preferences, riskiness)
            .with_traits(loves_cards, loves_dice_control, loves_being_mean, hates_inside)
            .with_health_levels(health_worry, health_happy)
            .with_too_much_currency(too_much_currency)
    }

    /// A personality with the given ranking and riskiness and neutral traits.
    #[must_use]
    pub fn from_traits(preferences: [AttributeFamily; 4], riskiness: f64) -> Self {
        let riskiness = riskiness.clamp(0.0, 0.999_999);
        let dice_risk = 1 + ((1.0 - riskiness) * 5.0) as i32;
        let points_risk = (riskiness * 5.0) as i32;
        Self {
            preferences,
            loves_cards: false,
            loves_dice_control: false,
            loves_being_mean: false,
            hates_inside: false,
            riskiness,
            dice_risk,
            points_risk,
            enemy_points_risk: 4 - points_risk,
            health_worry: 4,
            health_happy: 7,
            too_much_currency: 6,
        }
    }

    #[must_use]
    pub fn with_traits(
        mut self,
        loves_cards: bool,
        loves_dice_control: bool,
        loves_being_mean: bool,
        hates_inside: bool,
    ) -> Self {
        self.loves_cards = loves_cards;
        self.loves_dice_control = loves_dice_control;
        self.loves_being_mean = loves_being_mean;
        self.hates_inside = hates_inside;
        self
    }

    #[must_use]
    pub fn with_health_levels(mut self, worry: i32, happy: i32) -> Self {
        self.health_worry = worry;
        self.health_happy = happy;
        self
    }

    #[must_use]
    pub fn with_too_much_currency(mut self, level: i32) -> Self {
        self.too_much_currency = level;
        self
    }

    /// Rank of a family, 0 being most preferred.
    #[must_use]
    pub fn rank(&self, family: AttributeFamily) -> Option<usize> {
        self.preferences.iter().position(|f| *f == family)
    }

    /// True if `a` is ranked ahead of `b`.
    #[must_use]
    pub fn prefers(&self, a: AttributeFamily, b: AttributeFamily) -> bool {
        match (self.rank(a), self.rank(b)) {
            (Some(ra), Some(rb)) => ra < rb,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::from_traits(AttributeFamily::RESOURCES, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AttributeFamily::*;

    #[test]
    fn test_risk_derivation() {
        let careful = Personality::from_traits(AttributeFamily::RESOURCES, 0.0);
        assert_eq!(careful.dice_risk, 6);
        assert_eq!(careful.points_risk, 0);
        assert_eq!(careful.enemy_points_risk, 4);

        let reckless = Personality::from_traits(AttributeFamily::RESOURCES, 0.9);
        assert_eq!(reckless.dice_risk, 1);
        assert_eq!(reckless.points_risk, 4);
        assert_eq!(reckless.enemy_points_risk, 0);
    }

    #[test]
    fn test_prefers_earlier_rank() {
        let p = Personality::from_traits([Health, Points, Currency, Damage], 0.5);
        assert!(p.prefers(Health, Currency));
        assert!(!p.prefers(Currency, Health));
        assert!(p.prefers(Points, Damage));
    }

    #[test]
    fn test_rolled_ranges() {
        let mut rng = GameRng::new(5);
        for _ in 0..50 {
            let p = Personality::roll(&mut rng);
            assert!((2..7).contains(&p.health_worry));
            assert!(p.health_happy > p.health_worry || p.health_happy == 10);
            assert!(p.health_happy <= 10);
            assert!((5..8).contains(&p.too_much_currency));
            assert!((1..=6).contains(&p.dice_risk));

            let mut sorted = p.preferences;
            sorted.sort();
            assert_eq!(sorted, [Points, Damage, Health, Currency]);
        }
    }
}
