//! Per-seat resources, status flags and card collection.
//!
//! `Player` only stores and clamps. Anything that needs card hooks or the
//! rest of the table (death, damage reduction, counterfeit currency) is done
//! by the rules engine on top of these primitives.

use serde::{Deserialize, Serialize};

use super::personality::Personality;
use crate::cards::{Card, CardId, CardKind};
use crate::core::{ControlKind, EngineError, GameConfig, PlayerId, Result, SeatConfig};

/// Flags gating the damage-reduction options for the incoming attack.
///
/// Everything but `invulnerable` is cleared whenever a health change lands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionFlags {
    pub invulnerable: bool,
    pub has_paid_to_reduce: bool,
    pub has_had_invulnerability_option: bool,
    pub has_rolled_to_reduce: bool,
}

impl ReductionFlags {
    /// Mark every option as spent for the current attack.
    pub fn spend_all(&mut self) {
        self.has_paid_to_reduce = true;
        self.has_had_invulnerability_option = true;
        self.has_rolled_to_reduce = true;
    }

    /// A health change landed; options become available again.
    pub fn reset_after_change(&mut self) {
        self.has_paid_to_reduce = false;
        self.has_had_invulnerability_option = false;
        self.has_rolled_to_reduce = false;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub control: ControlKind,
    health: i32,
    max_health: i32,
    points: i32,
    currency: i32,
    pub cards: Vec<Card>,
    pub reduction: ReductionFlags,
    /// Damage of the attack currently waiting on a reduction decision.
    pub incoming_damage: i32,
    pub dead_dice: i32,
    pub venom: i32,
    /// Remaining RockAndRoller rolls.
    pub extra_rolls: i32,
    /// Extra face-up market cards this player sees.
    pub visibility_bonus: usize,
    pub siege_days: u32,
    pub siege_hours: u32,
    pub personality: Personality,
}

impl Player {
    pub fn new(id: PlayerId, seat: &SeatConfig, config: &GameConfig, personality: Personality) -> Self {
        Self {
            id,
            name: seat.name.clone(),
            control: seat.control,
            health: config.starting_health.min(config.max_health),
            max_health: config.max_health,
            points: 0,
            currency: config.starting_currency.max(0),
            cards: Vec::new(),
            reduction: ReductionFlags::default(),
            incoming_damage: 0,
            dead_dice: 0,
            venom: 0,
            extra_rolls: 0,
            visibility_bonus: 0,
            siege_days: 0,
            siege_hours: 0,
            personality,
        }
    }

    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    #[must_use]
    pub fn points(&self) -> i32 {
        self.points
    }

    #[must_use]
    pub fn currency(&self) -> i32 {
        self.currency
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    #[must_use]
    pub fn is_ai(&self) -> bool {
        self.control == ControlKind::Ai
    }

    /// Health missing from the maximum.
    #[must_use]
    pub fn health_deficit(&self) -> i32 {
        self.max_health - self.health
    }

    #[must_use]
    pub fn points_needed(&self, win_points: i32) -> i32 {
        win_points - self.points
    }

    /// Set health directly, clamped to `0..=max_health`. No card hooks run.
    pub fn set_health(&mut self, health: i32) -> i32 {
        self.health = health.clamp(0, self.max_health);
        self.health
    }

    /// Change the maximum (never below 1) and clamp current health to it.
    pub fn adjust_max_health(&mut self, delta: i32) {
        self.max_health = (self.max_health + delta).max(1);
        self.health = self.health.min(self.max_health);
    }

    /// Add points. Dead players keep their score; points never go negative.
    ///
    /// Returns the change actually applied.
    pub fn add_points(&mut self, delta: i32) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let before = self.points;
        self.points = (self.points + delta).max(0);
        self.points - before
    }

    /// Zero the score (rebirth).
    pub fn reset_points(&mut self) {
        self.points = 0;
    }

    /// Change currency, clamping at zero. Returns the change applied.
    pub fn change_currency(&mut self, delta: i32) -> i32 {
        let before = self.currency;
        let target = self.currency + delta;
        if target < 0 {
            tracing::warn!(
                "{} would go to {} currency; clamping to 0",
                self.id,
                target
            );
        }
        self.currency = target.max(0);
        self.currency - before
    }

    /// Spend currency, refusing an overdraft without touching the balance.
    pub fn spend(&mut self, amount: i32) -> Result<()> {
        if amount > self.currency {
            tracing::warn!(
                "{} cannot spend {} currency with only {}",
                self.id,
                amount,
                self.currency
            );
            return Err(EngineError::InsufficientResource {
                player: self.id,
                needed: amount,
                available: self.currency,
            });
        }
        self.currency -= amount.max(0);
        Ok(())
    }

    /// Copies held of `kind`, including Duplicate cards copying it.
    #[must_use]
    pub fn count_card(&self, kind: CardKind) -> i32 {
        self.cards.iter().filter(|c| c.counts_as(kind)).count() as i32
    }

    #[must_use]
    pub fn has_card(&self, kind: CardKind) -> bool {
        self.cards.iter().any(|c| c.counts_as(kind))
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// First physical card of `kind` (ignores duplicates).
    #[must_use]
    pub fn first_card_of(&self, kind: CardKind) -> Option<CardId> {
        self.cards.iter().find(|c| c.kind == kind).map(|c| c.id)
    }

    /// Detach a card. Lifecycle hooks are the caller's job.
    pub fn take_card(&mut self, id: CardId) -> Option<Card> {
        let index = self.cards.iter().position(|c| c.id == id)?;
        Some(self.cards.remove(index))
    }
}
