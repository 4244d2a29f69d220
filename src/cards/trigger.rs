//! Fixed points in the turn flow where cards are consulted.
//!
//! A card definition lists the points it reacts to. The engine asks the
//! catalog for "the cards this player holds with trigger X" at each point
//! and dispatches on the card kind, instead of probing card ids one by one.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerPoint {
    /// Turn setup: payouts, extra rolls, extra dice, inside bonuses.
    StartTurn,
    /// Bonuses read from the full dice summary before set scoring.
    ResolveBonus,
    /// Reacts to a scored set of a number face.
    SetScored,
    /// Adds damage before the attack check.
    DamageBonus,
    /// Side effects and extra damage once the turn player is attacking.
    Attack,
    /// Changes which players an attack reaches.
    DamageTargeting,
    /// Points for a turn that dealt no damage.
    Peaceful,
    EndTurn,
    /// Post-roll options for the turn player.
    PostRoll,
    /// Post-roll options for players other than the turn player.
    EnemyRoll,
    /// Spend heal faces on an off-path effect.
    DieUsage,
    /// Options offered when damage is about to land.
    DamageReduction,
    /// Applied once when bought, then discarded.
    Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_serde() {
        let json = serde_json::to_string(&TriggerPoint::PostRoll).unwrap();
        assert_eq!(json, "\"PostRoll\"");
        let back: TriggerPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TriggerPoint::PostRoll);
    }
}
