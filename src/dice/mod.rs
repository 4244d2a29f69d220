//! The shared dice tray.
//!
//! ## DiceState
//!
//! One tray is shared by the whole table: it is reinitialised at the start
//! of every turn and for every damage-reduction roll. Each die has an
//! optional face (unset before the first roll, or after a card consumes it)
//! and a held flag. Roll batches are counted against a per-turn budget.
//!
//! ## Invariants
//!
//! - `results.len() == held.len() <= max_dice`
//! - `roll_count <= max_rolls`
//! - summaries are pure functions of `results` and `held`

mod summary;

pub use summary::{DiceSummary, Face};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::GameRng;

/// Die indices; the tray never holds more than a handful of dice.
pub type DieIndices = SmallVec<[usize; 8]>;

/// Face values, held flags and the roll budget for the current tray.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceState {
    results: Vec<Option<Face>>,
    held: Vec<bool>,
    roll_count: u8,
    max_rolls: u8,
    max_dice: usize,
}

impl DiceState {
    /// An empty tray that will never hold more than `max_dice` dice.
    #[must_use]
    pub fn new(max_dice: usize) -> Self {
        Self {
            results: Vec::new(),
            held: Vec::new(),
            roll_count: 0,
            max_rolls: 0,
            max_dice,
        }
    }

    /// Reset the tray to `count` unset, unheld dice with a fresh budget.
    ///
    /// `count` is clamped to the tray limit.
    pub fn init(&mut self, count: usize, max_rolls: u8) {
        let count = count.min(self.max_dice);
        self.results = vec![None; count];
        self.held = vec![false; count];
        self.roll_count = 0;
        self.max_rolls = max_rolls;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn max_dice(&self) -> usize {
        self.max_dice
    }

    #[must_use]
    pub fn results(&self) -> &[Option<Face>] {
        &self.results
    }

    #[must_use]
    pub fn held(&self) -> &[bool] {
        &self.held
    }

    #[must_use]
    pub fn result(&self, die: usize) -> Option<Face> {
        self.results.get(die).copied().flatten()
    }

    #[must_use]
    pub fn is_held(&self, die: usize) -> bool {
        self.held.get(die).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn roll_count(&self) -> u8 {
        self.roll_count
    }

    #[must_use]
    pub fn max_rolls(&self) -> u8 {
        self.max_rolls
    }

    #[must_use]
    pub fn can_roll(&self) -> bool {
        self.roll_count < self.max_rolls
    }

    /// Raise the roll budget by one batch.
    pub fn grant_extra_roll(&mut self) {
        self.max_rolls = self.max_rolls.saturating_add(1);
    }

    /// Spend the remaining budget without rolling.
    pub fn exhaust_rolls(&mut self) {
        self.roll_count = self.max_rolls;
    }

    /// Roll every unheld die as one batch.
    ///
    /// Returns the new faces, or `None` when the budget is spent.
    pub fn roll_batch(&mut self, rng: &mut GameRng) -> Option<Vec<(usize, Face)>> {
        if !self.can_roll() {
            return None;
        }
        self.roll_count += 1;
        let dice = self.unheld_indices();
        Some(self.roll_indices(&dice, rng))
    }

    /// Roll every die regardless of held state, spending the whole budget.
    pub fn roll_all(&mut self, rng: &mut GameRng) -> Vec<(usize, Face)> {
        self.exhaust_rolls();
        let dice: DieIndices = (0..self.len()).collect();
        self.roll_indices(&dice, rng)
    }

    /// Reroll specific dice without touching the budget.
    pub fn roll_indices(&mut self, dice: &[usize], rng: &mut GameRng) -> Vec<(usize, Face)> {
        let len = self.len();
        let mut rolled = Vec::with_capacity(dice.len());
        for &die in dice.iter().filter(|die| **die < len) {
            let face = rng.roll_face();
            self.results[die] = Some(face);
            rolled.push((die, face));
        }
        rolled
    }

    /// Set one die's held flag. Returns false for an out-of-range die.
    pub fn hold(&mut self, die: usize, held: bool) -> bool {
        match self.held.get_mut(die) {
            Some(slot) => {
                *slot = held;
                true
            }
            None => false,
        }
    }

    /// Flip one die's held flag.
    pub fn toggle(&mut self, die: usize) -> bool {
        let held = self.is_held(die);
        self.hold(die, !held)
    }

    /// Hold or release every die. Holding everything also ends rolling.
    pub fn hold_all(&mut self, held: bool) {
        if held {
            self.exhaust_rolls();
        }
        self.held.iter_mut().for_each(|h| *h = held);
    }

    /// Set every die showing `face` to `held`.
    ///
    /// Returns the indices whose flag actually changed.
    pub fn hold_all_with_value(&mut self, face: Face, held: bool) -> DieIndices {
        let mut changed = DieIndices::new();
        for (die, result) in self.results.iter().enumerate() {
            if *result == Some(face) && self.held[die] != held {
                self.held[die] = held;
                changed.push(die);
            }
        }
        changed
    }

    /// Set up to `count` dice showing `face` to `held`, scanning in order.
    ///
    /// Returns how many matching dice were set, which is less than `count`
    /// when fewer dice show the face. Matching dice are counted whether or
    /// not they were already in the requested state.
    pub fn hold_some_with_value(&mut self, face: Face, count: usize, held: bool) -> usize {
        let mut set = 0;
        for (die, result) in self.results.iter().enumerate() {
            if set == count {
                break;
            }
            if *result == Some(face) {
                self.held[die] = held;
                set += 1;
            }
        }
        set
    }

    /// Make `die` the only unheld die.
    pub fn select_single(&mut self, die: usize) {
        for (i, held) in self.held.iter_mut().enumerate() {
            *held = i != die;
        }
    }

    #[must_use]
    pub fn all_held(&self) -> bool {
        self.held.iter().all(|h| *h)
    }

    #[must_use]
    pub fn first_unheld(&self) -> Option<usize> {
        self.held.iter().position(|h| !h)
    }

    #[must_use]
    pub fn first_with_face(&self, face: Face) -> Option<usize> {
        self.results.iter().position(|r| *r == Some(face))
    }

    /// Overwrite one die's face. `None` consumes the die.
    pub fn set_face(&mut self, die: usize, face: Option<Face>) -> bool {
        match self.results.get_mut(die) {
            Some(slot) => {
                *slot = face;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn unheld_indices(&self) -> DieIndices {
        (0..self.len()).filter(|die| !self.held[*die]).collect()
    }

    /// Counts over every die.
    #[must_use]
    pub fn summary(&self) -> DiceSummary {
        DiceSummary::from_faces(&self.results)
    }

    /// Counts over held dice.
    #[must_use]
    pub fn held_summary(&self) -> DiceSummary {
        self.summary_where(|die| self.held[die])
    }

    /// Counts over unheld dice.
    #[must_use]
    pub fn unheld_summary(&self) -> DiceSummary {
        self.summary_where(|die| !self.held[die])
    }

    /// Counts over an arbitrary set of dice; out-of-range indices are skipped.
    #[must_use]
    pub fn summary_of(&self, dice: &[usize]) -> DiceSummary {
        DiceSummary::from_faces(dice.iter().filter_map(|die| self.results.get(*die)))
    }

    fn summary_where(&self, keep: impl Fn(usize) -> bool) -> DiceSummary {
        DiceSummary::from_faces(
            self.results
                .iter()
                .enumerate()
                .filter(|(die, _)| keep(*die))
                .map(|(_, r)| r),
        )
    }

    /// Test helper: place exact faces in the tray.
    #[doc(hidden)]
    pub fn set_faces(&mut self, faces: &[Face]) {
        self.results = faces.iter().copied().map(Some).collect();
        self.held = vec![false; faces.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tray(faces: &[Face]) -> DiceState {
        let mut dice = DiceState::new(8);
        dice.init(faces.len(), 3);
        dice.set_faces(faces);
        dice
    }

    #[test]
    fn test_init_clamps_to_tray() {
        let mut dice = DiceState::new(8);
        dice.init(11, 3);
        assert_eq!(dice.len(), 8);
        assert_eq!(dice.summary().total(), 0);
        assert_eq!(dice.roll_count(), 0);
    }

    #[test]
    fn test_roll_batch_respects_budget() {
        let mut rng = GameRng::new(1);
        let mut dice = DiceState::new(8);
        dice.init(6, 2);

        assert_eq!(dice.roll_batch(&mut rng).map(|r| r.len()), Some(6));
        dice.hold(0, true);
        assert_eq!(dice.roll_batch(&mut rng).map(|r| r.len()), Some(5));
        assert!(dice.roll_batch(&mut rng).is_none());
        assert_eq!(dice.roll_count(), 2);
    }

    #[test]
    fn test_roll_indices_skips_out_of_range() {
        let mut rng = GameRng::new(4);
        let mut dice = DiceState::new(8);
        dice.init(3, 3);

        let rolled = dice.roll_indices(&[2, 0, 7], &mut rng);
        let dice_rolled: Vec<usize> = rolled.iter().map(|(die, _)| *die).collect();
        assert_eq!(dice_rolled, vec![2, 0]);
        for (die, face) in rolled {
            assert_eq!(dice.result(die), Some(face));
        }
        assert_eq!(dice.result(1), None);
        assert_eq!(dice.roll_count(), 0);
    }

    #[test]
    fn test_hold_some_returns_available() {
        use Face::*;
        let mut dice = tray(&[Heal, Ones, Heal, Damage, Twos, Currency]);

        assert_eq!(dice.hold_some_with_value(Heal, 3, true), 2);
        assert_eq!(dice.held(), &[true, false, true, false, false, false]);
    }

    #[test]
    fn test_hold_all_with_value_reports_changes() {
        use Face::*;
        let mut dice = tray(&[Ones, Ones, Twos, Ones]);
        dice.hold(1, true);

        let changed = dice.hold_all_with_value(Ones, true);
        assert_eq!(changed.as_slice(), &[0, 3]);
        assert_eq!(dice.held_summary().count(Ones), 3);
    }

    #[test]
    fn test_hold_all_ends_rolling() {
        let mut dice = tray(&[Face::Ones, Face::Twos]);
        dice.hold_all(true);
        assert!(dice.all_held());
        assert!(!dice.can_roll());
    }

    #[test]
    fn test_select_single() {
        let mut dice = tray(&[Face::Ones, Face::Twos, Face::Threes]);
        dice.select_single(1);
        assert_eq!(dice.first_unheld(), Some(1));
        assert_eq!(dice.unheld_indices().as_slice(), &[1]);
    }

    #[test]
    fn test_consumed_die_leaves_summary() {
        let mut dice = tray(&[Face::Heal, Face::Heal, Face::Ones]);
        let die = dice.first_with_face(Face::Heal).unwrap();
        dice.set_face(die, None);
        assert_eq!(dice.summary().count(Face::Heal), 1);
        assert_eq!(dice.summary().total(), 2);
    }

    #[test]
    fn test_held_plus_unheld_is_full() {
        use Face::*;
        let mut dice = tray(&[Ones, Damage, Heal, Heal, Currency]);
        dice.hold(2, true);
        dice.hold(4, true);
        assert_eq!(dice.held_summary() + dice.unheld_summary(), dice.summary());
        assert_eq!(dice.summary_of(&[2, 3, 9]).count(Heal), 2);
    }
}
