//! Dice heuristics: what to hold between rolls and how to use die-changing
//! cards.
//!
//! Holding works on a scratch copy of the tray. Each resource family in
//! priority order may hold or release dice from the *undecided* set: dice
//! neither held nor already earmarked for rerolling. The finished held
//! flags travel back with the choice.

use crate::cards::{AttributeFamily, CardKind};
use crate::decision::GameOption;
use crate::dice::{DiceState, DiceSummary, DieIndices, Face};

use super::{AiChoice, AiView};

struct HoldPlan {
    dice: DiceState,
    undecided: DieIndices,
}

impl HoldPlan {
    fn new(dice: &DiceState) -> Self {
        let dice = dice.clone();
        let undecided = dice.unheld_indices();
        Self { dice, undecided }
    }

    /// Drop dice that are now held from the undecided set.
    fn settle(&mut self) {
        let dice = &self.dice;
        self.undecided.retain(|die| !dice.is_held(*die));
    }

    fn release(&mut self, face: Face) {
        let released = self.dice.hold_all_with_value(face, false);
        self.settle();
        for die in released {
            if !self.undecided.contains(&die) {
                self.undecided.push(die);
            }
        }
    }

    /// Earmark every remaining unheld die for rerolling.
    fn reroll_rest(&mut self) {
        self.undecided.clear();
    }

    fn summary(&self) -> DiceSummary {
        self.dice.summary()
    }

    fn held(&self) -> DiceSummary {
        self.dice.held_summary()
    }
}

/// Resource families to chase this roll, most urgent first.
fn roll_priorities(view: &AiView<'_>, held: &DiceSummary) -> Vec<AttributeFamily> {
    let player = view.player;
    let personality = &player.personality;
    let needed = player.points_needed(view.win_points());

    let mut families = Vec::with_capacity(4);
    if needed > 0 && needed <= personality.points_risk {
        families.push(AttributeFamily::Points);
    } else if player.health() + held.count(Face::Heal) <= personality.health_worry {
        families.push(AttributeFamily::Health);
    } else if view
        .catalog
        .holds_family(player, AttributeFamily::CurrencyHoarding)
    {
        families.push(AttributeFamily::Currency);
    }
    for family in personality.preferences {
        if !families.contains(&family) {
            families.push(family);
        }
    }
    families
}

pub(super) fn intermediate_roll(view: &AiView<'_>) -> Option<AiChoice> {
    let mut plan = HoldPlan::new(&view.state.dice);
    for family in roll_priorities(view, &plan.held()) {
        match family {
            AttributeFamily::Health => hold_health(view, &mut plan),
            AttributeFamily::Damage => hold_damage(view, &mut plan),
            AttributeFamily::Currency => hold_currency(&mut plan),
            AttributeFamily::Points => hold_points(view, &mut plan),
            _ => {}
        }
    }

    let option = if plan.dice.all_held() {
        GameOption::KeepRolls
    } else {
        GameOption::Roll
    };
    tracing::debug!("{} holds {:?} and picks {}", view.id, plan.dice.held(), option);
    Some(AiChoice::new(option, 0).with_holds(plan.dice.held().to_vec()))
}

fn hold_health(view: &AiView<'_>, plan: &mut HoldPlan) {
    let player = view.player;
    let worry = player.personality.health_worry;
    let heals = plan.summary().count(Face::Heal);

    if heals > 0 && !plan.undecided.is_empty() {
        let deficit = player.health_deficit();
        if deficit <= 0 || view.is_inside() {
            return;
        }
        plan.dice
            .hold_some_with_value(Face::Heal, heals.min(deficit) as usize, true);
        plan.settle();
        if player.health() + plan.held().count(Face::Heal) <= worry && !plan.undecided.is_empty() {
            plan.reroll_rest();
        }
    } else if !view.is_inside() && player.health() <= worry && !plan.undecided.is_empty() {
        plan.reroll_rest();
    }
}

fn hold_damage(view: &AiView<'_>, plan: &mut HoldPlan) {
    let damage = plan.summary().count(Face::Damage);
    if damage == 0 || plan.undecided.is_empty() {
        return;
    }
    let player = view.player;
    let inside = view.is_inside();
    if player.health() < player.personality.health_worry && !inside {
        return;
    }

    let state = view.state;
    let skull_points = state.config.skull_collecting_points;
    for enemy in state.others_living(view.id) {
        let enemy = state.player(enemy);
        if !enemy.has_card(CardKind::SkullCollector) {
            continue;
        }
        if damage >= enemy.health() {
            plan.dice.hold_all_with_value(Face::Damage, true);
            plan.settle();
            return;
        }
        let victims = state.vulnerable_enemies(view.id, !inside).len() as i32;
        if enemy.points_needed(view.win_points()) <= skull_points * victims {
            tracing::debug!("{} holds back damage: a skull collector is close", view.id);
            return;
        }
    }

    if !state.inside.is_empty() {
        plan.dice.hold_all_with_value(Face::Damage, true);
        plan.settle();
    }
}

fn hold_currency(plan: &mut HoldPlan) {
    if plan.summary().has(Face::Currency) && !plan.undecided.is_empty() {
        plan.dice.hold_all_with_value(Face::Currency, true);
        plan.settle();
    }
}

fn hold_points(view: &AiView<'_>, plan: &mut HoldPlan) {
    if view.player.points() >= view.win_points() {
        return;
    }
    let dice_risk = view.player.personality.dice_risk;
    let numbers = || [Face::Threes, Face::Twos, Face::Ones].into_iter();

    // Pairs held from an earlier roll that no longer have enough free dice
    // behind them go back in.
    if numbers().any(|face| plan.held().has(face)) {
        for face in numbers() {
            if plan.summary().count(face) == 2 && (plan.undecided.len() as i32) < dice_risk {
                plan.release(face);
            }
        }
    }

    if plan.undecided.is_empty() || !numbers().any(|face| plan.summary().has(face)) {
        return;
    }
    for face in numbers() {
        if plan.summary().count(face) >= 3 {
            plan.dice.hold_all_with_value(face, true);
            plan.settle();
        }
    }
    for face in numbers() {
        let free = plan.undecided.len() as i32 + plan.held().count(face) - 2;
        if plan.summary().count(face) == 2 && free >= dice_risk {
            plan.dice.hold_all_with_value(face, true);
            plan.reroll_rest();
        }
    }
}

/// Post-roll card options. Changing a die to a one is taken when it wins
/// the game or turns a useless die into points; threes are rerolled while
/// they fall short of a set.
pub(super) fn special_roll_change(view: &AiView<'_>) -> Option<AiChoice> {
    let dice = &view.state.dice;
    if dice.all_held() {
        return None;
    }
    let summary = dice.summary();
    let ones = summary.count(Face::Ones);
    let twos = summary.count(Face::Twos);
    let threes = summary.count(Face::Threes);

    if let Some(choice) = view.offered(&GameOption::GainChangeDieResultToOne) {
        let other_useful = summary.has(Face::Damage)
            || summary.has(Face::Heal)
            || summary.has(Face::Currency)
            || (1..3).contains(&twos)
            || (1..3).contains(&threes);
        let brings_points = ones >= 2 && (ones as usize) < dice.len() && other_useful;
        if brings_points {
            let points_from_ones = if ones >= 3 { ones - 2 } else { 0 };
            let needed = view.player.points_needed(view.win_points());
            let personality = &view.player.personality;
            let wants = needed == points_from_ones + 1
                || twos < 3
                || threes < 3
                || (personality.prefers(AttributeFamily::Points, AttributeFamily::Currency)
                    && summary.has(Face::Currency))
                || (personality.prefers(AttributeFamily::Points, AttributeFamily::Damage)
                    && summary.has(Face::Damage))
                || (personality.prefers(AttributeFamily::Points, AttributeFamily::Health)
                    && summary.has(Face::Heal));
            if wants {
                return Some(choice);
            }
        }
    }

    if (1..3).contains(&threes) {
        if let Some(choice) = view.offered(&GameOption::GainRerollThrees) {
            return Some(choice);
        }
    }

    if view.player.personality.loves_dice_control {
        if let Some(choice) = view.offered(&GameOption::GainExtraRoll) {
            return Some(choice);
        }
    }
    None
}

/// The die a change should land on: a number that cannot make a set,
/// otherwise whatever the player values least.
fn die_to_change(view: &AiView<'_>, keep: Option<Face>) -> Option<usize> {
    let dice = &view.state.dice;
    let summary = dice.summary();
    let mut candidates: Vec<Face> = Face::NUMBERS
        .iter()
        .copied()
        .filter(|face| Some(*face) != keep && summary.count(*face) < 3)
        .collect();
    let mut families = view.player.personality.preferences;
    families.reverse();
    for family in families {
        let face = match family {
            AttributeFamily::Damage => Face::Damage,
            AttributeFamily::Health => Face::Heal,
            AttributeFamily::Currency => Face::Currency,
            _ => continue,
        };
        if Some(face) != keep {
            candidates.push(face);
        }
    }
    candidates
        .into_iter()
        .find_map(|face| dice.first_with_face(face))
        .or_else(|| (0..dice.len()).find(|die| dice.result(*die) != keep))
}

/// Held flags selecting `die` as the only unheld die.
fn select(view: &AiView<'_>, die: usize) -> Vec<bool> {
    (0..view.state.dice.len()).map(|i| i != die).collect()
}

/// Pick the face for a free die change: finish a pair, then heal when
/// worried, then the favourite resource.
pub(super) fn change_die_result(view: &AiView<'_>) -> Option<AiChoice> {
    let summary = view.state.dice.summary();
    let pair = Face::NUMBERS
        .iter()
        .rev()
        .copied()
        .find(|face| summary.count(*face) == 2);
    let player = view.player;
    let face = match pair {
        Some(face) => face,
        None if !view.is_inside() && player.health() <= player.personality.health_worry => Face::Heal,
        None => match player.personality.preferences[0] {
            AttributeFamily::Damage => Face::Damage,
            AttributeFamily::Health if !view.is_inside() => Face::Heal,
            AttributeFamily::Points => Face::Threes,
            _ => Face::Currency,
        },
    };
    let choice = AiChoice::new(GameOption::ChangeDieResult, face.index() as i32);
    Some(match die_to_change(view, Some(face)) {
        Some(die) => choice.with_holds(select(view, die)),
        None => choice,
    })
}

pub(super) fn change_die_to_value(view: &AiView<'_>) -> Option<AiChoice> {
    let GameOption::ChangeDieResultToValue(face) = view.decision.options.first()?.clone() else {
        return None;
    };
    let choice = AiChoice::new(GameOption::ChangeDieResultToValue(face), 0);
    Some(match die_to_change(view, Some(face)) {
        Some(die) => choice.with_holds(select(view, die)),
        None => choice,
    })
}

/// Reroll the die that helps the active player most: part of a scoring
/// set, or a damage die aimed at this player.
pub(super) fn reroll_enemy_die(view: &AiView<'_>) -> Option<AiChoice> {
    let option = view.decision.options.first()?.clone();
    let dice = &view.state.dice;
    let summary = dice.summary();
    let turn_inside = view.state.is_inside(view.state.turn_player);
    let threatened = summary.has(Face::Damage) && (view.is_inside() || turn_inside);

    let target = if threatened {
        dice.first_with_face(Face::Damage)
    } else {
        Face::NUMBERS
            .iter()
            .rev()
            .find(|face| summary.count(**face) >= 3)
            .and_then(|face| dice.first_with_face(*face))
    };
    let choice = AiChoice::new(option, 0);
    Some(match target {
        Some(die) => choice.with_holds(select(view, die)),
        None => choice,
    })
}
