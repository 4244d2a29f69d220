//! Reactions to other players' turns and to incoming damage.

use crate::cards::AttributeFamily;
use crate::decision::{ArgumentSpec, GameOption};

use super::{AiChoice, AiView};

/// Stay inside when it is about to pay off or when the attacker would win
/// by entering; otherwise flee when hurt or when the seat hates it inside.
pub(super) fn leave_or_stay(view: &AiView<'_>) -> Option<AiChoice> {
    let state = view.state;
    let config = &state.config;
    let points = view.player.points();
    let personality = &view.player.personality;
    let stay = view.offered(&GameOption::Stay(view.id));
    let leave = view.offered(&GameOption::Leave(view.id));

    let next_up = state.next_living(state.turn_player) == Some(view.id);
    let close = points >= view.win_points() - config.start_turn_inside_points - personality.points_risk;
    if next_up && close && points < view.win_points() {
        return stay;
    }
    let attacker = state.player(state.turn_player);
    if attacker.points() >= view.win_points() - config.enter_inside_points {
        return stay;
    }
    if view.player.health() <= personality.health_worry || personality.hates_inside {
        return leave;
    }
    stay
}

/// Prefer rolling to reduce damage; otherwise buy protection when the hit
/// is lethal or the seat values health over currency.
pub(super) fn special_damage_reduction(view: &AiView<'_>) -> Option<AiChoice> {
    let claim = view.decision.options.iter().find_map(|option| match option {
        GameOption::IgnoreDamageReduction(claim) => Some(*claim),
        _ => None,
    })?;
    if let Some(choice) = view.offered(&GameOption::GainRollToReduceDamage(claim)) {
        return Some(choice);
    }
    let protect = claim.amount >= view.player.health()
        || view.prefers(AttributeFamily::Health, AttributeFamily::Currency);
    if !protect {
        return None;
    }
    view.offered(&GameOption::PayToBecomeInvulnerable(claim))
        .or_else(|| view.offered(&GameOption::GainPayToReduceDamage(claim)))
}

/// Pay down as much as affordable when health matters more, otherwise just
/// enough to survive.
pub(super) fn pay_to_reduce_damage(view: &AiView<'_>) -> Option<AiChoice> {
    let option = view.decision.options.first()?.clone();
    let GameOption::PayToReduceDamage(claim) = option else {
        return None;
    };
    let affordable = view.player.currency() / 2;
    let most = claim.amount.min(affordable);
    let least = (claim.amount - view.player.health() + 1).max(0).min(affordable);
    let wanted = if view.prefers(AttributeFamily::Health, AttributeFamily::Currency) {
        most
    } else {
        least
    };
    let (min, max) = view.decision.argument.bounds();
    Some(AiChoice::new(option, wanted.clamp(min, max)))
}

/// Meddle with the active player's dice when mean or when they are close
/// to winning.
pub(super) fn gain_reroll_enemy_die(view: &AiView<'_>) -> Option<AiChoice> {
    let attacker = view.state.player(view.state.turn_player);
    let personality = &view.player.personality;
    let threat = view.win_points() - attacker.points() <= personality.enemy_points_risk;
    if personality.loves_being_mean || threat {
        view.offered(&GameOption::GainRerollEnemyDie(view.id))
    } else {
        view.offered(&GameOption::IgnoreEnemyRollChanges(view.id))
    }
}

/// Revive dice first, then work off venom. Healing an enemy is only worth
/// it when the heal faces would be wasted on this seat anyway.
pub(super) fn special_die_usage(view: &AiView<'_>) -> Option<AiChoice> {
    if let Some(choice) = view.offered(&GameOption::GainReviveDeadDice) {
        return Some(choice);
    }
    if let Some(choice) = view.offered(&GameOption::GainReduceVenom) {
        return Some(choice);
    }
    let heals_wasted = view.is_inside() || view.player.health_deficit() == 0;
    if heals_wasted || view.player.personality.loves_being_mean {
        return view.offered(&GameOption::GainHealEnemy);
    }
    None
}

/// Heal whichever enemy pays the most.
pub(super) fn choose_enemy_to_heal(view: &AiView<'_>) -> Option<AiChoice> {
    let ArgumentSpec::OneOf(seats) = &view.decision.argument else {
        return None;
    };
    let richest = view
        .state
        .healable_enemies(view.id)
        .into_iter()
        .filter(|enemy| seats.contains(&(enemy.index() as i32)))
        .max_by_key(|enemy| (view.state.player(*enemy).currency(), std::cmp::Reverse(enemy.index())))?;
    Some(AiChoice::new(GameOption::ChooseEnemyToHeal, richest.index() as i32))
}

/// Spend every heal die the decision allows.
pub(super) fn spend_all_heals(view: &AiView<'_>) -> Option<AiChoice> {
    let option = view.decision.options.first()?.clone();
    let (_, max) = view.decision.argument.bounds();
    Some(AiChoice::new(option, max))
}

#[cfg(test)]
mod tests {
    use crate::ai::{AiChoice, DecisionPolicy, HeuristicPolicy};
    use crate::cards::{AttributeFamily, CardRegistry};
    use crate::core::{GameConfig, GameState, PlayerId};
    use crate::decision::{DamageClaim, Decision, GameOption};
    use crate::players::Personality;

    use AttributeFamily::*;

    fn table(seats: usize) -> (GameState, CardRegistry) {
        let catalog = CardRegistry::standard();
        let mut state = GameState::new(GameConfig::all_ai(seats).with_seed(5), &catalog);
        for (_, player) in state.players.iter_mut() {
            player.personality = Personality::default();
        }
        state.turn_player = PlayerId::new(0);
        (state, catalog)
    }

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    fn choose(state: &GameState, catalog: &CardRegistry, decision: &Decision) -> AiChoice {
        HeuristicPolicy.choose(decision, state, catalog)
    }

    #[test]
    fn test_hurt_occupant_leaves() {
        let (mut state, catalog) = table(4);
        state.inside.push(p(2));
        state.player_mut(p(2)).set_health(3);
        let choice = choose(&state, &catalog, &Decision::leave_or_stay(p(2)));
        assert_eq!(choice.option, GameOption::Leave(p(2)));
    }

    #[test]
    fn test_healthy_occupant_stays() {
        let (mut state, catalog) = table(4);
        state.inside.push(p(2));
        let choice = choose(&state, &catalog, &Decision::leave_or_stay(p(2)));
        assert_eq!(choice.option, GameOption::Stay(p(2)));
    }

    #[test]
    fn test_stays_to_deny_a_winning_entry() {
        let (mut state, catalog) = table(4);
        state.inside.push(p(2));
        state.player_mut(p(2)).set_health(1);
        let win = state.config.win_points;
        state.player_mut(p(0)).add_points(win - 1);
        let choice = choose(&state, &catalog, &Decision::leave_or_stay(p(2)));
        assert_eq!(choice.option, GameOption::Stay(p(2)));
    }

    #[test]
    fn test_next_player_close_to_winning_stays() {
        let (mut state, catalog) = table(3);
        state.inside.push(p(1));
        state.player_mut(p(1)).set_health(2);
        state.player_mut(p(1)).personality.hates_inside = true;
        let win = state.config.win_points;
        state.player_mut(p(1)).add_points(win - 2);
        let choice = choose(&state, &catalog, &Decision::leave_or_stay(p(1)));
        assert_eq!(choice.option, GameOption::Stay(p(1)));
    }

    #[test]
    fn test_lethal_hit_buys_invulnerability() {
        let (mut state, catalog) = table(3);
        state.player_mut(p(1)).set_health(2);
        let claim = DamageClaim::new(p(1), Some(p(0)), 3);
        let decision = Decision::special_damage_reduction(
            claim,
            &[GameOption::GainPayToReduceDamage(claim), GameOption::PayToBecomeInvulnerable(claim)],
        );
        let choice = choose(&state, &catalog, &decision);
        assert_eq!(choice.option, GameOption::PayToBecomeInvulnerable(claim));
    }

    #[test]
    fn test_roll_to_reduce_always_taken() {
        let (state, catalog) = table(3);
        let claim = DamageClaim::new(p(1), Some(p(0)), 1);
        let decision = Decision::special_damage_reduction(claim, &[GameOption::GainRollToReduceDamage(claim)]);
        let choice = choose(&state, &catalog, &decision);
        assert_eq!(choice.option, GameOption::GainRollToReduceDamage(claim));
    }

    #[test]
    fn test_minor_hit_ignored_by_currency_lover() {
        let (mut state, catalog) = table(3);
        state.player_mut(p(1)).personality = Personality::from_traits([Currency, Points, Damage, Health], 0.5);
        let claim = DamageClaim::new(p(1), Some(p(0)), 1);
        let decision = Decision::special_damage_reduction(claim, &[GameOption::GainPayToReduceDamage(claim)]);
        let choice = choose(&state, &catalog, &decision);
        assert_eq!(choice.option, GameOption::IgnoreDamageReduction(claim));
    }

    #[test]
    fn test_pay_just_enough_to_survive() {
        let (mut state, catalog) = table(3);
        state.player_mut(p(1)).personality = Personality::from_traits([Currency, Points, Damage, Health], 0.5);
        state.player_mut(p(1)).set_health(3);
        state.player_mut(p(1)).change_currency(10);
        let claim = DamageClaim::new(p(1), Some(p(0)), 5);
        let choice = choose(&state, &catalog, &Decision::pay_to_reduce_damage(claim, 5));
        // 5 incoming against 3 health: prevent 3 to end on 1.
        assert_eq!(choice.argument, 3);
    }

    #[test]
    fn test_pay_everything_when_health_comes_first() {
        let (mut state, catalog) = table(3);
        state.player_mut(p(1)).personality = Personality::from_traits([Health, Points, Damage, Currency], 0.5);
        state.player_mut(p(1)).change_currency(6);
        let claim = DamageClaim::new(p(1), Some(p(0)), 5);
        let choice = choose(&state, &catalog, &Decision::pay_to_reduce_damage(claim, 3));
        assert_eq!(choice.argument, 3);
    }

    #[test]
    fn test_reroll_enemy_die_when_threatened() {
        let (mut state, catalog) = table(3);
        let decision = Decision::gain_reroll_enemy_die(p(2));
        assert_eq!(
            choose(&state, &catalog, &decision).option,
            GameOption::IgnoreEnemyRollChanges(p(2))
        );
        let win = state.config.win_points;
        state.player_mut(p(0)).add_points(win - 1);
        assert_eq!(choose(&state, &catalog, &decision).option, GameOption::GainRerollEnemyDie(p(2)));
    }

    #[test]
    fn test_die_usage_prefers_reviving_dice() {
        let (state, catalog) = table(3);
        let decision = Decision::special_die_usage(
            p(0),
            &[GameOption::GainHealEnemy, GameOption::GainReviveDeadDice, GameOption::GainReduceVenom],
        );
        assert_eq!(choose(&state, &catalog, &decision).option, GameOption::GainReviveDeadDice);
    }

    #[test]
    fn test_heal_enemy_only_when_heals_are_spare() {
        let (mut state, catalog) = table(3);
        let decision = Decision::special_die_usage(p(0), &[GameOption::GainHealEnemy]);
        // Full health: the heal faces do nothing for the roller.
        assert_eq!(choose(&state, &catalog, &decision).option, GameOption::GainHealEnemy);
        state.player_mut(p(0)).set_health(5);
        assert_eq!(choose(&state, &catalog, &decision).option, GameOption::IgnoreSpecialDieUsage);
    }

    #[test]
    fn test_heals_the_richest_enemy() {
        let (mut state, catalog) = table(4);
        for (seat, currency) in [(1, 2), (2, 7), (3, 4)] {
            state.player_mut(p(seat)).set_health(5);
            state.player_mut(p(seat)).change_currency(currency);
        }
        let decision = Decision::choose_enemy_to_heal(p(0), &[p(1), p(2), p(3)]);
        let choice = choose(&state, &catalog, &decision);
        assert_eq!(choice.option, GameOption::ChooseEnemyToHeal);
        assert_eq!(choice.argument, 2);
    }

    #[test]
    fn test_spends_every_heal_die() {
        let (state, catalog) = table(3);
        let choice = choose(&state, &catalog, &Decision::reduce_venom_level(p(0), 3));
        assert_eq!(choice.option, GameOption::ReduceVenomLevel);
        assert_eq!(choice.argument, 3);
    }
}
