//! End-to-end turn scenarios driven through the public decision interface.
//!
//! Each test seats human players (so nothing resolves on its own), answers
//! decisions with `submit_decision`, and pokes state directly only to fix
//! the dice or set up the table.

use siege_dice::ai::{DecisionPolicy, HeuristicPolicy};
use siege_dice::cards::{CardAttribute, CardCatalog, CardKind, CardRegistry};
use siege_dice::core::{ControlKind, GameConfig, GameState, PlayerId};
use siege_dice::decision::{Decision, DecisionKind, GameOption};
use siege_dice::dice::{DiceState, Face};
use siege_dice::events::GameEvent;
use siege_dice::players::Personality;
use siege_dice::rules::Engine;

fn humans(seats: usize, seed: u64) -> Engine {
    let config = (0..seats).fold(GameConfig::new(), |config, i| {
        config.with_seat(format!("Human {}", i + 1), ControlKind::Human)
    });
    Engine::standard(config.with_seed(seed)).unwrap()
}

/// Present the head decision, check its kind and answer it.
fn answer(engine: &mut Engine, kind: DecisionKind, option: GameOption) {
    let decision = engine.present().unwrap();
    assert_eq!(decision.kind, kind, "expected {:?}, got {}", kind, decision);
    let id = decision.id;
    engine.submit_decision(id, option, 0).unwrap();
}

/// Start the current player's turn and roll once, then force the faces.
fn roll_into(engine: &mut Engine, faces: &[Face]) {
    answer(engine, DecisionKind::StartTurn, GameOption::StartTurn);
    answer(engine, DecisionKind::FirstRoll, GameOption::Roll);
    engine.state_mut().dice.set_faces(faces);
}

/// Scenario A: six ones on the first roll score 1 + (6 - 3).
#[test]
fn test_six_ones_score_four_points() {
    let mut engine = humans(3, 12);
    let turn = engine.state().turn_player;
    let other = engine.state().next_living(turn).unwrap();
    engine.state_mut().inside.push(other);

    roll_into(&mut engine, &[Face::Ones; 6]);
    answer(&mut engine, DecisionKind::IntermediateRoll, GameOption::KeepRolls);
    answer(&mut engine, DecisionKind::NoMoreRolls, GameOption::Resolve);

    assert_eq!(engine.state().player(turn).points(), 4);
    assert_eq!(engine.present().unwrap().kind, DecisionKind::BrowseCards);
}

/// Scenario B: a 5 damage hit on 3 health kills and strips every card.
#[test]
fn test_lethal_hit_kills_and_removes_cards() {
    let mut engine = humans(3, 4);
    let turn = engine.state().turn_player;
    let victim = engine.state().next_living(turn).unwrap();
    engine.state_mut().inside.push(victim);
    engine.state_mut().player_mut(victim).set_health(3);
    engine.grant_card(victim, CardKind::Thrifty);
    engine.grant_card(victim, CardKind::Mercantile);

    roll_into(
        &mut engine,
        &[Face::Damage, Face::Damage, Face::Damage, Face::Damage, Face::Damage, Face::Twos],
    );
    answer(&mut engine, DecisionKind::IntermediateRoll, GameOption::KeepRolls);
    engine.drain_events();
    answer(&mut engine, DecisionKind::NoMoreRolls, GameOption::Resolve);

    let dead = engine.state().player(victim);
    assert!(!dead.is_alive());
    assert_eq!(dead.health(), 0);
    assert!(dead.cards.is_empty());
    assert!(!engine.state().is_inside(victim));
    assert!(engine.state().is_inside(turn));

    let events = engine.drain_events();
    assert!(events.contains(&GameEvent::PlayerDied { player: victim }));
    let removed = events
        .iter()
        .filter(|e| matches!(e, GameEvent::CardRemoved { player, .. } if *player == victim))
        .count();
    assert_eq!(removed, 2);
}

/// Scenario C: an affordable always-buy card is bought and the AI does not
/// refresh the market.
#[test]
fn test_ai_buys_always_buy_card_without_refreshing() {
    let mut engine = Engine::standard(GameConfig::all_ai(3).with_seed(31)).unwrap();
    for _ in 0..500 {
        if engine.queue().iter().next().map(|d| d.kind) == Some(DecisionKind::BrowseCards) {
            break;
        }
        engine.step().unwrap();
    }
    let browsing = engine.queue().iter().next().and_then(|d| d.player).unwrap();

    let catalog = CardRegistry::standard();
    let position = engine
        .state()
        .market
        .draw_pile()
        .iter()
        .position(|c| catalog.attributes_of(c.kind).is_some_and(|a| a.contains_key(&CardAttribute::NoBrainer)))
        .unwrap();
    engine.state_mut().market.refresh(position);
    let top = engine.state().market.peek(0).unwrap().clone();
    let cost = catalog.cost_to_player(top.kind, engine.state().player(browsing));
    let currency = engine.state().player(browsing).currency();
    engine.state_mut().player_mut(browsing).change_currency(cost - currency);

    let record = engine.step().unwrap();
    assert_eq!(record.option, GameOption::BuyCard(top.id));
    assert!(engine.state().player(browsing).card(top.id).is_some());
    assert_eq!(engine.state().player(browsing).currency(), 0);

    let next = engine.present().unwrap();
    assert_eq!(next.kind, DecisionKind::BrowseCards);
    assert!(!next.offers(&GameOption::RefreshCards));
}

/// Scenario D: holding three of a face that only shows twice holds two.
#[test]
fn test_hold_some_with_value_stops_at_available_dice() {
    let mut dice = DiceState::new(8);
    dice.init(6, 3);
    for (die, face) in [Face::Ones, Face::Heal, Face::Twos, Face::Heal, Face::Damage, Face::Currency]
        .into_iter()
        .enumerate()
    {
        dice.set_face(die, Some(face));
    }
    assert_eq!(dice.hold_some_with_value(Face::Heal, 3, true), 2);
    assert_eq!(dice.held(), &[false, true, false, true, false, false]);
}

/// Scenario E: an occupant at exactly their worry level leaves.
#[test]
fn test_occupant_at_worry_level_leaves() {
    let catalog = CardRegistry::standard();
    let mut state = GameState::new(GameConfig::all_ai(4).with_seed(2), &catalog);
    let occupant = PlayerId::new(2);
    state.turn_player = PlayerId::new(0);
    state.inside.push(occupant);
    state.player_mut(occupant).personality = Personality::default().with_health_levels(5, 8);
    state.player_mut(occupant).set_health(5);

    let decision = Decision::leave_or_stay(occupant);
    let choice = HeuristicPolicy.choose(&decision, &state, &catalog);
    assert_eq!(choice.option, GameOption::Leave(occupant));
}

#[test]
fn test_leaving_hands_the_slot_to_the_attacker() {
    let mut engine = humans(3, 8);
    let turn = engine.state().turn_player;
    let occupant = engine.state().next_living(turn).unwrap();
    engine.state_mut().inside.push(occupant);

    roll_into(&mut engine, &[Face::Damage, Face::Ones, Face::Twos, Face::Threes, Face::Heal, Face::Heal]);
    answer(&mut engine, DecisionKind::IntermediateRoll, GameOption::KeepRolls);
    answer(&mut engine, DecisionKind::NoMoreRolls, GameOption::Resolve);
    assert_eq!(engine.state().player(occupant).health(), 9);

    answer(&mut engine, DecisionKind::LeaveOrStay, GameOption::Leave(occupant));
    assert!(!engine.state().is_inside(occupant));
    assert!(engine.state().is_inside(turn));
    // Entering awards the entry points.
    assert_eq!(engine.state().player(turn).points(), 1);
}

#[test]
fn test_heal_resolves_before_the_attack() {
    let mut engine = humans(2, 3);
    let turn = engine.state().turn_player;
    let occupant = engine.state().next_living(turn).unwrap();
    engine.state_mut().inside.push(occupant);
    engine.state_mut().player_mut(turn).set_health(9);

    roll_into(&mut engine, &[Face::Heal, Face::Damage]);
    answer(&mut engine, DecisionKind::IntermediateRoll, GameOption::KeepRolls);
    answer(&mut engine, DecisionKind::NoMoreRolls, GameOption::Resolve);

    assert_eq!(engine.state().player(turn).health(), 10);
    assert_eq!(engine.state().player(occupant).health(), 9);
}

#[test]
fn test_health_insurance_reduction_flow() {
    let mut engine = humans(3, 6);
    let turn = engine.state().turn_player;
    let victim = engine.state().next_living(turn).unwrap();
    engine.state_mut().inside.push(victim);
    engine.grant_card(victim, CardKind::HealthInsurance);
    engine.state_mut().player_mut(victim).change_currency(10);

    roll_into(&mut engine, &[Face::Damage, Face::Damage, Face::Damage]);
    answer(&mut engine, DecisionKind::IntermediateRoll, GameOption::KeepRolls);
    answer(&mut engine, DecisionKind::NoMoreRolls, GameOption::Resolve);

    let reduction = engine.present().unwrap().clone();
    assert_eq!(reduction.kind, DecisionKind::SpecialDamageReduction);
    assert_eq!(reduction.player, Some(victim));
    let gain = reduction
        .find_option(|o| matches!(o, GameOption::GainPayToReduceDamage(_)))
        .cloned()
        .unwrap();
    engine.submit_decision(reduction.id, gain, 0).unwrap();

    let pay = engine.present().unwrap().clone();
    assert_eq!(pay.kind, DecisionKind::PayToReduceDamage);
    let option = pay.options[0].clone();
    // Out of range arguments are rejected and the decision stays pending.
    assert!(engine.submit_decision(pay.id, option.clone(), 99).is_err());
    engine.submit_decision(pay.id, option, 2).unwrap();

    let victim_state = engine.state().player(victim);
    assert_eq!(victim_state.health(), 9);
    assert_eq!(victim_state.currency(), 6);
}
