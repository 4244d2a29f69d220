//! Market heuristics.

use crate::cards::{AttributeFamily, CardAttribute, CardId, CardKind};
use crate::decision::GameOption;

use super::{AiChoice, AiView};

/// Cards on offer to the browsing player, in market order.
fn cards_on_offer(view: &AiView<'_>) -> Vec<(CardId, CardKind)> {
    view.state
        .cards_available_to(view.id)
        .into_iter()
        .map(|(_, card)| (card.id, card.kind))
        .collect()
}

fn buy(view: &AiView<'_>, card: CardId, reason: &str) -> Option<AiChoice> {
    let choice = view.offered(&GameOption::BuyCard(card))?;
    tracing::debug!("{} buys {} because {}", view.id, card, reason);
    Some(choice)
}

/// Buying this card alone reaches the win line without killing the buyer.
fn wins_outright(view: &AiView<'_>, kind: CardKind) -> bool {
    let player = view.player;
    let points = view.card_value(kind, CardAttribute::PointsInstant);
    points > 0
        && player.points() < view.win_points()
        && player.points() + points >= view.win_points()
        && player.health() + view.card_value(kind, CardAttribute::HealthInstant) > 0
}

/// Hurts the buyer below their comfort, or drags a hater inside.
fn is_detrimental(view: &AiView<'_>, kind: CardKind) -> bool {
    let player = view.player;
    player.health() + view.card_value(kind, CardAttribute::HealthInstant) <= player.personality.health_worry
        || (view.card_has(kind, CardAttribute::EnterInside) && player.personality.hates_inside)
}

/// The ordered buying gate for BrowseCards.
///
/// Always-buy cards first, then a card that wins on the spot. Threats are
/// read next: a card that would let an enemy win or would kill this player
/// makes a refresh attractive, while an enemy already close to winning
/// makes refreshing too risky. Personality purchases follow, keeping the
/// refresh price back when a refresh is wanted.
pub(super) fn browse_cards(view: &AiView<'_>) -> Option<AiChoice> {
    let offer = cards_on_offer(view);
    if offer.is_empty() {
        return view.offered(&GameOption::FinishedBrowsing);
    }
    let player = view.player;
    let currency = player.currency();
    let win = view.win_points();

    for (card, kind) in &offer {
        if view.card_has(*kind, CardAttribute::NoBrainer) && currency >= view.cost(*kind) {
            if let Some(choice) = buy(view, *card, "it is a no-brainer") {
                return Some(choice);
            }
        }
    }

    for (card, kind) in &offer {
        if wins_outright(view, *kind) && currency >= view.cost(*kind) {
            if let Some(choice) = buy(view, *card, "it wins the game") {
                return Some(choice);
            }
        }
    }

    let enemies = view.state.others_living(view.id);
    let mut wants_refresh = offer.iter().any(|(_, kind)| {
        let points = view.card_value(*kind, CardAttribute::PointsInstant);
        points > 0
            && enemies
                .iter()
                .any(|enemy| view.state.player(*enemy).points() + points >= win)
    });
    let never_refresh = !wants_refresh
        && enemies.iter().any(|enemy| {
            win - view.state.player(*enemy).points() <= player.personality.enemy_points_risk
        });

    let refresh_cost = view.state.config.refresh_cost;
    let budget = |wants_refresh: bool| currency - if wants_refresh { refresh_cost } else { 0 };

    for (card, kind) in &offer {
        let damage = view.card_value(*kind, CardAttribute::DamageInstant);
        if damage >= 0 || player.health() + damage > 0 {
            continue;
        }
        let survives_buying = player.health() + view.card_value(*kind, CardAttribute::HealthInstant) > 0;
        if budget(wants_refresh) >= view.cost(*kind) && !survives_buying {
            if let Some(choice) = buy(view, *card, "someone else could kill them with it") {
                return Some(choice);
            }
        } else {
            wants_refresh = true;
        }
    }

    let affordable = |kind: CardKind| budget(wants_refresh) >= view.cost(kind);
    let personality = &player.personality;
    if personality.loves_being_mean {
        for (card, kind) in &offer {
            if view.catalog.in_family(*kind, AttributeFamily::WeakenEnemies) && affordable(*kind) {
                if let Some(choice) = buy(view, *card, "they like being mean") {
                    return Some(choice);
                }
            }
        }
    }
    if personality.loves_dice_control {
        for (card, kind) in &offer {
            if view.catalog.in_family(*kind, AttributeFamily::DiceControl) && affordable(*kind) {
                if let Some(choice) = buy(view, *card, "they like controlling dice") {
                    return Some(choice);
                }
            }
        }
    }
    if personality.loves_cards {
        for (card, kind) in &offer {
            if !is_detrimental(view, *kind) && affordable(*kind) {
                if let Some(choice) = buy(view, *card, "they like cards") {
                    return Some(choice);
                }
            }
        }
    }

    if !never_refresh && currency >= refresh_cost {
        let hoards = view
            .catalog
            .holds_family(player, AttributeFamily::CurrencyHoarding);
        if wants_refresh || (currency >= personality.too_much_currency && !hoards) {
            if let Some(choice) = view.offered(&GameOption::RefreshCards) {
                tracing::debug!("{} refreshes the market", view.id);
                return Some(choice);
            }
        }
    }
    view.offered(&GameOption::FinishedBrowsing)
}

/// Quick Deal offer: take it on the same terms as browsing would, without
/// any refresh considerations.
pub(super) fn buy_card_instantly(view: &AiView<'_>) -> Option<AiChoice> {
    let option = view
        .decision
        .find_option(|o| matches!(o, GameOption::BuyCardInstantly(_)))?
        .clone();
    let GameOption::BuyCardInstantly(card) = option else {
        return None;
    };
    let kind = view.state.market.draw_pile().iter().find(|c| c.id == card)?.kind;
    if view.player.currency() < view.cost(kind) {
        return view.offered(&GameOption::DontBuy);
    }

    let personality = &view.player.personality;
    let wanted = view.card_has(kind, CardAttribute::NoBrainer)
        || wins_outright(view, kind)
        || (personality.loves_being_mean && view.catalog.in_family(kind, AttributeFamily::WeakenEnemies))
        || (personality.loves_dice_control && view.catalog.in_family(kind, AttributeFamily::DiceControl))
        || (personality.loves_cards && !is_detrimental(view, kind));
    if wanted {
        tracing::debug!("{} snaps up {:?}", view.id, kind);
        view.offered(&option)
    } else {
        view.offered(&GameOption::DontBuy)
    }
}

/// Copy the most expensive enemy card. An existing copy is only moved for
/// a strictly pricier target.
pub(super) fn duplicate_card(view: &AiView<'_>) -> Option<AiChoice> {
    let base_cost = |kind: CardKind| view.catalog.definition(kind).map_or(0, |d| d.base_cost);
    let best = view
        .decision
        .options
        .iter()
        .filter_map(|option| match option {
            GameOption::DuplicateCard { card, target } => Some((*card, *target)),
            _ => None,
        })
        .max_by_key(|(_, target)| base_cost(*target))?;

    let (card, target) = best;
    let current = view.player.card(card).and_then(|c| c.duplicating);
    if let Some(current) = current {
        if base_cost(target) <= base_cost(current) {
            return view.offered(&GameOption::FinishedDuplicating);
        }
    }
    view.offered(&GameOption::DuplicateCard { card, target })
}
