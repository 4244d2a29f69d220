//! Entering and leaving the inside area.

use crate::cards::CardKind;
use crate::core::PlayerId;
use crate::events::GameEvent;

use super::Engine;

impl Engine {
    /// Move `player` inside if a slot is free. The previous occupant's
    /// Aggressive cards hit the newcomer on the way in.
    pub(crate) fn enter_inside(&mut self, player: PlayerId) -> bool {
        if !self.state.player(player).is_alive()
            || self.state.is_inside(player)
            || !self.state.inside_has_free_slot()
        {
            return false;
        }

        if let Some(previous) = self.state.previous_inside.filter(|p| *p != player) {
            let aggressive = self.count_card(previous, CardKind::Aggressive);
            if aggressive > 0 {
                self.change_health(player, None, -aggressive);
                if previous == self.state.turn_player {
                    self.state.turn.dealt_damage = true;
                }
                if !self.state.player(player).is_alive() || !self.state.inside_has_free_slot() {
                    return false;
                }
            }
        }

        self.state.inside.push(player);
        self.state.entered_this_turn.push(player);
        tracing::info!("{} entered inside", player);
        self.emit(GameEvent::EnteredInside { player });
        let points = self.state.config.enter_inside_points;
        self.add_points(player, points);
        true
    }

    /// Take `player` out of the inside area.
    ///
    /// A Sneaky leaver gets back the damage this turn's attack did to them.
    /// With `forced`, a free slot is filled by the turn player unless they
    /// are the one leaving.
    pub(crate) fn leave_inside(&mut self, player: PlayerId, forced: bool) {
        if !self.state.is_inside(player) {
            tracing::debug!("{} is not inside and cannot leave", player);
            return;
        }

        let taken = self.state.damage_this_turn[player];
        if taken > 0 && self.has_card(player, CardKind::Sneaky) {
            self.change_health(player, None, taken);
        }

        self.state.inside.retain(|p| *p != player);
        self.state.previous_inside = Some(player);
        tracing::info!("{} left inside", player);
        self.emit(GameEvent::LeftInside { player });

        let turn = self.state.turn_player;
        if forced && turn != player && self.state.inside_has_free_slot() {
            self.enter_inside(turn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;

    fn engine(seats: usize) -> Engine {
        let mut e = Engine::standard(GameConfig::all_ai(seats).with_seed(5)).unwrap();
        e.state_mut().turn_player = PlayerId::new(0);
        e
    }

    #[test]
    fn test_enter_awards_points_once() {
        let mut e = engine(3);
        let p = PlayerId::new(1);
        assert!(e.enter_inside(p));
        assert!(!e.enter_inside(p));
        assert_eq!(e.state().player(p).points(), 1);
        assert_eq!(e.state().entered_this_turn.as_slice(), &[p]);
    }

    #[test]
    fn test_capacity_blocks_second_entry() {
        let mut e = engine(4);
        assert!(e.enter_inside(PlayerId::new(1)));
        assert!(!e.enter_inside(PlayerId::new(2)));
    }

    #[test]
    fn test_forced_leave_pulls_turn_player_in() {
        let mut e = engine(3);
        let occupant = PlayerId::new(2);
        e.enter_inside(occupant);

        e.leave_inside(occupant, true);
        assert!(e.state().is_inside(PlayerId::new(0)));
        assert_eq!(e.state().previous_inside, Some(occupant));

        e.leave_inside(PlayerId::new(0), false);
        assert!(e.state().inside.is_empty());
    }

    #[test]
    fn test_aggressive_previous_occupant_hits_newcomer() {
        let mut e = engine(3);
        let brute = PlayerId::new(2);
        e.grant_card(brute, CardKind::Aggressive);
        e.enter_inside(brute);
        e.leave_inside(brute, false);

        assert!(e.enter_inside(PlayerId::new(1)));
        assert_eq!(e.state().player(PlayerId::new(1)).health(), 9);
    }

    #[test]
    fn test_sneaky_leaver_is_healed() {
        let mut e = engine(3);
        let p = PlayerId::new(1);
        e.grant_card(p, CardKind::Sneaky);
        e.enter_inside(p);
        e.state_mut().player_mut(p).set_health(6);
        e.state_mut().damage_this_turn[p] = 3;

        e.leave_inside(p, false);
        assert_eq!(e.state().player(p).health(), 9);
    }
}
