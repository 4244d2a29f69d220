//! Table state: everything the rules engine mutates between decisions.
//!
//! ## GameState
//!
//! - Players, turn order and the inside area
//! - The shared dice tray and per-turn flags
//! - The card market and the siege clock
//! - The persistent decision history
//!
//! `GameState` is plain data plus read-only queries. Mutations that have
//! rule consequences (damage, death, entering) live on the engine.

use im::Vector;
use smallvec::SmallVec;

use super::config::GameConfig;
use super::history::DecisionRecord;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{Card, CardCatalog, CardId, CardKind, Market};
use crate::dice::DiceState;
use crate::players::{Personality, Player};
use crate::rules::GameResult;

/// Player id lists; tables seat at most eight.
pub type PlayerIds = SmallVec<[PlayerId; 8]>;

/// Flags that live for one turn and are cleared by StartTurn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnFlags {
    pub has_ended: bool,
    pub dealt_damage: bool,
    pub finished_roll_changes: bool,
    pub finished_die_usage: bool,
    pub changed_to_one: bool,
    pub rolls_resolved: bool,
    pub inside_died: bool,
    pub enemy_to_heal: Option<PlayerId>,
    pub used_aggressive_healthcare: bool,
    pub negated_die_die: bool,
    pub negated_venom: bool,
    /// Die clicks select a single die instead of toggling holds.
    pub single_die_only: bool,
}

/// Day and hour of the siege.
///
/// A day is one full lap of the table starting from the pivot player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiegeClock {
    pub day: u32,
    pub hour: u32,
    pub total_hours: u32,
    pub pivot: PlayerId,
    pub living_at_day_start: usize,
}

impl SiegeClock {
    #[must_use]
    pub fn new(pivot: PlayerId, living: usize) -> Self {
        Self {
            day: 1,
            hour: 1,
            total_hours: 0,
            pivot,
            living_at_day_start: living,
        }
    }

    /// Advance one hour for the turn passing to `next`. Returns true when a
    /// new day starts.
    pub fn advance(&mut self, next: PlayerId, living: usize) -> bool {
        self.total_hours += 1;
        if next == self.pivot {
            self.day += 1;
            self.hour = 1;
            self.living_at_day_start = living;
            true
        } else {
            self.hour += 1;
            false
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub players: PlayerMap<Player>,
    pub turn_player: PlayerId,
    /// Occupants of the inside area, in arrival order.
    pub inside: SmallVec<[PlayerId; 2]>,
    pub previous_inside: Option<PlayerId>,
    pub entered_this_turn: SmallVec<[PlayerId; 2]>,
    pub dice: DiceState,
    pub turn: TurnFlags,
    /// Damage dealt to each player by the current turn's attack.
    pub damage_this_turn: PlayerMap<i32>,
    pub finished_enemy_die_change: PlayerMap<bool>,
    pub bought_instantly: PlayerMap<bool>,
    pub extra_turn: bool,
    pub extra_turn_number: i32,
    pub market: Market,
    pub clock: SiegeClock,
    pub rng: GameRng,
    pub result: Option<GameResult>,
    pub history: Vector<DecisionRecord>,
    pub games_played: u32,
}

impl GameState {
    /// Seat the players, shuffle the market and pick a random first player.
    #[must_use]
    pub fn new(config: GameConfig, catalog: &dyn CardCatalog) -> Self {
        let rng = GameRng::new(config.seed);
        let seats = config.seat_count();
        let mut state = Self {
            players: PlayerMap::new(seats, |id| {
                Player::new(id, &config.seats[id.index()], &config, Personality::default())
            }),
            turn_player: PlayerId::new(0),
            inside: SmallVec::new(),
            previous_inside: None,
            entered_this_turn: SmallVec::new(),
            dice: DiceState::new(config.max_dice),
            turn: TurnFlags::default(),
            damage_this_turn: PlayerMap::with_value(seats, 0),
            finished_enemy_die_change: PlayerMap::with_value(seats, false),
            bought_instantly: PlayerMap::with_value(seats, false),
            extra_turn: false,
            extra_turn_number: 0,
            market: Market::default(),
            clock: SiegeClock::new(PlayerId::new(0), seats),
            rng,
            result: None,
            history: Vector::new(),
            games_played: 0,
            config,
        };
        state.deal(catalog);
        state
    }

    /// Start a fresh game on the same table with a forked random stream.
    ///
    /// History is kept across games.
    pub fn reset(&mut self, catalog: &dyn CardCatalog) {
        self.rng = self.rng.fork();
        self.games_played += 1;
        self.deal(catalog);
    }

    fn deal(&mut self, catalog: &dyn CardCatalog) {
        let seats = self.seat_count();
        let config = &self.config;
        let rng = &mut self.rng;
        self.players = PlayerMap::new(seats, |id| {
            let mut personality_rng = rng.fork();
            let personality = Personality::roll(&mut personality_rng);
            Player::new(id, &config.seats[id.index()], config, personality)
        });

        self.turn_player = PlayerId::new(self.rng.gen_range_usize(0..seats) as u8);
        self.inside.clear();
        self.previous_inside = None;
        self.entered_this_turn.clear();
        self.dice = DiceState::new(self.config.max_dice);
        self.turn = TurnFlags::default();
        self.damage_this_turn.fill(0);
        self.finished_enemy_die_change.fill(false);
        self.bought_instantly.fill(false);
        self.extra_turn = false;
        self.extra_turn_number = 0;
        self.market = Market::new(&catalog.deck(), &mut self.rng);
        self.clock = SiegeClock::new(self.turn_player, seats);
        self.result = None;
    }

    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id]
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    // === Turn order ===

    #[must_use]
    pub fn living_ids(&self) -> PlayerIds {
        self.players
            .iter()
            .filter(|(_, p)| p.is_alive())
            .map(|(id, _)| id)
            .collect()
    }

    #[must_use]
    pub fn living_count(&self) -> usize {
        self.players.values().filter(|p| p.is_alive()).count()
    }

    /// Living players other than `player`, in seat order.
    #[must_use]
    pub fn others_living(&self, player: PlayerId) -> PlayerIds {
        self.living_ids().into_iter().filter(|id| *id != player).collect()
    }

    /// First living seat after `from`, wrapping. May return `from` itself
    /// when it is the only survivor.
    #[must_use]
    pub fn next_living(&self, from: PlayerId) -> Option<PlayerId> {
        self.scan_living(from, PlayerId::next_seat)
    }

    /// First living seat before `from`, wrapping.
    #[must_use]
    pub fn previous_living(&self, from: PlayerId) -> Option<PlayerId> {
        self.scan_living(from, PlayerId::previous_seat)
    }

    fn scan_living(&self, from: PlayerId, step: fn(PlayerId, usize) -> PlayerId) -> Option<PlayerId> {
        let seats = self.seat_count();
        let mut seat = from;
        for _ in 0..seats {
            seat = step(seat, seats);
            if self.players[seat].is_alive() {
                return Some(seat);
            }
        }
        None
    }

    /// Living players sharing the lowest score.
    #[must_use]
    pub fn least_points_players(&self) -> PlayerIds {
        let living = self.living_ids();
        let lowest = living.iter().map(|id| self.players[*id].points()).min();
        living
            .into_iter()
            .filter(|id| Some(self.players[*id].points()) == lowest)
            .collect()
    }

    // === Inside area ===

    #[must_use]
    pub fn is_inside(&self, player: PlayerId) -> bool {
        self.inside.contains(&player)
    }

    /// Inside capacity: two seats once more than four players are alive.
    #[must_use]
    pub fn max_inside(&self) -> usize {
        if self.living_count() > 4 {
            2
        } else {
            1
        }
    }

    #[must_use]
    pub fn inside_has_free_slot(&self) -> bool {
        self.inside.len() < self.max_inside()
    }

    #[must_use]
    pub fn outside_ids(&self) -> PlayerIds {
        self.living_ids()
            .into_iter()
            .filter(|id| !self.is_inside(*id))
            .collect()
    }

    /// Living enemies at or below `player`'s health worry level, on one side
    /// of the wall.
    #[must_use]
    pub fn vulnerable_enemies(&self, player: PlayerId, inside: bool) -> PlayerIds {
        let worry = self.players[player].personality.health_worry;
        self.others_living(player)
            .into_iter()
            .filter(|id| self.players[*id].health() <= worry && self.is_inside(*id) == inside)
            .collect()
    }

    /// Enemies that can be healed for currency: hurt and holding some.
    #[must_use]
    pub fn healable_enemies(&self, healer: PlayerId) -> PlayerIds {
        self.others_living(healer)
            .into_iter()
            .filter(|id| {
                let p = &self.players[*id];
                p.health() < p.max_health() && p.currency() > 0
            })
            .collect()
    }

    // === Cards ===

    /// Face-up market cards `player` can see.
    #[must_use]
    pub fn visible_cards(&self, player: PlayerId) -> &[Card] {
        let bonus = self.players.get(player).map_or(0, |p| p.visibility_bonus);
        self.market.visible(self.config.card_visibility + bonus)
    }

    /// Every card held by a living enemy, with its owner.
    #[must_use]
    pub fn enemy_cards(&self, player: PlayerId) -> Vec<(PlayerId, &Card)> {
        self.others_living(player)
            .into_iter()
            .flat_map(|id| self.players[id].cards.iter().map(move |c| (id, c)))
            .collect()
    }

    /// Cards `player` may buy: the visible market, plus enemy cards when
    /// holding Bargainer. The owner is `None` for market cards.
    #[must_use]
    pub fn cards_available_to(&self, player: PlayerId) -> Vec<(Option<PlayerId>, &Card)> {
        let mut cards: Vec<(Option<PlayerId>, &Card)> =
            self.visible_cards(player).iter().map(|c| (None, c)).collect();
        if self.players[player].has_card(CardKind::Bargainer) {
            cards.extend(self.enemy_cards(player).into_iter().map(|(id, c)| (Some(id), c)));
        }
        cards
    }

    /// Current owner of a card, if a player holds it.
    #[must_use]
    pub fn card_owner(&self, card: CardId) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|(_, p)| p.card(card).is_some())
            .map(|(id, _)| id)
    }
}
