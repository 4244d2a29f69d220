//! Seat identification and per-seat data storage.
//!
//! ## PlayerId
//!
//! Seats are numbered from 0 in turn order. Turn order always advances by
//! increasing id and wraps around, so the id doubles as the seat position.
//!
//! ## PlayerMap
//!
//! Dense per-seat storage backed by a `Vec`, indexable by `PlayerId`. Used
//! for the players themselves and for the per-turn scratch tables (damage
//! accumulators, cascade flags).

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat identifier. The first seat is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat after this one, wrapping at `seat_count`.
    ///
    /// ```
    /// use siege_dice::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::new(1).next_seat(3), PlayerId::new(2));
    /// assert_eq!(PlayerId::new(2).next_seat(3), PlayerId::new(0));
    /// ```
    #[must_use]
    pub fn next_seat(self, seat_count: usize) -> Self {
        Self(((self.index() + 1) % seat_count) as u8)
    }

    /// The seat before this one, wrapping at `seat_count`.
    #[must_use]
    pub fn previous_seat(self, seat_count: usize) -> Self {
        Self(((self.index() + seat_count - 1) % seat_count) as u8)
    }

    /// Iterate over all seat IDs for a game with `seat_count` seats.
    pub fn all(seat_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..seat_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use siege_dice::core::{PlayerId, PlayerMap};
///
/// let mut damage: PlayerMap<i32> = PlayerMap::with_default(4);
/// damage[PlayerId::new(2)] += 3;
///
/// assert_eq!(damage[PlayerId::new(2)], 3);
/// assert_eq!(damage.values().sum::<i32>(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(seat_count: usize, factory: impl FnMut(PlayerId) -> T) -> Self {
        assert!(seat_count > 0, "Must have at least 1 player");
        assert!(seat_count <= 255, "At most 255 players supported");

        let data = (0..seat_count as u8).map(PlayerId).map(factory).collect();
        Self { data }
    }

    /// Create a map with every entry set to the same value.
    pub fn with_value(seat_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(seat_count, |_| value.clone())
    }

    /// Create a map with default values.
    pub fn with_default(seat_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(seat_count, |_| T::default())
    }

    /// Number of seats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a map holds at least one seat.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Overwrite every entry with `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for slot in &mut self.data {
            *slot = value.clone();
        }
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over the stored values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate over all seat IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_wrapping() {
        let last = PlayerId::new(4);
        assert_eq!(last.next_seat(5), PlayerId::new(0));
        assert_eq!(PlayerId::new(0).previous_seat(5), last);
        assert_eq!(PlayerId::new(2).previous_seat(5), PlayerId::new(1));
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(format!("{}", PlayerId::new(0)), "Player 1");
    }

    #[test]
    fn test_player_map_factory() {
        let map = PlayerMap::new(3, |p| p.index() * 10);
        assert_eq!(map[PlayerId::new(2)], 20);
        assert_eq!(map.len(), 3);
        assert!(map.get(PlayerId::new(3)).is_none());
    }

    #[test]
    fn test_player_map_fill() {
        let mut flags = PlayerMap::with_value(4, true);
        flags.fill(false);
        assert!(flags.values().all(|f| !f));
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_seats() {
        let _ = PlayerMap::<u8>::with_default(0);
    }
}
