//! Die faces and per-face counts.

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// One face of a siege die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    Ones = 0,
    Twos = 1,
    Threes = 2,
    Damage = 3,
    Heal = 4,
    Currency = 5,
}

impl Face {
    pub const COUNT: usize = 6;

    pub const ALL: [Face; Face::COUNT] = [
        Face::Ones,
        Face::Twos,
        Face::Threes,
        Face::Damage,
        Face::Heal,
        Face::Currency,
    ];

    /// The three number faces that score as sets.
    pub const NUMBERS: [Face; 3] = [Face::Ones, Face::Twos, Face::Threes];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Face> {
        Face::ALL.get(index).copied()
    }

    /// Points awarded for exactly three of this face, if it is a number face.
    #[must_use]
    pub const fn set_value(self) -> Option<i32> {
        match self {
            Face::Ones => Some(1),
            Face::Twos => Some(2),
            Face::Threes => Some(3),
            _ => None,
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Face::Ones => "1",
            Face::Twos => "2",
            Face::Threes => "3",
            Face::Damage => "damage",
            Face::Heal => "heal",
            Face::Currency => "currency",
        };
        f.write_str(label)
    }
}

/// Count of dice showing each face.
///
/// Summaries are always computed from a [`DiceState`](super::DiceState) on
/// demand; unset dice never contribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceSummary(pub [u8; Face::COUNT]);

impl DiceSummary {
    /// Count faces from an iterator of (possibly unset) results.
    pub fn from_faces<'a>(faces: impl IntoIterator<Item = &'a Option<Face>>) -> Self {
        let mut counts = [0u8; Face::COUNT];
        for face in faces.into_iter().flatten() {
            counts[face.index()] += 1;
        }
        Self(counts)
    }

    #[must_use]
    pub fn count(&self, face: Face) -> i32 {
        i32::from(self.0[face.index()])
    }

    #[must_use]
    pub fn has(&self, face: Face) -> bool {
        self.0[face.index()] > 0
    }

    /// Total dice counted.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.0.iter().map(|c| i32::from(*c)).sum()
    }

    /// True when every face appears at least once.
    #[must_use]
    pub fn has_every_face(&self) -> bool {
        self.0.iter().all(|c| *c > 0)
    }

    /// Points from number sets: `value + (count - 3)` for every face with
    /// three or more dice.
    #[must_use]
    pub fn set_points(&self) -> i32 {
        Face::NUMBERS
            .iter()
            .filter_map(|face| {
                let count = self.count(*face);
                face.set_value()
                    .filter(|_| count >= 3)
                    .map(|value| value + count - 3)
            })
            .sum()
    }
}

impl Index<Face> for DiceSummary {
    type Output = u8;

    fn index(&self, face: Face) -> &u8 {
        &self.0[face.index()]
    }
}

impl std::ops::Add for DiceSummary {
    type Output = DiceSummary;

    fn add(self, other: DiceSummary) -> DiceSummary {
        let mut counts = self.0;
        for (slot, extra) in counts.iter_mut().zip(other.0) {
            *slot += extra;
        }
        DiceSummary(counts)
    }
}

impl std::fmt::Display for DiceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = Face::ALL
            .iter()
            .filter(|face| self.has(**face))
            .map(|face| format!("{}x{}", self.count(*face), face))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
