use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct marble colors
pub const MARBLE_COLORS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marble {
    Black,
    White,
    Blue,
    Red,
}

impl Marble {
    pub const ALL: [Marble; MARBLE_COLORS] = [Marble::Black, Marble::White, Marble::Blue, Marble::Red];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Colors handed out to seats, in turn order, for a given player count
    pub fn seating(player_count: usize) -> Result<&'static [Marble], GameError> {
        match player_count {
            2 => Ok(&[Marble::Black, Marble::White]),
            3 => Ok(&[Marble::Black, Marble::Blue, Marble::White]),
            4 => Ok(&[Marble::Black, Marble::White, Marble::Blue, Marble::Red]),
            n => Err(GameError::Configuration(format!(
                "a game needs 2 to 4 players, got {}",
                n
            ))),
        }
    }

    /// Single-character board symbol
    pub fn symbol(self) -> char {
        match self {
            Marble::Black => 'B',
            Marble::White => 'W',
            Marble::Blue => 'U',
            Marble::Red => 'R',
        }
    }
}

impl fmt::Display for Marble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Marble::Black => "BLACK",
            Marble::White => "WHITE",
            Marble::Blue => "BLUE",
            Marble::Red => "RED",
        };
        f.write_str(name)
    }
}

/// Who is behind a seat, as declared by the client when it connects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    /// Types moves at a terminal
    #[default]
    Human,
    /// Driven by a [`Strategy`](crate::strategy::Strategy)
    Computer,
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKind::Human => f.write_str("human"),
            PlayerKind::Computer => f.write_str("computer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub marble: Marble,
    pub kind: PlayerKind,
}

impl Player {
    pub fn new(name: impl Into<String>, marble: Marble, kind: PlayerKind) -> Self {
        Self {
            name: name.into(),
            marble,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seating_by_player_count() {
        assert_eq!(Marble::seating(2).unwrap(), &[Marble::Black, Marble::White]);
        assert_eq!(
            Marble::seating(3).unwrap(),
            &[Marble::Black, Marble::Blue, Marble::White]
        );
        assert_eq!(Marble::seating(4).unwrap().len(), 4);
    }

    #[test]
    fn test_seating_rejects_bad_counts() {
        for n in [0, 1, 5] {
            assert!(matches!(
                Marble::seating(n),
                Err(GameError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_marble_indices_are_distinct() {
        let indices: Vec<usize> = Marble::ALL.iter().map(|m| m.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
