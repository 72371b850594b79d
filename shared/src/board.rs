//! Board occupancy and starting layouts

use crate::error::GameError;
use crate::hex::{Cell, Coord, Direction, CELL_COUNT};
use crate::player::{Marble, MARBLE_COLORS};
use serde::{Deserialize, Serialize};

/// Occupancy of every cell, as sent to clients
pub type Layout = [Option<Marble>; CELL_COUNT];

/// The 61-cell board plus the number of marbles each color has lost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Layout,
    eliminated: [u8; MARBLE_COLORS],
    player_count: usize,
}

impl Board {
    /// An empty board with no layout applied
    pub fn new() -> Self {
        Self {
            cells: [None; CELL_COUNT],
            eliminated: [0; MARBLE_COLORS],
            player_count: 0,
        }
    }

    /// A board set up for `player_count` players
    pub fn with_players(player_count: usize) -> Result<Self, GameError> {
        let mut board = Board::new();
        board.reset(player_count)?;
        Ok(board)
    }

    /// Repopulates the starting arrangement and clears elimination counts
    pub fn reset(&mut self, player_count: usize) -> Result<(), GameError> {
        self.cells = layout_for(player_count)?;
        self.eliminated = [0; MARBLE_COLORS];
        self.player_count = player_count;
        Ok(())
    }

    /// Player count of the last layout, 0 for a board built by hand
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn occupant(&self, cell: Cell) -> Option<Marble> {
        self.cells[cell.index()]
    }

    pub fn set_occupant(&mut self, cell: Cell, marble: Option<Marble>) {
        self.cells[cell.index()] = marble;
    }

    pub fn is_empty(&self, cell: Cell) -> bool {
        self.cells[cell.index()].is_none()
    }

    /// Marbles of `marble`'s color pushed off the board so far
    pub fn eliminated(&self, marble: Marble) -> u8 {
        self.eliminated[marble.index()]
    }

    /// Marbles of `marble`'s color still on the board
    pub fn marbles(&self, marble: Marble) -> usize {
        self.cells_of(marble).count()
    }

    pub fn cells_of(&self, marble: Marble) -> impl Iterator<Item = Cell> + '_ {
        Cell::all().filter(move |cell| self.occupant(*cell) == Some(marble))
    }

    pub(crate) fn record_elimination(&mut self, cell: Cell, marble: Marble) {
        self.cells[cell.index()] = None;
        self.eliminated[marble.index()] = self.eliminated[marble.index()].saturating_add(1);
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cells: self.cells.to_vec(),
            eliminated: self.eliminated.to_vec(),
            player_count: self.player_count as u8,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire form of a [`Board`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub cells: Vec<Option<Marble>>,
    pub eliminated: Vec<u8>,
    pub player_count: u8,
}

impl TryFrom<&BoardSnapshot> for Board {
    type Error = GameError;

    fn try_from(snapshot: &BoardSnapshot) -> Result<Self, Self::Error> {
        let cells: Layout = snapshot.cells.as_slice().try_into().map_err(|_| {
            GameError::Configuration(format!(
                "snapshot has {} cells, expected {}",
                snapshot.cells.len(),
                CELL_COUNT
            ))
        })?;
        let eliminated: [u8; MARBLE_COLORS] =
            snapshot.eliminated.as_slice().try_into().map_err(|_| {
                GameError::Configuration(format!(
                    "snapshot has {} elimination counts, expected {}",
                    snapshot.eliminated.len(),
                    MARBLE_COLORS
                ))
            })?;

        Ok(Board {
            cells,
            eliminated,
            player_count: snapshot.player_count as usize,
        })
    }
}

/// A straight run of starting marbles
struct Line {
    marble: Marble,
    start: (char, u8),
    direction: Direction,
    length: usize,
}

const fn line(marble: Marble, start: (char, u8), direction: Direction, length: usize) -> Line {
    Line {
        marble,
        start,
        direction,
        length,
    }
}

const TWO_PLAYER: &[Line] = &[
    line(Marble::Black, ('A', 1), Direction::Right, 5),
    line(Marble::Black, ('B', 1), Direction::Right, 6),
    line(Marble::Black, ('C', 3), Direction::Right, 3),
    line(Marble::White, ('I', 5), Direction::Right, 5),
    line(Marble::White, ('H', 4), Direction::Right, 6),
    line(Marble::White, ('G', 5), Direction::Right, 3),
];

const THREE_PLAYER: &[Line] = &[
    line(Marble::Black, ('A', 1), Direction::Right, 5),
    line(Marble::Black, ('B', 1), Direction::Right, 6),
    line(Marble::Blue, ('E', 1), Direction::TopRight, 5),
    line(Marble::Blue, ('D', 1), Direction::TopRight, 6),
    line(Marble::White, ('E', 9), Direction::TopLeft, 5),
    line(Marble::White, ('D', 8), Direction::TopLeft, 6),
];

const FOUR_PLAYER: &[Line] = &[
    line(Marble::Black, ('A', 1), Direction::Right, 5),
    line(Marble::Black, ('B', 2), Direction::Right, 4),
    line(Marble::Blue, ('I', 5), Direction::Right, 5),
    line(Marble::Blue, ('H', 5), Direction::Right, 4),
    line(Marble::Red, ('C', 1), Direction::TopRight, 3),
    line(Marble::Red, ('D', 1), Direction::TopRight, 3),
    line(Marble::Red, ('E', 1), Direction::TopRight, 3),
    line(Marble::White, ('G', 9), Direction::BottomLeft, 3),
    line(Marble::White, ('F', 9), Direction::BottomLeft, 3),
    line(Marble::White, ('E', 9), Direction::BottomLeft, 3),
];

/// The standard starting occupancy for 2, 3 or 4 players
pub fn layout_for(player_count: usize) -> Result<Layout, GameError> {
    let lines = match player_count {
        2 => TWO_PLAYER,
        3 => THREE_PLAYER,
        4 => FOUR_PLAYER,
        n => {
            return Err(GameError::Configuration(format!(
                "no board layout for {} players",
                n
            )))
        }
    };

    let mut cells = [None; CELL_COUNT];
    for line in lines {
        let (row, diagonal) = line.start;
        let start = Cell::from_coord(Coord::new(row, diagonal)).ok_or_else(|| {
            GameError::Configuration(format!("layout starts off board at {}{}", row, diagonal))
        })?;
        for step in 0..line.length {
            let cell = start.step(line.direction, step).ok_or_else(|| {
                GameError::Configuration(format!("layout line from {} runs off board", start))
            })?;
            cells[cell.index()] = Some(line.marble);
        }
    }

    Ok(cells)
}
