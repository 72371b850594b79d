//! Hexagonal board geometry
//!
//! The Abalone board is a hexagon with five cells per side, 61 cells in total.
//! Positions are addressed by a row letter (`A` at the bottom to `I` at the
//! top) and a diagonal number (`1` to `9`), so `E5` is the centre cell.
//!
//! All neighbor relations are computed at compile time into a lookup table,
//! which keeps move validation free of any geometric arithmetic at runtime.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of cells on the board
pub const CELL_COUNT: usize = 61;

/// Rows (and diagonals) per axis
const SIZE: i8 = 9;
/// Cells from the centre to an edge
const RADIUS: i8 = 4;
const OFF_BOARD: u8 = u8::MAX;

/// The six hex-adjacency directions, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    TopLeft,
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::TopLeft,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::BottomLeft,
        Direction::Left,
    ];

    /// Offset as (row, diagonal)
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::TopLeft => (1, 0),
            Direction::TopRight => (1, 1),
            Direction::Right => (0, 1),
            Direction::BottomRight => (-1, 0),
            Direction::BottomLeft => (-1, -1),
            Direction::Left => (0, -1),
        }
    }

    pub const fn opposite(self) -> Direction {
        Direction::ALL[(self as usize + 3) % 6]
    }

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Direction> {
        Direction::ALL.get(ordinal as usize).copied()
    }

    /// True when `self` and `other` lie on the same axis
    pub fn is_parallel(self, other: Direction) -> bool {
        self == other || self == other.opposite()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::TopLeft => "TOP_LEFT",
            Direction::TopRight => "TOP_RIGHT",
            Direction::Right => "RIGHT",
            Direction::BottomRight => "BOTTOM_RIGHT",
            Direction::BottomLeft => "BOTTOM_LEFT",
            Direction::Left => "LEFT",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    /// Accepts `TOP_LEFT`, `top-left`, `TL` or the ordinal `0`..`5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let direction = match normalized.as_str() {
            "TOPLEFT" | "TL" => Some(Direction::TopLeft),
            "TOPRIGHT" | "TR" => Some(Direction::TopRight),
            "RIGHT" | "R" => Some(Direction::Right),
            "BOTTOMRIGHT" | "BR" => Some(Direction::BottomRight),
            "BOTTOMLEFT" | "BL" => Some(Direction::BottomLeft),
            "LEFT" | "L" => Some(Direction::Left),
            digits => digits.parse::<u8>().ok().and_then(Direction::from_ordinal),
        };

        direction.ok_or_else(|| ParseError::InvalidDirection(s.to_string()))
    }
}

/// An unchecked board position as typed by a user or received on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Row letter, `'A'` (bottom) to `'I'` (top)
    pub row: char,
    /// Diagonal number, 1 to 9
    pub diagonal: u8,
}

impl Coord {
    pub fn new(row: char, diagonal: u8) -> Self {
        Self {
            row: row.to_ascii_uppercase(),
            diagonal,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.diagonal)
    }
}

impl FromStr for Coord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let row = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(|| ParseError::InvalidCoord(s.to_string()))?;
        let diagonal = chars
            .as_str()
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidCoord(s.to_string()))?;

        Ok(Coord::new(row, diagonal))
    }
}

/// A valid cell on the board, indexed `0..61` from the top row (`I5`) down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(u8);

impl Cell {
    pub fn new(index: usize) -> Option<Cell> {
        (index < CELL_COUNT).then_some(Cell(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Resolves a coordinate, returning `None` for positions off the board
    pub fn from_coord(coord: Coord) -> Option<Cell> {
        if !coord.row.is_ascii_alphabetic() {
            return None;
        }
        let row = coord.row.to_ascii_uppercase() as i16 - 'A' as i16;
        let diag = coord.diagonal as i16 - 1;
        if !(0..SIZE as i16).contains(&row) || !(0..SIZE as i16).contains(&diag) {
            return None;
        }
        lookup(row as i8, diag as i8)
    }

    pub fn coord(self) -> Coord {
        let (row, diag) = POSITIONS[self.index()];
        Coord {
            row: (b'A' + row as u8) as char,
            diagonal: diag as u8 + 1,
        }
    }

    /// Zero-based (row, diagonal), row 0 being `A`
    pub fn position(self) -> (i8, i8) {
        POSITIONS[self.index()]
    }

    pub fn neighbor(self, direction: Direction) -> Option<Cell> {
        NEIGHBORS[self.index()][direction as usize]
    }

    /// Walks `steps` cells in `direction`, stopping at the edge
    pub fn step(self, direction: Direction, steps: usize) -> Option<Cell> {
        (0..steps).try_fold(self, |cell, _| cell.neighbor(direction))
    }

    /// The direction leading from `self` to the adjacent cell `other`, if any
    pub fn direction_to(self, other: Cell) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.neighbor(*d) == Some(other))
    }

    /// True for cells on the rim, where some direction leads off the board
    pub fn is_edge(self) -> bool {
        NEIGHBORS[self.index()].iter().any(Option::is_none)
    }

    pub fn all() -> impl Iterator<Item = Cell> {
        (0..CELL_COUNT as u8).map(Cell)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.coord().fmt(f)
    }
}

/// Free-function form of [`Cell::neighbor`]
pub fn neighbor(cell: Cell, direction: Direction) -> Option<Cell> {
    cell.neighbor(direction)
}

const fn on_board(row: i8, diag: i8) -> bool {
    row >= 0 && row < SIZE && diag >= 0 && diag < SIZE && (row - diag).abs() <= RADIUS
}

const fn lookup(row: i8, diag: i8) -> Option<Cell> {
    if on_board(row, diag) {
        Some(Cell(INDEX[row as usize][diag as usize]))
    } else {
        None
    }
}

const fn build_positions() -> [(i8, i8); CELL_COUNT] {
    let mut out = [(0i8, 0i8); CELL_COUNT];
    let mut n = 0;
    let mut row = SIZE - 1;
    while row >= 0 {
        let mut diag = 0;
        while diag < SIZE {
            if on_board(row, diag) {
                out[n] = (row, diag);
                n += 1;
            }
            diag += 1;
        }
        row -= 1;
    }
    out
}

const fn build_index() -> [[u8; SIZE as usize]; SIZE as usize] {
    let mut out = [[OFF_BOARD; SIZE as usize]; SIZE as usize];
    let mut n = 0;
    while n < CELL_COUNT {
        let (row, diag) = POSITIONS[n];
        out[row as usize][diag as usize] = n as u8;
        n += 1;
    }
    out
}

const fn build_neighbors() -> [[Option<Cell>; 6]; CELL_COUNT] {
    let mut out = [[None; 6]; CELL_COUNT];
    let mut n = 0;
    while n < CELL_COUNT {
        let (row, diag) = POSITIONS[n];
        let mut k = 0;
        while k < 6 {
            let (dr, dd) = Direction::ALL[k].delta();
            out[n][k] = lookup(row + dr, diag + dd);
            k += 1;
        }
        n += 1;
    }
    out
}

const POSITIONS: [(i8, i8); CELL_COUNT] = build_positions();
const INDEX: [[u8; SIZE as usize]; SIZE as usize] = build_index();
const NEIGHBORS: [[Option<Cell>; 6]; CELL_COUNT] = build_neighbors();

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(name: &str) -> Cell {
        Cell::from_coord(name.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_board_has_61_cells() {
        assert_eq!(Cell::all().count(), CELL_COUNT);
        assert_eq!(Cell::new(60).map(Cell::index), Some(60));
        assert!(Cell::new(61).is_none());
    }

    #[test]
    fn test_index_order_starts_at_top_row() {
        assert_eq!(Cell::new(0).unwrap().to_string(), "I5");
        assert_eq!(Cell::new(4).unwrap().to_string(), "I9");
        assert_eq!(Cell::new(56).unwrap().to_string(), "A1");
        assert_eq!(Cell::new(60).unwrap().to_string(), "A5");
        assert_eq!(cell("E5").index(), 30);
    }

    #[test]
    fn test_coord_round_trip_for_every_cell() {
        for c in Cell::all() {
            assert_eq!(Cell::from_coord(c.coord()), Some(c));
        }
    }

    #[test]
    fn test_off_board_coords() {
        for name in ["A6", "I4", "E0", "E10", "J5", "A9", "I1"] {
            let coord: Coord = name.parse().unwrap();
            assert!(Cell::from_coord(coord).is_none(), "{} should be off board", name);
        }
        assert!(Cell::from_coord(Coord::new('?', 3)).is_none());
    }

    #[test]
    fn test_neighbor_symmetry() {
        for a in Cell::all() {
            for d in Direction::ALL {
                if let Some(b) = neighbor(a, d) {
                    assert_eq!(neighbor(b, d.opposite()), Some(a), "{} {} {}", a, d, b);
                }
            }
        }
    }

    #[test]
    fn test_centre_has_six_neighbors() {
        let centre = cell("E5");
        let neighbors: Vec<String> = Direction::ALL
            .iter()
            .filter_map(|d| centre.neighbor(*d))
            .map(|c| c.to_string())
            .collect();
        assert_eq!(neighbors, vec!["F5", "F6", "E6", "D5", "D4", "E4"]);
        assert!(!centre.is_edge());
    }

    #[test]
    fn test_corners_have_three_neighbors() {
        for name in ["A1", "A5", "E1", "E9", "I5", "I9"] {
            let corner = cell(name);
            let count = Direction::ALL
                .iter()
                .filter(|d| corner.neighbor(**d).is_some())
                .count();
            assert_eq!(count, 3, "corner {}", name);
        }
    }

    #[test]
    fn test_edge_cell_count() {
        assert_eq!(Cell::all().filter(|c| c.is_edge()).count(), 24);
    }

    #[test]
    fn test_step_and_direction_to() {
        let start = cell("C3");
        assert_eq!(start.step(Direction::Right, 2), Some(cell("C5")));
        assert_eq!(start.step(Direction::BottomLeft, 2), Some(cell("A1")));
        assert_eq!(start.step(Direction::BottomLeft, 3), None);
        assert_eq!(start.direction_to(cell("D3")), Some(Direction::TopLeft));
        assert_eq!(start.direction_to(cell("E5")), None);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("TOP_LEFT".parse::<Direction>().unwrap(), Direction::TopLeft);
        assert_eq!("bottom-right".parse::<Direction>().unwrap(), Direction::BottomRight);
        assert_eq!("tr".parse::<Direction>().unwrap(), Direction::TopRight);
        assert_eq!("5".parse::<Direction>().unwrap(), Direction::Left);
        assert!("6".parse::<Direction>().is_err());
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_display_parses_back() {
        for d in Direction::ALL {
            assert_eq!(d.to_string().parse::<Direction>().unwrap(), d);
            assert_eq!(Direction::from_ordinal(d.ordinal()), Some(d));
        }
    }

    #[test]
    fn test_coord_parsing() {
        assert_eq!("c3".parse::<Coord>().unwrap(), Coord::new('C', 3));
        assert_eq!(" I9 ".parse::<Coord>().unwrap(), Coord::new('I', 9));
        assert!("3C".parse::<Coord>().is_err());
        assert!("C".parse::<Coord>().is_err());
        assert!("".parse::<Coord>().is_err());
    }
}
