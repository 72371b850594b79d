//! Move validation and push resolution
//!
//! A move names the two end marbles of a straight line of one to three of the
//! mover's marbles, plus a direction. Moving along the line's own axis is an
//! in-line move and may push a strictly shorter group of opposing marbles
//! (sumito); moving across the axis is a side-step and needs every
//! destination to be empty.
//!
//! Resolution is split in two phases. [`Board::resolve_move`] decides
//! legality and computes every shift without touching the board, and
//! [`Board::apply`] writes the result. A rejected move therefore never leaves
//! a partially updated board behind.

use crate::board::Board;
use crate::error::{IllegalMove, ParseError};
use crate::hex::{Cell, Coord, Direction};
use crate::player::Marble;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest line of marbles that may move together
pub const MAX_LINE: usize = 3;

/// A candidate move as submitted by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    pub marble1: Coord,
    pub marble2: Coord,
    pub direction: Direction,
}

impl MoveRequest {
    pub fn new(marble1: Coord, marble2: Coord, direction: Direction) -> Self {
        Self {
            marble1,
            marble2,
            direction,
        }
    }

    /// Moves a single marble
    pub fn single(marble: Coord, direction: Direction) -> Self {
        Self::new(marble, marble, direction)
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.marble1, self.marble2, self.direction)
    }
}

impl FromStr for MoveRequest {
    type Err = ParseError;

    /// Parses `C3 C5 TOP_RIGHT`, `C3;C5;1` or `C3 RIGHT` for a single marble
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ';' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();

        match parts.as_slice() {
            [marble, direction] => Ok(MoveRequest::single(marble.parse()?, direction.parse()?)),
            [marble1, marble2, direction] => Ok(MoveRequest::new(
                marble1.parse()?,
                marble2.parse()?,
                direction.parse()?,
            )),
            _ => Err(ParseError::InvalidMove(s.to_string())),
        }
    }
}

/// The colors a player moves with and must not push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Side {
    pub marble: Marble,
    /// Teammate's color in four-player games
    pub ally: Option<Marble>,
}

impl Side {
    pub fn solo(marble: Marble) -> Self {
        Self { marble, ally: None }
    }

    pub fn is_friendly(&self, marble: Marble) -> bool {
        marble == self.marble || Some(marble) == self.ally
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    Single,
    InLine,
    SideStep,
}

/// A fully validated move, ready to be written to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMove {
    pub kind: MoveKind,
    /// Every marble that changes cell, as (from, to)
    pub shifts: Vec<(Cell, Cell)>,
    /// The opposing marble pushed off the edge, if any
    pub eliminated: Option<(Cell, Marble)>,
    /// Opposing marbles displaced by a sumito
    pub pushed: usize,
}

/// What an applied move did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub kind: MoveKind,
    pub pushed: usize,
    pub eliminated: Option<Marble>,
}

impl Board {
    /// Checks a move for `side` without modifying the board
    pub fn resolve_move(
        &self,
        side: Side,
        request: &MoveRequest,
    ) -> Result<ResolvedMove, IllegalMove> {
        let first = Cell::from_coord(request.marble1).ok_or(IllegalMove::OffBoardSelection)?;
        let last = Cell::from_coord(request.marble2).ok_or(IllegalMove::OffBoardSelection)?;

        if self.occupant(first) != Some(side.marble) || self.occupant(last) != Some(side.marble)
        {
            return Err(IllegalMove::NotOwnMarble);
        }

        let (line, axis) = selection_line(first, last)?;
        if line.iter().any(|cell| self.occupant(*cell) != Some(side.marble)) {
            return Err(IllegalMove::NotOwnMarble);
        }

        match axis {
            Some(axis) if !axis.is_parallel(request.direction) => {
                self.resolve_side_step(&line, request.direction)
            }
            _ => self.resolve_in_line(side, &line, request.direction),
        }
    }

    fn resolve_in_line(
        &self,
        side: Side,
        line: &[Cell],
        direction: Direction,
    ) -> Result<ResolvedMove, IllegalMove> {
        // The leader is the one marble whose next cell is not part of the line
        let leader = line
            .iter()
            .copied()
            .find(|cell| {
                cell.neighbor(direction)
                    .map_or(true, |next| !line.contains(&next))
            })
            .ok_or(IllegalMove::NotContiguous)?;

        let mut pushed = Vec::new();
        let mut eliminated = None;
        let mut cursor = leader.neighbor(direction);
        loop {
            let Some(cell) = cursor else {
                // Off the edge: only an opposing marble may go there
                match pushed.last() {
                    Some(&last) => {
                        let marble = self.occupant(last).ok_or(IllegalMove::BlockedDestination)?;
                        eliminated = Some((last, marble));
                        break;
                    }
                    None => return Err(IllegalMove::BlockedDestination),
                }
            };

            match self.occupant(cell) {
                None => break,
                Some(marble) if side.is_friendly(marble) => {
                    return Err(IllegalMove::BlockedDestination)
                }
                Some(_) => {
                    pushed.push(cell);
                    if pushed.len() >= line.len() {
                        return Err(IllegalMove::OutnumberedPush);
                    }
                    cursor = cell.neighbor(direction);
                }
            }
        }

        let mut shifts = Vec::with_capacity(line.len() + pushed.len());
        for cell in line.iter().chain(pushed.iter()) {
            if let Some(to) = cell.neighbor(direction) {
                shifts.push((*cell, to));
            }
        }

        let kind = if line.len() == 1 {
            MoveKind::Single
        } else {
            MoveKind::InLine
        };

        Ok(ResolvedMove {
            kind,
            shifts,
            eliminated,
            pushed: pushed.len(),
        })
    }

    fn resolve_side_step(
        &self,
        line: &[Cell],
        direction: Direction,
    ) -> Result<ResolvedMove, IllegalMove> {
        let mut shifts = Vec::with_capacity(line.len());
        for cell in line {
            match cell.neighbor(direction) {
                Some(to) if self.is_empty(to) => shifts.push((*cell, to)),
                _ => return Err(IllegalMove::BlockedDestination),
            }
        }

        Ok(ResolvedMove {
            kind: MoveKind::SideStep,
            shifts,
            eliminated: None,
            pushed: 0,
        })
    }

    /// Writes a resolved move, returning the color of an eliminated marble
    pub fn apply(&mut self, resolved: &ResolvedMove) -> Option<Marble> {
        let moving: Vec<(Cell, Option<Marble>)> = resolved
            .shifts
            .iter()
            .map(|(from, to)| (*to, self.occupant(*from)))
            .collect();

        if let Some((cell, marble)) = resolved.eliminated {
            self.record_elimination(cell, marble);
        }
        for (from, _) in &resolved.shifts {
            self.set_occupant(*from, None);
        }
        for (to, marble) in moving {
            self.set_occupant(to, marble);
        }

        resolved.eliminated.map(|(_, marble)| marble)
    }

    /// Validates and applies a move in one step
    pub fn make_move(
        &mut self,
        side: Side,
        request: &MoveRequest,
    ) -> Result<MoveOutcome, IllegalMove> {
        let resolved = self.resolve_move(side, request)?;
        let eliminated = self.apply(&resolved);

        Ok(MoveOutcome {
            kind: resolved.kind,
            pushed: resolved.pushed,
            eliminated,
        })
    }

    /// Every legal move for `side`, each line listed once
    pub fn legal_moves(&self, side: Side) -> Vec<MoveRequest> {
        // Lines are enumerated along three axes only so that a line and its
        // reverse are not both produced
        const AXES: [Direction; 3] = [Direction::TopLeft, Direction::TopRight, Direction::Right];

        let mut moves = Vec::new();
        for first in self.cells_of(side.marble) {
            let mut selections = vec![first];
            for axis in AXES {
                for steps in 1..MAX_LINE {
                    if let Some(last) = first.step(axis, steps) {
                        selections.push(last);
                    }
                }
            }

            for last in selections {
                for direction in Direction::ALL {
                    let request = MoveRequest::new(first.coord(), last.coord(), direction);
                    if self.resolve_move(side, &request).is_ok() {
                        moves.push(request);
                    }
                }
            }
        }
        moves
    }
}

/// Cells from `first` to `last` inclusive, with the axis they lie on
fn selection_line(first: Cell, last: Cell) -> Result<(Vec<Cell>, Option<Direction>), IllegalMove> {
    if first == last {
        return Ok((vec![first], None));
    }

    for axis in Direction::ALL {
        let mut line = vec![first];
        let mut cursor = first;
        for _ in 1..MAX_LINE {
            let Some(next) = cursor.neighbor(axis) else {
                break;
            };
            line.push(next);
            if next == last {
                return Ok((line, Some(axis)));
            }
            cursor = next;
        }
    }

    Err(IllegalMove::NotContiguous)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(name: &str) -> Cell {
        Cell::from_coord(name.parse().unwrap()).unwrap()
    }

    fn place(board: &mut Board, marble: Marble, names: &[&str]) {
        for name in names {
            board.set_occupant(cell(name), Some(marble));
        }
    }

    fn request(text: &str) -> MoveRequest {
        text.parse().unwrap()
    }

    const BLACK: Side = Side {
        marble: Marble::Black,
        ally: None,
    };

    #[test]
    fn test_single_marble_advance() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E5"]);

        let outcome = board.make_move(BLACK, &request("E5 RIGHT")).unwrap();
        assert_eq!(outcome.kind, MoveKind::Single);
        assert!(board.is_empty(cell("E5")));
        assert_eq!(board.occupant(cell("E6")), Some(Marble::Black));
    }

    #[test]
    fn test_in_line_move_of_three() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E3", "E4", "E5"]);

        let outcome = board.make_move(BLACK, &request("E3 E5 RIGHT")).unwrap();
        assert_eq!(outcome.kind, MoveKind::InLine);
        assert_eq!(board.cells_of(Marble::Black).count(), 3);
        assert!(board.is_empty(cell("E3")));
        assert_eq!(board.occupant(cell("E6")), Some(Marble::Black));
    }

    #[test]
    fn test_in_line_move_backwards_along_axis() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E3", "E4", "E5"]);

        board.make_move(BLACK, &request("E3 E5 LEFT")).unwrap();
        assert_eq!(board.occupant(cell("E2")), Some(Marble::Black));
        assert!(board.is_empty(cell("E5")));
    }

    #[test]
    fn test_three_push_two() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E2", "E3", "E4"]);
        place(&mut board, Marble::White, &["E5", "E6"]);

        let outcome = board.make_move(BLACK, &request("E2 E4 RIGHT")).unwrap();
        assert_eq!(outcome.pushed, 2);
        assert_eq!(outcome.eliminated, None);
        assert_eq!(board.occupant(cell("E5")), Some(Marble::Black));
        assert_eq!(board.occupant(cell("E6")), Some(Marble::White));
        assert_eq!(board.occupant(cell("E7")), Some(Marble::White));
        assert!(board.is_empty(cell("E2")));
    }

    #[test]
    fn test_two_push_one() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["C3", "D3"]);
        place(&mut board, Marble::White, &["E3"]);

        let outcome = board.make_move(BLACK, &request("C3 D3 TOP_LEFT")).unwrap();
        assert_eq!(outcome.pushed, 1);
        assert_eq!(board.occupant(cell("F3")), Some(Marble::White));
    }

    #[test]
    fn test_two_cannot_push_two_or_three() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E3", "E4"]);
        place(&mut board, Marble::White, &["E5", "E6"]);
        let before = board.clone();

        assert_eq!(
            board.make_move(BLACK, &request("E3 E4 RIGHT")),
            Err(IllegalMove::OutnumberedPush)
        );
        assert_eq!(board, before);

        place(&mut board, Marble::White, &["E7"]);
        assert_eq!(
            board.resolve_move(BLACK, &request("E3 E4 RIGHT")),
            Err(IllegalMove::OutnumberedPush)
        );
    }

    #[test]
    fn test_single_marble_cannot_push() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E4"]);
        place(&mut board, Marble::White, &["E5"]);

        assert_eq!(
            board.resolve_move(BLACK, &request("E4 RIGHT")),
            Err(IllegalMove::OutnumberedPush)
        );
    }

    #[test]
    fn test_push_off_the_edge_eliminates() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E6", "E7", "E8"]);
        place(&mut board, Marble::White, &["E9"]);

        let outcome = board.make_move(BLACK, &request("E6 E8 RIGHT")).unwrap();
        assert_eq!(outcome.eliminated, Some(Marble::White));
        assert_eq!(board.eliminated(Marble::White), 1);
        assert_eq!(board.eliminated(Marble::Black), 0);
        assert_eq!(board.marbles(Marble::White), 0);
        assert_eq!(board.occupant(cell("E9")), Some(Marble::Black));
    }

    #[test]
    fn test_push_blocked_by_own_marble_behind() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E2", "E3", "E4", "E6"]);
        place(&mut board, Marble::White, &["E5"]);

        assert_eq!(
            board.resolve_move(BLACK, &request("E2 E4 RIGHT")),
            Err(IllegalMove::BlockedDestination)
        );
    }

    #[test]
    fn test_cannot_push_own_marble_off_board() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E8", "E9"]);

        assert_eq!(
            board.resolve_move(BLACK, &request("E8 E9 RIGHT")),
            Err(IllegalMove::BlockedDestination)
        );
    }

    #[test]
    fn test_cannot_walk_into_own_marble() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E4", "E5"]);

        assert_eq!(
            board.resolve_move(BLACK, &request("E4 RIGHT")),
            Err(IllegalMove::BlockedDestination)
        );
    }

    #[test]
    fn test_side_step() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E3", "E4", "E5"]);

        let outcome = board.make_move(BLACK, &request("E3 E5 TOP_RIGHT")).unwrap();
        assert_eq!(outcome.kind, MoveKind::SideStep);
        for name in ["F4", "F5", "F6"] {
            assert_eq!(board.occupant(cell(name)), Some(Marble::Black), "{}", name);
        }
        assert_eq!(board.marbles(Marble::Black), 3);
    }

    #[test]
    fn test_side_step_blocked_by_either_color() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E3", "E4", "E5"]);
        place(&mut board, Marble::White, &["F6"]);
        let before = board.clone();

        assert_eq!(
            board.make_move(BLACK, &request("E3 E5 TOP_RIGHT")),
            Err(IllegalMove::BlockedDestination)
        );
        assert_eq!(board, before);

        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E3", "E4", "E5", "D4"]);
        assert_eq!(
            board.resolve_move(BLACK, &request("E3 E5 BOTTOM_RIGHT")),
            Err(IllegalMove::BlockedDestination)
        );
    }

    #[test]
    fn test_side_step_off_board_is_blocked() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["A1", "A2"]);

        assert_eq!(
            board.resolve_move(BLACK, &request("A1 A2 BOTTOM_LEFT")),
            Err(IllegalMove::BlockedDestination)
        );
    }

    #[test]
    fn test_selection_must_be_own_marbles() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E3", "E5"]);
        place(&mut board, Marble::White, &["E4"]);

        assert_eq!(
            board.resolve_move(BLACK, &request("E3 E5 RIGHT")),
            Err(IllegalMove::NotOwnMarble)
        );
        assert_eq!(
            board.resolve_move(BLACK, &request("E4 RIGHT")),
            Err(IllegalMove::NotOwnMarble)
        );
        assert_eq!(
            board.resolve_move(BLACK, &request("E6 RIGHT")),
            Err(IllegalMove::NotOwnMarble)
        );
    }

    #[test]
    fn test_selection_must_be_a_short_straight_line() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E1", "E2", "E3", "E4", "F6"]);

        assert_eq!(
            board.resolve_move(BLACK, &request("E1 E4 RIGHT")),
            Err(IllegalMove::NotContiguous)
        );
        assert_eq!(
            board.resolve_move(BLACK, &request("E4 F6 RIGHT")),
            Err(IllegalMove::NotContiguous)
        );
    }

    #[test]
    fn test_off_board_selection() {
        let board = Board::with_players(2).unwrap();

        assert_eq!(
            board.resolve_move(BLACK, &request("A6 A5 LEFT")),
            Err(IllegalMove::OffBoardSelection)
        );
        assert_eq!(
            board.resolve_move(BLACK, &request("J1 RIGHT")),
            Err(IllegalMove::OffBoardSelection)
        );
    }

    #[test]
    fn test_teammate_marbles_cannot_be_pushed() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E2", "E3", "E4"]);
        place(&mut board, Marble::Blue, &["E5"]);
        let team = Side {
            marble: Marble::Black,
            ally: Some(Marble::Blue),
        };

        assert_eq!(
            board.resolve_move(team, &request("E2 E4 RIGHT")),
            Err(IllegalMove::BlockedDestination)
        );
        assert!(board.resolve_move(BLACK, &request("E2 E4 RIGHT")).is_ok());
    }

    #[test]
    fn test_mixed_opponents_form_one_block() {
        let mut board = Board::new();
        place(&mut board, Marble::Black, &["E2", "E3", "E4"]);
        place(&mut board, Marble::White, &["E5"]);
        place(&mut board, Marble::Blue, &["E6"]);

        let outcome = board.make_move(BLACK, &request("E2 E4 RIGHT")).unwrap();
        assert_eq!(outcome.pushed, 2);
        assert_eq!(board.occupant(cell("E7")), Some(Marble::Blue));
    }

    #[test]
    fn test_legal_moves_are_all_valid() {
        let board = Board::with_players(2).unwrap();
        let moves = board.legal_moves(BLACK);

        assert!(!moves.is_empty());
        for mv in &moves {
            assert!(board.resolve_move(BLACK, mv).is_ok(), "{}", mv);
        }
        assert!(Board::new().legal_moves(BLACK).is_empty());
    }

    #[test]
    fn test_move_request_parsing() {
        let parsed: MoveRequest = "c3;c5;1".parse().unwrap();
        assert_eq!(
            parsed,
            MoveRequest::new(Coord::new('C', 3), Coord::new('C', 5), Direction::TopRight)
        );
        assert_eq!(
            "E5 left".parse::<MoveRequest>().unwrap(),
            MoveRequest::single(Coord::new('E', 5), Direction::Left)
        );
        assert!("E5".parse::<MoveRequest>().is_err());
        assert!("E5 E6 E7 LEFT".parse::<MoveRequest>().is_err());
        assert!("E5 E6 UP".parse::<MoveRequest>().is_err());
    }
}
