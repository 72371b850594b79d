//! Move selection for computer-controlled seats

use crate::board::Board;
use crate::hex::Direction;
use crate::rules::{MoveRequest, Side};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random proposals tried before falling back to the first legal move
pub const MAX_RANDOM_ATTEMPTS: usize = 64;

/// What a seat can see when it is asked for a move
#[derive(Debug, Clone, Copy)]
pub struct MatchView<'a> {
    pub board: &'a Board,
    pub side: Side,
}

pub trait Strategy {
    /// Returns `None` only when the side has no legal move at all
    fn propose_move(&mut self, view: &MatchView<'_>) -> Option<MoveRequest>;
}

/// Plays a random legal move
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_request(&mut self, view: &MatchView<'_>) -> Option<MoveRequest> {
        let own: Vec<_> = view.board.cells_of(view.side.marble).collect();
        let first = *own.choose(&mut self.rng)?;
        let axis = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        let length = self.rng.gen_range(0..3);
        let last = first.step(axis, length).unwrap_or(first);
        let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];

        Some(MoveRequest::new(first.coord(), last.coord(), direction))
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomStrategy {
    fn propose_move(&mut self, view: &MatchView<'_>) -> Option<MoveRequest> {
        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let request = self.random_request(view)?;
            if view.board.resolve_move(view.side, &request).is_ok() {
                return Some(request);
            }
        }

        view.board.legal_moves(view.side).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Cell;
    use crate::player::Marble;

    #[test]
    fn test_random_moves_are_legal() {
        let mut strategy = RandomStrategy::seeded(7);
        for players in 2..=4 {
            let board = Board::with_players(players).unwrap();
            let view = MatchView {
                board: &board,
                side: Side::solo(Marble::Black),
            };
            for _ in 0..50 {
                let request = strategy.propose_move(&view).unwrap();
                assert!(board.resolve_move(view.side, &request).is_ok(), "{}", request);
            }
        }
    }

    #[test]
    fn test_random_play_keeps_board_consistent() {
        let mut strategy = RandomStrategy::seeded(42);
        let mut board = Board::with_players(2).unwrap();
        let sides = [Side::solo(Marble::Black), Side::solo(Marble::White)];

        for turn in 0..60 {
            let side = sides[turn % 2];
            let view = MatchView {
                board: &board,
                side,
            };
            let request = strategy.propose_move(&view).unwrap();
            board.make_move(side, &request).unwrap();

            for marble in [Marble::Black, Marble::White] {
                assert_eq!(board.marbles(marble) + board.eliminated(marble) as usize, 14);
            }
        }
    }

    #[test]
    fn test_falls_back_when_random_tries_miss() {
        // One marble with a single legal destination
        let mut board = Board::new();
        let corner = Cell::from_coord("A1".parse().unwrap()).unwrap();
        board.set_occupant(corner, Some(Marble::Black));
        for name in ["B1", "B2"] {
            let cell = Cell::from_coord(name.parse().unwrap()).unwrap();
            board.set_occupant(cell, Some(Marble::White));
        }
        let view = MatchView {
            board: &board,
            side: Side::solo(Marble::Black),
        };

        let mut strategy = RandomStrategy::seeded(1);
        for _ in 0..20 {
            let request = strategy.propose_move(&view).unwrap();
            assert_eq!(request.direction, Direction::Right);
        }
    }

    #[test]
    fn test_no_marbles_no_move() {
        let board = Board::new();
        let view = MatchView {
            board: &board,
            side: Side::solo(Marble::White),
        };
        assert!(RandomStrategy::seeded(3).propose_move(&view).is_none());
    }

    #[test]
    fn test_blocked_side_has_no_move() {
        let mut board = Board::new();
        let corner = Cell::from_coord("A1".parse().unwrap()).unwrap();
        board.set_occupant(corner, Some(Marble::Black));
        for name in ["B1", "B2", "A2"] {
            let cell = Cell::from_coord(name.parse().unwrap()).unwrap();
            board.set_occupant(cell, Some(Marble::White));
        }
        let view = MatchView {
            board: &board,
            side: Side::solo(Marble::Black),
        };
        assert!(RandomStrategy::seeded(9).propose_move(&view).is_none());
    }
}
