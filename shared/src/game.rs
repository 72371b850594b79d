//! Turn sequencing and terminal-state detection for one match

use crate::board::Board;
use crate::error::GameError;
use crate::player::{Marble, Player, PlayerKind};
use crate::rules::{MoveOutcome, MoveRequest, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marbles a color (or, with four players, a team) may lose before the match ends
pub const WIN_THRESHOLD: u8 = 6;
/// Turns after which a match without a winner is drawn
pub const MAX_TURNS: u32 = 96;

/// How a finished match ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner { name: String },
    TeamWinners { first: String, second: String },
    Draw,
    Forfeit { forfeited: String, winners: Vec<String> },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner { name } => write!(f, "{} won!", name),
            Outcome::TeamWinners { first, second } => {
                write!(f, "Team {} & {} won!", first, second)
            }
            Outcome::Draw => write!(f, "{} turns have passed. It's a draw!", MAX_TURNS),
            Outcome::Forfeit { forfeited, winners } => {
                write!(f, "{} forfeited. {} won!", forfeited, winners.join(" & "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// The current player may submit a move
    WaitingForMove,
    /// A move was applied and the turn has not advanced yet
    MoveApplied,
    Terminal(Outcome),
}

/// Board, seats and turn state of one match
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    players: Vec<Player>,
    current: usize,
    turn_count: u32,
    phase: Phase,
    last_mover: Option<usize>,
    /// Seats that left the match; they are skipped in the rotation
    forfeited: Vec<bool>,
}

impl Game {
    /// Starts a match with the standard layout for the number of players
    pub fn new(players: Vec<Player>) -> Result<Self, GameError> {
        validate_players(&players)?;
        let board = Board::with_players(players.len())?;
        Ok(Self::from_parts(players, board))
    }

    /// Seats named players of one kind in order, handing out the standard colors
    pub fn seat<I, S>(names: I, kind: PlayerKind) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Game::seat_players(names.into_iter().map(|name| (name, kind)))
    }

    /// Seats `(name, kind)` pairs in order, handing out the standard colors
    pub fn seat_players<I, S>(seats: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = (S, PlayerKind)>,
        S: Into<String>,
    {
        let seats: Vec<(String, PlayerKind)> = seats
            .into_iter()
            .map(|(name, kind)| (name.into(), kind))
            .collect();
        let colors = Marble::seating(seats.len())?;
        let players = seats
            .into_iter()
            .zip(colors.iter())
            .map(|((name, kind), marble)| Player::new(name, *marble, kind))
            .collect();
        Game::new(players)
    }

    /// Starts a match from an arbitrary position
    pub fn with_board(players: Vec<Player>, board: Board) -> Result<Self, GameError> {
        validate_players(&players)?;
        Ok(Self::from_parts(players, board))
    }

    fn from_parts(players: Vec<Player>, board: Board) -> Self {
        let forfeited = vec![false; players.len()];
        Self {
            board,
            players,
            current: 0,
            turn_count: 0,
            phase: Phase::WaitingForMove,
            last_mover: None,
            forfeited,
        }
    }

    /// Puts the marbles back and hands the first turn to seat 0
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.board.reset(self.players.len())?;
        self.current = 0;
        self.turn_count = 0;
        self.phase = Phase::WaitingForMove;
        self.last_mover = None;
        self.forfeited.fill(false);
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    pub fn result(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn player_index(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    pub fn is_forfeited(&self, index: usize) -> bool {
        self.forfeited.get(index).copied().unwrap_or(false)
    }

    /// Players still taking turns, in seat order
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .zip(self.forfeited.iter())
            .filter(|(_, gone)| !**gone)
            .map(|(player, _)| player)
    }

    /// Seat sharing a team with `index`; only four-player games have teams
    pub fn teammate(&self, index: usize) -> Option<usize> {
        (self.players.len() == 4).then_some((index + 2) % 4)
    }

    /// Colors the player at `index` moves and protects
    pub fn side(&self, index: usize) -> Side {
        Side {
            marble: self.players[index].marble,
            ally: self.teammate(index).map(|mate| self.players[mate].marble),
        }
    }

    /// Validates and applies a move for `player`.
    ///
    /// Fails without changing anything when the match is over, when it is not
    /// `player`'s turn, or when the move is illegal.
    pub fn apply_move(
        &mut self,
        player: &str,
        request: &MoveRequest,
    ) -> Result<MoveOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::MatchOver);
        }

        let index = self
            .player_index(player)
            .filter(|index| {
                *index == self.current
                    && self.phase == Phase::WaitingForMove
                    && !self.forfeited[*index]
            })
            .ok_or_else(|| GameError::OutOfTurn {
                player: player.to_string(),
            })?;

        let side = self.side(index);
        let outcome = self.board.make_move(side, request)?;
        self.last_mover = Some(index);
        self.phase = Phase::MoveApplied;
        Ok(outcome)
    }

    /// Passes the turn to the next seat still in the match and counts the turn
    pub fn advance_turn(&mut self) -> usize {
        if !self.is_over() {
            self.current = self.next_active(self.current);
            self.turn_count += 1;
            self.phase = Phase::WaitingForMove;
        }
        self.current
    }

    fn next_active(&self, from: usize) -> usize {
        let n = self.players.len();
        (1..=n)
            .map(|step| (from + step) % n)
            .find(|index| !self.forfeited[*index])
            .unwrap_or(from)
    }

    /// Moves to the terminal phase if a side has lost enough marbles or the
    /// turn limit is reached. Returns whether the match is over.
    ///
    /// A current player left without a legal move forfeits, which either
    /// passes the turn on or ends the match.
    pub fn check_game_over(&mut self) -> bool {
        if self.is_over() {
            return true;
        }

        let outcome = self.winner().or_else(|| {
            (self.turn_count >= MAX_TURNS).then_some(Outcome::Draw)
        });
        if let Some(outcome) = outcome {
            self.phase = Phase::Terminal(outcome);
            return true;
        }

        while !self.is_over()
            && self.phase == Phase::WaitingForMove
            && self.board.legal_moves(self.side(self.current)).is_empty()
        {
            self.drop_seat(self.current);
        }
        self.is_over()
    }

    fn winner(&self) -> Option<Outcome> {
        let n = self.players.len();

        if n == 4 {
            for team in 0..2 {
                let lost = self.board.eliminated(self.players[team].marble)
                    + self.board.eliminated(self.players[team + 2].marble);
                if lost >= WIN_THRESHOLD {
                    return Some(Outcome::TeamWinners {
                        first: self.players[1 - team].name.clone(),
                        second: self.players[3 - team].name.clone(),
                    });
                }
            }
            return None;
        }

        let loser = self
            .players
            .iter()
            .position(|p| self.board.eliminated(p.marble) >= WIN_THRESHOLD)?;
        let winner = self
            .last_mover
            .filter(|mover| *mover != loser)
            .unwrap_or((loser + 1) % n);

        Some(Outcome::Winner {
            name: self.players[winner].name.clone(),
        })
    }

    /// Takes `player` out of the rotation.
    ///
    /// The match ends once a single player, or with four players a single
    /// team, is left; the outcome is returned then. Otherwise play goes on
    /// and the turn passes on if it was `player`'s.
    pub fn forfeit(&mut self, player: &str) -> Result<Option<Outcome>, GameError> {
        if self.is_over() {
            return Err(GameError::MatchOver);
        }
        let index = self
            .player_index(player)
            .ok_or_else(|| GameError::Configuration(format!("{} is not in this game", player)))?;
        if self.forfeited[index] {
            return Err(GameError::Configuration(format!(
                "{} already forfeited",
                player
            )));
        }

        Ok(self.drop_seat(index))
    }

    fn drop_seat(&mut self, index: usize) -> Option<Outcome> {
        self.forfeited[index] = true;

        match self.forfeit_outcome(index) {
            Some(outcome) => {
                self.phase = Phase::Terminal(outcome.clone());
                Some(outcome)
            }
            None => {
                if self.current == index && self.phase == Phase::WaitingForMove {
                    self.current = self.next_active(index);
                }
                None
            }
        }
    }

    fn forfeit_outcome(&self, index: usize) -> Option<Outcome> {
        let winners: Vec<String> = match self.teammate(index) {
            Some(mate) => {
                if !self.forfeited[mate] {
                    return None;
                }
                let team = index % 2;
                vec![
                    self.players[1 - team].name.clone(),
                    self.players[3 - team].name.clone(),
                ]
            }
            None => {
                let remaining: Vec<String> =
                    self.active_players().map(|p| p.name.clone()).collect();
                if remaining.len() > 1 {
                    return None;
                }
                remaining
            }
        };

        Some(Outcome::Forfeit {
            forfeited: self.players[index].name.clone(),
            winners,
        })
    }
}

fn validate_players(players: &[Player]) -> Result<(), GameError> {
    let allowed = Marble::seating(players.len())?;

    for (i, player) in players.iter().enumerate() {
        if player.name.trim().is_empty() {
            return Err(GameError::Configuration("player names must not be empty".into()));
        }
        if !allowed.contains(&player.marble) {
            return Err(GameError::Configuration(format!(
                "{} is not used in a {} player game",
                player.marble,
                players.len()
            )));
        }
        if players[..i].iter().any(|p| p.marble == player.marble) {
            return Err(GameError::Configuration(format!(
                "{} is assigned twice",
                player.marble
            )));
        }
        if players[..i].iter().any(|p| p.name == player.name) {
            return Err(GameError::Configuration(format!(
                "player name {} is taken",
                player.name
            )));
        }
    }
    Ok(())
}
