//! Client-side mirror of the match, rebuilt from server updates

use log::{debug, warn};
use shared::{
    Board, BoardSnapshot, GameError, MatchView, MoveRequest, Outcome, Player, Side,
};

/// Everything the client knows about its current match
#[derive(Debug, Clone, Default)]
pub struct ClientGameState {
    pub client_id: Option<u32>,
    pub name: String,
    pub match_id: Option<u32>,
    pub players: Vec<Player>,
    pub board: Board,
    pub current_player: Option<String>,
    pub turn: u32,
    /// Players who left the current match
    pub forfeited: Vec<String>,
    pub outcome: Option<Outcome>,
}

impl ClientGameState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn apply_started(
        &mut self,
        match_id: u32,
        players: Vec<Player>,
        board: &BoardSnapshot,
        current_player: String,
    ) {
        self.match_id = Some(match_id);
        self.players = players;
        self.current_player = Some(current_player);
        self.turn = 0;
        self.forfeited.clear();
        self.outcome = None;
        self.apply_board(board);
    }

    pub fn apply_update(&mut self, board: &BoardSnapshot, current_player: String, turn: u32) {
        self.current_player = Some(current_player);
        self.turn = turn;
        self.apply_board(board);
    }

    /// `player` left; the match goes on with `current_player` to move
    pub fn apply_forfeit(&mut self, player: String, current_player: String, turn: u32) {
        if !self.forfeited.contains(&player) {
            self.forfeited.push(player);
        }
        self.current_player = Some(current_player);
        self.turn = turn;
    }

    pub fn has_forfeited(&self, player: &str) -> bool {
        self.forfeited.iter().any(|name| name == player)
    }

    pub fn apply_game_over(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.current_player = None;
    }

    fn apply_board(&mut self, snapshot: &BoardSnapshot) {
        match Board::try_from(snapshot) {
            Ok(board) => self.board = board,
            Err(e) => warn!("Ignoring malformed board from server: {}", e),
        }
    }

    pub fn in_match(&self) -> bool {
        self.match_id.is_some() && self.outcome.is_none()
    }

    pub fn is_my_turn(&self) -> bool {
        self.in_match() && self.current_player.as_deref() == Some(self.name.as_str())
    }

    /// Colors this client moves, and its teammate's in a four-player match
    pub fn my_side(&self) -> Option<Side> {
        let index = self.players.iter().position(|p| p.name == self.name)?;
        let ally = (self.players.len() == 4).then(|| self.players[(index + 2) % 4].marble);
        Some(Side {
            marble: self.players[index].marble,
            ally,
        })
    }

    pub fn view(&self) -> Option<MatchView<'_>> {
        Some(MatchView {
            board: &self.board,
            side: self.my_side()?,
        })
    }

    /// Checks a move against the local board before it is sent
    pub fn check_move(&self, request: &MoveRequest) -> Result<(), GameError> {
        if !self.is_my_turn() {
            return Err(GameError::OutOfTurn {
                player: self.name.clone(),
            });
        }
        let side = self.my_side().ok_or_else(|| {
            GameError::Configuration(format!("{} is not seated in this match", self.name))
        })?;

        let resolved = self.board.resolve_move(side, request)?;
        debug!("Local check passed for {}: {:?}", request, resolved.kind);
        Ok(())
    }
}
