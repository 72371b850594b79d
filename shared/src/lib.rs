//! Rules and wire types shared by the Abalone server and client
//!
//! Both sides resolve moves with the same code, so a client can check a move
//! locally before sending it and render the board exactly as the server sees it.

pub mod board;
pub mod codec;
pub mod error;
pub mod game;
pub mod hex;
pub mod player;
pub mod rules;
pub mod strategy;

pub use board::{Board, BoardSnapshot};
pub use error::{GameError, IllegalMove, ParseError};
pub use game::{Game, Outcome, Phase, MAX_TURNS, WIN_THRESHOLD};
pub use hex::{Cell, Coord, Direction, CELL_COUNT};
pub use player::{Marble, Player, PlayerKind};
pub use rules::{MoveKind, MoveOutcome, MoveRequest, Side};
pub use strategy::{MatchView, RandomStrategy, Strategy};

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

/// Longest chat line the server relays
pub const MAX_CHAT_LEN: usize = 512;

/// One connected, named client as shown in the player list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub name: String,
    pub kind: PlayerKind,
    /// Match the player is seated in, `None` while waiting
    pub match_id: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        name: String,
        client_version: u32,
        kind: PlayerKind,
    },
    Move {
        request: MoveRequest,
    },
    Forfeit,
    /// Lobby message to everyone, or a private one when `to` is set
    Chat {
        to: Option<String>,
        text: String,
    },
    ListPlayers,
    Disconnect,

    Connected {
        client_id: u32,
    },
    GameStarted {
        match_id: u32,
        players: Vec<Player>,
        board: BoardSnapshot,
        current_player: String,
    },
    MoveApplied {
        player: String,
        request: MoveRequest,
        eliminated: Option<Marble>,
        board: BoardSnapshot,
        current_player: String,
        turn: u32,
    },
    MoveRejected {
        error: GameError,
    },
    /// A player left a match that carries on without them
    PlayerForfeited {
        player: String,
        current_player: String,
        turn: u32,
    },
    GameOver {
        outcome: Outcome,
    },
    ChatMessage {
        from: String,
        text: String,
        private: bool,
    },
    ChatRejected {
        reason: String,
    },
    PlayerList {
        players: Vec<PlayerEntry>,
    },
    Disconnected {
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_serialization_connect() {
        let packet = Packet::Connect {
            name: "alice".to_string(),
            client_version: PROTOCOL_VERSION,
            kind: PlayerKind::Computer,
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Connect {
                name,
                client_version,
                kind,
            } => {
                assert_eq!(name, "alice");
                assert_eq!(client_version, 1);
                assert_eq!(kind, PlayerKind::Computer);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_game_started() {
        let game = Game::seat(["alice", "bob"], PlayerKind::Human).unwrap();
        let packet = Packet::GameStarted {
            match_id: 3,
            players: game.players().to_vec(),
            board: game.board().snapshot(),
            current_player: game.current_player().name.clone(),
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::GameStarted {
                match_id,
                players,
                board,
                current_player,
            } => {
                assert_eq!(match_id, 3);
                assert_eq!(players.len(), 2);
                assert_eq!(players[1].marble, Marble::White);
                assert_eq!(current_player, "alice");
                assert_eq!(Board::try_from(&board).unwrap(), *game.board());
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_rejection_keeps_reason() {
        let packet = Packet::MoveRejected {
            error: GameError::IllegalMove(IllegalMove::OutnumberedPush),
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::MoveRejected { error } => {
                assert_eq!(error, GameError::IllegalMove(IllegalMove::OutnumberedPush))
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_game_over() {
        let packet = Packet::GameOver {
            outcome: Outcome::TeamWinners {
                first: "p2".to_string(),
                second: "p4".to_string(),
            },
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::GameOver { outcome } => assert_eq!(outcome.to_string(), "Team p2 & p4 won!"),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_player_list() {
        let packet = Packet::PlayerList {
            players: vec![
                PlayerEntry {
                    name: "alice".to_string(),
                    kind: PlayerKind::Human,
                    match_id: Some(2),
                },
                PlayerEntry {
                    name: "bot".to_string(),
                    kind: PlayerKind::Computer,
                    match_id: None,
                },
            ],
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::PlayerList { players } => {
                assert_eq!(players.len(), 2);
                assert_eq!(players[0].match_id, Some(2));
                assert_eq!(players[1].kind, PlayerKind::Computer);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }
}
