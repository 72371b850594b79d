//! Per-match synchronization between client reader tasks and the turn loop
//!
//! Every match owns one [`Game`] behind a single mutex. Reader tasks apply moves
//! through a [`MatchHandle`]; each applied move is announced to the match's turn
//! loop exactly once, and the loop advances the turn, checks for the end of the
//! match and queues the resulting packets for broadcast.

use crate::network::GameMessage;
use log::{debug, error, info};
use shared::{Game, GameError, Marble, MoveOutcome, MoveRequest, Outcome, Packet};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Signals sent from a [`MatchHandle`] to its turn loop
#[derive(Debug)]
pub enum TurnSignal {
    MoveApplied {
        player: String,
        request: MoveRequest,
        eliminated: Option<Marble>,
    },
    Forfeit {
        player: String,
    },
}

/// Shared access to one running match
#[derive(Debug, Clone)]
pub struct MatchHandle {
    id: u32,
    game: Arc<Mutex<Game>>,
    signal_tx: mpsc::UnboundedSender<TurnSignal>,
}

impl MatchHandle {
    /// Spawns the turn loop for `game` and returns a handle to it.
    ///
    /// Update packets are queued on `game_tx` addressed to `id`. The loop ends
    /// once the match is over or every handle has been dropped.
    pub fn start(
        id: u32,
        game: Game,
        game_tx: mpsc::UnboundedSender<GameMessage>,
    ) -> (Self, JoinHandle<()>) {
        let game = Arc::new(Mutex::new(game));
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_turn_loop(id, Arc::clone(&game), signal_rx, game_tx));

        (
            Self {
                id,
                game,
                signal_tx,
            },
            task,
        )
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Applies `request` for `player`. A rejected move leaves the match untouched.
    pub async fn submit_move(
        &self,
        player: &str,
        request: &MoveRequest,
    ) -> Result<MoveOutcome, GameError> {
        let mut state = self.game.lock().await;
        let outcome = state.apply_move(player, request)?;
        debug!(
            "Match {}: {} played {} ({:?})",
            self.id, player, request, outcome.kind
        );

        let signal = TurnSignal::MoveApplied {
            player: player.to_string(),
            request: *request,
            eliminated: outcome.eliminated,
        };
        if self.signal_tx.send(signal).is_err() {
            error!("Turn loop for match {} is gone", self.id);
        }
        Ok(outcome)
    }

    /// Takes `player` out of the match. Returns the outcome if that ended it.
    pub async fn forfeit(&self, player: &str) -> Result<Option<Outcome>, GameError> {
        let mut state = self.game.lock().await;
        let outcome = state.forfeit(player)?;
        info!("Match {}: {} forfeited", self.id, player);

        let signal = TurnSignal::Forfeit {
            player: player.to_string(),
        };
        if self.signal_tx.send(signal).is_err() {
            error!("Turn loop for match {} is gone", self.id);
        }
        Ok(outcome)
    }

    /// A copy of the current match state
    pub async fn game(&self) -> Game {
        self.game.lock().await.clone()
    }
}

async fn run_turn_loop(
    id: u32,
    game: Arc<Mutex<Game>>,
    mut signal_rx: mpsc::UnboundedReceiver<TurnSignal>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
) {
    while let Some(signal) = signal_rx.recv().await {
        let mut packets = Vec::with_capacity(2);
        let finished = {
            let mut state = game.lock().await;

            match signal {
                TurnSignal::MoveApplied {
                    player,
                    request,
                    eliminated,
                } => {
                    state.advance_turn();
                    state.check_game_over();
                    packets.push(Packet::MoveApplied {
                        player,
                        request,
                        eliminated,
                        board: state.board().snapshot(),
                        current_player: state.current_player().name.clone(),
                        turn: state.turn_count(),
                    });
                }
                TurnSignal::Forfeit { player } => {
                    debug!("Match {}: turn loop saw {} forfeit", id, player);
                    if !state.check_game_over() {
                        packets.push(Packet::PlayerForfeited {
                            player,
                            current_player: state.current_player().name.clone(),
                            turn: state.turn_count(),
                        });
                    }
                }
            }

            match state.result() {
                Some(outcome) => {
                    info!("Match {} over: {}", id, outcome);
                    packets.push(Packet::GameOver {
                        outcome: outcome.clone(),
                    });
                    true
                }
                None => false,
            }
        };

        for packet in packets {
            if game_tx
                .send(GameMessage::Broadcast {
                    match_id: id,
                    packet,
                })
                .is_err()
            {
                error!("Failed to queue update for match {}", id);
                return;
            }
        }

        if finished {
            break;
        }
    }

    debug!("Turn loop for match {} stopped", id);
}
