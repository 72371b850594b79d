//! Server network layer: TCP connections, the waiting room, lobby chat and
//! match start-up

use crate::client_manager::{ClientManager, Seat};
use crate::session::MatchHandle;
use log::{debug, error, info, warn};
use shared::codec::{read_packet, write_packet};
use shared::{Game, GameError, Marble, Packet, MAX_CHAT_LEN, PROTOCOL_VERSION};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};

/// Messages sent from client tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    /// A client picked a name and entered the waiting room
    Joined { client_id: u32 },
    /// A client's connection ended, cleanly or not
    ClientDisconnected { client_id: u32 },
    /// A match ended; `players` are its clients in turn order
    MatchFinished { match_id: u32, players: Vec<u32> },
}

/// Messages sent from match turn loops to the network sender task
#[derive(Debug)]
pub enum GameMessage {
    /// Sent to every client seated in the match
    Broadcast { match_id: u32, packet: Packet },
}

/// Accepts connections, seats waiting clients and starts matches
pub struct Server {
    listener: TcpListener,
    clients: Arc<RwLock<ClientManager>>,
    next_match_id: u32,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    /// Binds to `addr`; matches are started for `players_per_match` (2 to 4) players
    pub async fn bind(
        addr: &str,
        players_per_match: usize,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Marble::seating(players_per_match)?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            "Server listening on {} ({} players per match)",
            listener.local_addr()?,
            players_per_match
        );

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            clients: Arc::new(RwLock::new(ClientManager::new(
                max_clients,
                players_per_match,
            ))),
            next_match_id: 1,
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Spawns task that fans match updates out to the seated clients' queues
    fn spawn_network_sender(&mut self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::Broadcast { match_id, packet } => {
                        let (recipients, finished) = if matches!(packet, Packet::GameOver { .. }) {
                            // Unseat first so nobody can act on a finished match
                            let mut clients = clients.write().await;
                            let recipients = clients.match_senders(match_id);
                            let players = clients.clear_seats(match_id);
                            (recipients, Some(players))
                        } else {
                            (clients.read().await.match_senders(match_id), None)
                        };

                        for (client_id, sender) in recipients {
                            if sender.send(packet.clone()).is_err() {
                                debug!("Client {} writer already closed", client_id);
                            }
                        }

                        if let Some(players) = finished {
                            let message = ServerMessage::MatchFinished { match_id, players };
                            if let Err(e) = server_tx.send(message) {
                                error!("Failed to report end of match {}: {}", match_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Registers a new connection and spawns its reader and writer tasks
    async fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
        }
        let (reader, mut writer) = stream.into_split();
        let (packet_tx, packet_rx) = mpsc::unbounded_channel();

        let client_id = self
            .clients
            .write()
            .await
            .add_client(addr, packet_tx.clone());
        let Some(client_id) = client_id else {
            warn!("Rejecting {}: server full", addr);
            tokio::spawn(async move {
                let packet = Packet::Disconnected {
                    reason: "Server full".to_string(),
                };
                if let Err(e) = write_packet(&mut writer, &packet).await {
                    debug!("Failed to notify {}: {}", addr, e);
                }
            });
            return;
        };

        tokio::spawn(run_client_writer(client_id, writer, packet_rx));
        tokio::spawn(run_client_reader(
            client_id,
            reader,
            packet_tx,
            Arc::clone(&self.clients),
            self.server_tx.clone(),
        ));
    }

    /// Starts a match for every full group in the waiting room
    async fn start_ready_matches(&mut self) {
        loop {
            let Some(group) = self.clients.write().await.take_ready_group() else {
                break;
            };

            let match_id = self.next_match_id;
            self.next_match_id += 1;

            let names: Vec<String> = group.iter().map(|e| e.name.clone()).collect();
            let game = match Game::seat_players(group.iter().map(|e| (e.name.clone(), e.kind))) {
                Ok(game) => game,
                Err(e) => {
                    error!("Failed to set up match {} for {:?}: {}", match_id, names, e);
                    continue;
                }
            };

            let started = Packet::GameStarted {
                match_id,
                players: game.players().to_vec(),
                board: game.board().snapshot(),
                current_player: game.current_player().name.clone(),
            };
            let (handle, _turn_loop) = MatchHandle::start(match_id, game, self.game_tx.clone());

            {
                let mut clients = self.clients.write().await;
                for (index, entrant) in group.into_iter().enumerate() {
                    let seat = Seat {
                        handle: handle.clone(),
                        player: entrant.name,
                        index,
                    };
                    if !clients.seat_client(entrant.client_id, seat) {
                        warn!(
                            "Client {} left before match {} started",
                            entrant.client_id, match_id
                        );
                    }
                }
            }

            info!("Match {} started: {}", match_id, names.join(" vs "));
            self.queue(GameMessage::Broadcast {
                match_id,
                packet: started,
            });
        }
    }

    /// Drops a client; a seated client forfeits its match
    async fn handle_disconnect(&mut self, client_id: u32) {
        let removed = self.clients.write().await.remove_client(&client_id);
        let Some(seat) = removed.and_then(|client| client.seat) else {
            return;
        };

        match seat.handle.forfeit(&seat.player).await {
            Ok(Some(outcome)) => info!("Match {}: {}", seat.handle.id(), outcome),
            Ok(None) => info!(
                "Match {} continues without {}",
                seat.handle.id(),
                seat.player
            ),
            Err(GameError::MatchOver) => {}
            Err(e) => warn!("Failed to forfeit for {}: {}", seat.player, e),
        }
    }

    fn queue(&self, message: GameMessage) {
        if let Err(e) = self.game_tx.send(message) {
            error!("Failed to queue outgoing packet: {}", e);
        }
    }

    /// Main server loop accepting connections and reacting to client events
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_sender();

        info!("Server started successfully");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.handle_connection(stream, addr).await,
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::Joined { client_id }) => {
                            debug!("Client {} is waiting for a match", client_id);
                            self.start_ready_matches().await;
                        },
                        Some(ServerMessage::ClientDisconnected { client_id }) => {
                            self.handle_disconnect(client_id).await;
                        },
                        Some(ServerMessage::MatchFinished { match_id, players }) => {
                            let queued = self.clients.write().await.requeue(&players);
                            debug!("Match {} finished, {} players back in the queue", match_id, queued);
                            self.start_ready_matches().await;
                        },
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },
            }
        }

        Ok(())
    }
}

/// Drains a client's queue onto its socket until the queue closes or a
/// `Disconnected` packet has been written
async fn run_client_writer(
    client_id: u32,
    mut writer: OwnedWriteHalf,
    mut packet_rx: mpsc::UnboundedReceiver<Packet>,
) {
    while let Some(packet) = packet_rx.recv().await {
        let last = matches!(packet, Packet::Disconnected { .. });
        if let Err(e) = write_packet(&mut writer, &packet).await {
            warn!("Failed to write to client {}: {}", client_id, e);
            break;
        }
        if last {
            break;
        }
    }
}

async fn run_client_reader(
    client_id: u32,
    mut reader: OwnedReadHalf,
    outgoing: mpsc::UnboundedSender<Packet>,
    clients: Arc<RwLock<ClientManager>>,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    loop {
        match read_packet(&mut reader).await {
            Ok(Some(packet)) => {
                if !handle_packet(client_id, packet, &outgoing, &clients, &server_tx).await {
                    break;
                }
            }
            Ok(None) => {
                info!("Client {} closed the connection", client_id);
                break;
            }
            Err(e) => {
                warn!("Dropping client {}: {}", client_id, e);
                break;
            }
        }
    }

    if let Err(e) = server_tx.send(ServerMessage::ClientDisconnected { client_id }) {
        error!("Failed to report disconnect of client {}: {}", client_id, e);
    }
}

/// Handles one packet from a client; replies go straight onto its own queue.
/// Returns false when the connection should close.
async fn handle_packet(
    client_id: u32,
    packet: Packet,
    outgoing: &mpsc::UnboundedSender<Packet>,
    clients: &RwLock<ClientManager>,
    server_tx: &mpsc::UnboundedSender<ServerMessage>,
) -> bool {
    let reply = |packet: Packet| {
        if outgoing.send(packet).is_err() {
            debug!("Client {} writer already closed", client_id);
        }
    };

    match packet {
        Packet::Connect {
            name,
            client_version,
            kind,
        } => {
            info!(
                "Client {} connecting as {} (version: {}, {})",
                client_id, name, client_version, kind
            );
            if client_version != PROTOCOL_VERSION {
                reply(Packet::Disconnected {
                    reason: "Protocol version mismatch".to_string(),
                });
                return false;
            }

            let registered = clients.write().await.register_name(client_id, &name, kind);
            match registered {
                Ok(()) => {
                    reply(Packet::Connected { client_id });
                    if let Err(e) = server_tx.send(ServerMessage::Joined { client_id }) {
                        error!("Failed to report join of client {}: {}", client_id, e);
                    }
                    true
                }
                Err(reason) => {
                    warn!("Client {} refused: {}", client_id, reason);
                    reply(Packet::Disconnected { reason });
                    false
                }
            }
        }

        Packet::Move { request } => {
            let seat = clients.read().await.seat_of(client_id);
            let result = match seat {
                Some(seat) => seat.handle.submit_move(&seat.player, &request).await,
                None => Err(GameError::Configuration("no match in progress".to_string())),
            };
            if let Err(error) = result {
                warn!("Client {} move {} rejected: {}", client_id, request, error);
                reply(Packet::MoveRejected { error });
            }
            true
        }

        Packet::Forfeit => {
            let seat = clients.read().await.seat_of(client_id);
            let result = match seat {
                Some(seat) => seat.handle.forfeit(&seat.player).await.map(|_| ()),
                None => Err(GameError::Configuration("no match in progress".to_string())),
            };
            if let Err(error) = result {
                reply(Packet::MoveRejected { error });
            }
            true
        }

        Packet::Chat { to, text } => {
            if let Err(reason) = relay_chat(client_id, to, text, clients).await {
                debug!("Client {} chat refused: {}", client_id, reason);
                reply(Packet::ChatRejected { reason });
            }
            true
        }

        Packet::ListPlayers => {
            let players = clients.read().await.player_list();
            reply(Packet::PlayerList { players });
            true
        }

        Packet::Disconnect => {
            debug!("Client {} said goodbye", client_id);
            false
        }

        _ => {
            warn!("Unexpected packet type from client {}", client_id);
            true
        }
    }
}

/// Delivers a lobby message to every other named client, or a private one to `to`
async fn relay_chat(
    client_id: u32,
    to: Option<String>,
    text: String,
    clients: &RwLock<ClientManager>,
) -> Result<(), String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Message must not be empty".to_string());
    }
    if text.len() > MAX_CHAT_LEN {
        return Err(format!("Message longer than {} bytes", MAX_CHAT_LEN));
    }

    let clients = clients.read().await;
    let from = clients
        .name_of(client_id)
        .ok_or_else(|| "Connect before chatting".to_string())?
        .to_string();

    let recipients = match &to {
        Some(name) => {
            let sender = clients
                .sender_for(name)
                .ok_or_else(|| format!("No player named {}", name))?;
            vec![sender]
        }
        None => clients
            .lobby_senders(client_id)
            .into_iter()
            .map(|(_, sender)| sender)
            .collect(),
    };

    let packet = Packet::ChatMessage {
        from,
        text: text.to_string(),
        private: to.is_some(),
    };
    for sender in recipients {
        if sender.send(packet.clone()).is_err() {
            debug!("Dropping chat for a closed client");
        }
    }
    Ok(())
}
