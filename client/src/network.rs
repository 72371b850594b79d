use crate::game::ClientGameState;
use crate::input::{parse_command, Command, Controller, HELP};
use crate::rendering::{render_board, render_players, render_status};
use log::{debug, error, info, warn};
use shared::codec::{read_packet, write_packet};
use shared::{MoveRequest, Packet, PROTOCOL_VERSION};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

pub struct Client {
    reader: Option<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    game_state: ClientGameState,
    controller: Controller,
    connected: bool,
}

impl Client {
    pub async fn connect(
        server_addr: &str,
        name: &str,
        controller: Controller,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = TcpStream::connect(server_addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        info!("Connected to {}", server_addr);

        Ok(Client {
            reader: Some(reader),
            writer,
            game_state: ClientGameState::new(name),
            controller,
            connected: false,
        })
    }

    async fn send_packet(&mut self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        write_packet(&mut self.writer, packet).await?;
        Ok(())
    }

    async fn send_move(&mut self, request: MoveRequest) -> Result<(), Box<dyn std::error::Error>> {
        if let Err(e) = self.game_state.check_move(&request) {
            println!("Not sent: {}", e);
            return Ok(());
        }
        debug!("Sending move {}", request);
        self.send_packet(&Packet::Move { request }).await
    }

    /// Lets the computer move if it is our turn
    async fn play_if_due(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.game_state.is_my_turn() {
            return Ok(());
        }

        let proposal = match self.game_state.view() {
            Some(view) => self.controller.propose_move(&view),
            None => None,
        };
        match proposal {
            Some(request) => {
                println!("{} plays {}", self.game_state.name, request);
                self.send_move(request).await?;
            }
            None if self.controller.is_computer() => {
                warn!("No legal move available, forfeiting");
                self.send_packet(&Packet::Forfeit).await?;
            }
            None => println!("Your move:"),
        }
        Ok(())
    }

    /// Applies a server packet. Returns false once the session is over.
    async fn handle_packet(&mut self, packet: Packet) -> Result<bool, Box<dyn std::error::Error>> {
        match packet {
            Packet::Connected { client_id } => {
                info!("Connected! Client ID: {}", client_id);
                self.game_state.client_id = Some(client_id);
                self.connected = true;
                println!("Waiting for other players...");
            }

            Packet::GameStarted {
                match_id,
                players,
                board,
                current_player,
            } => {
                self.game_state
                    .apply_started(match_id, players, &board, current_player);
                println!("Match {} started", match_id);
                println!("{}", render_board(&self.game_state.board));
                print!("{}", render_status(&self.game_state));
                self.play_if_due().await?;
            }

            Packet::MoveApplied {
                player,
                request,
                eliminated,
                board,
                current_player,
                turn,
            } => {
                self.game_state.apply_update(&board, current_player, turn);
                match eliminated {
                    Some(marble) => println!(
                        "{} played {} and pushed off a {} marble",
                        player, request, marble
                    ),
                    None => println!("{} played {}", player, request),
                }
                println!("{}", render_board(&self.game_state.board));
                print!("{}", render_status(&self.game_state));
                self.play_if_due().await?;
            }

            Packet::MoveRejected { error } => {
                println!("Move rejected: {}", error);
                if self.controller.is_computer() {
                    self.play_if_due().await?;
                }
            }

            Packet::PlayerForfeited {
                player,
                current_player,
                turn,
            } => {
                println!("{} left the match", player);
                self.game_state
                    .apply_forfeit(player, current_player, turn);
                print!("{}", render_status(&self.game_state));
                self.play_if_due().await?;
            }

            Packet::GameOver { outcome } => {
                println!("{}", outcome);
                self.game_state.apply_game_over(outcome);
                println!("Back in the waiting room for the next match");
            }

            Packet::ChatMessage {
                from,
                text,
                private,
            } => {
                if private {
                    println!("[{} -> you] {}", from, text);
                } else {
                    println!("[{}] {}", from, text);
                }
            }

            Packet::ChatRejected { reason } => println!("Message not sent: {}", reason),

            Packet::PlayerList { players } => {
                print!("{}", render_players(&players, &self.game_state.name));
            }

            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.connected = false;
                return Ok(false);
            }

            _ => warn!("Unexpected packet type"),
        }
        Ok(true)
    }

    /// Handles one terminal line. Returns false when the user quits.
    async fn handle_line(&mut self, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
        if line.trim().is_empty() {
            return Ok(true);
        }

        match parse_command(line) {
            Ok(Command::Move(request)) => self.send_move(request).await?,
            Ok(Command::Forfeit) => self.send_packet(&Packet::Forfeit).await?,
            Ok(Command::Say(text)) => {
                self.send_packet(&Packet::Chat { to: None, text }).await?
            }
            Ok(Command::Tell { to, text }) => {
                self.send_packet(&Packet::Chat { to: Some(to), text })
                    .await?
            }
            Ok(Command::Players) => self.send_packet(&Packet::ListPlayers).await?,
            Ok(Command::Board) => {
                println!("{}", render_board(&self.game_state.board));
                print!("{}", render_status(&self.game_state));
            }
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Quit) => return Ok(false),
            Err(e) => println!("{} (type `help` for the syntax)", e),
        }
        Ok(true)
    }

    /// Spawns task that reads packets off the socket, so frames are never cut
    /// short when the main loop wakes up for terminal input
    fn spawn_network_receiver(&mut self) -> mpsc::UnboundedReceiver<Packet> {
        let (packet_tx, packet_rx) = mpsc::unbounded_channel();
        let Some(mut reader) = self.reader.take() else {
            return packet_rx;
        };

        tokio::spawn(async move {
            loop {
                match read_packet(&mut reader).await {
                    Ok(Some(packet)) => {
                        if packet_tx.send(packet).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Server closed the connection");
                        break;
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        break;
                    }
                }
            }
        });

        packet_rx
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut packet_rx = self.spawn_network_receiver();
        let hello = Packet::Connect {
            name: self.game_state.name.clone(),
            client_version: PROTOCOL_VERSION,
            kind: self.controller.kind(),
        };
        self.send_packet(&hello).await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                packet = packet_rx.recv() => {
                    match packet {
                        Some(packet) => {
                            if !self.handle_packet(packet).await? {
                                break;
                            }
                        }
                        None => {
                            self.connected = false;
                            break;
                        }
                    }
                },

                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            if !self.handle_line(&line).await? {
                                break;
                            }
                        }
                        Ok(None) => {
                            stdin_open = false;
                            // A computer player keeps going without a terminal
                            if !self.controller.is_computer() {
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Error reading input: {}", e);
                            stdin_open = false;
                        }
                    }
                },
            }
        }

        if self.connected {
            if let Err(e) = self.send_packet(&Packet::Disconnect).await {
                debug!("Failed to say goodbye: {}", e);
            }
        }

        Ok(())
    }
}
