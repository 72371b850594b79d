//! Connected clients, the waiting room and match seats
//!
//! Clients join anonymously, pick a unique name with `Connect`, and then wait
//! until enough named clients are queued to fill a match. The manager hands
//! out ready groups in join order and remembers which match each client sits in.
//! When a match ends its players go back to the end of the queue.

use crate::session::MatchHandle;
use log::info;
use shared::{Packet, PlayerEntry, PlayerKind};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// A client's place in a running match
#[derive(Debug, Clone)]
pub struct Seat {
    pub handle: MatchHandle,
    /// Name the match knows this client by
    pub player: String,
    /// Position in the match's turn order
    pub index: usize,
}

/// A waiting client picked for a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    pub client_id: u32,
    pub name: String,
    pub kind: PlayerKind,
}

/// A connected client
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    pub addr: SocketAddr,
    /// Set once the client has sent `Connect`
    pub name: Option<String>,
    pub kind: PlayerKind,
    /// Queue drained by the client's writer task
    pub sender: mpsc::UnboundedSender<Packet>,
    pub seat: Option<Seat>,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, sender: mpsc::UnboundedSender<Packet>) -> Self {
        Self {
            id,
            addr,
            name: None,
            kind: PlayerKind::default(),
            sender,
            seat: None,
        }
    }

    pub fn match_id(&self) -> Option<u32> {
        self.seat.as_ref().map(|seat| seat.handle.id())
    }
}

pub struct ClientManager {
    clients: HashMap<u32, Client>,
    /// Named clients waiting for a match, oldest first
    waiting: VecDeque<u32>,
    next_client_id: u32,
    max_clients: usize,
    players_per_match: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize, players_per_match: usize) -> Self {
        Self {
            clients: HashMap::new(),
            waiting: VecDeque::new(),
            next_client_id: 1,
            max_clients,
            players_per_match,
        }
    }

    /// Returns the new client's id, or `None` when the server is full
    pub fn add_client(
        &mut self,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<Packet>,
    ) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, sender));

        Some(client_id)
    }

    /// Removes a client and takes it out of the waiting room
    pub fn remove_client(&mut self, client_id: &u32) -> Option<Client> {
        self.waiting.retain(|id| id != client_id);
        let client = self.clients.remove(client_id)?;
        info!("Client {} disconnected", client.id);
        Some(client)
    }

    /// Names a client and queues it for the next match
    pub fn register_name(
        &mut self,
        client_id: u32,
        name: &str,
        kind: PlayerKind,
    ) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Name must not be empty".to_string());
        }
        if self
            .clients
            .values()
            .any(|c| c.name.as_deref() == Some(name))
        {
            return Err(format!("Name {} is already taken", name));
        }

        let client = self
            .clients
            .get_mut(&client_id)
            .ok_or_else(|| format!("Unknown client {}", client_id))?;
        if client.name.is_some() {
            return Err("Already connected".to_string());
        }

        client.name = Some(name.to_string());
        client.kind = kind;
        self.waiting.push_back(client_id);
        info!("Client {} joined as {} ({})", client_id, name, kind);
        Ok(())
    }

    /// Takes the oldest waiting clients if there are enough to fill a match
    pub fn take_ready_group(&mut self) -> Option<Vec<Entrant>> {
        if self.waiting.len() < self.players_per_match {
            return None;
        }

        let group = self
            .waiting
            .drain(..self.players_per_match)
            .filter_map(|id| {
                let client = self.clients.get(&id)?;
                Some(Entrant {
                    client_id: id,
                    name: client.name.clone()?,
                    kind: client.kind,
                })
            })
            .collect();
        Some(group)
    }

    /// Puts named, unseated clients back at the end of the waiting room.
    /// Returns how many were queued.
    pub fn requeue(&mut self, client_ids: &[u32]) -> usize {
        let mut queued = 0;
        for id in client_ids {
            let Some(client) = self.clients.get(id) else {
                continue;
            };
            if client.name.is_none() || client.seat.is_some() || self.waiting.contains(id) {
                continue;
            }
            self.waiting.push_back(*id);
            queued += 1;
        }
        queued
    }

    pub fn seat_client(&mut self, client_id: u32, seat: Seat) -> bool {
        match self.clients.get_mut(&client_id) {
            Some(client) => {
                client.seat = Some(seat);
                true
            }
            None => false,
        }
    }

    pub fn seat_of(&self, client_id: u32) -> Option<Seat> {
        self.clients.get(&client_id)?.seat.clone()
    }

    /// Unseats everyone in a finished match and returns their ids in turn order
    pub fn clear_seats(&mut self, match_id: u32) -> Vec<u32> {
        let mut seated: Vec<(usize, u32)> = self
            .clients
            .values_mut()
            .filter(|client| client.match_id() == Some(match_id))
            .filter_map(|client| client.seat.take().map(|seat| (seat.index, client.id)))
            .collect();
        seated.sort_unstable();
        seated.into_iter().map(|(_, id)| id).collect()
    }

    /// Outgoing queues of every client seated in `match_id`
    pub fn match_senders(&self, match_id: u32) -> Vec<(u32, mpsc::UnboundedSender<Packet>)> {
        self.clients
            .values()
            .filter(|c| c.match_id() == Some(match_id))
            .map(|c| (c.id, c.sender.clone()))
            .collect()
    }

    pub fn name_of(&self, client_id: u32) -> Option<&str> {
        self.clients.get(&client_id)?.name.as_deref()
    }

    /// Outgoing queue of the client registered as `name`
    pub fn sender_for(&self, name: &str) -> Option<mpsc::UnboundedSender<Packet>> {
        self.clients
            .values()
            .find(|c| c.name.as_deref() == Some(name))
            .map(|c| c.sender.clone())
    }

    /// Outgoing queues of every named client except `client_id`
    pub fn lobby_senders(&self, client_id: u32) -> Vec<(u32, mpsc::UnboundedSender<Packet>)> {
        self.clients
            .values()
            .filter(|c| c.id != client_id && c.name.is_some())
            .map(|c| (c.id, c.sender.clone()))
            .collect()
    }

    /// Named clients, oldest connection first
    pub fn player_list(&self) -> Vec<PlayerEntry> {
        let mut named: Vec<&Client> = self.clients.values().filter(|c| c.name.is_some()).collect();
        named.sort_by_key(|c| c.id);
        named
            .into_iter()
            .filter_map(|c| {
                Some(PlayerEntry {
                    name: c.name.clone()?,
                    kind: c.kind,
                    match_id: c.match_id(),
                })
            })
            .collect()
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
