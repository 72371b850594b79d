//! # Abalone Match Server Library
//!
//! This library hosts networked Abalone matches for two to four players. The
//! server is authoritative: clients send move requests, the server validates
//! and applies them with the shared rules, and every applied move is broadcast
//! to all players of the match.
//!
//! ## Core Responsibilities
//!
//! ### Match Authority
//! Each match owns one [`shared::Game`] behind a mutex. A move is validated and
//! applied in a single critical section, so two players can never interleave
//! half-applied moves, and the board only changes when the whole move is legal.
//!
//! ### Client Management
//! Handles the lifecycle of client connections:
//! - Connection establishment and capacity limits
//! - Unique player names and the waiting room
//! - Seating the first N waiting clients, in join order, into a new match
//! - Disconnection handling, which forfeits the client's match
//!
//! ### Turn Sequencing
//! Every applied move sends exactly one signal to the match's turn loop, which
//! passes the turn on, checks for a winner or a draw, and broadcasts the new
//! board. A forfeit wakes the same loop so it never waits forever.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Connected clients, their names, outgoing queues and match seats.
//!
//! ### Session Module (`session`)
//! [`session::MatchHandle`] and the per-match turn loop.
//!
//! ### Network Module (`network`)
//! TCP listener, per-client reader and writer tasks, and the main event loop.
//! Packets are length-prefixed bincode frames (see [`shared::codec`]).
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Two-player matches, at most 32 connected clients
//!     let mut server = Server::bind("127.0.0.1:8080", 2, 32).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod network;
pub mod session;
