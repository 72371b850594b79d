//! # Abalone Text Client Library
//!
//! A terminal client for the Abalone match server. It joins the waiting room
//! under a chosen name, mirrors the match from server updates and draws the
//! board as text after every move. After a match it stays connected and is
//! queued for the next one.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The local mirror of the match: players, board, whose turn it is and the
//! outcome. Moves are checked against the mirror with the shared rules before
//! they are sent, so typos never cost a round trip.
//!
//! ### Input Module (`input`)
//! Parses terminal commands (`C3 C5 TOP_LEFT`, `say hi`, `forfeit`, ...) and
//! defines [`input::Controller`], which decides whether a person or the random
//! strategy plays this seat.
//!
//! ### Network Module (`network`)
//! TCP connection to the server, a receiver task for incoming frames and the
//! main loop multiplexing server packets with terminal input.
//!
//! ### Rendering Module (`rendering`)
//! Text drawing of the hexagonal board, a status summary and the player list.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::input::Controller;
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("127.0.0.1:8080", "alice", Controller::Human).await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
