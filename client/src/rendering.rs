//! Text rendering of the board and match status

use crate::game::ClientGameState;
use shared::{Board, Cell, Coord, Marble, PlayerEntry, PlayerKind, MAX_TURNS};
use std::fmt::Write;

const ROWS: u8 = 9;
const CENTER_ROW: u8 = 4;

/// Draws the hexagonal board, top row (`I`) first
///
/// ```text
///     I W W W W W
///    H W W W W W W
///   G . . W W W . .
/// ```
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();

    for row in (0..ROWS).rev() {
        let letter = (b'A' + row) as char;
        let indent = row.abs_diff(CENTER_ROW) as usize;
        let first = row.saturating_sub(CENTER_ROW);
        let last = (row + CENTER_ROW).min(ROWS - 1);

        out.push_str(&" ".repeat(indent));
        out.push(letter);
        for diagonal in first..=last {
            let symbol = Cell::from_coord(Coord::new(letter, diagonal + 1))
                .and_then(|cell| board.occupant(cell))
                .map_or('.', Marble::symbol);
            out.push(' ');
            out.push(symbol);
        }
        out.push('\n');
    }

    // Diagonal numbers under row A
    let _ = writeln!(out, "{}1 2 3 4 5", " ".repeat(CENTER_ROW as usize + 2));
    out
}

/// Players, lost marbles and whose turn it is
pub fn render_status(state: &ClientGameState) -> String {
    let mut out = String::new();

    if let Some(match_id) = state.match_id {
        let _ = writeln!(out, "Match {}, turn {} of {}", match_id, state.turn, MAX_TURNS);
    }

    for player in &state.players {
        let marker = if state.current_player.as_deref() == Some(player.name.as_str()) {
            '>'
        } else {
            ' '
        };
        let you = if player.name == state.name { " (you)" } else { "" };
        let computer = if player.kind == PlayerKind::Computer {
            " (computer)"
        } else {
            ""
        };
        let left = if state.has_forfeited(&player.name) {
            " (left)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{} {}{}{}{} [{}] {} lost {}",
            marker,
            player.name,
            you,
            computer,
            left,
            player.marble.symbol(),
            player.marble,
            state.board.eliminated(player.marble)
        );
    }

    if let Some(outcome) = &state.outcome {
        let _ = writeln!(out, "{}", outcome);
    }
    out
}

/// The server's player list, one line per player
pub fn render_players(players: &[PlayerEntry], me: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} players online", players.len());
    for player in players {
        let you = if player.name == me { " (you)" } else { "" };
        let place = match player.match_id {
            Some(id) => format!("in match {}", id),
            None => "waiting".to_string(),
        };
        let _ = writeln!(out, "  {}{} [{}] {}", player.name, you, player.kind, place);
    }
    out
}
