//! Terminal command parsing and move sources

use shared::{MatchView, MoveRequest, ParseError, PlayerKind, RandomStrategy, Strategy};

/// A line typed at the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(MoveRequest),
    Forfeit,
    /// Message to everyone in the lobby
    Say(String),
    /// Private message to one player
    Tell { to: String, text: String },
    Players,
    Board,
    Help,
    Quit,
}

pub const HELP: &str = "\
Moves:   <marble> [<marble>] <direction>   e.g. `C3 C5 TOP_LEFT`, `C3;C5;0` or `A1 R`
         directions: TOP_LEFT(0) TOP_RIGHT(1) RIGHT(2) BOTTOM_RIGHT(3) BOTTOM_LEFT(4) LEFT(5)
Chat:    say <text> | tell <name> <text> | players
Other:   board | forfeit | help | quit";

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "say" if !rest.is_empty() => return Ok(Command::Say(rest.to_string())),
        "tell" | "pm" => {
            if let Some((to, text)) = rest.split_once(char::is_whitespace) {
                return Ok(Command::Tell {
                    to: to.to_string(),
                    text: text.trim().to_string(),
                });
            }
        }
        _ => {}
    }

    match line.to_ascii_lowercase().as_str() {
        "forfeit" | "resign" => Ok(Command::Forfeit),
        "players" | "who" => Ok(Command::Players),
        "board" | "b" => Ok(Command::Board),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => line.parse().map(Command::Move),
    }
}

/// Where this client's moves come from
pub enum Controller {
    /// Moves are typed at the terminal
    Human,
    Computer(RandomStrategy),
}

impl Controller {
    pub fn computer(seed: Option<u64>) -> Self {
        let strategy = match seed {
            Some(seed) => RandomStrategy::seeded(seed),
            None => RandomStrategy::new(),
        };
        Controller::Computer(strategy)
    }

    pub fn is_computer(&self) -> bool {
        matches!(self, Controller::Computer(_))
    }

    /// What the server is told about this seat
    pub fn kind(&self) -> PlayerKind {
        match self {
            Controller::Human => PlayerKind::Human,
            Controller::Computer(_) => PlayerKind::Computer,
        }
    }

    /// Picks a move when it is this client's turn. A human's move arrives
    /// later as a typed [`Command::Move`], so this returns `None` for them.
    pub fn propose_move(&mut self, view: &MatchView<'_>) -> Option<MoveRequest> {
        match self {
            Controller::Human => None,
            Controller::Computer(strategy) => strategy.propose_move(view),
        }
    }
}
