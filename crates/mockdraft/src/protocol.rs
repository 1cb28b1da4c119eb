// Messages between the draft loop and the terminal front end.

use std::time::Duration;

use crate::draft::engine::DraftSnapshot;
use crate::draft::pick::DraftPick;
use crate::draft::roster::TeamRoster;
use crate::valuation::rankings::Player;

/// Default number of rows for `board` without an explicit count.
pub const DEFAULT_BOARD_ROWS: usize = 15;

// ---------------------------------------------------------------------------
// Front end -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Draft the available player matching the query.
    Pick(String),
    /// Show recommendations for the current pick.
    Suggest,
    /// Show the top of the available board.
    Board(usize),
    /// Show the human roster.
    Roster,
    /// Show pick number, clock, and who is up.
    Status,
    /// Finish the draft instantly, autodrafting for the human.
    Simulate,
    Quit,
}

/// Parse one line of input. Returns a usage message on bad input.
pub fn parse_command(line: &str) -> Result<UserCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "" => Err(usage()),
        "pick" | "p" => {
            if rest.is_empty() {
                Err("usage: pick <player name>".into())
            } else {
                Ok(UserCommand::Pick(rest.to_string()))
            }
        }
        "suggest" | "s" => Ok(UserCommand::Suggest),
        "board" | "b" => {
            if rest.is_empty() {
                return Ok(UserCommand::Board(DEFAULT_BOARD_ROWS));
            }
            rest.parse::<usize>()
                .map(UserCommand::Board)
                .map_err(|_| format!("board expects a row count, got '{rest}'"))
        }
        "roster" | "r" => Ok(UserCommand::Roster),
        "status" => Ok(UserCommand::Status),
        "sim" | "simulate" => Ok(UserCommand::Simulate),
        "quit" | "q" | "exit" => Ok(UserCommand::Quit),
        _ => Err(usage()),
    }
}

fn usage() -> String {
    "commands: pick <name> | suggest | board [n] | roster | status | sim | quit".to_string()
}

// ---------------------------------------------------------------------------
// App -> front end
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum UiUpdate {
    Started(DraftSnapshot),
    /// The human is on the clock. Sent once per human pick.
    YourTurn {
        pick_number: u32,
        round: u32,
        remaining: Duration,
        suggestions: Vec<Player>,
    },
    Pick(DraftPick),
    /// Human pick made by the clock or by simulation.
    AutoPick(DraftPick),
    Suggestions(Vec<Player>),
    Board(Vec<Player>),
    Roster(TeamRoster),
    Status(DraftSnapshot),
    /// A command was refused; the draft is unchanged.
    Rejected(String),
    Complete,
}
