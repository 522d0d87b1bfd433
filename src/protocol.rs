//! Line-oriented wire protocol: server messages and the client shot command.
//!
//! Clients pattern-match on the tags (`YOUR_TURN`, `OPPONENT_TURN`,
//! `GAME_OVER:`) and on the `HIT`/`MISS` substrings of result lines, so those
//! strings are fixed.

use alloc::string::String;
use core::fmt;

use crate::common::ShotOutcome;
use crate::config::BOARD_SIZE;

pub const YOUR_TURN: &str = "YOUR_TURN";
pub const OPPONENT_TURN: &str = "OPPONENT_TURN";
pub const GAME_OVER: &str = "GAME_OVER";
pub const MATCH_FOUND: &str = "MATCH_FOUND";
pub const ERROR: &str = "ERROR";

/// Messages sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Welcome { name: String },
    MatchFound { opponent: String },
    PlacingShips,
    ShipsPlaced { board: String },
    AwaitingOpponent,
    GameStarted { first: String },
    /// Prompt for the acting player: own board, enemy view, input prompt.
    YourTurn { board: String, view: String },
    OpponentTurn { board: String, view: String },
    ShotResult {
        shooter: String,
        x: usize,
        y: usize,
        outcome: ShotOutcome,
    },
    Error(InputError),
    GameOver(GameOverReason),
}

/// Problems with a client's command. The session state is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    InvalidFormat,
    InvalidCoordinates,
    NotYourTurn,
}

/// Why a player's game ended, from that player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Victory,
    Defeat,
    OpponentDisconnected,
    DisconnectedDuringSetup,
    OpponentLeftBeforeStart,
    ReadyTimeout,
    TurnTimeout,
    SetupFailed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::InvalidFormat => {
                write!(f, "Invalid input format. Use: x y (numbers 0-9) or A1-J10")
            }
            InputError::InvalidCoordinates => {
                write!(f, "Invalid coordinates. Use values between 0 and {}.", BOARD_SIZE - 1)
            }
            InputError::NotYourTurn => write!(f, "Not your turn."),
        }
    }
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOverReason::Victory => write!(f, "You won! All enemy ships destroyed."),
            GameOverReason::Defeat => write!(f, "You lost. Your fleet has been destroyed."),
            GameOverReason::OpponentDisconnected => write!(f, "opponent disconnected"),
            GameOverReason::DisconnectedDuringSetup => {
                write!(f, "opponent disconnected during setup")
            }
            GameOverReason::OpponentLeftBeforeStart => {
                write!(f, "opponent disconnected before the match started")
            }
            GameOverReason::ReadyTimeout => write!(f, "players were not ready in time"),
            GameOverReason::TurnTimeout => write!(f, "turn timed out, you were disconnected"),
            GameOverReason::SetupFailed => write!(f, "server could not set up the match"),
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Welcome { name } => writeln!(
                f,
                "Welcome to Sea Battle! You are {}. Waiting for an opponent...",
                name
            ),
            ServerMessage::MatchFound { opponent } => writeln!(f, "{}: vs {}", MATCH_FOUND, opponent),
            ServerMessage::PlacingShips => writeln!(f, "Placing ships automatically..."),
            ServerMessage::ShipsPlaced { board } => {
                write!(f, "Your ships have been placed automatically:\n{}\n", board)
            }
            ServerMessage::AwaitingOpponent => {
                writeln!(f, "All ships placed! Waiting for other player...")
            }
            ServerMessage::GameStarted { first } => writeln!(f, "Game started! {} goes first.", first),
            ServerMessage::YourTurn { board, view } => write!(
                f,
                "{}\nYour board:\n{}\nEnemy view:\n{}\nEnter coordinates to shoot (x y or A1): ",
                YOUR_TURN, board, view
            ),
            ServerMessage::OpponentTurn { board, view } => write!(
                f,
                "{}\nYour board:\n{}\nEnemy view:\n{}\nWaiting for opponent's move...\n",
                OPPONENT_TURN, board, view
            ),
            ServerMessage::ShotResult {
                shooter,
                x,
                y,
                outcome,
            } => writeln!(f, "{} shot at ({},{}) - {}", shooter, x, y, outcome),
            ServerMessage::Error(err) => writeln!(f, "{}: {}", ERROR, err),
            ServerMessage::GameOver(reason) => writeln!(f, "{}: {}", GAME_OVER, reason),
        }
    }
}

/// Malformed shot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("expected `x y` or a column letter followed by a row number")]
    Malformed,
    #[error("column letter must be between A and J")]
    BadColumn,
    #[error("row numbers start at 1")]
    BadRow,
}

/// Parse a shot command into (x, y).
///
/// Accepts two whitespace-separated integers (`"3 7"`) or a column letter
/// followed by a 1-based row number (`"D8"`, case-insensitive). Coordinates
/// that parse but fall outside the grid are returned as-is; shot resolution
/// rejects them.
pub fn parse_shot(line: &str) -> Result<(usize, usize), ParseError> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next().ok_or(ParseError::Empty)?;
    match (tokens.next(), tokens.next()) {
        (Some(second), None) => {
            let x = first.parse().map_err(|_| ParseError::Malformed)?;
            let y = second.parse().map_err(|_| ParseError::Malformed)?;
            Ok((x, y))
        }
        (None, _) => parse_letter_form(first),
        _ => Err(ParseError::Malformed),
    }
}

fn parse_letter_form(token: &str) -> Result<(usize, usize), ParseError> {
    let mut chars = token.chars();
    let letter = chars.next().ok_or(ParseError::Empty)?;
    if !letter.is_ascii_alphabetic() {
        return Err(ParseError::Malformed);
    }
    let x = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
    if x >= BOARD_SIZE {
        return Err(ParseError::BadColumn);
    }
    let row: usize = chars.as_str().parse().map_err(|_| ParseError::Malformed)?;
    if row == 0 {
        return Err(ParseError::BadRow);
    }
    Ok((x, row - 1))
}
