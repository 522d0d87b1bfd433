//! Common types for Sea Battle: cell states, shot outcomes and board errors.

use core::fmt;

/// State of a single grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Empty,
    /// Intact ship segment. Only ever present on an own board.
    Ship,
    Hit,
    Miss,
    Sunk,
}

impl CellState {
    /// Symbol used by the text renderings sent to clients.
    pub fn symbol(self, show_ships: bool) -> char {
        match self {
            CellState::Empty => '.',
            CellState::Ship if show_ships => 'S',
            CellState::Ship => '.',
            CellState::Hit => 'X',
            CellState::Miss => 'O',
            CellState::Sunk => '#',
        }
    }

    /// `true` once a shot has resolved this cell.
    pub fn is_attacked(self) -> bool {
        matches!(self, CellState::Hit | CellState::Miss | CellState::Sunk)
    }
}

/// Result of resolving one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Ship segment hit, ship still afloat.
    Hit,
    /// Final segment hit; the ship of the given size went down.
    Sunk { size: usize },
    /// Previously untouched empty cell.
    Miss,
    /// Cell was already resolved by an earlier shot; nothing changed.
    AlreadyAttacked,
    /// Coordinates outside the grid; nothing changed.
    OutOfBounds,
}

impl ShotOutcome {
    /// The turn passes to the opponent only after a fresh miss.
    pub fn switches_turn(self) -> bool {
        matches!(self, ShotOutcome::Miss)
    }

    /// `false` for outcomes that did not consume the shot.
    pub fn is_resolved(self) -> bool {
        !matches!(self, ShotOutcome::OutOfBounds)
    }
}

impl fmt::Display for ShotOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotOutcome::Hit => write!(f, "HIT"),
            ShotOutcome::Sunk { .. } => write!(f, "HIT: Ship sunk!"),
            ShotOutcome::Miss => write!(f, "MISS"),
            ShotOutcome::AlreadyAttacked => write!(f, "REPEAT: Already attacked this position"),
            ShotOutcome::OutOfBounds => write!(f, "INVALID: Coordinates out of bounds"),
        }
    }
}

/// Errors returned by board placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Ship would extend past the grid edge.
    #[error("ship placement is out of bounds")]
    ShipOutOfBounds,
    /// A target cell is not empty.
    #[error("ship placement overlaps another ship")]
    ShipOverlaps,
    /// A neighbouring cell, diagonals included, holds a ship.
    #[error("ship placement touches another ship")]
    ShipTouches,
    /// Ship size outside 1..=4.
    #[error("invalid ship size {0}")]
    InvalidShipSize(usize),
    /// Auto-placement ran out of whole-board restarts.
    #[error("unable to place fleet after {0} layout resets")]
    UnableToPlaceFleet(usize),
}
