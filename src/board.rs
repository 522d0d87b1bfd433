//! Own board and enemy view, with placement and shot resolution.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use log::debug;
use rand::Rng;

use crate::common::{BoardError, CellState, ShotOutcome};
use crate::config::{BOARD_SIZE, MAX_LAYOUT_RESETS, MAX_PLACEMENT_ATTEMPTS};
use crate::ship::{Orientation, Ship, MAX_SHIP_SIZE};

type Grid = [[CellState; BOARD_SIZE]; BOARD_SIZE];

const EMPTY_GRID: Grid = [[CellState::Empty; BOARD_SIZE]; BOARD_SIZE];

/// A player's own board: ground truth for their fleet.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: Grid,
    ships: Vec<Ship>,
}

/// What a player has learned about the opponent's board. Never holds
/// [`CellState::Ship`].
#[derive(Clone, PartialEq, Eq)]
pub struct EnemyView {
    cells: Grid,
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new() -> Self {
        Self {
            cells: EMPTY_GRID,
            ships: Vec::new(),
        }
    }

    /// State at (x, y), or `None` off the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Number of ships still afloat.
    pub fn ships_remaining(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_sunk()).count()
    }

    /// Returns `true` when every ship is sunk.
    pub fn is_defeated(&self) -> bool {
        self.ships.iter().all(|s| s.is_sunk())
    }

    /// Remove every ship and mark.
    pub fn clear(&mut self) {
        self.cells = EMPTY_GRID;
        self.ships.clear();
    }

    /// Place a ship of `size` anchored at (x, y).
    ///
    /// Fails without side effects if the ship leaves the grid, covers a
    /// non-empty cell, or touches another ship, diagonals included.
    pub fn place_ship(
        &mut self,
        size: usize,
        x: usize,
        y: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        if size == 0 || size > MAX_SHIP_SIZE {
            return Err(BoardError::InvalidShipSize(size));
        }
        let (width, height) = match orientation {
            Orientation::Horizontal => (size, 1),
            Orientation::Vertical => (1, size),
        };
        if x >= BOARD_SIZE
            || y >= BOARD_SIZE
            || width > BOARD_SIZE - x
            || height > BOARD_SIZE - y
        {
            return Err(BoardError::ShipOutOfBounds);
        }

        let ship = Ship::new(size, x, y, orientation);
        if ship.cells().any(|(cx, cy)| self.cells[cy][cx] != CellState::Empty) {
            return Err(BoardError::ShipOverlaps);
        }
        if ship
            .surroundings(BOARD_SIZE)
            .any(|(nx, ny)| self.cells[ny][nx] == CellState::Ship)
        {
            return Err(BoardError::ShipTouches);
        }

        for (cx, cy) in ship.cells() {
            self.cells[cy][cx] = CellState::Ship;
        }
        self.ships.push(ship);
        Ok(())
    }

    /// Randomly place every ship in `fleet`.
    ///
    /// Each ship gets [`MAX_PLACEMENT_ATTEMPTS`] random anchors. When one runs
    /// out, the whole board is cleared and the fleet is placed again from the
    /// first ship. Returns the number of resets that were needed.
    pub fn auto_place<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        fleet: &[usize],
    ) -> Result<usize, BoardError> {
        for resets in 0..MAX_LAYOUT_RESETS {
            self.clear();
            if fleet.iter().all(|&size| self.place_random(rng, size)) {
                return Ok(resets);
            }
            debug!(
                "auto-placement stuck after {} of {} ships, resetting board",
                self.ships.len(),
                fleet.len()
            );
        }
        self.clear();
        Err(BoardError::UnableToPlaceFleet(MAX_LAYOUT_RESETS))
    }

    fn place_random<R: Rng + ?Sized>(&mut self, rng: &mut R, size: usize) -> bool {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let x = rng.random_range(0..BOARD_SIZE);
            let y = rng.random_range(0..BOARD_SIZE);
            let orientation = Orientation::from_horizontal(rng.random_bool(0.5));
            if self.place_ship(size, x, y, orientation).is_ok() {
                return true;
            }
        }
        false
    }

    /// Resolve a shot at (x, y) against this board, recording what the shooter
    /// learns in `view`.
    ///
    /// Both grids are only written through [`Board::mark`], so `view` always
    /// equals [`Board::projection`] when it started out that way.
    pub fn resolve_shot(&mut self, view: &mut EnemyView, x: usize, y: usize) -> ShotOutcome {
        let Some(state) = self.cell(x, y) else {
            return ShotOutcome::OutOfBounds;
        };
        match state {
            CellState::Ship => {
                self.mark(view, x, y, CellState::Hit);
                let Some(index) = self.ships.iter().position(|s| s.occupies(x, y)) else {
                    return ShotOutcome::Hit;
                };
                self.ships[index].register_hit();
                let ship = self.ships[index];
                if ship.is_sunk() {
                    self.sink(view, &ship);
                    ShotOutcome::Sunk { size: ship.size() }
                } else {
                    ShotOutcome::Hit
                }
            }
            CellState::Empty => {
                self.mark(view, x, y, CellState::Miss);
                ShotOutcome::Miss
            }
            CellState::Hit | CellState::Miss | CellState::Sunk => ShotOutcome::AlreadyAttacked,
        }
    }

    /// Mark the wreck and reveal the empty cells around it.
    fn sink(&mut self, view: &mut EnemyView, ship: &Ship) {
        for (x, y) in ship.cells() {
            self.mark(view, x, y, CellState::Sunk);
        }
        for (x, y) in ship.surroundings(BOARD_SIZE) {
            if self.cells[y][x] == CellState::Empty {
                self.mark(view, x, y, CellState::Miss);
            }
        }
    }

    fn mark(&mut self, view: &mut EnemyView, x: usize, y: usize, state: CellState) {
        debug_assert!(state != CellState::Ship);
        self.cells[y][x] = state;
        view.cells[y][x] = state;
    }

    /// What an opponent can observe of this board: everything except intact
    /// ship segments.
    pub fn projection(&self) -> EnemyView {
        let mut cells = self.cells;
        for cell in cells.iter_mut().flatten() {
            if *cell == CellState::Ship {
                *cell = CellState::Empty;
            }
        }
        EnemyView { cells }
    }

    /// Text rendering; `show_ships` reveals intact segments.
    pub fn render(&self, show_ships: bool) -> String {
        render_grid(&self.cells, show_ships)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ ships: {:?} }}", self.ships)?;
        f.write_str(&self.render(true))
    }
}

impl EnemyView {
    pub fn new() -> Self {
        Self { cells: EMPTY_GRID }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn clear(&mut self) {
        self.cells = EMPTY_GRID;
    }

    pub fn render(&self) -> String {
        render_grid(&self.cells, false)
    }
}

impl Default for EnemyView {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnemyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn render_grid(cells: &Grid, show_ships: bool) -> String {
    let mut out = String::from(" ");
    for x in 0..BOARD_SIZE {
        let _ = write!(out, " {}", x);
    }
    out.push('\n');
    for (y, row) in cells.iter().enumerate() {
        let _ = write!(out, "{} ", y);
        for cell in row {
            out.push(cell.symbol(show_ships));
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_uses_symbol_legend() {
        let mut board = Board::new();
        let mut view = EnemyView::new();
        board.place_ship(2, 0, 0, Orientation::Horizontal).unwrap();
        board.resolve_shot(&mut view, 0, 0);
        board.resolve_shot(&mut view, 5, 5);

        let own = board.render(true);
        let mut lines = own.lines();
        assert_eq!(lines.next(), Some("  0 1 2 3 4 5 6 7 8 9"));
        assert_eq!(lines.next(), Some("0 X S . . . . . . . . "));
        assert_eq!(lines.nth(4), Some("5 . . . . . O . . . . "));

        assert!(board.render(false).lines().nth(1).unwrap().starts_with("0 X . "));
        assert_eq!(view.render().lines().nth(1), Some("0 X . . . . . . . . . "));
    }

    #[test]
    fn projection_hides_intact_segments() {
        let mut board = Board::new();
        board.place_ship(3, 4, 4, Orientation::Vertical).unwrap();
        assert_eq!(board.projection(), EnemyView::new());
    }
}
