//! Ship value type. Occupied cells are derived from anchor, orientation and size.

use core::fmt;

/// Largest ship allowed in a fleet.
pub const MAX_SHIP_SIZE: usize = 4;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Unit step from one segment to the next.
    fn step(self) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }
}

/// A placed ship. `hits` never exceeds `size`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    size: usize,
    orientation: Orientation,
    x: usize,
    y: usize,
    hits: usize,
}

impl Ship {
    pub fn new(size: usize, x: usize, y: usize, orientation: Orientation) -> Self {
        Self {
            size,
            orientation,
            x,
            y,
            hits: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Anchor cell (x, y): the leftmost or topmost segment.
    pub fn anchor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn is_sunk(&self) -> bool {
        self.hits == self.size
    }

    /// Cells covered by this ship, anchor first.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (dx, dy) = self.orientation.step();
        let (x, y) = (self.x, self.y);
        (0..self.size).map(move |i| (x + i * dx, y + i * dy))
    }

    pub fn occupies(&self, x: usize, y: usize) -> bool {
        self.cells().any(|cell| cell == (x, y))
    }

    /// Cells in the 8-neighbourhood of the ship that lie on an `n`×`n` grid,
    /// excluding the ship's own cells.
    pub fn surroundings(&self, n: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (w, h) = match self.orientation {
            Orientation::Horizontal => (self.size, 1),
            Orientation::Vertical => (1, self.size),
        };
        let x0 = self.x as isize - 1;
        let y0 = self.y as isize - 1;
        (y0..y0 + h as isize + 2)
            .flat_map(move |y| (x0..x0 + w as isize + 2).map(move |x| (x, y)))
            .filter(move |&(x, y)| x >= 0 && y >= 0 && (x as usize) < n && (y as usize) < n)
            .map(|(x, y)| (x as usize, y as usize))
            .filter(move |&(x, y)| !self.occupies(x, y))
    }

    /// Count one more hit, saturating at `size`.
    pub(crate) fn register_hit(&mut self) {
        if self.hits < self.size {
            self.hits += 1;
        }
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ size: {}, anchor: ({}, {}), orientation: {:?}, hits: {} }}",
            self.size, self.x, self.y, self.orientation, self.hits,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn cells_follow_orientation() {
        let h = Ship::new(3, 2, 5, Orientation::Horizontal);
        assert_eq!(h.cells().collect::<Vec<_>>(), [(2, 5), (3, 5), (4, 5)]);
        let v = Ship::new(2, 7, 1, Orientation::Vertical);
        assert_eq!(v.cells().collect::<Vec<_>>(), [(7, 1), (7, 2)]);
    }

    #[test]
    fn surroundings_clip_at_edges() {
        let corner = Ship::new(1, 0, 0, Orientation::Horizontal);
        let around: Vec<_> = corner.surroundings(10).collect();
        assert_eq!(around, [(1, 0), (0, 1), (1, 1)]);

        let mid = Ship::new(4, 3, 4, Orientation::Vertical);
        assert_eq!(mid.surroundings(10).count(), 3 * 6 - 4);
    }

    #[test]
    fn hits_saturate() {
        let mut ship = Ship::new(2, 0, 0, Orientation::Horizontal);
        ship.register_hit();
        assert!(!ship.is_sunk());
        ship.register_hit();
        ship.register_hit();
        assert_eq!(ship.hits(), 2);
        assert!(ship.is_sunk());
    }
}
