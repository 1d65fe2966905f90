//! Board occupancy and relative cell patterns.

use std::collections::BTreeMap;

use crate::ids::ShipId;

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Saturates at the `i32` range; a saturated coordinate is never on a board.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// Sparse map of relative cells to values; absent cells query as 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    cells: BTreeMap<(i32, i32), i64>,
}

impl Pattern {
    /// Largest radius [`Pattern::expanded`] honours.
    pub const MAX_RADIUS: u32 = 256;

    /// Single-cell pattern at the origin.
    pub fn single() -> Self {
        Self::from_cells([(0, 0, 1)])
    }

    /// Builds a pattern from `(dx, dy, value)` triples; zero values are dropped.
    pub fn from_cells(cells: impl IntoIterator<Item = (i32, i32, i64)>) -> Self {
        Self {
            cells: cells
                .into_iter()
                .filter(|&(_, _, value)| value != 0)
                .map(|(dx, dy, value)| ((dx, dy), value))
                .collect(),
        }
    }

    /// Value at a relative cell, 0 when the cell is not part of the pattern.
    pub fn query(&self, dx: i32, dy: i32) -> i64 {
        self.cells.get(&(dx, dy)).copied().unwrap_or(0)
    }

    /// Relative cells that are part of the pattern, in a stable order.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pattern rotated clockwise by `quarter_turns` × 90° around the origin.
    pub fn rotated(&self, quarter_turns: u8) -> Self {
        let turns = quarter_turns % 4;
        Self {
            cells: self
                .cells
                .iter()
                .map(|(&(dx, dy), &value)| {
                    let cell = match turns {
                        0 => (dx, dy),
                        1 => (-dy, dx),
                        2 => (-dx, -dy),
                        _ => (dy, -dx),
                    };
                    (cell, value)
                })
                .collect(),
        }
    }

    /// Every cell within Manhattan distance `radius` of some cell of this
    /// pattern, valued 1.
    ///
    /// `radius` is clamped to [`Pattern::MAX_RADIUS`].
    pub fn expanded(&self, radius: u32) -> Self {
        let r = i32::try_from(radius.min(Self::MAX_RADIUS)).unwrap_or(0);
        let mut cells = BTreeMap::new();
        for (cx, cy) in self.cells() {
            for dx in -r..=r {
                let span = r - dx.abs();
                for dy in -span..=span {
                    cells.insert((cx.saturating_add(dx), cy.saturating_add(dy)), 1);
                }
            }
        }
        Self { cells }
    }
}

/// Rectangular board tracking which ship occupies each tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: u32,
    height: u32,
    tiles: Vec<Option<ShipId>>,
}

impl Board {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![None; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    fn slot(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    /// Ship occupying `(x, y)`, if any. Off-board positions are empty.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<ShipId> {
        self.slot(Position::new(x, y))
            .and_then(|slot| self.tiles[slot])
    }

    /// Board positions covered by `pattern` anchored at `anchor`.
    pub fn footprint(anchor: Position, pattern: &Pattern) -> impl Iterator<Item = Position> + '_ {
        pattern.cells().map(move |(dx, dy)| anchor.offset(dx, dy))
    }

    /// Returns true if every cell is on the board and free or held by `ship`.
    pub fn can_place(&self, ship: ShipId, anchor: Position, pattern: &Pattern) -> bool {
        Self::footprint(anchor, pattern).all(|pos| match self.slot(pos) {
            Some(slot) => self.tiles[slot].is_none_or(|occupant| occupant == ship),
            None => false,
        })
    }

    /// Marks the footprint as occupied by `ship`. Off-board cells are ignored.
    pub fn place(&mut self, ship: ShipId, anchor: Position, pattern: &Pattern) {
        for pos in Self::footprint(anchor, pattern) {
            if let Some(slot) = self.slot(pos) {
                self.tiles[slot] = Some(ship);
            }
        }
    }

    /// Clears the footprint cells still held by `ship`.
    pub fn clear(&mut self, ship: ShipId, anchor: Position, pattern: &Pattern) {
        for pos in Self::footprint(anchor, pattern) {
            if let Some(slot) = self.slot(pos)
                && self.tiles[slot] == Some(ship)
            {
                self.tiles[slot] = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_returns_zero_outside_pattern() {
        let p = Pattern::from_cells([(0, 0, 1), (1, 0, 2), (2, 0, 0)]);
        assert_eq!(p.query(1, 0), 2);
        assert_eq!(p.query(2, 0), 0);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn offsets_saturate_off_the_board() {
        let board = Board::new(4, 4);
        let far = Position::new(2, 2).offset(i32::MAX, i32::MIN);
        assert_eq!(far, Position::new(i32::MAX, i32::MIN));
        assert!(!board.contains(far));
        assert!(!board.can_place(ShipId(0), far, &Pattern::single()));
    }

    #[test]
    fn expansion_clamps_the_radius() {
        let huge = Pattern::single().expanded(u32::MAX);
        assert!(!huge.is_empty());
        assert_eq!(huge.query(Pattern::MAX_RADIUS as i32, 0), 1);
        assert_eq!(huge.query(Pattern::MAX_RADIUS as i32 + 1, 0), 0);
    }

    #[test]
    fn rotation_is_clockwise_quarter_turns() {
        let bar = Pattern::from_cells([(0, 0, 1), (1, 0, 1)]);
        let turned = bar.rotated(1);
        assert_eq!(turned.query(0, 1), 1);
        assert_eq!(turned.query(1, 0), 0);
        assert_eq!(bar.rotated(4), bar);
    }

    #[test]
    fn expansion_uses_manhattan_distance() {
        let vision = Pattern::single().expanded(2);
        assert_eq!(vision.query(2, 0), 1);
        assert_eq!(vision.query(1, 1), 1);
        assert_eq!(vision.query(2, 1), 0);
        assert_eq!(vision.len(), 13);
    }

    #[test]
    fn placement_respects_bounds_and_occupants() {
        let mut board = Board::new(4, 4);
        let bar = Pattern::from_cells([(0, 0, 1), (1, 0, 1)]);

        assert!(!board.can_place(ShipId(0), Position::new(3, 0), &bar));
        assert!(board.can_place(ShipId(0), Position::new(0, 0), &bar));
        board.place(ShipId(0), Position::new(0, 0), &bar);

        assert_eq!(board.tile_at(1, 0), Some(ShipId(0)));
        assert_eq!(board.tile_at(-1, 0), None);
        assert!(!board.can_place(ShipId(1), Position::new(1, 0), &bar));
        assert!(board.can_place(ShipId(0), Position::new(1, 0), &bar));

        board.clear(ShipId(0), Position::new(0, 0), &bar);
        assert_eq!(board.tile_at(0, 0), None);
    }
}
