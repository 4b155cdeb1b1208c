// =============================================================================
// GRID.RS: Fixed-width flat grid
//
// Backing store for tile maps. Cells live in one row-major Vec; the column
// count is fixed at construction and the row count is derived from the
// length. Reads are bounds-checked and report out-of-range cells as absent;
// writes outside the grid are a caller bug and panic.
// =============================================================================

/// Row-major grid of `T` with a fixed column count.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    cols: usize,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// A `cols × rows` grid filled with `T::default()`.
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            cells: vec![T::default(); cols * rows],
        }
    }
}

impl<T: Copy> Grid<T> {
    /// Wrap an existing row-major cell buffer.
    ///
    /// Panics when `cells.len()` is not a multiple of `cols`.
    pub fn from_vec(cols: usize, cells: Vec<T>) -> Self {
        assert!(cols > 0, "grid needs at least one column");
        assert!(
            cells.len() % cols == 0,
            "grid length {} is not a multiple of {cols} columns",
            cells.len()
        );
        Self { cols, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        if self.cols == 0 { 0 } else { self.cells.len() / self.cols }
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows()
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[y as usize * self.cols + x as usize])
    }

    /// Overwrite the cell at `(x, y)`.
    ///
    /// Panics outside the grid.
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        assert!(
            self.in_bounds(x, y),
            "grid write out of bounds: ({x}, {y}) in {}x{}",
            self.cols,
            self.rows()
        );
        let idx = y as usize * self.cols + x as usize;
        self.cells[idx] = value;
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

impl<T: Copy + Default> Grid<T> {
    /// Cell at `(x, y)`, with out-of-range cells reading as `T::default()`.
    #[inline]
    pub fn get_or_default(&self, x: i32, y: i32) -> T {
        self.get(x, y).unwrap_or_default()
    }
}

/// Tile maps use `0` for empty space.
pub type TileGrid = Grid<u16>;

impl TileGrid {
    /// Whether the tile at `(tx, ty)` blocks movement. Out-of-range tiles are open.
    #[inline]
    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        self.get_or_default(tx, ty) != 0
    }
}
