use serde::Serialize;

/// Display color of a cell.
///
/// The engine treats colors as opaque values: it copies them from the falling
/// brick into the matrix and never inspects them. Renderers map them to
/// whatever their surface supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CellColor {
    #[default]
    Default,
    Cyan,
    Blue,
    Orange,
    Yellow,
    Green,
    Magenta,
    Red,
}

/// A single grid position of the [`Matrix`].
///
/// - `empty` is true if no brick has been drawn here in the current frame.
/// - `embedded` is true once a brick has been locked into this cell. It is only
///   cleared again by an explicit [`Matrix::set`] from a collaborator (row clearing,
///   board reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub(crate) color: CellColor,
    pub(crate) empty: bool,
    pub(crate) embedded: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    pub const EMPTY: Self = Self {
        color: CellColor::Default,
        empty: true,
        embedded: false,
    };

    /// A cell occupied by a previously locked brick.
    #[must_use]
    pub const fn embedded(color: CellColor) -> Self {
        Self {
            color,
            empty: false,
            embedded: true,
        }
    }

    #[must_use]
    pub fn color(self) -> CellColor {
        self.color
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.empty
    }

    #[must_use]
    pub fn is_embedded(self) -> bool {
        self.embedded
    }
}

/// Fixed-size grid of cells indexed `[x][y]`.
///
/// `x` grows rightward and `y` grows downward. Coordinates are signed because a
/// falling brick may hang above the board (`y < 0`); such positions are never
/// stored. Every accessor is bounds-checked, so an off-board coordinate reads as
/// "nothing there" instead of reaching the underlying storage.
///
/// # Example
///
/// ```
/// use brickfall_engine::{Cell, CellColor, Matrix};
///
/// let mut matrix = Matrix::new(10, 20);
/// assert!(matrix.set(3, 19, Cell::embedded(CellColor::Red)));
/// assert!(matrix.is_embedded(3, 19));
/// assert!(!matrix.is_embedded(3, 20));
/// assert!(matrix.get(-1, 0).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix {
    width: usize,
    height: usize,
    columns: Vec<Vec<Cell>>,
}

impl Matrix {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            columns: vec![vec![Cell::EMPTY; height]; width],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some((x, y))
    }

    /// Returns the cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        let (x, y) = self.index(x, y)?;
        Some(&self.columns[x][y])
    }

    pub(crate) fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let (x, y) = self.index(x, y)?;
        Some(&mut self.columns[x][y])
    }

    /// Overwrites the cell at `(x, y)`.
    ///
    /// Returns `false` without touching the grid if the position is off the board.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.get_mut(x, y) {
            Some(target) => {
                *target = cell;
                true
            }
            None => false,
        }
    }

    /// Returns whether `(x, y)` is on the board and holds a locked brick.
    #[must_use]
    pub fn is_embedded(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|cell| cell.embedded)
    }

    /// Iterates over the rows from top to bottom, each row from left to right.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = &Cell>> {
        (0..self.height).map(move |y| self.columns.iter().map(move |column| &column[y]))
    }

    /// Resets every cell not holding a locked brick to its pristine state.
    ///
    /// Locked cells keep the color they were painted with.
    pub(crate) fn clear_unembedded(&mut self) {
        for cell in self.columns.iter_mut().flatten() {
            if !cell.embedded {
                *cell = Cell::EMPTY;
            }
        }
    }
}

/// Per-column footprint of the falling brick.
///
/// A column is set iff it lies within the span (min to max inclusive) of the
/// brick's occupied columns, independent of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shadow {
    columns: Vec<bool>,
}

impl Shadow {
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            columns: vec![false; width],
        }
    }

    #[must_use]
    pub fn is_set(&self, x: usize) -> bool {
        self.columns.get(x).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.columns.iter().copied()
    }

    pub(crate) fn set_span(&mut self, min: i32, max: i32) {
        for (x, column) in (0..).zip(&mut self.columns) {
            *column = (min..=max).contains(&x);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.columns.fill(false);
    }
}
