use std::fmt;

use serde::Serialize;

use crate::{
    BoardSizeError,
    core::{
        brick::{Brick, PieceKind, PieceRotation, Position},
        cell::{Matrix, Shadow},
    },
};

use super::{
    blocker::Blocker,
    piece_source::{PieceGenerator, PieceSource},
};

/// Column at which new bricks are anchored, if the board is wide enough.
pub const SPAWN_COLUMN: i32 = 4;

/// Result of one gravity step, see [`Board::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// The brick moved down one row.
    Fell,
    /// The brick could not move down but still has its grace tick.
    Grounded,
    /// The brick was locked into the matrix and a new one spawned.
    Locked {
        /// The locked brick stuck out above the board, or the new brick
        /// overlaps locked cells.
        topped_out: bool,
    },
}

/// The playing field: a fixed-size matrix, the falling brick and its shadow.
///
/// Every mutation is guarded. A move or rotation that is not legal is silently
/// rejected and reported as `false`; it is never an error.
///
/// After each applied mutation the board repaints itself: cells not holding a
/// locked brick are reset, the brick is drawn and the shadow recomputed.
///
/// # Example
///
/// ```
/// use brickfall_engine::{Board, PieceSequence};
///
/// let source = "O".parse::<PieceSequence>().unwrap();
/// let mut board = Board::with_source(10, 20, Box::new(source)).unwrap();
///
/// board.move_left();
/// board.hard_drop();
///
/// // One grace check after touching down, then the brick locks.
/// assert!(!board.needs_next_brick());
/// assert!(board.needs_next_brick());
/// board.fill_with_brick();
/// board.brick_next();
///
/// assert!(board.matrix().is_embedded(3, 19));
/// ```
#[derive(Debug)]
pub struct Board {
    matrix: Matrix,
    shadow: Shadow,
    brick: Brick,
    source: Box<dyn PieceSource>,
}

impl Board {
    /// Smallest supported board; fits the largest bounding box (I-piece).
    pub const MIN_WIDTH: usize = 4;
    pub const MIN_HEIGHT: usize = 4;

    /// Creates a board drawing random piece kinds.
    pub fn new(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        Self::with_source(width, height, Box::new(PieceGenerator::new()))
    }

    /// Creates a board drawing piece kinds from `source`.
    ///
    /// The first brick is spawned immediately.
    pub fn with_source(
        width: usize,
        height: usize,
        source: Box<dyn PieceSource>,
    ) -> Result<Self, BoardSizeError> {
        let fits = |len: usize, min: usize| len >= min && i32::try_from(len).is_ok();
        if !fits(width, Self::MIN_WIDTH) || !fits(height, Self::MIN_HEIGHT) {
            return Err(BoardSizeError { width, height });
        }

        let mut source = source;
        let brick = spawn_brick(source.next_piece_kind(), width);
        let mut board = Self {
            matrix: Matrix::new(width, height),
            shadow: Shadow::new(width),
            brick,
            source,
        };
        board.refresh();
        Ok(board)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.matrix.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.matrix.height()
    }

    #[must_use]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Mutable access for collaborators that own row clearing or resets.
    ///
    /// Call [`Self::refresh`] afterwards to repaint the brick.
    pub fn matrix_mut(&mut self) -> &mut Matrix {
        &mut self.matrix
    }

    #[must_use]
    pub fn shadow(&self) -> &Shadow {
        &self.shadow
    }

    #[must_use]
    pub fn brick(&self) -> &Brick {
        &self.brick
    }

    /// Replaces the falling brick without any legality check.
    pub fn replace_brick(&mut self, brick: Brick) {
        self.brick = brick;
        self.refresh();
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            matrix: self.matrix.clone(),
            shadow: self.shadow.clone(),
        }
    }

    // `i32::try_from` cannot fail here, the constructor rejects larger boards.
    fn bounds(&self) -> (i32, i32) {
        let width = i32::try_from(self.matrix.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(self.matrix.height()).unwrap_or(i32::MAX);
        (width, height)
    }

    /// Occupied cells of the brick that are on or below the top row.
    fn visible_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.brick.cells().filter(|&(_, y)| y > -1)
    }

    /// Returns whether the brick, at its current position, touches any of the
    /// requested conditions.
    ///
    /// Cells above the board never touch anything. The scan stops at the first
    /// match.
    ///
    /// Note that [`Blocker::BRICK_AT_LEFT`] is only checked for cells with
    /// `x > 1`: a cell in column 1 does not see a locked cell in column 0.
    #[must_use]
    pub fn brick_touched(&self, blocker: Blocker) -> bool {
        let (width, height) = self.bounds();
        let matrix = &self.matrix;
        self.visible_cells().any(|(x, y)| {
            (blocker.intersects(Blocker::BORDER_RIGHT) && x + 1 == width)
                || (blocker.intersects(Blocker::BORDER_LEFT) && x == 0)
                || (blocker.intersects(Blocker::BORDER_BOTTOM) && y + 1 == height)
                || (blocker.intersects(Blocker::BRICK_BELOW)
                    && y + 1 < height
                    && matrix.is_embedded(x, y + 1))
                || (blocker.intersects(Blocker::BRICK_AT_LEFT)
                    && x > 1
                    && matrix.is_embedded(x - 1, y))
                || (blocker.intersects(Blocker::BRICK_AT_RIGHT)
                    && x + 1 < width
                    && matrix.is_embedded(x + 1, y))
        })
    }

    /// Returns whether rotating the brick clockwise in place is legal.
    ///
    /// A brick that touches nothing may always rotate. Otherwise every cell of
    /// the rotated layout must stay within the columns, not below the last row,
    /// and off locked cells. Cells above the board are not checked. There are no
    /// wall kicks: any violation rejects the rotation.
    #[must_use]
    pub fn brick_can_rotate(&self) -> bool {
        if !self.brick_touched(Blocker::SOMETHING) {
            return true;
        }

        let (width, height) = self.bounds();
        let Position { x: px, y: py } = self.brick.position();
        self.brick
            .rotation_layout()
            .occupied_offsets()
            .map(|(bx, by)| (px + bx, py + by))
            .filter(|&(_, y)| y > -1)
            .all(|(x, y)| (0..width).contains(&x) && y < height && !self.matrix.is_embedded(x, y))
    }

    /// Reports the moment the brick must be locked.
    ///
    /// The first call that finds the brick resting on something anchors it and
    /// still returns `false`, giving the player one more move. The next call
    /// that finds it resting returns `true`.
    pub fn needs_next_brick(&mut self) -> bool {
        let touched = self.brick_touched(Blocker::BORDER_BOTTOM | Blocker::BRICK_BELOW);
        let anchored = self.brick.is_anchored();
        if touched {
            self.brick.anchor();
        }
        touched && anchored
    }

    /// Locks the brick: marks every occupied on-board cell as embedded.
    ///
    /// Colors are left as painted by the last [`Self::brick_draw`].
    pub fn fill_with_brick(&mut self) {
        let cells: Vec<_> = self.visible_cells().collect();
        for (x, y) in cells {
            if let Some(cell) = self.matrix.get_mut(x, y) {
                cell.embedded = true;
            }
        }
    }

    /// Spawns the next brick from the piece source and makes it current.
    ///
    /// The previous brick is discarded; only its embedded cells remain.
    pub fn brick_next(&mut self) -> Brick {
        let kind = self.source.next_piece_kind();
        self.brick = spawn_brick(kind, self.matrix.width());
        self.refresh();
        self.brick
    }

    /// Paints the brick's color into the matrix. Vacated cells are not cleared.
    pub fn brick_draw(&mut self) {
        let color = self.brick.color();
        let cells: Vec<_> = self.visible_cells().collect();
        for (x, y) in cells {
            if let Some(cell) = self.matrix.get_mut(x, y) {
                cell.color = color;
                cell.empty = false;
            }
        }
    }

    /// Recomputes the shadow from the columns the brick spans.
    pub fn brick_set_shadow(&mut self) {
        let columns = self.brick.cells().map(|(x, _)| x);
        let span = columns.fold(None, |span: Option<(i32, i32)>, x| match span {
            None => Some((x, x)),
            Some((min, max)) => Some((min.min(x), max.max(x))),
        });
        match span {
            Some((min, max)) => self.shadow.set_span(min, max),
            None => self.shadow.clear(),
        }
    }

    /// Full redraw pass: clears cells not holding locked bricks, then paints
    /// the brick and its shadow.
    pub fn refresh(&mut self) {
        self.matrix.clear_unembedded();
        self.brick_draw();
        self.brick_set_shadow();
    }

    fn apply_unless(&mut self, blocker: Blocker, mutate: fn(&mut Brick)) -> bool {
        if self.brick_touched(blocker) {
            return false;
        }
        mutate(&mut self.brick);
        self.refresh();
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.apply_unless(Blocker::BORDER_LEFT | Blocker::BRICK_AT_LEFT, Brick::move_left)
    }

    pub fn move_right(&mut self) -> bool {
        self.apply_unless(
            Blocker::BORDER_RIGHT | Blocker::BRICK_AT_RIGHT,
            Brick::move_right,
        )
    }

    pub fn move_down(&mut self) -> bool {
        self.apply_unless(
            Blocker::BORDER_BOTTOM | Blocker::BRICK_BELOW,
            Brick::move_down,
        )
    }

    pub fn rotate(&mut self) -> bool {
        if !self.brick_can_rotate() {
            return false;
        }
        self.brick.rotate();
        self.refresh();
        true
    }

    /// Moves the brick down until it rests on the floor or a locked cell.
    ///
    /// The brick is not locked; that stays with [`Self::needs_next_brick`].
    /// Returns the number of rows fallen.
    pub fn hard_drop(&mut self) -> usize {
        let mut rows = 0;
        while self.move_down() {
            rows += 1;
        }
        rows
    }

    /// One gravity step, in the order a game loop drives it: move down, then
    /// lock and spawn if the brick has used up its grace tick.
    pub fn tick(&mut self) -> TickOutcome {
        let fell = self.move_down();
        if !self.needs_next_brick() {
            return if fell {
                TickOutcome::Fell
            } else {
                TickOutcome::Grounded
            };
        }

        let overflow = self.brick.cells().any(|(_, y)| y < 0);
        self.fill_with_brick();
        self.brick_next();
        let blocked = self
            .visible_cells()
            .any(|(x, y)| self.matrix.is_embedded(x, y));
        TickOutcome::Locked {
            topped_out: overflow || blocked,
        }
    }
}

fn spawn_brick(kind: PieceKind, width: usize) -> Brick {
    let size = kind.layout(PieceRotation::default()).size();
    let max_x = i32::try_from(width.saturating_sub(size)).unwrap_or(i32::MAX);
    let position = Position::new(SPAWN_COLUMN.min(max_x), kind.start_offset() - 1);
    Brick::new(kind, position)
}

/// Read-only view of a board for renderers: the matrix and the shadow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    matrix: Matrix,
    shadow: Shadow,
}

impl BoardSnapshot {
    #[must_use]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    #[must_use]
    pub fn shadow(&self) -> &Shadow {
        &self.shadow
    }
}

/// Plain-text rendering: `#` locked, `o` falling brick, `.` empty, and a
/// final row with `^` under the shadowed columns.
impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.matrix.rows() {
            for cell in row {
                let c = if cell.is_embedded() {
                    '#'
                } else if cell.is_empty() {
                    '.'
                } else {
                    'o'
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        for set in self.shadow.iter() {
            write!(f, "{}", if set { '^' } else { ' ' })?;
        }
        Ok(())
    }
}
