use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Serialize};

use super::cell::CellColor;

/// The seven standard piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// Z-piece.
    Z = 6,
}

/// Uniform distribution over the seven piece kinds.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    /// Returns the layout of this kind in the given rotation state.
    ///
    /// This is a table lookup; layouts are never mutated in place.
    #[must_use]
    pub const fn layout(self, rotation: PieceRotation) -> Layout {
        LAYOUTS[self as usize][rotation.as_usize()]
    }

    #[must_use]
    pub const fn color(self) -> CellColor {
        match self {
            PieceKind::I => CellColor::Cyan,
            PieceKind::J => CellColor::Blue,
            PieceKind::L => CellColor::Orange,
            PieceKind::O => CellColor::Yellow,
            PieceKind::S => CellColor::Green,
            PieceKind::T => CellColor::Magenta,
            PieceKind::Z => CellColor::Red,
        }
    }

    /// Vertical offset used to compute the spawn row.
    ///
    /// Spawning at `start_offset() - 1` puts the highest occupied row of the
    /// spawn layout exactly one row above the board.
    #[must_use]
    pub fn start_offset(self) -> i32 {
        let top = self
            .layout(PieceRotation::default())
            .occupied_offsets()
            .map(|(_, by)| by)
            .min()
            .unwrap_or(0);
        -top
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use brickfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::from_char('Z'), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Shape mask of a piece inside its square bounding box.
///
/// A cell is addressed by its local offset `(bx, by)`: `bx` along x, `by` along y.
/// The bounding box is 4×4 for I, 2×2 for O and 3×3 for the others; rotation
/// turns the mask inside that box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    size: usize,
    // rows[by][bx]
    rows: [[bool; 4]; 4],
}

impl Layout {
    const fn from_rows(size: usize, rows: [[u8; 4]; 4]) -> Self {
        let mut cells = [[false; 4]; 4];
        let mut by = 0;
        while by < size {
            let mut bx = 0;
            while bx < size {
                cells[by][bx] = rows[by][bx] == 1;
                bx += 1;
            }
            by += 1;
        }
        Self { size, rows: cells }
    }

    /// Side length of the bounding box.
    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_occupied(self, bx: usize, by: usize) -> bool {
        bx < 4 && by < 4 && self.rows[by][bx]
    }

    /// Local offsets of the occupied cells, scanned column by column.
    pub fn occupied_offsets(self) -> impl Iterator<Item = (i32, i32)> {
        const OFFSETS: [i32; 4] = [0, 1, 2, 3];
        (0..4)
            .flat_map(|bx| (0..4).map(move |by| (bx, by)))
            .filter(move |&(bx, by)| self.is_occupied(bx, by))
            .map(|(bx, by)| (OFFSETS[bx], OFFSETS[by]))
    }

    /// The layout turned 90° clockwise inside its bounding box.
    #[must_use]
    pub const fn rotated_right(self) -> Self {
        let n = self.size;
        let mut rows = [[false; 4]; 4];
        let mut by = 0;
        while by < n {
            let mut bx = 0;
            while bx < n {
                rows[by][bx] = self.rows[n - 1 - bx][by];
                bx += 1;
            }
            by += 1;
        }
        Self { size: n, rows }
    }
}

const fn rotations(spawn: Layout) -> [Layout; 4] {
    let mut layouts = [spawn; 4];
    let mut i = 1;
    while i < 4 {
        layouts[i] = layouts[i - 1].rotated_right();
        i += 1;
    }
    layouts
}

const LAYOUTS: [[Layout; 4]; PieceKind::LEN] = {
    const ____: [u8; 4] = [0; 4];
    [
        // I-piece
        rotations(Layout::from_rows(4, [____, [1, 1, 1, 1], ____, ____])),
        // J-piece
        rotations(Layout::from_rows(3, [[1, 0, 0, 0], [1, 1, 1, 0], ____, ____])),
        // L-piece
        rotations(Layout::from_rows(3, [[0, 0, 1, 0], [1, 1, 1, 0], ____, ____])),
        // O-piece
        rotations(Layout::from_rows(2, [[1, 1, 0, 0], [1, 1, 0, 0], ____, ____])),
        // S-piece
        rotations(Layout::from_rows(3, [[0, 1, 1, 0], [1, 1, 0, 0], ____, ____])),
        // T-piece
        rotations(Layout::from_rows(3, [[0, 1, 0, 0], [1, 1, 1, 0], ____, ____])),
        // Z-piece
        rotations(Layout::from_rows(3, [[1, 1, 0, 0], [0, 1, 1, 0], ____, ____])),
    ]
};

/// Anchor of a brick's bounding box on the board.
///
/// A local cell `(bx, by)` maps to the absolute cell `(x + bx, y + by)`.
/// Both coordinates may be negative: `y < 0` is above the visible board and
/// `x < 0` happens when the leftmost layout columns are empty.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A falling piece.
///
/// The brick only knows its own geometry; whether a move is legal is decided
/// by the [`Board`](crate::Board) that owns it.
///
/// # Example
///
/// ```
/// use brickfall_engine::{Brick, PieceKind, Position};
///
/// let brick = Brick::new(PieceKind::T, Position::new(4, 0));
/// let cells: Vec<_> = brick.cells().collect();
/// assert_eq!(cells, [(4, 1), (5, 0), (5, 1), (6, 1)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brick {
    kind: PieceKind,
    rotation: PieceRotation,
    position: Position,
    anchored: bool,
}

impl Brick {
    #[must_use]
    pub fn new(kind: PieceKind, position: Position) -> Self {
        Self {
            kind,
            rotation: PieceRotation::default(),
            position,
            anchored: false,
        }
    }

    /// Same brick in a different rotation state.
    #[must_use]
    pub fn with_rotation(self, rotation: PieceRotation) -> Self {
        Self { rotation, ..self }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn color(&self) -> CellColor {
        self.kind.color()
    }

    /// True once the brick has touched an obstruction below. Never reset.
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.kind.layout(self.rotation)
    }

    /// Layout the brick would have after one clockwise rotation.
    #[must_use]
    pub fn rotation_layout(&self) -> Layout {
        self.kind.layout(self.rotation.rotated_right())
    }

    /// Absolute coordinates of the occupied cells, including those above the board.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let Position { x, y } = self.position;
        self.layout()
            .occupied_offsets()
            .map(move |(bx, by)| (x + bx, y + by))
    }

    pub(crate) fn anchor(&mut self) {
        self.anchored = true;
    }

    pub(crate) fn move_left(&mut self) {
        self.position.x -= 1;
    }

    pub(crate) fn move_right(&mut self) {
        self.position.x += 1;
    }

    pub(crate) fn move_down(&mut self) {
        self.position.y += 1;
    }

    pub(crate) fn rotate(&mut self) {
        self.rotation = self.rotation.rotated_right();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn offsets(layout: Layout) -> Vec<(i32, i32)> {
        let mut cells: Vec<_> = layout.occupied_offsets().collect();
        cells.sort_unstable();
        cells
    }

    #[test]
    fn test_every_layout_has_four_cells() {
        for kind in PieceKind::ALL {
            let mut rotation = PieceRotation::default();
            for _ in 0..4 {
                let layout = kind.layout(rotation);
                assert_eq!(
                    layout.occupied_offsets().count(),
                    4,
                    "{kind:?} rotation {rotation:?} should have 4 cells"
                );
                for (bx, by) in layout.occupied_offsets() {
                    assert!(bx < 4 && by < 4);
                    assert!(usize::try_from(bx).unwrap() < layout.size());
                    assert!(usize::try_from(by).unwrap() < layout.size());
                }
                rotation = rotation.rotated_right();
            }
        }
    }

    #[test]
    fn test_four_rotations_return_to_spawn() {
        for kind in PieceKind::ALL {
            let spawn = kind.layout(PieceRotation::default());
            let mut layout = spawn;
            for _ in 0..4 {
                layout = layout.rotated_right();
            }
            assert_eq!(layout, spawn, "{kind:?}");
        }
    }

    #[test]
    fn test_i_piece_rotation_is_clockwise() {
        let rotation = PieceRotation::default().rotated_right();
        assert_eq!(
            offsets(PieceKind::I.layout(rotation)),
            [(2, 0), (2, 1), (2, 2), (2, 3)]
        );
        assert_eq!(
            offsets(PieceKind::I.layout(rotation.rotated_right())),
            [(0, 2), (1, 2), (2, 2), (3, 2)]
        );
    }

    #[test]
    fn test_t_piece_rotation() {
        let rotation = PieceRotation::default().rotated_right();
        // .T.      .T.
        // TTT  =>  .TT
        //          .T.
        assert_eq!(
            offsets(PieceKind::T.layout(rotation)),
            [(1, 0), (1, 1), (1, 2), (2, 1)]
        );
    }

    #[test]
    fn test_o_piece_rotation_is_identity() {
        let spawn = PieceKind::O.layout(PieceRotation::default());
        assert_eq!(spawn.rotated_right(), spawn);
    }

    #[test]
    fn test_start_offset_places_top_row_above_board() {
        for kind in PieceKind::ALL {
            let brick = Brick::new(kind, Position::new(0, kind.start_offset() - 1));
            let top = brick.cells().map(|(_, y)| y).min().unwrap();
            assert_eq!(top, -1, "{kind:?}");
        }
        assert_eq!(PieceKind::I.start_offset(), -1);
        assert_eq!(PieceKind::T.start_offset(), 0);
    }

    #[test]
    fn test_brick_moves() {
        let mut brick = Brick::new(PieceKind::O, Position::new(3, 3));
        brick.move_left();
        brick.move_down();
        brick.move_down();
        brick.move_right();
        brick.move_right();
        assert_eq!(brick.position(), Position::new(4, 5));

        brick.rotate();
        assert_eq!(brick.rotation().as_u8(), 1);
        assert!(!brick.is_anchored());
        brick.anchor();
        assert!(brick.is_anchored());
    }

    #[test]
    fn test_rotation_layout_does_not_mutate() {
        let brick = Brick::new(PieceKind::L, Position::new(2, 2));
        let candidate = brick.rotation_layout();
        assert_ne!(candidate, brick.layout());
        assert_eq!(brick.rotation(), PieceRotation::default());
    }

    #[test]
    fn test_random_kinds_cover_all_pieces() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = [false; PieceKind::LEN];
        for _ in 0..200 {
            let kind: PieceKind = rng.random();
            seen[kind as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }
}
