use std::{fmt, str::FromStr};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{PieceKind, PieceSequenceError};

/// Supplies the kind of each newly spawned brick.
///
/// A [`Board`](crate::Board) owns its source, so every board draws from its own
/// stream and tests can inject a fixed order.
pub trait PieceSource: fmt::Debug + Send {
    fn next_piece_kind(&mut self) -> PieceKind;
}

/// Uniformly random piece kinds from a seedable PCG generator.
///
/// The generator is seeded once, on construction.
///
/// # Example
///
/// ```
/// use brickfall_engine::{PieceGenerator, PieceSource as _};
///
/// let mut a = PieceGenerator::with_seed(42);
/// let mut b = PieceGenerator::with_seed(42);
/// for _ in 0..10 {
///     assert_eq!(a.next_piece_kind(), b.next_piece_kind());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    ///
    /// For deterministic piece order, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl PieceSource for PieceGenerator {
    fn next_piece_kind(&mut self) -> PieceKind {
        self.rng.random()
    }
}

/// A fixed, cyclically repeated order of piece kinds.
///
/// Parses from a string of piece letters:
///
/// ```
/// use brickfall_engine::{PieceKind, PieceSequence, PieceSource as _};
///
/// let mut sequence: PieceSequence = "IO".parse().unwrap();
/// assert_eq!(sequence.next_piece_kind(), PieceKind::I);
/// assert_eq!(sequence.next_piece_kind(), PieceKind::O);
/// assert_eq!(sequence.next_piece_kind(), PieceKind::I);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceSequence {
    kinds: Vec<PieceKind>,
    next: usize,
}

impl PieceSequence {
    pub fn new(kinds: impl IntoIterator<Item = PieceKind>) -> Result<Self, PieceSequenceError> {
        let kinds: Vec<_> = kinds.into_iter().collect();
        if kinds.is_empty() {
            return Err(PieceSequenceError::Empty);
        }
        Ok(Self { kinds, next: 0 })
    }
}

impl FromStr for PieceSequence {
    type Err = PieceSequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| {
                PieceKind::from_char(c.to_ascii_uppercase())
                    .ok_or(PieceSequenceError::InvalidKind { kind: c })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(kinds)
    }
}

impl PieceSource for PieceSequence {
    fn next_piece_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.next];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }
}
