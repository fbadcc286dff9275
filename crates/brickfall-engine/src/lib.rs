pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unsupported board size {width}x{height}")]
pub struct BoardSizeError {
    pub(crate) width: usize,
    pub(crate) height: usize,
}

impl BoardSizeError {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("game server has shut down")]
pub struct ServerClosedError;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PieceSequenceError {
    #[display("piece sequence is empty")]
    Empty,
    #[display("invalid piece kind '{kind}'")]
    InvalidKind { kind: char },
}
