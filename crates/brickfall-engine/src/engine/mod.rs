//! Board rules and the multi-player session around them.
//!
//! - [`Board`] - Matrix, falling brick and shadow of one player, with the
//!   guarded moves and the gravity step
//! - [`Blocker`] - Obstruction conditions tested by [`Board::brick_touched`]
//! - [`PieceSource`] - Where new piece kinds come from ([`PieceGenerator`],
//!   [`PieceSequence`])
//! - [`PlayerLoop`] - Thread-owned driver of one player's board
//! - [`GameServer`] - Player registry, join channel and event dispatch
//!
//! # Game Flow
//!
//! 1. A player joins through a [`Lobby`] and receives its [`PlayerLoop`]
//! 2. The loop applies [`Command`]s and gravity ticks to its board
//! 3. Every change is published as a [`PlayerEvent`] to the
//!    [`EventDispatcher`]
//! 4. A brick that can no longer fall gets one grace tick, then locks and
//!    the next one spawns
//! 5. The loop ends on top-out or when its command sender goes away
//!
//! # Example
//!
//! ```
//! use brickfall_engine::{Board, PieceSequence, TickOutcome};
//!
//! let source = "I".parse::<PieceSequence>().unwrap();
//! let mut board = Board::with_source(10, 4, Box::new(source)).unwrap();
//!
//! let mut falls = 0;
//! loop {
//!     match board.tick() {
//!         TickOutcome::Fell => falls += 1,
//!         TickOutcome::Grounded => {}
//!         TickOutcome::Locked { topped_out } => {
//!             assert!(!topped_out);
//!             break;
//!         }
//!     }
//! }
//! assert_eq!(falls, 4);
//! assert!((4..8).all(|x| board.matrix().is_embedded(x, 3)));
//! ```

pub use self::{blocker::*, board::*, game_server::*, piece_source::*, player::*};

mod blocker;
mod board;
mod game_server;
mod piece_source;
mod player;
