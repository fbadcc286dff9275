use std::{
    sync::mpsc::{self, RecvTimeoutError},
    time::{Duration, Instant},
};

use serde::Serialize;

use super::board::{Board, BoardSnapshot, TickOutcome};

/// Identifier handed out by the [`GameServer`](crate::GameServer) on join.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[display("#{_0}")]
pub struct PlayerId(pub(crate) u32);

/// Registry entry of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub nickname: String,
    pub host: String,
}

/// A player and the board it owns for the whole session.
#[derive(Debug)]
pub struct Player {
    info: PlayerInfo,
    board: Board,
}

impl Player {
    #[must_use]
    pub fn info(&self) -> &PlayerInfo {
        &self.info
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }
}

/// Input a driver can issue to a player's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    Drop,
}

/// Notification sent from a player loop to the event dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum PlayerEvent {
    /// The player's board changed and should be redrawn.
    BoardChanged {
        player: PlayerId,
        snapshot: BoardSnapshot,
    },
    /// The player loop finished.
    Left(PlayerSummary),
}

/// Final state of a player loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub info: PlayerInfo,
    pub locked_bricks: usize,
    pub topped_out: bool,
}

/// Exclusive owner of one player's board.
///
/// A player loop runs on a single thread; it mutates the board and publishes
/// a [`PlayerEvent::BoardChanged`] after every change.
#[derive(Debug)]
pub struct PlayerLoop {
    player: Player,
    events: mpsc::Sender<PlayerEvent>,
    listening: bool,
    locked_bricks: usize,
}

impl PlayerLoop {
    pub(crate) fn new(info: PlayerInfo, board: Board, events: mpsc::Sender<PlayerEvent>) -> Self {
        Self {
            player: Player { info, board },
            events,
            listening: true,
            locked_bricks: 0,
        }
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub fn locked_bricks(&self) -> usize {
        self.locked_bricks
    }

    /// Applies one command. Returns whether the board changed.
    pub fn apply(&mut self, command: Command) -> bool {
        let board = &mut self.player.board;
        let applied = match command {
            Command::MoveLeft => board.move_left(),
            Command::MoveRight => board.move_right(),
            Command::MoveDown => board.move_down(),
            Command::Rotate => board.rotate(),
            Command::Drop => board.hard_drop() > 0,
        };
        if applied {
            self.publish();
        }
        applied
    }

    /// Performs one gravity step.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.player.board.tick();
        match outcome {
            TickOutcome::Fell => {
                self.publish();
            }
            TickOutcome::Locked { .. } => {
                self.locked_bricks += 1;
                self.publish();
            }
            TickOutcome::Grounded => {}
        }
        outcome
    }

    /// Publishes the current board. Returns `false` once nobody listens anymore.
    pub fn publish(&mut self) -> bool {
        let event = PlayerEvent::BoardChanged {
            player: self.player.info.id,
            snapshot: self.player.board.snapshot(),
        };
        self.listening = self.events.send(event).is_ok();
        self.listening
    }

    /// Drives the board until the command sender disconnects, the board tops
    /// out, or the dispatcher goes away.
    ///
    /// Commands are applied as they arrive; a gravity tick happens every
    /// `gravity` in between. The loop ends by publishing [`PlayerEvent::Left`].
    #[must_use]
    pub fn run(mut self, commands: &mpsc::Receiver<Command>, gravity: Duration) -> PlayerSummary {
        let mut topped_out = false;
        let mut next_tick = Instant::now() + gravity;
        self.publish();
        while self.listening {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            match commands.recv_timeout(timeout) {
                Ok(command) => {
                    self.apply(command);
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            next_tick = Instant::now() + gravity;
            if let TickOutcome::Locked { topped_out: true } = self.tick() {
                topped_out = true;
                break;
            }
        }
        self.leave(topped_out)
    }

    fn summary(&self, topped_out: bool) -> PlayerSummary {
        PlayerSummary {
            info: self.player.info.clone(),
            locked_bricks: self.locked_bricks,
            topped_out,
        }
    }

    /// Ends the loop and announces it to the dispatcher.
    #[must_use]
    pub fn leave(self, topped_out: bool) -> PlayerSummary {
        let summary = self.summary(topped_out);
        let _ = self.events.send(PlayerEvent::Left(summary.clone()));
        summary
    }
}
