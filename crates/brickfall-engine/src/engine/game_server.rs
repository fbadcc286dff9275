use std::{
    collections::BTreeMap,
    ops::ControlFlow,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
        mpsc,
    },
};

use crate::ServerClosedError;

use super::{
    board::Board,
    player::{PlayerEvent, PlayerId, PlayerInfo, PlayerLoop},
};

/// Player registry of one game process.
///
/// The server hands out [`Lobby`] handles through which players join. Each
/// join sends the new player's registry entry over the join channel; the
/// server collects them with [`Self::collect_players`]. Board changes flow
/// from the player loops to the single [`EventDispatcher`] created alongside
/// the server.
///
/// # Example
///
/// ```
/// use brickfall_engine::{Board, GameServer, PlayerEvent};
///
/// let (mut server, dispatcher) = GameServer::new();
/// let mut player_loop = server
///     .join("alice", "localhost", Board::new(10, 20).unwrap())
///     .unwrap();
/// assert_eq!(server.collect_players(), 1);
///
/// player_loop.publish();
/// assert!(dispatcher.next_event().unwrap().is_board_changed());
///
/// drop(player_loop);
/// assert_eq!(server.shutdown().len(), 1);
/// assert!(dispatcher.next_event().is_none());
/// ```
#[derive(Debug)]
pub struct GameServer {
    players: BTreeMap<PlayerId, PlayerInfo>,
    joined: mpsc::Receiver<PlayerInfo>,
    lobby: Lobby,
}

/// Cloneable handle for creating players from any thread.
#[derive(Debug, Clone)]
pub struct Lobby {
    next_id: Arc<AtomicU32>,
    joined: mpsc::Sender<PlayerInfo>,
    events: mpsc::Sender<PlayerEvent>,
}

impl Lobby {
    /// Registers a new player owning `board`.
    ///
    /// Fails if the server has already shut down.
    pub fn join(
        &self,
        nickname: impl Into<String>,
        host: impl Into<String>,
        board: Board,
    ) -> Result<PlayerLoop, ServerClosedError> {
        let id = PlayerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let info = PlayerInfo {
            id,
            nickname: nickname.into(),
            host: host.into(),
        };
        self.joined
            .send(info.clone())
            .map_err(|_| ServerClosedError)?;
        Ok(PlayerLoop::new(info, board, self.events.clone()))
    }
}

impl GameServer {
    /// Creates the server and the consumer of its event channel.
    #[must_use]
    pub fn new() -> (Self, EventDispatcher) {
        let (joined_tx, joined_rx) = mpsc::channel();
        let (events_tx, events_rx) = mpsc::channel();
        let server = Self {
            players: BTreeMap::new(),
            joined: joined_rx,
            lobby: Lobby {
                next_id: Arc::new(AtomicU32::new(1)),
                joined: joined_tx,
                events: events_tx,
            },
        };
        (server, EventDispatcher { events: events_rx })
    }

    #[must_use]
    pub fn lobby(&self) -> Lobby {
        self.lobby.clone()
    }

    /// Shorthand for joining through the server's own lobby.
    pub fn join(
        &self,
        nickname: impl Into<String>,
        host: impl Into<String>,
        board: Board,
    ) -> Result<PlayerLoop, ServerClosedError> {
        self.lobby.join(nickname, host, board)
    }

    /// Moves every pending join into the registry. Returns how many arrived.
    pub fn collect_players(&mut self) -> usize {
        let mut count = 0;
        for info in self.joined.try_iter() {
            self.players.insert(info.id, info);
            count += 1;
        }
        count
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.players.values()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.get(&id)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<PlayerInfo> {
        self.players.remove(&id)
    }

    /// Tears the server down and returns the final registry.
    ///
    /// Lobby handles cloned earlier can no longer join. The dispatcher keeps
    /// delivering events until every player loop has ended.
    #[must_use]
    pub fn shutdown(mut self) -> Vec<PlayerInfo> {
        self.collect_players();
        self.players.into_values().collect()
    }
}

/// Single consumer of the player event channel.
#[derive(Debug)]
pub struct EventDispatcher {
    events: mpsc::Receiver<PlayerEvent>,
}

impl EventDispatcher {
    /// Blocks until the next event arrives.
    ///
    /// Returns `None` once the server and every player loop are gone.
    #[must_use]
    pub fn next_event(&self) -> Option<PlayerEvent> {
        self.events.recv().ok()
    }

    /// Hands each event to `handler` until it breaks or the channel closes.
    pub fn for_each<F>(&self, mut handler: F)
    where
        F: FnMut(PlayerEvent) -> ControlFlow<()>,
    {
        while let Some(event) = self.next_event() {
            if handler(event).is_break() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread, time::Duration};

    use crate::{Command, PieceSequence};

    use super::*;

    fn board(kinds: &str) -> Board {
        let source: PieceSequence = kinds.parse().unwrap();
        Board::with_source(10, 20, Box::new(source)).unwrap()
    }

    #[test]
    fn test_collect_players_from_lobby_threads() {
        let (mut server, _dispatcher) = GameServer::new();
        let handles: Vec<_> = (0..3)
            .map(|i| {
                let lobby = server.lobby();
                thread::spawn(move || {
                    lobby
                        .join(format!("player{i}"), "localhost", board("T"))
                        .unwrap()
                        .player()
                        .info()
                        .id
                })
            })
            .collect();
        let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();

        assert_eq!(server.collect_players(), 3);
        assert_eq!(server.collect_players(), 0);
        let registered: Vec<_> = server.players().map(|info| info.id).collect();
        assert_eq!(registered, ids);
        assert_eq!(ids, [PlayerId(1), PlayerId(2), PlayerId(3)]);
    }

    #[test]
    fn test_remove_player() {
        let (mut server, _dispatcher) = GameServer::new();
        let player_loop = server.join("bob", "10.0.0.2", board("O")).unwrap();
        let id = player_loop.player().info().id;
        server.collect_players();

        assert_eq!(server.player(id).map(|p| p.nickname.as_str()), Some("bob"));
        assert_eq!(server.remove_player(id).map(|p| p.host), Some("10.0.0.2".to_owned()));
        assert!(server.player(id).is_none());
    }

    #[test]
    fn test_join_after_shutdown_fails() {
        let (server, _dispatcher) = GameServer::new();
        let lobby = server.lobby();
        let _ = server.join("early", "localhost", board("I")).unwrap();

        let registry = server.shutdown();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry[0].nickname, "early");
        assert_eq!(
            lobby.join("late", "localhost", board("I")).unwrap_err(),
            ServerClosedError
        );
    }

    #[test]
    fn test_dispatcher_receives_events_from_player_thread() {
        let (server, dispatcher) = GameServer::new();
        let player_loop = server.join("carol", "localhost", board("O")).unwrap();
        let (commands, rx) = mpsc::channel();
        let player = thread::spawn(move || player_loop.run(&rx, Duration::from_mins(1)));

        commands.send(Command::MoveLeft).unwrap();
        commands.send(Command::Drop).unwrap();
        drop(commands);

        let mut changes = 0;
        let mut summary = None;
        dispatcher.for_each(|event| match event {
            PlayerEvent::BoardChanged { .. } => {
                changes += 1;
                ControlFlow::Continue(())
            }
            PlayerEvent::Left(s) => {
                summary = Some(s);
                ControlFlow::Break(())
            }
        });

        assert_eq!(changes, 3);
        let summary = summary.unwrap();
        assert_eq!(summary, player.join().unwrap());
        assert_eq!(summary.info.nickname, "carol");
        assert_eq!(server.shutdown().len(), 1);
    }
}
