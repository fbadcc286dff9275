use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
    time::Duration,
};

use brickfall_engine::{
    BoardSnapshot, Command, EventDispatcher, GameServer, PlayerEvent, PlayerId, PlayerSummary,
};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Flex, Layout},
    text::Line,
    widgets::Block,
};

use crate::{
    command::BoardArg,
    ui::widgets::{BoardDisplay, color, style},
};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    board: BoardArg,
    /// Milliseconds between gravity ticks
    #[clap(long, default_value_t = 500)]
    gravity_ms: u64,
    /// Name shown above the board
    #[clap(long, default_value = "player")]
    nickname: String,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            board: BoardArg::default(),
            gravity_ms: 500,
            nickname: "player".to_owned(),
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        board,
        gravity_ms,
        nickname,
    } = arg;

    let board = board.build()?;
    let (mut server, dispatcher) = GameServer::new();
    let player_loop = server.join(nickname.as_str(), "localhost", board)?;
    server.collect_players();

    let (commands_tx, commands_rx) = mpsc::channel();
    let gravity = Duration::from_millis(*gravity_ms);
    let player = thread::spawn(move || player_loop.run(&commands_rx, gravity));

    let running = Arc::new(AtomicBool::new(true));
    let input = {
        let running = Arc::clone(&running);
        thread::spawn(move || forward_input(&commands_tx, &running))
    };

    let mut terminal = ratatui::init();
    let session = Session::new(&server);
    let result = session.run(&mut terminal, &dispatcher);
    ratatui::restore();

    running.store(false, Ordering::Relaxed);
    input
        .join()
        .map_err(|_| anyhow::anyhow!("input thread panicked"))??;
    let summary = player
        .join()
        .map_err(|_| anyhow::anyhow!("player thread panicked"))?;
    for info in server.shutdown() {
        eprintln!("{} ({}@{}) left", info.nickname, info.id, info.host);
    }
    result?;

    report(&summary);
    Ok(())
}

fn report(summary: &PlayerSummary) {
    let PlayerSummary {
        info,
        locked_bricks,
        topped_out,
    } = summary;
    let end = if *topped_out { "topped out" } else { "quit" };
    eprintln!("{}: {locked_bricks} bricks locked, {end}", info.nickname);
}

/// Reads terminal keys and forwards them as commands until `q` is pressed,
/// the player loop goes away, or `running` is cleared.
fn forward_input(commands: &mpsc::Sender<Command>, running: &AtomicBool) -> anyhow::Result<()> {
    while running.load(Ordering::Relaxed) {
        if !event::poll(INPUT_POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.code == KeyCode::Char('q') {
            break;
        }
        if let Some(command) = key_command(key.code)
            && commands.send(command).is_err()
        {
            break;
        }
    }
    Ok(())
}

fn key_command(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Left | KeyCode::Char('h') => Command::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Command::MoveRight,
        KeyCode::Down | KeyCode::Char('j') => Command::MoveDown,
        KeyCode::Up | KeyCode::Char('k') => Command::Rotate,
        KeyCode::Char(' ') => Command::Drop,
        _ => return None,
    };
    Some(command)
}

/// Render state: the latest snapshot of every player.
#[derive(Debug)]
struct Session {
    names: BTreeMap<PlayerId, String>,
    boards: BTreeMap<PlayerId, BoardSnapshot>,
}

impl Session {
    fn new(server: &GameServer) -> Self {
        Self {
            names: server
                .players()
                .map(|info| (info.id, info.nickname.clone()))
                .collect(),
            boards: BTreeMap::new(),
        }
    }

    /// Redraws on every board change until the last player has left.
    fn run(
        mut self,
        terminal: &mut DefaultTerminal,
        dispatcher: &EventDispatcher,
    ) -> anyhow::Result<()> {
        while let Some(event) = dispatcher.next_event() {
            match event {
                PlayerEvent::BoardChanged { player, snapshot } => {
                    self.boards.insert(player, snapshot);
                    terminal.draw(|frame| self.draw(frame))?;
                }
                PlayerEvent::Left(summary) => {
                    self.names.remove(&summary.info.id);
                    if self.names.is_empty() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let displays: Vec<_> = self
            .boards
            .iter()
            .map(|(id, snapshot)| {
                let name = self.names.get(id).map_or("", String::as_str);
                BoardDisplay::new(snapshot).block(
                    Block::bordered()
                        .title(format!(" {name} "))
                        .border_style(color::WHITE)
                        .style(style::DEFAULT),
                )
            })
            .collect();
        let height = displays.iter().map(BoardDisplay::height).max().unwrap_or(0);

        let [board_area, help_area] =
            Layout::vertical([Constraint::Length(height), Constraint::Length(1)])
                .flex(Flex::Center)
                .areas(frame.area());
        let columns = Layout::horizontal(displays.iter().map(|d| Constraint::Length(d.width())))
            .flex(Flex::Center)
            .spacing(2)
            .split(board_area);
        for (display, area) in displays.iter().zip(columns.iter()) {
            frame.render_widget(display, *area);
        }
        frame.render_widget(
            Line::from("←/h →/l move  ↓/j down  ↑/k rotate  space drop  q quit")
                .style(style::DEFAULT)
                .centered(),
            help_area,
        );
    }
}
