use clap::{Parser, Subcommand};

use brickfall_engine::{Board, PieceGenerator, PieceSequence, PieceSource};

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play interactively in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Drive a board with random input and print the final state
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Options shared by every mode that creates a board.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BoardArg {
    /// Board width in cells
    #[clap(long, default_value_t = 10)]
    width: usize,
    /// Board height in cells
    #[clap(long, default_value_t = 20)]
    height: usize,
    /// Seed for the piece generator
    #[clap(long)]
    seed: Option<u64>,
    /// Fixed, repeating piece order (e.g. "IOTSZJL"); overrides --seed
    #[clap(long)]
    sequence: Option<PieceSequence>,
}

impl Default for BoardArg {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            seed: None,
            sequence: None,
        }
    }
}

impl BoardArg {
    pub(crate) fn build(&self) -> anyhow::Result<Board> {
        let source: Box<dyn PieceSource> = match (&self.sequence, self.seed) {
            (Some(sequence), _) => Box::new(sequence.clone()),
            (None, Some(seed)) => Box::new(PieceGenerator::with_seed(seed)),
            (None, None) => Box::new(PieceGenerator::new()),
        };
        let board = Board::with_source(self.width, self.height, source)?;
        Ok(board)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
