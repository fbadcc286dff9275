use std::io::{self, Write as _};

use brickfall_engine::{Board, BoardSnapshot, TickOutcome};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::command::BoardArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    pub(super) board: BoardArg,
    /// Number of gravity ticks to run
    #[clap(long, default_value_t = 200)]
    ticks: usize,
    /// Seed for the random input; defaults to the piece seed
    #[clap(long)]
    input_seed: Option<u64>,
    /// Print the result as JSON instead of text
    #[clap(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    ticks: usize,
    locked_bricks: usize,
    topped_out: bool,
    board: BoardSnapshot,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        board,
        ticks,
        input_seed,
        json,
    } = arg;

    let input_seed = input_seed
        .or(board.seed)
        .unwrap_or_else(|| rand::rng().random());
    eprintln!("Simulating {ticks} ticks (input seed {input_seed})...");

    let mut board = board.build()?;
    let mut rng = Pcg32::seed_from_u64(input_seed);
    let report = simulate(&mut board, &mut rng, *ticks);
    eprintln!(
        "Finished after {} ticks: {} bricks locked{}",
        report.ticks,
        report.locked_bricks,
        if report.topped_out { ", topped out" } else { "" }
    );

    let mut stdout = io::stdout().lock();
    if *json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", report.board)?;
    }
    Ok(())
}

/// Applies one random input per tick, then gravity, until `ticks` ran out or
/// the board tops out.
fn simulate(board: &mut Board, rng: &mut Pcg32, ticks: usize) -> SimulationReport {
    let mut report = SimulationReport {
        ticks: 0,
        locked_bricks: 0,
        topped_out: false,
        board: board.snapshot(),
    };
    while report.ticks < ticks {
        match rng.random_range(0..6) {
            0 => _ = board.move_left(),
            1 => _ = board.move_right(),
            2 => _ = board.move_down(),
            3 => _ = board.rotate(),
            4 => _ = board.hard_drop(),
            _ => {}
        }
        report.ticks += 1;
        if let TickOutcome::Locked { topped_out } = board.tick() {
            report.locked_bricks += 1;
            if topped_out {
                report.topped_out = true;
                break;
            }
        }
    }
    report.board = board.snapshot();
    report
}
