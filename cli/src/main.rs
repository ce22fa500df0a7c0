use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::io::{self, BufRead, Write};
use tilesweep_canvas::{DrawCommand, FrameEvent, FrameLoop};
use tilesweep_cli::*;
use tilesweep_core as game;

const FRAME_MS: f64 = 1000.0 / 60.0;
/// Upper bound on frames drawn between two commands.
const MAX_SETTLE_FRAMES: u32 = 600;

fn random_seed() -> u64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

/// Runs frames until the animations are idle, returning the draw commands issued.
fn settle_animations(
    session: &mut GameSession<JsonFileStore>,
    frames: &mut FrameLoop,
    clock_ms: &mut f64,
) -> usize {
    let mut surface: Vec<DrawCommand> = Vec::new();
    for _ in 0..MAX_SETTLE_FRAMES {
        let Some(delta_ms) = frames.tick(*clock_ms) else {
            break;
        };
        *clock_ms += FRAME_MS;

        for event in session.advance(delta_ms, &mut surface) {
            if let FrameEvent::MineShown(coords) = event {
                log::trace!("mine shown at {coords:?}");
            }
        }
        if session.animations().is_idle() {
            break;
        }
    }
    surface.len()
}

fn print_records(session: &GameSession<JsonFileStore>) -> anyhow::Result<()> {
    let records = game::GameStore::records(session.store())?;
    let ranked = game::ranked_records(&records, session.difficulty());
    if ranked.is_empty() {
        println!("No {} times yet", session.difficulty());
    }
    for (place, record) in ranked.iter().enumerate().take(10) {
        println!("{:>2}. {}", place + 1, format_elapsed(record.time));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let seed = args.seed.unwrap_or_else(random_seed);
    log::debug!("seed: {seed:?}");

    let store = JsonFileStore::new(&args.data_dir);
    let mut session = if args.new {
        GameSession::new(store, args.difficulty, seed, args.cell_size)
    } else {
        GameSession::open(store, args.difficulty, seed, args.cell_size)
    }
    .with_context(|| format!("Could not open {}", args.data_dir.display()))?;
    if let Some((width, height)) = session.animations().surface_size() {
        log::debug!("Drawing on a {width}x{height} surface");
    }

    let mut frames = FrameLoop::new();
    frames.start();
    let mut clock_ms = 0.0;
    let mut next_seed = seed;

    let stdin = io::stdin();
    loop {
        let drawn = settle_animations(&mut session, &mut frames, &mut clock_ms);
        log::trace!("{drawn} draw commands");
        print!("{}> ", render_board(session.engine(), Utc::now()));
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let now = Utc::now();
        let report = match command {
            Command::Dig(coords) => session.dig(coords, now)?,
            Command::Mark(coords) => session.toggle_mark(coords, now)?,
            Command::Chord(coords) => session.chord(coords, now)?,
            Command::Pause => {
                session.pause(now)?;
                continue;
            }
            Command::Resume => {
                session.resume(now);
                continue;
            }
            Command::New => {
                next_seed = next_seed.wrapping_add(1);
                session.abandon(next_seed)?;
                continue;
            }
            Command::Records => {
                print_records(&session)?;
                continue;
            }
            Command::Quit => break,
        };

        match report.status {
            game::StatusCode::Error => println!("Not possible here"),
            game::StatusCode::DugMine => println!("Boom"),
            game::StatusCode::HasWon => println!("Cleared"),
            game::StatusCode::Success | game::StatusCode::MinesChanged => {}
        }
    }

    frames.stop();
    session
        .pause(Utc::now())
        .context("Could not save the game on exit")?;
    Ok(())
}
