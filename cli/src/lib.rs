use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tilesweep_core as game;

pub use render::*;
pub use session::*;
pub use store::*;

mod render;
mod session;
mod store;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// What log level to use
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Board preset: easy, medium, hard, huge or extreme
    #[arg(short, long, default_value_t = game::Difficulty::Easy)]
    pub difficulty: game::Difficulty,

    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Where saved games and time records are kept
    #[arg(long, default_value = ".tilesweep")]
    pub data_dir: PathBuf,

    /// Cell size in pixels handed to the animation engine
    #[arg(long, default_value_t = 32.0)]
    pub cell_size: f32,

    /// Discard the saved game of this difficulty
    #[arg(long)]
    pub new: bool,
}

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Dig(game::Coord2),
    Mark(game::Coord2),
    Chord(game::Coord2),
    Pause,
    Resume,
    New,
    Records,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command {0:?}, try d/m/c ROW COL, p, r, n, t or q")]
    Unknown(String),
    #[error("Expected ROW COL after the command")]
    MissingCoords,
    #[error("{0:?} is not a valid row or column")]
    BadCoord(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };

        let mut coords = || -> Result<game::Coord2, CommandError> {
            let mut next = || -> Result<game::Coord, CommandError> {
                let word = words.next().ok_or(CommandError::MissingCoords)?;
                word.parse::<game::Coord>()
                    .map_err(|_| CommandError::BadCoord(word.to_string()))
            };
            Ok((next()?, next()?))
        };

        match name {
            "d" | "dig" => Ok(Command::Dig(coords()?)),
            "m" | "mark" => Ok(Command::Mark(coords()?)),
            "c" | "chord" => Ok(Command::Chord(coords()?)),
            "p" | "pause" => Ok(Command::Pause),
            "r" | "resume" => Ok(Command::Resume),
            "n" | "new" => Ok(Command::New),
            "t" | "times" => Ok(Command::Records),
            "q" | "quit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
