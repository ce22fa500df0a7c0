use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tilesweep_core as game;
use game::{Difficulty, GameStore, SavedGame, TimeRecord};

const SAVED_GAMES_FILE: &str = "saved-games.json";
const TIME_RECORDS_FILE: &str = "time-records.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Keeps saved games and time records as two JSON lists in a directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn games(&self) -> Result<Vec<SavedGame>, StoreError> {
        read_list(&self.dir.join(SAVED_GAMES_FILE))
    }

    fn write_games(&self, games: &[SavedGame]) -> Result<(), StoreError> {
        write_list(&self.dir, SAVED_GAMES_FILE, games)
    }
}

impl GameStore for JsonFileStore {
    type Error = StoreError;

    fn load(&self, difficulty: Difficulty) -> Result<Option<SavedGame>, StoreError> {
        Ok(self
            .games()?
            .into_iter()
            .find(|game| game.difficulty == difficulty))
    }

    fn save(&mut self, game: SavedGame) -> Result<(), StoreError> {
        let mut games = self.games()?;
        games.retain(|saved| saved.difficulty != game.difficulty);
        games.push(game);
        self.write_games(&games)
    }

    fn delete(&mut self, difficulty: Difficulty) -> Result<(), StoreError> {
        let mut games = self.games()?;
        let before = games.len();
        games.retain(|saved| saved.difficulty != difficulty);
        if games.len() == before {
            return Ok(());
        }
        self.write_games(&games)
    }

    fn records(&self) -> Result<Vec<TimeRecord>, StoreError> {
        read_list(&self.dir.join(TIME_RECORDS_FILE))
    }

    fn push_record(&mut self, record: TimeRecord) -> Result<(), StoreError> {
        let mut records = self.records()?;
        records.push(record);
        write_list(&self.dir, TIME_RECORDS_FILE, &records)
    }
}

/// A missing file reads as an empty list.
fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_list<T: Serialize>(dir: &Path, file: &str, items: &[T]) -> Result<(), StoreError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let path = dir.join(file);
    let json = serde_json::to_string_pretty(items).map_err(|source| StoreError::Json {
        path: path.clone(),
        source,
    })?;
    log::trace!("Writing {} entries to {}", items.len(), path.display());
    fs::write(&path, json).map_err(io_error(&path))
}
