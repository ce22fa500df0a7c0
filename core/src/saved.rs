use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use core::convert::Infallible;
use serde::{Deserialize, Serialize};

use crate::*;

/// Store envelope around an encoded game, at most one per difficulty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub encoded_game: String,
    pub difficulty: Difficulty,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl SavedGame {
    pub fn new(engine: &GridEngine, now: DateTime<Utc>) -> Self {
        Self {
            encoded_game: encode(engine, now),
            difficulty: engine.difficulty(),
            created_at: now.timestamp_millis(),
        }
    }

    pub fn restore(&self, seed: u64) -> core::result::Result<GridEngine, DecodeError> {
        decode(&self.encoded_game, seed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    pub id: String,
    /// Whole seconds.
    pub time: i64,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub difficulty: Difficulty,
}

impl TimeRecord {
    pub fn new(difficulty: Difficulty, time: i64, created_at: DateTime<Utc>) -> Self {
        let created_at = created_at.timestamp_millis();
        Self {
            id: format!("{}{}{}", u8::from(difficulty), time, created_at),
            time,
            created_at,
            difficulty,
        }
    }
}

/// Records of one difficulty, fastest first.
pub fn ranked_records(records: &[TimeRecord], difficulty: Difficulty) -> Vec<TimeRecord> {
    let mut ranked: Vec<_> = records
        .iter()
        .filter(|record| record.difficulty == difficulty)
        .cloned()
        .collect();
    ranked.sort_by_key(|record| (record.time, record.created_at));
    ranked
}

/// Persistence seam for saved games and time records.
pub trait GameStore {
    type Error;

    fn load(&self, difficulty: Difficulty) -> core::result::Result<Option<SavedGame>, Self::Error>;

    /// Replaces any saved game of the same difficulty.
    fn save(&mut self, game: SavedGame) -> core::result::Result<(), Self::Error>;

    fn delete(&mut self, difficulty: Difficulty) -> core::result::Result<(), Self::Error>;

    fn records(&self) -> core::result::Result<Vec<TimeRecord>, Self::Error>;

    fn push_record(&mut self, record: TimeRecord) -> core::result::Result<(), Self::Error>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    games: Vec<SavedGame>,
    records: Vec<TimeRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn games(&self) -> &[SavedGame] {
        &self.games
    }
}

impl GameStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, difficulty: Difficulty) -> core::result::Result<Option<SavedGame>, Infallible> {
        Ok(self
            .games
            .iter()
            .find(|game| game.difficulty == difficulty)
            .cloned())
    }

    fn save(&mut self, game: SavedGame) -> core::result::Result<(), Infallible> {
        self.games.retain(|saved| saved.difficulty != game.difficulty);
        self.games.push(game);
        Ok(())
    }

    fn delete(&mut self, difficulty: Difficulty) -> core::result::Result<(), Infallible> {
        self.games.retain(|saved| saved.difficulty != difficulty);
        Ok(())
    }

    fn records(&self) -> core::result::Result<Vec<TimeRecord>, Infallible> {
        Ok(self.records.clone())
    }

    fn push_record(&mut self, record: TimeRecord) -> core::result::Result<(), Infallible> {
        self.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn record_id_joins_difficulty_time_and_timestamp() {
        let record = TimeRecord::new(Difficulty::Hard, 95, at(1_700_000_000_123));

        assert_eq!(record.id, "2951700000000123");
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":"2951700000000123","time":95,"createdAt":1700000000123,"difficulty":2}"#
        );
    }

    #[test]
    fn memory_store_keeps_one_game_per_difficulty() {
        let mut store = MemoryStore::new();
        let layout = MineLayout::from_mine_coords((4, 4), &[(3, 3)]).unwrap();
        let engine = GridEngine::from_layout(Difficulty::Easy, layout, 0);

        store.save(SavedGame::new(&engine, at(1))).unwrap();
        store.save(SavedGame::new(&engine, at(2))).unwrap();

        assert_eq!(store.games().len(), 1);
        let saved = store.load(Difficulty::Easy).unwrap().unwrap();
        assert_eq!(saved.created_at, 2);
        assert_eq!(saved.restore(0).unwrap().cells(), engine.cells());
        assert_eq!(store.load(Difficulty::Huge).unwrap(), None);

        store.delete(Difficulty::Easy).unwrap();
        assert_eq!(store.load(Difficulty::Easy).unwrap(), None);
    }

    #[test]
    fn ranking_filters_and_sorts_by_time() {
        let records = [
            TimeRecord::new(Difficulty::Easy, 40, at(3)),
            TimeRecord::new(Difficulty::Medium, 10, at(2)),
            TimeRecord::new(Difficulty::Easy, 25, at(1)),
        ];

        let ranked = ranked_records(&records, Difficulty::Easy);

        assert_eq!(
            ranked.iter().map(|record| record.time).collect::<Vec<_>>(),
            [25, 40]
        );
    }
}
