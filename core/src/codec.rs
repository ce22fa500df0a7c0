use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use core::fmt::Write;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

const CELL_TERMINATOR: char = ';';
const MINE_COUNT_MARKER: i8 = -1;

/// `(row, col)` as persisted: a `{"row": r, "col": c}` object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: Coord,
    pub col: Coord,
}

impl From<Coord2> for Position {
    fn from((row, col): Coord2) -> Self {
        Self { row, col }
    }
}

impl From<Position> for Coord2 {
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}

/// Frozen projection of a game in progress, key-compatible with older saves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGameState {
    pub difficulty: Difficulty,
    pub mines: CellCount,
    #[serde(rename = "markedMinesCount")]
    pub marked_count: CellCount,
    #[serde(rename = "dugCellsCount")]
    pub dug_count: CellCount,
    /// `-1` when the clock never started.
    pub elapsed_seconds: i64,
    #[serde(rename = "firstDugCellPos")]
    pub first_dug: Option<Position>,
    pub mine_positions: Vec<Position>,
    pub rows: Coord,
    pub cols: Coord,
    pub encoded_grid: String,
}

impl SavedGameState {
    pub fn from_engine(engine: &GridEngine, now: DateTime<Utc>) -> Self {
        Self {
            difficulty: engine.difficulty(),
            mines: engine.mines(),
            marked_count: engine.marked_count(),
            dug_count: engine.dug_count(),
            elapsed_seconds: engine.elapsed_secs(now).unwrap_or(-1),
            first_dug: engine.first_dug().map(Position::from),
            mine_positions: engine
                .mine_positions()
                .iter()
                .copied()
                .map(Position::from)
                .collect(),
            rows: engine.rows(),
            cols: engine.cols(),
            encoded_grid: encode_grid(engine.cells()),
        }
    }

    /// Validates the record against its own grid and rebuilds the engine.
    /// The clock stays paused until [`GridEngine::resume_game`].
    pub fn into_engine(self, seed: u64) -> core::result::Result<GridEngine, DecodeError> {
        let size = (self.rows, self.cols);
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidBoardShape.into());
        }

        let grid = decode_grid(&self.encoded_grid, size)?;
        let positions: Vec<Coord2> = self.mine_positions.iter().copied().map(Coord2::from).collect();
        let layout = MineLayout::from_mine_coords(size, &positions)?;
        if usize::from(layout.mine_count()) != positions.len() || layout.mine_count() != self.mines {
            return Err(DecodeError::Counts);
        }

        for (index, ((row, col), cell)) in grid.indexed_iter().enumerate() {
            let coords = (row as Coord, col as Coord);
            let reason = if cell.is_mine != layout.contains_mine(coords) {
                "mine flag disagrees with mine positions"
            } else if cell.is_mine && cell.is_dug {
                "dug mine in an unfinished game"
            } else if !cell.is_mine && cell.mines_around != layout.adjacent_mine_count(coords) {
                "wrong adjacent mine count"
            } else {
                continue;
            };
            return Err(DecodeError::Cell {
                index,
                reason: reason.to_owned(),
            });
        }

        let dug = grid.iter().filter(|cell| cell.is_dug).count();
        let marked = grid.iter().filter(|cell| cell.is_marked).count();
        if dug != usize::from(self.dug_count) || marked != usize::from(self.marked_count) {
            return Err(DecodeError::Counts);
        }

        let first_dug = self.first_dug.map(Coord2::from);
        if let Some(pos) = first_dug {
            layout.validate_coords(pos)?;
        }

        let saved_elapsed = (self.elapsed_seconds >= 0).then_some(self.elapsed_seconds);
        log::debug!(
            "Restored {} game, {dug} dug, {marked} marked",
            self.difficulty
        );

        Ok(GridEngine::restore(
            self.difficulty,
            layout,
            grid,
            first_dug,
            saved_elapsed,
            seed,
        ))
    }
}

/// Serializes the engine into the saved-game JSON record.
pub fn encode(engine: &GridEngine, now: DateTime<Utc>) -> String {
    serde_json::to_string(&SavedGameState::from_engine(engine, now))
        .expect("saved game state has only string keys")
}

pub fn decode(encoded: &str, seed: u64) -> core::result::Result<GridEngine, DecodeError> {
    serde_json::from_str::<SavedGameState>(encoded)?.into_engine(seed)
}

/// Row-major `{flags}{mines_around};` per cell, mines written as `-1`.
pub fn encode_grid(cells: &Array2<GridCell>) -> String {
    let mut out = String::with_capacity(cells.len() * 3);
    for cell in cells {
        let count = if cell.is_mine {
            MINE_COUNT_MARKER
        } else {
            cell.mines_around as i8
        };
        // writing into a String cannot fail
        let _ = write!(out, "{}{}{}", cell.flags().bits(), count, CELL_TERMINATOR);
    }
    out
}

pub fn decode_grid(
    encoded: &str,
    size: Coord2,
) -> core::result::Result<Array2<GridCell>, DecodeError> {
    let Some(body) = encoded.strip_suffix(CELL_TERMINATOR) else {
        return Err(GameError::InvalidBoardShape.into());
    };

    let cells = body
        .split(CELL_TERMINATOR)
        .enumerate()
        .map(|(index, token)| decode_cell(index, token))
        .collect::<core::result::Result<Vec<_>, _>>()?;

    Array2::from_shape_vec(size.to_nd_index(), cells)
        .map_err(|_| GameError::InvalidBoardShape.into())
}

fn decode_cell(index: usize, token: &str) -> core::result::Result<GridCell, DecodeError> {
    let malformed = |reason: &str| DecodeError::Cell {
        index,
        reason: reason.to_owned(),
    };

    let mut chars = token.chars();
    let bits = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .and_then(|digit| u8::try_from(digit).ok())
        .ok_or_else(|| malformed("missing flags digit"))?;
    let flags = CellFlags::from_bits(bits).ok_or_else(|| malformed("unknown flag bits"))?;
    let count: i8 = chars
        .as_str()
        .parse()
        .map_err(|_| malformed("unreadable mine count"))?;

    let is_mine = flags.contains(CellFlags::MINE);
    let is_dug = flags.contains(CellFlags::DUG);
    let is_marked = flags.contains(CellFlags::MARKED);

    if is_dug && is_marked {
        return Err(malformed("cell is both dug and marked"));
    }
    let mines_around = match (is_mine, count) {
        (true, MINE_COUNT_MARKER) => 0,
        (false, 0..=8) => count as u8,
        _ => return Err(malformed("mine count out of range")),
    };

    Ok(GridCell {
        is_mine,
        is_dug,
        is_marked,
        mines_around,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(secs * 1000).unwrap()
    }

    fn played_engine() -> GridEngine {
        let layout = MineLayout::from_mine_coords((4, 5), &[(0, 4), (2, 4), (3, 0)]).unwrap();
        let mut engine = GridEngine::from_layout(Difficulty::Hard, layout, 11);
        engine.dig_cell((0, 0), at(0)).unwrap();
        engine.mark_cell((3, 0)).unwrap();
        engine.mark_cell((1, 4)).unwrap();
        engine
    }

    #[test]
    fn untouched_row_encodes_flags_then_count() {
        let layout = MineLayout::from_mine_coords((1, 3), &[(0, 2)]).unwrap();
        let engine = GridEngine::from_layout(Difficulty::Easy, layout, 0);

        assert_eq!(encode_grid(engine.cells()), "00;01;4-1;");
    }

    #[test]
    fn record_keeps_camel_case_keys() {
        let layout = MineLayout::from_mine_coords((1, 3), &[(0, 2)]).unwrap();
        let engine = GridEngine::from_layout(Difficulty::Medium, layout, 0);

        let json = encode(&engine, at(0));

        assert!(json.contains("\"difficulty\":1"));
        assert!(json.contains("\"markedMinesCount\":0"));
        assert!(json.contains("\"dugCellsCount\":0"));
        assert!(json.contains("\"elapsedSeconds\":-1"));
        assert!(json.contains("\"firstDugCellPos\":null"));
        assert!(json.contains("\"minePositions\":[{\"row\":0,\"col\":2}]"));
        assert!(json.contains("\"encodedGrid\":\"00;01;4-1;\""));
    }

    #[test]
    fn round_trip_restores_cells_counters_and_clock() {
        let engine = played_engine();

        let restored = decode(&encode(&engine, at(30)), 0).unwrap();

        assert_eq!(restored.cells(), engine.cells());
        assert_eq!(restored.difficulty(), Difficulty::Hard);
        assert_eq!(restored.mine_positions(), engine.mine_positions());
        assert_eq!(restored.first_dug(), Some((0, 0)));
        assert_eq!(restored.dug_count(), engine.dug_count());
        assert_eq!(restored.marked_count(), 2);
        assert_eq!(restored.elapsed_secs(at(90)), Some(30));

        let mut resumed = restored;
        resumed.resume_game(at(100));
        assert_eq!(resumed.elapsed_secs(at(105)), Some(35));
        assert_eq!(encode(&resumed, at(100)), encode(&engine, at(30)));
    }

    #[test]
    fn garbage_json_is_rejected() {
        assert!(matches!(decode("not a save", 0), Err(DecodeError::Json(_))));
    }

    #[test]
    fn tampered_grid_is_rejected() {
        let engine = played_engine();
        let mut state = SavedGameState::from_engine(&engine, at(5));

        let mut short = state.clone();
        let len = short.encoded_grid.len();
        short.encoded_grid.truncate(len - "01;".len());
        assert!(matches!(
            short.into_engine(0),
            Err(DecodeError::Grid(GameError::InvalidBoardShape))
        ));

        let mut both = state.clone();
        both.encoded_grid = both.encoded_grid.replacen("20;", "30;", 1);
        assert!(matches!(
            both.into_engine(0),
            Err(DecodeError::Cell { index: 0, .. })
        ));

        state.dug_count += 1;
        assert!(matches!(state.into_engine(0), Err(DecodeError::Counts)));
    }
}
