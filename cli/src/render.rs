use std::fmt::Write;
use tilesweep_core as game;
use game::{EngineState, GridEngine};

/// `"1H 2M 3S"`, leaving out zero parts, `"0S"` for no time at all.
pub fn format_elapsed(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    let parts = [
        (total_secs / 3600, 'H'),
        (total_secs / 60 % 60, 'M'),
        (total_secs % 60, 'S'),
    ];

    let formatted = parts
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ");

    if formatted.is_empty() {
        "0S".to_string()
    } else {
        formatted
    }
}

fn cell_glyph(engine: &GridEngine, coords: game::Coord2) -> char {
    let cell = engine.cell_at(coords);
    let finished = engine.state().is_finished();

    if cell.is_dug && cell.is_mine {
        'X'
    } else if cell.is_dug {
        match cell.mines_around {
            0 => '.',
            count => char::from(b'0' + count),
        }
    } else if cell.is_marked && finished && !cell.is_mine {
        '!'
    } else if cell.is_marked {
        'F'
    } else if finished && cell.is_mine {
        '*'
    } else {
        '#'
    }
}

/// Plain text board with a header line and column indices.
pub fn render_board(engine: &GridEngine, now: chrono::DateTime<chrono::Utc>) -> String {
    let status = match engine.state() {
        EngineState::Ready if engine.is_paused() => "paused",
        EngineState::Ready => "ready",
        EngineState::Active => "playing",
        EngineState::Won => "won",
        EngineState::Lost => "lost",
    };
    let elapsed = engine.elapsed_secs(now).map_or_else(|| "0S".to_string(), format_elapsed);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} | {} | mines left {} | {}",
        engine.difficulty(),
        status,
        engine.mines_left(),
        elapsed
    );

    out.push_str("    ");
    for col in 0..engine.cols() {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');

    for row in 0..engine.rows() {
        let _ = write!(out, "{row:>3} ");
        for col in 0..engine.cols() {
            let _ = write!(out, "{:>3}", cell_glyph(engine, (row, col)));
        }
        out.push('\n');
    }
    out
}
