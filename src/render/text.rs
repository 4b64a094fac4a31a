/// Plain-text drawing of a board for terminals

use std::fmt::Write;

use crate::domain::ViewMode;
use crate::render::{plural, BoardView, CardView, DialogView};

const NAME_WIDTH: usize = 24;
const GRID_ROWS: usize = 7;

fn name_column(card: &CardView, select_mode: bool) -> String {
    let marker = match (select_mode, card.selected) {
        (true, true) => "[x] ",
        (true, false) => "[ ] ",
        _ => "",
    };
    let label: String = card.name.chars().take(NAME_WIDTH - 1 - marker.len()).collect();
    format!("{:<width$}", format!("{}{}", marker, label), width = NAME_WIDTH)
}

fn weekly(board: &BoardView, out: &mut String) {
    let Some(first) = board.cards.first() else {
        return;
    };

    let mut header = " ".repeat(NAME_WIDTH);
    for day in &first.days {
        let _ = write!(header, "{:>4}", day.weekday);
    }
    let _ = writeln!(out, "{}", header.trim_end());

    for card in &board.cards {
        let mut line = name_column(card, board.select_mode);
        for day in &card.days {
            let mark = if day.completed { '●' } else { '○' };
            let _ = write!(line, "{:>4}", mark);
        }
        let _ = writeln!(out, "{}  ({})", line, card.color);
    }
}

fn overview(board: &BoardView, out: &mut String) {
    for card in &board.cards {
        let _ = writeln!(out, "{}({})", name_column(card, board.select_mode), card.color);
        for row in 0..GRID_ROWS {
            let line: String = card
                .days
                .iter()
                .skip(row)
                .step_by(GRID_ROWS)
                .map(|day| if day.completed { '■' } else { '·' })
                .collect();
            let _ = writeln!(out, "  {}", line);
        }
    }
}

/// Draw `board` as lines of text
pub fn render_text(board: &BoardView) -> String {
    let mut out = String::new();
    let mode = match board.view_mode {
        ViewMode::Weekly => "Weekly",
        ViewMode::Overview => "Overview",
    };
    let count = board.cards.len();
    let _ = writeln!(out, "{} · {} {}", mode, count, plural(count, "habit", "habits"));

    if board.select_mode {
        let _ = writeln!(out, "Select mode: {} selected", board.selected_count);
    }

    match board.view_mode {
        ViewMode::Weekly => weekly(board, &mut out),
        ViewMode::Overview => overview(board, &mut out),
    }

    if let Some(menu) = &board.context_menu {
        let _ = writeln!(out, "\nMenu for {}: edit · select · delete · recolor", menu.habit_id);
    }

    match &board.dialog {
        Some(DialogView::ConfirmDelete { title, message })
        | Some(DialogView::ConfirmImport { title, message }) => {
            let _ = writeln!(out, "\n{}\n{}", title, message);
        }
        Some(DialogView::ColorPicker { swatches, .. }) => {
            let keys: Vec<String> = swatches.iter().map(|s| s.color.to_string()).collect();
            let _ = writeln!(out, "\nChoose a color: {}", keys.join(" "));
        }
        None => {}
    }

    out
}
