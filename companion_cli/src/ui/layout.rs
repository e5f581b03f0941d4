//! Geometry and input mapping for the terminal front-end.
//!
//! The core works in pixel-like units; a terminal reports cells. Each cell is
//! treated as a `CELL_WIDTH_PX` x `CELL_HEIGHT_PX` block so a one-cell move is
//! large enough to register as motion for the tilt rule.

use companion_core::persona::Rgb;
use companion_core::AnimalKind;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;
use unicode_width::UnicodeWidthStr;

pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// Widest a remark bubble's text may get, in columns.
pub const MAX_BUBBLE_TEXT_WIDTH: u16 = 36;

/// Rows reserved for the control panel at the bottom of the screen.
pub const PANEL_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Quit,
    SelectPersona(AnimalKind),
    ToggleRemarks,
}

/// Splits the screen into the stage the companion roams and the control
/// panel below it.
pub fn split_screen(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(PANEL_HEIGHT)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Centre of a terminal cell in pointer units.
pub fn cell_to_point(column: u16, row: u16) -> (f32, f32) {
    (
        column as f32 * CELL_WIDTH_PX + CELL_WIDTH_PX / 2.0,
        row as f32 * CELL_HEIGHT_PX + CELL_HEIGHT_PX / 2.0,
    )
}

/// Cell containing a point, clamped into `area`.
pub fn point_to_cell(x: f32, y: f32, area: Rect) -> (u16, u16) {
    let column = (x / CELL_WIDTH_PX).floor().max(0.0) as u16;
    let row = (y / CELL_HEIGHT_PX).floor().max(0.0) as u16;
    (
        column.clamp(area.x, area.right().saturating_sub(1).max(area.x)),
        row.clamp(area.y, area.bottom().saturating_sub(1).max(area.y)),
    )
}

/// Marker drawn beside the glyph on the side it leans towards.
pub fn lean_marker(tilt: f32) -> &'static str {
    if tilt >= 15.0 {
        "//"
    } else if tilt >= 3.0 {
        "/"
    } else if tilt <= -15.0 {
        "\\\\"
    } else if tilt <= -3.0 {
        "\\"
    } else {
        ""
    }
}

/// Animated ellipsis shown while a remark is being generated.
pub fn thinking_dots(frame: usize) -> &'static str {
    ["·", "··", "···"][(frame / 20) % 3]
}

/// Greedy word wrap on display width. Words wider than `width` get a line
/// of their own.
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    let width = width.max(1) as usize;
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Box for a bubble holding `lines`, placed above `anchor` when there is room
/// and below it otherwise, and kept inside `area`.
pub fn bubble_rect(anchor: (u16, u16), lines: &[String], area: Rect) -> Rect {
    let text_width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    // One column of padding and one of border on each side.
    let width = (text_width + 4).min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);

    let (anchor_x, anchor_y) = anchor;
    let y = if anchor_y >= area.y + height {
        anchor_y - height
    } else {
        (anchor_y + 1).min(area.bottom().saturating_sub(height))
    };
    let x = anchor_x
        .saturating_sub(width / 2)
        .clamp(area.x, area.right().saturating_sub(width).max(area.x));

    Rect::new(x, y, width, height)
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Maps a key press to a front-end action. Releases and repeats are ignored.
pub fn action_for_key(key: KeyEvent) -> Option<UiAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(UiAction::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(UiAction::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UiAction::ToggleRemarks),
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            Some(UiAction::SelectPersona(AnimalKind::ALL[index]))
        }
        _ => None,
    }
}
