//! TUI rendering traits for agenda types.
//!
//! Extension traits that add colored terminal rendering to agenda-core
//! types using owo_colors.

use agenda_core::error_log::{ErrorKind, ErrorRecord};
use agenda_core::grid::{DayCell, DepartmentGlyphs, MonthGrid};
use agenda_core::special_days::Background;
use agenda_core::sync::{DiffKind, SyncChange};
use agenda_core::Event;
use owo_colors::OwoColorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width of one day column, borders excluded.
const CELL_WIDTH: usize = 20;

const WEEKDAYS: [&str; 7] = ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam", "Dim"];

const MONTHS: [&str; 12] = [
    "Janvier", "Février", "Mars", "Avril", "Mai", "Juin", "Juillet", "Août", "Septembre",
    "Octobre", "Novembre", "Décembre",
];

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        match self {
            DiffKind::Create => self.to_string().green().to_string(),
            DiffKind::Delete => self.to_string().red().to_string(),
        }
    }
}

impl Render for SyncChange {
    fn render(&self) -> String {
        let label = match self.kind {
            DiffKind::Create => self.label.green().to_string(),
            DiffKind::Delete => self.label.red().to_string(),
        };
        let context = format!("{} [{}]", self.date, self.department);

        format!("{} {} {}", self.kind.render(), label, context.dimmed())
    }
}

impl Render for ErrorKind {
    fn render(&self) -> String {
        match self {
            ErrorKind::Data => self.to_string().yellow().to_string(),
            ErrorKind::Sync => self.to_string().red().to_string(),
            ErrorKind::Parse => self.to_string().magenta().to_string(),
        }
    }
}

impl Render for ErrorRecord {
    fn render(&self) -> String {
        let location = if self.row_ref.is_empty() {
            &self.department
        } else {
            &self.row_ref
        };

        let mut line = format!(
            "{} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            self.kind.render(),
            location.bold(),
            self.description
        );
        if !self.details.is_empty() {
            line.push_str(&format!(" {}", format!("({})", self.details).dimmed()));
        }
        line
    }
}

/// One event as a list line: time, title, department tag.
pub fn render_event_line(event: &Event) -> String {
    let time = if event.has_time {
        event.start.format("%H:%M").to_string()
    } else {
        "all-day".to_string()
    };
    let tag = format!("[{}]", event.department);

    format!("  {:>7} {} {}", time, event.title, tag.dimmed())
}

pub fn month_title(grid: &MonthGrid) -> String {
    let name = MONTHS[(grid.month as usize + 11) % 12];
    format!("{} {}", name, grid.year)
}

/// A month as a 7-column box of multi-line day cells.
pub fn render_month(grid: &MonthGrid, glyphs: &DepartmentGlyphs) -> String {
    let border = format!("+{}", format!("{}+", "-".repeat(CELL_WIDTH)).repeat(7));
    let mut lines = vec![month_title(grid).bold().to_string(), border.clone()];

    let header: String = WEEKDAYS
        .iter()
        .map(|d| format!("|{}", fit(d, CELL_WIDTH).bold()))
        .collect();
    lines.push(format!("{header}|"));
    lines.push(border.clone());

    for week in &grid.weeks {
        let blocks: Vec<Vec<String>> = week
            .iter()
            .map(|cell| cell.as_ref().map(|c| c.lines(glyphs)).unwrap_or_default())
            .collect();
        let height = blocks.iter().map(Vec::len).max().unwrap_or(0).max(1);

        for row in 0..height {
            let mut line = String::new();
            for (cell, block) in week.iter().zip(&blocks) {
                let text = fit(block.get(row).map(String::as_str).unwrap_or(""), CELL_WIDTH);
                line.push('|');
                line.push_str(&paint(cell.as_ref(), row, text));
            }
            line.push('|');
            lines.push(line);
        }
        lines.push(border.clone());
    }

    lines.join("\n")
}

fn paint(cell: Option<&DayCell>, row: usize, text: String) -> String {
    let Some(cell) = cell else {
        return text;
    };

    let text = if row == 0 && cell.is_today {
        text.bold().underline().to_string()
    } else {
        text
    };

    match cell.background {
        Background::StaffAbsence => text.on_red().to_string(),
        Background::PublicHoliday => text.on_magenta().to_string(),
        Background::SchoolBreak => text.on_blue().to_string(),
        Background::Weekend => text.on_bright_black().to_string(),
        Background::None => text,
    }
}

/// Truncate or pad `text` to exactly `width` terminal columns.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return format!("{}{}", text, " ".repeat(width - text.width()));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
