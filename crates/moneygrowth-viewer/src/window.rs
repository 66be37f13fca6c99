//! Window state for the paginated viewer
//!
//! Transitions are pure: a [`ViewWindow`] plus a [`Command`] yields the next
//! window or an exit, with no I/O involved.

use std::ops::Range;

/// One operator command read from the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PageDown,
    PageUp,
    ScrollRight,
    ScrollLeft,
    Exit,
    Unknown,
}

impl Command {
    /// Parse a trimmed, case-insensitive token
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "+" => Command::PageDown,
            "-" => Command::PageUp,
            ">" | "." | "d" => Command::ScrollRight,
            "<" | "," | "a" => Command::ScrollLeft,
            "x" | "q" => Command::Exit,
            _ => Command::Unknown,
        }
    }
}

/// Result of applying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue(ViewWindow),
    Exit,
}

/// Visible row/column slice over a dataset of fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    row_offset: usize,
    col_offset: usize,
    row_limit: usize,
    col_limit: usize,
    total_rows: usize,
    total_cols: usize,
}

impl ViewWindow {
    /// Window at the top-left corner. Zero limits are raised to 1.
    pub fn new(total_rows: usize, total_cols: usize, row_limit: usize, col_limit: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            row_limit: row_limit.max(1),
            col_limit: col_limit.max(1),
            total_rows,
            total_cols,
        }
    }

    #[inline]
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    pub fn col_offset(&self) -> usize {
        self.col_offset
    }

    #[inline]
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    #[inline]
    pub fn total_cols(&self) -> usize {
        self.total_cols
    }

    /// Visible row indexes, clipped to the data
    pub fn rows(&self) -> Range<usize> {
        clip(self.row_offset, self.row_limit, self.total_rows)
    }

    /// Visible column indexes, clipped to the data
    pub fn cols(&self) -> Range<usize> {
        clip(self.col_offset, self.col_limit, self.total_cols)
    }

    /// Apply a command
    pub fn step(self, command: Command) -> Step {
        let mut next = self;
        match command {
            Command::Exit => return Step::Exit,
            Command::PageDown => {
                next.row_offset = advance(self.row_offset, self.row_limit, self.total_rows)
            }
            Command::PageUp => next.row_offset = self.row_offset.saturating_sub(self.row_limit),
            Command::ScrollRight => {
                next.col_offset = advance(self.col_offset, self.col_limit, self.total_cols)
            }
            Command::ScrollLeft => next.col_offset = self.col_offset.saturating_sub(self.col_limit),
            Command::Unknown => {}
        }
        Step::Continue(next)
    }
}

// Only move forward when another full or partial window exists.
fn advance(offset: usize, limit: usize, total: usize) -> usize {
    match offset.checked_add(limit) {
        Some(next) if next < total => next,
        _ => offset,
    }
}

fn clip(offset: usize, limit: usize, total: usize) -> Range<usize> {
    let start = offset.min(total);
    start..offset.saturating_add(limit).min(total)
}
