//! Interactive reader loop
//!
//! The reader owns one snapshot of the table. Each turn clears the screen,
//! draws the current window and reads one command line.

use std::io::Write;

use crossterm::{
    cursor, execute,
    style::Print,
    terminal::{Clear, ClearType},
};

use moneygrowth_core::{Row, TableManager};

use crate::error::ViewerResult;
use crate::grid::{status_line, Dataset};
use crate::input::CommandInput;
use crate::window::{Command, Step, ViewWindow};

const TITLE: &str = "Database Viewer";
const CONTROLS: &str = "Controls: [+][-] Rows | [>][<] Columns | (x) Exit";
const PROMPT: &str = "Action: ";

/// Paginated viewer over a local snapshot
pub struct Reader {
    dataset: Dataset,
    window: ViewWindow,
    max_cell_width: usize,
}

impl Reader {
    pub fn new(rows: &[Row], row_limit: usize, col_limit: usize, max_cell_width: usize) -> Self {
        let dataset = Dataset::from_rows(rows);
        let window = ViewWindow::new(dataset.row_count(), dataset.column_count(), row_limit, col_limit);
        Self {
            dataset,
            window,
            max_cell_width,
        }
    }

    /// Fetch every row once and build a reader over them
    pub async fn load(
        manager: &TableManager,
        row_limit: usize,
        col_limit: usize,
        max_cell_width: usize,
    ) -> ViewerResult<Self> {
        let rows = manager.fetch_all().await?;
        if rows.is_empty() {
            log::warn!(target: "moneygrowth::viewer", "table {} is empty", manager.spec().table);
        } else {
            log::debug!(target: "moneygrowth::viewer", "loaded {} rows", rows.len());
        }
        Ok(Self::new(&rows, row_limit, col_limit, max_cell_width))
    }

    pub fn window(&self) -> &ViewWindow {
        &self.window
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Draw the current window
    pub fn render<W: Write>(&self, output: &mut W) -> ViewerResult<()> {
        execute!(output, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        writeln!(output, "{}", TITLE)?;
        for line in self.dataset.render(&self.window, self.max_cell_width) {
            writeln!(output, "{}", line)?;
        }
        writeln!(output, "{}", status_line(&self.window))?;
        writeln!(output)?;
        writeln!(output, "{}", CONTROLS)?;
        execute!(output, Print("\n"), Print(PROMPT))?;
        Ok(())
    }

    /// Run until an exit command, end of input or an interrupt
    pub fn show<I: CommandInput, W: Write>(&mut self, input: &mut I, output: &mut W) -> ViewerResult<()> {
        loop {
            self.render(output)?;

            let Some(line) = input.read_command()? else {
                return Ok(());
            };

            match self.window.step(Command::parse(&line)) {
                Step::Continue(window) => self.window = window,
                Step::Exit => return Ok(()),
            }
        }
    }
}
