//! Command input for the reader loop

use std::io::{self, BufRead, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use unicode_width::UnicodeWidthChar;

/// Source of operator commands
pub trait CommandInput {
    /// Next command line, or `None` on end of input or an interrupt
    fn read_command(&mut self) -> io::Result<Option<String>>;
}

/// One command per line from any buffered reader
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> CommandInput for LineInput<R> {
    fn read_command(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

/// Effect of one key press on the line being typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Push(char),
    Backspace,
    Submit,
    Interrupt,
    Ignore,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Interrupt
        }
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Char(c) => KeyAction::Push(c),
        _ => KeyAction::Ignore,
    }
}

/// Keyboard input read in raw mode, so Ctrl+C arrives as a key press
/// instead of terminating the process.
pub struct TerminalInput<W: Write> {
    echo: W,
}

impl<W: Write> TerminalInput<W> {
    pub fn new(echo: W) -> Self {
        Self { echo }
    }
}

impl<W: Write> CommandInput for TerminalInput<W> {
    fn read_command(&mut self) -> io::Result<Option<String>> {
        let _raw = RawMode::enable()?;
        let mut line = String::new();

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match key_action(&key) {
                KeyAction::Push(c) => {
                    line.push(c);
                    execute!(self.echo, Print(c))?;
                }
                KeyAction::Backspace => {
                    if let Some(c) = line.pop() {
                        let width = c.width().unwrap_or(1).max(1) as u16;
                        execute!(self.echo, cursor::MoveLeft(width), Clear(ClearType::UntilNewLine))?;
                    }
                }
                KeyAction::Submit => {
                    execute!(self.echo, Print("\r\n"))?;
                    return Ok(Some(line));
                }
                KeyAction::Interrupt => {
                    execute!(self.echo, Print("\r\n"))?;
                    return Ok(None);
                }
                KeyAction::Ignore => {}
            }
        }
    }
}

// Raw mode lasts for one command; dropping restores the terminal even on error.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_input() {
        let mut input = LineInput::new(Cursor::new("+\nx"));
        assert_eq!(input.read_command().unwrap().as_deref(), Some("+\n"));
        assert_eq!(input.read_command().unwrap().as_deref(), Some("x"));
        assert_eq!(input.read_command().unwrap(), None);
    }

    #[test]
    fn test_ctrl_c_and_ctrl_d_interrupt() {
        for c in ['c', 'd'] {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
            assert_eq!(key_action(&key), KeyAction::Interrupt);
        }
        let plain = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(key_action(&plain), KeyAction::Push('d'));
    }

    #[test]
    fn test_key_actions() {
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(key_action(&enter), KeyAction::Submit);
        let back = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(key_action(&back), KeyAction::Backspace);
        let shifted = KeyEvent::new(KeyCode::Char('>'), KeyModifiers::SHIFT);
        assert_eq!(key_action(&shifted), KeyAction::Push('>'));
        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(key_action(&up), KeyAction::Ignore);
        let release = KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(key_action(&release), KeyAction::Ignore);
    }
}
