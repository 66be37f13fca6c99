//! Paginated terminal viewer
//!
//! Browses a one-time snapshot of a table in fixed-size windows. Window
//! movement lives in [`window`] and has no side effects; [`Reader`] adds the
//! screen and the prompt.

pub mod error;
pub mod grid;
pub mod input;
pub mod reader;
pub mod window;

pub use error::{ViewerError, ViewerResult};
pub use grid::Dataset;
pub use input::{key_action, CommandInput, KeyAction, LineInput, TerminalInput};
pub use reader::Reader;
pub use window::{Command, Step, ViewWindow};
