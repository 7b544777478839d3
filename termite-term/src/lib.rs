//! Per-pane virtual terminal: a VT100/VT220/xterm-subset screen buffer
//! driven by the `termite-vte` parser, plus the character diff used by the
//! multiplexer's redraw pipeline.
mod cell;
mod charset;
mod color;
mod cursor;
mod diff;
mod error;
mod mode;
mod screen;

pub use cell::Char;
pub use charset::Charset;
pub use color::{Color, NamedColor};
pub use cursor::Cursor;
pub use diff::{dump_character_diff, CharacterDiff, RowDiff};
pub use error::TermError;
pub use mode::{Modes, NamedMode, NamedPrivateMode};
pub use screen::Screen;
