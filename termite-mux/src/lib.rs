//! `termite-mux`: the tiled terminal multiplexer core.
//!
//! A [`Session`] owns a set of [`Window`]s, each holding a binary [`Layout`]
//! tree of [`Pane`]s. Pane output is fed in by a host event loop; the
//! session coalesces the resulting invalidations and drives one or more
//! [`Renderer`]s to emit the minimal ANSI diff for the next frame. Keystrokes
//! from the controlling terminal pass through an [`InputDispatcher`], which
//! pulls the Ctrl-A prefix-command grammar out of the stream before handing
//! the rest to the focused pane.
//!
//! This crate has no opinion on how bytes reach it: `termite-pty` supplies a
//! real Unix backend, but a host may wire in anything that implements
//! `termite_pty::Session`.

pub mod error;
pub mod input;
pub mod layout;
pub mod pane;
pub mod renderer;
pub mod session;
pub mod window;

pub use error::{MuxError, Result};
pub use input::{BindingAction, InputDispatcher, PREFIX_BYTE};
pub use layout::{Axis, Direction, Handle, Layout, Location};
pub use pane::{Pane, PaneId};
pub use renderer::{PipeRenderer, Renderer};
pub use session::{Redraw, Session, StatusBar};
pub use window::{Window, WindowId};
