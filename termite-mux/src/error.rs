use std::io;

use thiserror::Error;

use termite_pty::SessionError;

/// Errors surfaced by the multiplexer core.
///
/// Most failure modes described by the design (malformed escape sequences,
/// unknown SGR attributes, out-of-range cursor motion) are policy-ignored
/// inside [`termite_term`] rather than raised here; this enum covers the
/// operations that do have a meaningful failure mode at the layout/session
/// level.
#[derive(Debug, Error)]
pub enum MuxError {
    /// A split, remove, or resize targeted a handle that does not belong to
    /// the addressed layout, or asked for an invalid direction.
    #[error("invalid layout operation: {0}")]
    Configuration(&'static str),

    /// A pane's child process could not be spawned.
    #[error("failed to start pane child process: {0}")]
    ChildProcess(#[from] SessionError),

    /// The renderer's output sink failed; per the error-handling design the
    /// caller should detach this renderer and keep the session running.
    #[error("renderer output failed: {0}")]
    RendererIo(io::Error),
}

pub type Result<T> = std::result::Result<T, MuxError>;
