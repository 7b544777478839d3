//! PTY backend for termite panes.
//!
//! The multiplexer core treats a pane's child process as an external
//! collaborator: a byte sink for input and a byte source for output, plus a
//! resize hook. This crate supplies that collaborator on Unix by forking a
//! real pseudo terminal and exec'ing the pane's command, and a [`fake`]
//! in-memory double for tests that should not spawn a process.
//!
//! [`PYMUX_PANE`] is set in the child's environment before exec so scripts
//! run inside a pane can identify which one they're in.

mod errors;
pub mod fake;
mod size;
#[cfg(unix)]
mod unix;

use std::process::ExitStatus;

use mio::Token;

pub use crate::errors::SessionError;
pub use crate::size::PtySize;
#[cfg(unix)]
pub use unix::{UnixSession, UnixSessionBuilder, unix};

/// Name of the environment variable set in every pane's child process,
/// identifying which pane it is running in.
pub const PYMUX_PANE: &str = "PYMUX_PANE";

/// A pane's connection to its child process: a byte sink, a byte source, and
/// a resize/lifecycle surface. Implemented by a real PTY backend and by an
/// in-memory double for tests.
pub trait Session: Send {
    /// Read bytes produced by the child process.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SessionError>;

    /// Write bytes to be delivered to the child process's stdin.
    fn write(&mut self, input: &[u8]) -> Result<usize, SessionError>;

    /// Propagate a layout-driven resize to the pty slave (`TIOCSWINSZ`).
    fn resize(&mut self, size: PtySize) -> Result<(), SessionError>;

    /// Terminate the child process, returning its exit code if available.
    fn close(&mut self) -> Result<i32, SessionError>;

    /// Poll the child process for exit without blocking the event loop.
    fn try_get_child_exit_status(&mut self) -> Result<Option<ExitStatus>, SessionError>;
}

/// Integration point with a Mio-based event loop, matching the single
/// worker-thread concurrency model: the event loop polls readiness on the
/// pty master and a side channel for child-exit notification, and never
/// blocks inside a command method.
pub trait Pollable: Send {
    /// Register the session's file descriptors with the provided registry.
    fn register(
        &mut self,
        registry: &mio::Registry,
        interest: mio::Interest,
        io_token: Token,
        child_token: Token,
    ) -> Result<(), SessionError>;

    /// Update the interest set associated with the registered descriptors.
    fn reregister(
        &mut self,
        registry: &mio::Registry,
        interest: mio::Interest,
        io_token: Token,
        child_token: Token,
    ) -> Result<(), SessionError>;

    /// Remove the session's resources from the registry.
    fn deregister(&mut self, registry: &mio::Registry) -> Result<(), SessionError>;
}
