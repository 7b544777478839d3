//! Error types for the per-pane virtual terminal.
//!
//! The VT state machine itself never fails: malformed or unsupported escape
//! sequences are ignored and parsing continues, matching how a real terminal
//! behaves in the face of a misbehaving child process. This module exists
//! for the handful of operations that do have a meaningful failure mode.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermError {
    #[error("screen dimensions must be non-zero (got {lines}x{columns})")]
    InvalidDimensions { lines: usize, columns: usize },
}
