//! `termite-vte`: a byte-oriented VT100/VT220/xterm escape-sequence parser.
//!
//! [`Parser::advance`] feeds raw PTY output through the state machine in
//! [`transitions`] and dispatches decoded print/control/CSI/OSC/DCS events to
//! an [`Actor`] implementation — `termite-term`'s `Screen` is the only one in
//! this workspace, but the trait has no dependency on it.

mod actor;
mod csi;
mod enums;
mod parser;
mod transitions;
mod utf8;

pub use actor::Actor;
pub use csi::CsiParam;
pub use parser::Parser;
