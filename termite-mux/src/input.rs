//! Prefix-command input dispatcher: a two-state byte-oriented state machine
//! that pulls Ctrl-A escapes out of the input stream before the remainder
//! reaches the focused pane.

use std::collections::HashMap;

use crate::session::Session;

/// Ctrl-A: the first byte of a prefix command.
pub const PREFIX_BYTE: u8 = 0x01;

enum State {
    Ground,
    ExpectBinding,
}

/// A bound prefix-command action. Receives the session so it can call
/// whichever method the binding maps to (`move_focus`, `kill_current_pane`,
/// ...); must be idempotent since a dropped or duplicated second byte never
/// re-invokes it twice in a row from the same keystroke.
pub type BindingAction = Box<dyn FnMut(&mut Session) + Send>;

/// Byte-by-byte parser: ordinary bytes are aggregated and forwarded to the
/// focused pane as one write; a Ctrl-A arms the next byte as a binding
/// lookup instead of forwarding it.
pub struct InputDispatcher {
    state: State,
    bindings: HashMap<u8, BindingAction>,
}

impl Default for InputDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self { state: State::Ground, bindings: HashMap::new() };
        dispatcher.bind(PREFIX_BYTE, |session: &mut Session| {
            let _ = session.send_input_to_current_pane(&[PREFIX_BYTE]);
        });
        dispatcher
    }
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the action invoked when `byte` follows Ctrl-A.
    pub fn bind(&mut self, byte: u8, action: impl FnMut(&mut Session) + Send + 'static) {
        self.bindings.insert(byte, Box::new(action));
    }

    /// Feed a chunk of input read from the controlling terminal through the
    /// state machine, applying bindings to `session` and forwarding the rest
    /// to the currently focused pane.
    pub fn process(&mut self, session: &mut Session, data: &[u8]) {
        let mut forward = Vec::with_capacity(data.len());

        for &byte in data {
            match self.state {
                State::Ground => {
                    if byte == PREFIX_BYTE {
                        self.state = State::ExpectBinding;
                    } else {
                        forward.push(byte);
                    }
                },
                State::ExpectBinding => {
                    self.state = State::Ground;
                    if !forward.is_empty() {
                        let _ = session.send_input_to_current_pane(&forward);
                        forward.clear();
                    }
                    if let Some(action) = self.bindings.get_mut(&byte) {
                        action(session);
                    }
                },
            }
        }

        if !forward.is_empty() {
            let _ = session.send_input_to_current_pane(&forward);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::process::ExitStatus;
    use std::sync::{Arc, Mutex};

    use termite_pty::{PtySize, Session as PtySession, SessionError};

    use super::*;
    use crate::layout::Location;
    use crate::pane::Pane;

    /// Records everything written to it, so a test can inspect what a
    /// dispatcher run actually forwarded to the pane's child process.
    #[derive(Clone, Default)]
    struct RecordingSession {
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl RecordingSession {
        fn written(&self) -> Vec<u8> {
            self.written.lock().unwrap().clone()
        }
    }

    impl PtySession for RecordingSession {
        fn read(&mut self, _buf: &mut [u8]) -> Result<usize, SessionError> {
            Ok(0)
        }
        fn write(&mut self, input: &[u8]) -> Result<usize, SessionError> {
            self.written.lock().unwrap().extend_from_slice(input);
            Ok(input.len())
        }
        fn resize(&mut self, _size: PtySize) -> Result<(), SessionError> {
            Ok(())
        }
        fn close(&mut self) -> Result<i32, SessionError> {
            Ok(0)
        }
        fn try_get_child_exit_status(&mut self) -> Result<Option<ExitStatus>, SessionError> {
            Ok(None)
        }
    }

    fn session_with_one_pane() -> (Session, RecordingSession) {
        let recording = RecordingSession::default();
        let mut session = Session::new(80, 24);
        session.add_window();
        let pane = Pane::new(
            0,
            Box::new(recording.clone()),
            Location { px: 0, py: 0, sx: 80, sy: 23 },
        );
        session.active_window_mut().unwrap().add_pane(pane, true).unwrap();
        (session, recording)
    }

    #[test]
    fn ordinary_bytes_forward_untouched() {
        let (mut session, recording) = session_with_one_pane();
        let mut dispatcher = InputDispatcher::new();
        dispatcher.process(&mut session, b"ls\n");
        assert_eq!(recording.written(), b"ls\n");
    }

    #[test]
    fn ctrl_a_then_unbound_byte_forwards_neither() {
        let (mut session, recording) = session_with_one_pane();
        let mut dispatcher = InputDispatcher::new();
        dispatcher.process(&mut session, b"\x01z");
        assert_eq!(recording.written(), b"");
    }

    #[test]
    fn ctrl_a_twice_forwards_one_literal_ctrl_a() {
        let (mut session, recording) = session_with_one_pane();
        let mut dispatcher = InputDispatcher::new();
        dispatcher.process(&mut session, b"\x01\x01");
        assert_eq!(recording.written(), b"\x01");
    }

    #[test]
    fn custom_binding_runs_and_consumes_both_bytes() {
        let (mut session, recording) = session_with_one_pane();
        let mut dispatcher = InputDispatcher::new();
        dispatcher.bind(b'n', |session: &mut Session| session.focus_next_window());
        session.add_window();
        let first = session.active_window().map(|w| w.id());
        dispatcher.process(&mut session, b"\x01n");
        let second = session.active_window().map(|w| w.id());
        assert_ne!(first, second);
        assert_eq!(recording.written(), b"");
    }

    #[test]
    fn split_chunk_still_arms_across_process_calls() {
        let (mut session, recording) = session_with_one_pane();
        let mut dispatcher = InputDispatcher::new();
        dispatcher.process(&mut session, b"\x01");
        dispatcher.process(&mut session, b"\x01");
        assert_eq!(recording.written(), b"\x01");
    }
}
