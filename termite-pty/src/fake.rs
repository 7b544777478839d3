//! In-memory [`Session`](crate::Session) double for tests that exercise the
//! pane/renderer pipeline without forking a real process.

use std::collections::VecDeque;
use std::process::ExitStatus;

use crate::{PtySize, Session, SessionError};

/// A [`Session`] backed by in-memory byte queues instead of a real pty.
///
/// `feed` simulates bytes arriving from the "child" (consumed by `read`);
/// bytes handed to `write` accumulate and can be inspected with `written`.
#[derive(Debug, Default)]
pub struct FakeSession {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    last_size: Option<PtySize>,
    closed: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the child process had produced them.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Bytes written to this session so far (what the "child" received).
    pub fn written(&self) -> &[u8] {
        &self.outbound
    }

    /// The most recent size set via [`Session::resize`].
    pub fn last_size(&self) -> Option<PtySize> {
        self.last_size
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Session for FakeSession {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SessionError> {
        let mut n = 0;
        while n < buf.len() {
            match self.inbound.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                },
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, input: &[u8]) -> Result<usize, SessionError> {
        self.outbound.extend_from_slice(input);
        Ok(input.len())
    }

    fn resize(&mut self, size: PtySize) -> Result<(), SessionError> {
        self.last_size = Some(size);
        Ok(())
    }

    fn close(&mut self) -> Result<i32, SessionError> {
        self.closed = true;
        Ok(0)
    }

    fn try_get_child_exit_status(&mut self) -> Result<Option<ExitStatus>, SessionError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_drains_fed_bytes_in_order() {
        let mut session = FakeSession::new();
        session.feed(b"hello");

        let mut buf = [0u8; 3];
        assert_eq!(session.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");

        let mut buf = [0u8; 8];
        assert_eq!(session.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
    }

    #[test]
    fn write_accumulates_and_resize_is_recorded() {
        let mut session = FakeSession::new();
        session.write(b"echo hi\n").unwrap();
        assert_eq!(session.written(), b"echo hi\n");

        let size = PtySize {
            rows: 40,
            cols: 100,
            cell_width: 0,
            cell_height: 0,
        };
        session.resize(size).unwrap();
        assert_eq!(session.last_size(), Some(size));
    }

    #[test]
    fn close_marks_session_closed() {
        let mut session = FakeSession::new();
        assert!(!session.is_closed());
        session.close().unwrap();
        assert!(session.is_closed());
    }
}
