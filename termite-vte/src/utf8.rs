//! Incremental UTF-8 decoding used while the state machine sits in
//! [`PhaseState::Utf8Sequence`](crate::enums::PhaseState::Utf8Sequence).

use crate::enums::PhaseState;
use utf8parse::Receiver;

/// Collects at most one decoded codepoint from a single `advance` call.
#[derive(Default)]
pub(crate) struct CodepointSink {
    decoded: Option<char>,
}

impl CodepointSink {
    pub fn take(self) -> Option<char> {
        self.decoded
    }
}

impl Receiver for CodepointSink {
    fn codepoint(&mut self, c: char) {
        self.decoded = Some(c);
    }

    fn invalid_sequence(&mut self) {
        self.codepoint(char::REPLACEMENT_CHARACTER);
    }
}

/// Wraps `utf8parse::Parser` together with the phase the byte stream was in
/// before a multi-byte sequence started, so the outer parser can resume
/// where it left off once the codepoint is complete.
#[derive(Default)]
pub(crate) struct Utf8Cursor {
    resume_phase: PhaseState,
    inner: utf8parse::Parser,
}

impl Utf8Cursor {
    pub(crate) fn resume_phase(&self) -> PhaseState {
        self.resume_phase
    }

    pub(crate) fn set_resume_phase(&mut self, phase: PhaseState) {
        self.resume_phase = phase;
    }

    pub(crate) fn advance(&mut self, byte: u8) -> CodepointSink {
        let mut sink = CodepointSink::default();
        self.inner.advance(&mut sink, byte);
        sink
    }
}
