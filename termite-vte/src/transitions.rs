//! Transition table for the terminal escape-sequence state machine.
//!
//! The parser is driven by a table mirroring the DEC/ECMA-48 specification:
//! given the current [`PhaseState`] and an input byte, [`PhaseState::advance`]
//! returns the next phase and the [`StepAction`] the parser should perform.
//! Grouping the table as methods on `PhaseState` (one per control-sequence
//! family: ESC, CSI, DCS, OSC, SOS/PM/APC, UTF-8) keeps each family's rows
//! together and makes it easy to audit coverage family by family.

use crate::enums::{PhaseState, StepAction};

impl PhaseState {
    /// Transitions valid from any phase: C1 controls and the handful of
    /// single-byte introducers that can interrupt whatever sequence is in
    /// flight.
    #[inline(always)]
    const fn common(self, byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x18 | 0x1a | 0x80..=0x8f | 0x91..=0x97 | 0x99 | 0x9a => (Ground, Execute),
            0x9c => (Ground, None),
            0x1b => (Escape, None),
            0x98 | 0x9e | 0x9f => (SosPmApcString, None),
            0x90 => (DcsEntry, None),
            0x9d => (OscString, None),
            0x9b => (CsiEntry, None),
            _ => (self, None),
        }
    }

    /// Ground: printable data and C0 controls, the idle state between
    /// sequences.
    #[inline(always)]
    const fn on_ground(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (Ground, Execute),
            0x20..=0x7f => (Ground, Print),
            0xc2..=0xf4 => (Utf8Sequence, Utf8),
            _ => Ground.common(byte),
        }
    }

    /// Escape: waiting for the next byte to identify the sequence family.
    #[inline(always)]
    const fn on_escape(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (Escape, Execute),
            0x7f => (Escape, Ignore),
            0x20..=0x2f => (EscapeIntermediate, Collect),
            0x30..=0x4f | 0x51..=0x57 | 0x59 | 0x5a | 0x5c | 0x60..=0x7e => (Ground, EscDispatch),
            0x5b => (CsiEntry, None),
            0x5d => (OscString, None),
            0x50 => (DcsEntry, None),
            0x58 | 0x5e | 0x5f => (SosPmApcString, None),
            _ => Escape.common(byte),
        }
    }

    /// Escape-intermediate: collecting intermediate bytes before dispatch.
    #[inline(always)]
    const fn on_escape_intermediate(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (EscapeIntermediate, Execute),
            0x20..=0x2f => (EscapeIntermediate, Collect),
            0x7f => (EscapeIntermediate, Ignore),
            0x30..=0x7e => (Ground, EscDispatch),
            _ => EscapeIntermediate.common(byte),
        }
    }

    /// CSI-entry: validates the introducer and routes the first parameter
    /// byte.
    #[inline(always)]
    const fn on_csi_entry(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (CsiEntry, Execute),
            0x7f => (CsiEntry, Ignore),
            0x20..=0x2f => (CsiIntermediate, Collect),
            0x3a => (CsiIgnore, None),
            0x30..=0x39 | 0x3b => (CsiParam, Param),
            0x3c..=0x3f => (CsiParam, Collect),
            0x40..=0x7e => (Ground, CsiDispatch),
            _ => CsiEntry.common(byte),
        }
    }

    /// CSI-param: numeric fields and separators.
    #[inline(always)]
    const fn on_csi_param(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (CsiParam, Execute),
            0x30..=0x3b => (CsiParam, Param),
            0x7f => (CsiParam, Ignore),
            0x3c..=0x3f => (CsiIgnore, None),
            0x20..=0x2f => (CsiIntermediate, Collect),
            0x40..=0x7e => (Ground, CsiDispatch),
            _ => CsiParam.common(byte),
        }
    }

    /// CSI-intermediate: extra bytes collected prior to dispatch.
    #[inline(always)]
    const fn on_csi_intermediate(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (CsiIntermediate, Execute),
            0x20..=0x2f => (CsiIntermediate, Collect),
            0x7f => (CsiIntermediate, Ignore),
            0x30..=0x3f => (CsiIntermediate, None),
            0x40..=0x7e => (Ground, CsiDispatch),
            _ => CsiIntermediate.common(byte),
        }
    }

    /// CSI-ignore: swallows bytes after an invalid introducer.
    #[inline(always)]
    const fn on_csi_ignore(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (CsiIgnore, Execute),
            0x20..=0x3f | 0x7f => (CsiIgnore, Ignore),
            0x40..=0x7e => (Ground, None),
            _ => CsiIgnore.common(byte),
        }
    }

    /// DCS-entry: collects the introducer and prepares parameters.
    #[inline(always)]
    const fn on_dcs_entry(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (DcsEntry, Execute),
            0x7f => (DcsEntry, Ignore),
            0x3a => (DcsIgnore, None),
            0x20..=0x2f => (DcsIntermediate, Collect),
            0x30..=0x39 | 0x3b => (DcsParam, Param),
            0x3c..=0x3f => (DcsParam, Collect),
            0x40..=0x7e => (DcsPassthrough, None),
            _ => DcsEntry.common(byte),
        }
    }

    /// DCS-param: the `on_csi_param` equivalent for DCS strings.
    #[inline(always)]
    const fn on_dcs_param(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x7f => (DcsParam, Ignore),
            0x30..=0x39 | 0x3b => (DcsParam, Param),
            0x3a | 0x3c..=0x3f => (DcsIgnore, None),
            0x20..=0x2f => (DcsIntermediate, Collect),
            0x40..=0x7e => (DcsPassthrough, None),
            _ => DcsParam.common(byte),
        }
    }

    /// DCS-intermediate: bytes collected prior to entering passthrough.
    #[inline(always)]
    const fn on_dcs_intermediate(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x7f => (DcsIntermediate, Ignore),
            0x20..=0x2f => (DcsIntermediate, Collect),
            0x30..=0x3f => (DcsIgnore, None),
            0x40..=0x7e => (DcsPassthrough, None),
            _ => DcsIntermediate.common(byte),
        }
    }

    /// DCS-passthrough: forwards the payload to the active hook handler.
    #[inline(always)]
    const fn on_dcs_passthrough(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            // String Terminator (ST) in 8-bit form.
            0x9c => (Ground, None),
            // DCS payload is effectively a byte stream (sixel, app-specific
            // protocols); accept high-bit bytes as payload too, otherwise a
            // UTF-8 continuation byte (0x80..=0xbf) reads as a C1 control and
            // prematurely ends the DCS.
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x20..=0x7e | 0x80..=0x9b | 0x9d..=0xff => {
                (DcsPassthrough, Put)
            },
            0x7f => (DcsPassthrough, Ignore),
            _ => DcsPassthrough.common(byte),
        }
    }

    /// DCS-ignore: swallows bytes after a malformed sequence.
    #[inline(always)]
    const fn on_dcs_ignore(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            // String Terminator (ST) in 8-bit form.
            0x9c => (Ground, None),
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x20..=0x7f | 0x80..=0x9b | 0x9d..=0xff => {
                (DcsIgnore, Ignore)
            },
            _ => DcsIgnore.common(byte),
        }
    }

    /// OSC-string: payload collection until BEL or ST.
    #[inline(always)]
    const fn on_osc_string(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x06 | 0x08..=0x17 | 0x19 | 0x1c..=0x1f => (OscString, Ignore),
            0x07 => (Ground, Ignore),
            0x20..=0x7f => (OscString, OscPut),
            0xc2..=0xf4 => (Utf8Sequence, Utf8),
            _ => OscString.common(byte),
        }
    }

    /// SOS/PM/APC-string: mirrors OSC but with no dispatch of its own.
    #[inline(always)]
    const fn on_sos_pm_apc_string(byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;
        use StepAction::*;

        match byte {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x20..=0x7f => (SosPmApcString, Ignore),
            _ => SosPmApcString.common(byte),
        }
    }

    /// Action to run when entering this phase, before the next byte is read.
    #[inline(always)]
    pub(crate) const fn enter_action(self) -> StepAction {
        use PhaseState::*;
        use StepAction::*;

        match self {
            Escape | CsiEntry | DcsEntry => Clear,
            DcsPassthrough => Hook,
            OscString => OscStart,
            Ground
            | EscapeIntermediate
            | CsiParam
            | CsiIntermediate
            | CsiIgnore
            | DcsParam
            | DcsIntermediate
            | DcsIgnore
            | SosPmApcString
            | Anywhere
            | Utf8Sequence
            | Nothing => None,
        }
    }

    /// Action to run when leaving this phase, typically finalizing buffers.
    #[inline(always)]
    pub(crate) const fn leave_action(self) -> StepAction {
        use PhaseState::*;
        use StepAction::*;

        match self {
            DcsPassthrough => Unhook,
            OscString => OscEnd,
            Ground
            | Escape
            | EscapeIntermediate
            | CsiEntry
            | CsiParam
            | CsiIntermediate
            | CsiIgnore
            | DcsEntry
            | DcsParam
            | DcsIntermediate
            | DcsIgnore
            | SosPmApcString
            | Anywhere
            | Utf8Sequence
            | Nothing => None,
        }
    }

    /// Action to run for a decoded byte when no state transition applies,
    /// i.e. the fallback branch of UTF-8 handling.
    #[inline(always)]
    pub(crate) const fn utf8_fallback_action(self) -> StepAction {
        use PhaseState::*;
        use StepAction::*;

        match self {
            Ground => Print,
            OscString => OscPut,
            _ => None,
        }
    }

    /// Looks up the next phase and the action to run for `byte` from the
    /// current phase.
    #[inline(always)]
    pub(crate) const fn advance(self, byte: u8) -> (PhaseState, StepAction) {
        use PhaseState::*;

        match self {
            Ground => Self::on_ground(byte),
            Escape => Self::on_escape(byte),
            EscapeIntermediate => Self::on_escape_intermediate(byte),
            CsiEntry => Self::on_csi_entry(byte),
            CsiParam => Self::on_csi_param(byte),
            CsiIntermediate => Self::on_csi_intermediate(byte),
            CsiIgnore => Self::on_csi_ignore(byte),
            DcsEntry => Self::on_dcs_entry(byte),
            DcsParam => Self::on_dcs_param(byte),
            DcsIntermediate => Self::on_dcs_intermediate(byte),
            DcsIgnore => Self::on_dcs_ignore(byte),
            DcsPassthrough => Self::on_dcs_passthrough(byte),
            OscString => Self::on_osc_string(byte),
            SosPmApcString => Self::on_sos_pm_apc_string(byte),
            Anywhere => Anywhere.common(byte),
            Utf8Sequence | Nothing => (Nothing, StepAction::None),
        }
    }
}
