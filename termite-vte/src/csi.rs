//! A single parameter of a CSI escape sequence.
//!
//! ECMA-48 defines a CSI sequence as `CSI P...P I...I F`, where `P` bytes
//! (the parameter bytes, 0x30-0x3F) carry digits and separators, `I` bytes
//! (0x20-0x2F) are intermediates, and `F` (0x40-0x7E) is the final byte that
//! selects the operation. `CSI 3 m` and `CSI 3 ; 4 m` both set SGR
//! attributes with one or two [`CsiParam::Integer`] values; `CSI 4 : 3 m`
//! (a curly underline) mixes in a [`CsiParam::P`] colon separator, since a
//! parameter byte can be digits, `;`, `:`, or one of `<=>?` — the last of
//! which marks a private-mode sequence such as DECSET/DECRST (`CSI ? 1 h`).

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CsiParam {
    Integer(i64),
    P(u8),
}

impl Default for CsiParam {
    fn default() -> Self {
        Self::Integer(0)
    }
}

impl CsiParam {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// True for the `?` parameter byte that marks a private-mode DECSET/
    /// DECRST sequence, e.g. the leading parameter of `CSI ? 1049 h`.
    pub fn is_private_marker(&self) -> bool {
        matches!(self, Self::P(b'?'))
    }
}
