//! Terminal mode tracking.
//!
//! Public modes (`CSI Pm h` / `CSI Pm l`) and private DEC modes
//! (`CSI ? Pm h` / `CSI ? Pm l`) share the same numeric code space, so a
//! private mode's code is shifted left by 5 bits before being stored. This
//! lets [`Modes`] hold both families in a single set without collisions,
//! mirroring the scheme used by the terminal this engine's behavior is
//! modeled on.
use std::collections::BTreeSet;

const PRIVATE_SHIFT: u16 = 5;

/// A standard (public) ANSI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedMode {
    /// IRM: insert mode.
    Insert,
}

impl NamedMode {
    pub fn raw(self) -> u16 {
        match self {
            Self::Insert => 4,
        }
    }
}

/// A private DEC mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedPrivateMode {
    /// DECCKM: application cursor keys.
    CursorKeys,
    /// DECCOLM: 80/132 column mode.
    ColumnMode,
    /// DECOM: origin mode.
    Origin,
    /// DECAWM: autowrap mode.
    AutoWrap,
    /// DECSCNM: reverse video.
    ReverseVideo,
    /// DECTCEM: cursor visibility.
    ShowCursor,
    /// Swap to/from the alternate screen buffer, saving/restoring the
    /// cursor.
    AlternateScreen,
}

impl NamedPrivateMode {
    pub fn raw(self) -> u16 {
        match self {
            Self::CursorKeys => 1,
            Self::ColumnMode => 3,
            Self::Origin => 6,
            Self::AutoWrap => 7,
            Self::ReverseVideo => 5,
            Self::ShowCursor => 25,
            Self::AlternateScreen => 1049,
        }
    }

    fn encoded(self) -> u16 {
        self.raw() << PRIVATE_SHIFT
    }
}

/// Set of enabled mode codes, public and private sharing one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modes(BTreeSet<u16>);

impl Modes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_public(&mut self, mode: NamedMode) {
        self.0.insert(mode.raw());
    }

    pub fn reset_public(&mut self, mode: NamedMode) {
        self.0.remove(&mode.raw());
    }

    pub fn contains_public(&self, mode: NamedMode) -> bool {
        self.0.contains(&mode.raw())
    }

    pub fn set_private(&mut self, mode: NamedPrivateMode) {
        self.0.insert(mode.encoded());
    }

    pub fn reset_private(&mut self, mode: NamedPrivateMode) {
        self.0.remove(&mode.encoded());
    }

    pub fn contains_private(&self, mode: NamedPrivateMode) -> bool {
        self.0.contains(&mode.encoded())
    }

    /// Insert a mode by raw numeric code, honoring the private/public
    /// distinction the way `CSI ? ... h` vs `CSI ... h` do.
    pub fn set_raw(&mut self, code: u16, private: bool) {
        self.0.insert(if private { code << PRIVATE_SHIFT } else { code });
    }

    pub fn reset_raw(&mut self, code: u16, private: bool) {
        self.0.remove(&if private { code << PRIVATE_SHIFT } else { code });
    }
}

impl Default for NamedMode {
    fn default() -> Self {
        Self::Insert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_and_private_modes_do_not_collide() {
        let mut modes = Modes::new();
        // Private mode 1 (DECCKM) and public mode 1 (GATM, unused here but
        // exercised via set_raw) must not alias to the same slot.
        modes.set_raw(1, true);
        modes.set_raw(1, false);
        assert!(modes.contains_private(NamedPrivateMode::CursorKeys));
        modes.reset_raw(1, false);
        assert!(modes.contains_private(NamedPrivateMode::CursorKeys));
    }

    #[test]
    fn set_reset_round_trip_is_a_no_op() {
        let mut modes = Modes::new();
        modes.set_public(NamedMode::Insert);
        modes.reset_public(NamedMode::Insert);
        assert_eq!(modes, Modes::new());
    }
}
