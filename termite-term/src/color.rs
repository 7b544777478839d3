//! Cell color tagging.
//!
//! The core tracks only what xterm's 256-color palette needs: the eight
//! named ANSI colors, their bright variants, the terminal's default
//! foreground/background, and indexed palette entries. True color (24-bit
//! RGB) is out of scope, matching the VT220/xterm reference this engine
//! targets.

/// One of the eight standard ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl NamedColor {
    fn from_offset(offset: u16) -> Option<Self> {
        Some(match offset {
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            7 => Self::White,
            _ => return None,
        })
    }
}

/// A cell foreground or background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Named(NamedColor),
    Bright(NamedColor),
    /// Index into the 256-color palette.
    Indexed(u8),
}

impl NamedColor {
    fn offset(self) -> u16 {
        match self {
            Self::Black => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Blue => 4,
            Self::Magenta => 5,
            Self::Cyan => 6,
            Self::White => 7,
        }
    }
}

impl Color {
    /// Parse a standard SGR color code (30-37, 40-47, 90-97, 100-107).
    pub(crate) fn from_sgr(code: u16) -> Option<Self> {
        match code {
            30..=37 => NamedColor::from_offset(code - 30).map(Color::Named),
            40..=47 => NamedColor::from_offset(code - 40).map(Color::Named),
            90..=97 => NamedColor::from_offset(code - 90).map(Color::Bright),
            100..=107 => NamedColor::from_offset(code - 100).map(Color::Bright),
            _ => None,
        }
    }

    /// The SGR foreground code for this color, for the named/bright/default
    /// cases. Indexed colors use the `38;5;N` form instead and have no
    /// single-code representation.
    pub fn sgr_foreground_code(self) -> Option<u16> {
        match self {
            Self::Default => Some(39),
            Self::Named(c) => Some(30 + c.offset()),
            Self::Bright(c) => Some(90 + c.offset()),
            Self::Indexed(_) => None,
        }
    }

    /// The SGR background code for this color; see
    /// [`Color::sgr_foreground_code`].
    pub fn sgr_background_code(self) -> Option<u16> {
        match self {
            Self::Default => Some(49),
            Self::Named(c) => Some(40 + c.offset()),
            Self::Bright(c) => Some(100 + c.offset()),
            Self::Indexed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_fg_and_bright_bg_decode() {
        assert_eq!(Color::from_sgr(31), Some(Color::Named(NamedColor::Red)));
        assert_eq!(Color::from_sgr(44), Some(Color::Named(NamedColor::Blue)));
        assert_eq!(
            Color::from_sgr(92),
            Some(Color::Bright(NamedColor::Green))
        );
        assert_eq!(
            Color::from_sgr(107),
            Some(Color::Bright(NamedColor::White))
        );
        assert_eq!(Color::from_sgr(12), None);
    }
}
