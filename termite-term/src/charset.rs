//! G0/G1 character set designation (`ESC ( X` / `ESC ) X`) and the charset
//! shift controls SI/SO.

/// A designatable character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Ascii,
    /// DEC Special Graphics: box-drawing glyphs live on the lowercase
    /// letters in this set.
    SpecialGraphics,
}

impl Charset {
    pub fn from_designator(byte: u8) -> Self {
        match byte {
            b'0' => Self::SpecialGraphics,
            _ => Self::Ascii,
        }
    }

    /// Translate one incoming byte through this charset's mapping.
    pub fn translate(self, c: char) -> char {
        match self {
            Self::Ascii => c,
            Self::SpecialGraphics => translate_special_graphics(c),
        }
    }
}

fn translate_special_graphics(c: char) -> char {
    match c {
        '`' => '\u{25c6}',
        'a' => '\u{2592}',
        'b' => '\u{2409}',
        'c' => '\u{240c}',
        'd' => '\u{240d}',
        'e' => '\u{240a}',
        'f' => '\u{00b0}',
        'g' => '\u{00b1}',
        'h' => '\u{2424}',
        'i' => '\u{240b}',
        'j' => '\u{2518}',
        'k' => '\u{2510}',
        'l' => '\u{250c}',
        'm' => '\u{2514}',
        'n' => '\u{253c}',
        'o' => '\u{23ba}',
        'p' => '\u{23bb}',
        'q' => '\u{2500}',
        'r' => '\u{23bc}',
        's' => '\u{23bd}',
        't' => '\u{251c}',
        'u' => '\u{2524}',
        'v' => '\u{2534}',
        'w' => '\u{252c}',
        'x' => '\u{2502}',
        'y' => '\u{2264}',
        'z' => '\u{2265}',
        '{' => '\u{03c0}',
        '|' => '\u{2260}',
        '}' => '\u{00a3}',
        '~' => '\u{00b7}',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_graphics_maps_box_drawing() {
        assert_eq!(Charset::SpecialGraphics.translate('q'), '\u{2500}');
        assert_eq!(Charset::Ascii.translate('q'), 'q');
    }
}
