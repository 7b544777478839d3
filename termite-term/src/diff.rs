//! Per-pane character diffing: reduces a full screen to the sparse set of
//! cells that changed since the last dump, for the renderer to emit.
use std::collections::BTreeMap;

use crate::cell::Char;
use crate::screen::Screen;

/// One row's worth of changed cells, keyed by column.
pub type RowDiff = BTreeMap<usize, Char>;

/// A full-screen diff: changed cells keyed by (row, column).
pub type CharacterDiff = BTreeMap<usize, RowDiff>;

/// Compare `screen`'s current visible contents against `previous` (the last
/// dump handed to the renderer) and return only what changed. A `None`
/// previous dump means every non-default cell is reported.
#[must_use]
pub fn dump_character_diff(screen: &Screen, previous: Option<&CharacterDiff>) -> CharacterDiff {
    let mut diff = CharacterDiff::new();
    for y in 0..screen.lines() {
        let mut row_diff = RowDiff::new();
        for x in 0..screen.columns() {
            let cell = screen.cell_at(y, x);
            let unchanged = previous
                .and_then(|p| p.get(&y))
                .and_then(|row| row.get(&x))
                .is_some_and(|prev| *prev == cell);
            if !unchanged {
                row_diff.insert(x, cell);
            }
        }
        if !row_diff.is_empty() {
            diff.insert(y, row_diff);
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_crlf_diffs_five_cells_on_row_zero() {
        let mut screen = Screen::new(24, 80);
        let baseline = dump_character_diff(&screen, None);
        screen.feed(b"hello\r\n");
        let diff = dump_character_diff(&screen, Some(&baseline));
        let row0 = &diff[&0];
        assert_eq!(row0.len(), 5);
        let word: String = (0..5).map(|x| row0[&x].data).collect();
        assert_eq!(word, "hello");
    }

    #[test]
    fn repeated_diff_with_no_mutation_is_empty() {
        let mut screen = Screen::new(24, 80);
        screen.feed(b"hello");
        let first = dump_character_diff(&screen, None);
        let second = dump_character_diff(&screen, Some(&first));
        assert!(second.is_empty());
    }

    #[test]
    fn blank_with_non_default_background_differs_from_plain_space() {
        let mut plain = Screen::new(1, 1);
        plain.feed(b" ");
        let plain_diff = dump_character_diff(&plain, None);

        let mut styled = Screen::new(1, 1);
        styled.feed(b"\x1b[44m ");
        let styled_diff = dump_character_diff(&styled, None);

        assert_ne!(plain_diff, styled_diff);
    }
}
