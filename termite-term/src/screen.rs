//! The per-pane virtual terminal: a sparse, scrollback-capable screen buffer
//! driven by a [`termite_vte::Parser`].
use std::collections::{BTreeMap, BTreeSet};

use termite_vte::{Actor, CsiParam, Parser};

use crate::cell::Char;
use crate::charset::Charset;
use crate::color::Color;
use crate::cursor::Cursor;
use crate::error::TermError;
use crate::mode::{Modes, NamedMode, NamedPrivateMode};

type Row = BTreeMap<usize, Char>;

/// Everything needed to restore a screen after leaving the alternate buffer.
#[derive(Debug, Clone)]
struct AlternateSnapshot {
    buffer: BTreeMap<i64, Row>,
    cursor: Cursor,
    saved_cursor: Option<Cursor>,
    top: usize,
    bottom: usize,
    line_offset: i64,
    charset: usize,
    g0_charset: Charset,
    g1_charset: Charset,
    tabstops: BTreeSet<usize>,
    modes: Modes,
}

/// A pane's virtual terminal: screen buffer, cursor, modes, and the state
/// the VT parser mutates as bytes arrive.
///
/// Rows are addressed by an absolute index (`display_row + line_offset`);
/// scrolling the visible window never moves stored cells, it just slides
/// `line_offset`. A row missing from `buffer` reads as a line of default
/// (blank) cells.
pub struct Screen {
    parser: Parser,
    state: ScreenState,
}

impl Screen {
    #[must_use]
    pub fn new(lines: usize, columns: usize) -> Self {
        Self {
            parser: Parser::new(),
            state: ScreenState::new(lines, columns),
        }
    }

    /// Construct a screen, rejecting a zero-sized geometry instead of
    /// silently clamping it to 1x1. Use this when the size comes from a
    /// layout reflow rather than a hardcoded default.
    pub fn try_new(lines: usize, columns: usize) -> Result<Self, TermError> {
        if lines == 0 || columns == 0 {
            return Err(TermError::InvalidDimensions { lines, columns });
        }
        Ok(Self::new(lines, columns))
    }

    /// Feed raw child-process output through the VT parser.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.advance(bytes, &mut self.state);
    }

    #[must_use]
    pub fn lines(&self) -> usize {
        self.state.lines
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.state.columns
    }

    #[must_use]
    pub fn line_offset(&self) -> i64 {
        self.state.line_offset
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.state.cursor
    }

    #[must_use]
    pub fn modes(&self) -> &Modes {
        &self.state.modes
    }

    /// Cell at the given display row/column; missing entries read as a
    /// default (blank) cell.
    #[must_use]
    pub fn cell_at(&self, display_row: usize, column: usize) -> Char {
        self.state.cell_at_absolute(display_row as i64 + self.state.line_offset, column)
    }

    pub fn resize(&mut self, lines: usize, columns: usize) {
        self.state.resize(lines, columns);
    }
}

impl ScreenState {
    fn default_modes() -> Modes {
        let mut modes = Modes::new();
        modes.set_private(NamedPrivateMode::AutoWrap);
        modes.set_private(NamedPrivateMode::ShowCursor);
        modes
    }
}

struct ScreenState {
    lines: usize,
    columns: usize,
    buffer: BTreeMap<i64, Row>,
    cursor: Cursor,
    saved_cursor: Option<Cursor>,
    top: usize,
    bottom: usize,
    line_offset: i64,
    charset: usize,
    g0_charset: Charset,
    g1_charset: Charset,
    tabstops: BTreeSet<usize>,
    modes: Modes,
    alternate: Option<AlternateSnapshot>,
}

fn default_tabstops(columns: usize) -> BTreeSet<usize> {
    (8..columns).step_by(8).collect()
}

impl ScreenState {
    fn new(lines: usize, columns: usize) -> Self {
        let lines = lines.max(1);
        let columns = columns.max(1);
        Self {
            lines,
            columns,
            buffer: BTreeMap::new(),
            cursor: Cursor::default(),
            saved_cursor: None,
            top: 0,
            bottom: lines - 1,
            line_offset: 0,
            charset: 0,
            g0_charset: Charset::default(),
            g1_charset: Charset::default(),
            tabstops: default_tabstops(columns),
            modes: Self::default_modes(),
            alternate: None,
        }
    }

    fn active_charset(&self) -> Charset {
        if self.charset == 0 {
            self.g0_charset
        } else {
            self.g1_charset
        }
    }

    fn cell_at_absolute(&self, row: i64, column: usize) -> Char {
        self.buffer
            .get(&row)
            .and_then(|r| r.get(&column))
            .copied()
            .unwrap_or_default()
    }

    fn absolute_row(&self, display_row: usize) -> i64 {
        display_row as i64 + self.line_offset
    }

    fn set_cell(&mut self, display_row: usize, column: usize, cell: Char) {
        let row = self.absolute_row(display_row);
        self.buffer.entry(row).or_default().insert(column, cell);
    }

    fn clear_row_range(&mut self, display_row: usize, start: usize, end: usize) {
        let row = self.absolute_row(display_row);
        if let Some(entries) = self.buffer.get_mut(&row) {
            entries.retain(|&col, _| col < start || col >= end);
            if entries.is_empty() {
                self.buffer.remove(&row);
            }
        }
    }

    fn clear_row(&mut self, display_row: usize) {
        self.buffer.remove(&self.absolute_row(display_row));
    }

    // -- cursor motion --------------------------------------------------

    fn cursor_up(&mut self, n: usize) {
        self.cursor.y = self.cursor.y.saturating_sub(n).max(self.top);
    }

    fn cursor_down(&mut self, n: usize) {
        self.cursor.y = (self.cursor.y + n).min(self.bottom);
    }

    fn cursor_forward(&mut self, n: usize) {
        self.cursor.x = (self.cursor.x + n).min(self.columns.saturating_sub(1));
    }

    fn cursor_back(&mut self, n: usize) {
        self.cursor.x = self.cursor.x.saturating_sub(n);
    }

    fn carriage_return(&mut self) {
        self.cursor.x = 0;
    }

    fn cursor_position(&mut self, row: usize, col: usize) {
        let origin = self.modes.contains_private(NamedPrivateMode::Origin);
        let (min_y, max_y) = if origin {
            (self.top, self.bottom)
        } else {
            (0, self.lines.saturating_sub(1))
        };
        let y = if origin { self.top + row } else { row };
        self.cursor.y = y.clamp(min_y, max_y);
        self.cursor.x = col.min(self.columns.saturating_sub(1));
    }

    fn save_cursor(&mut self) {
        self.saved_cursor = Some(self.cursor);
    }

    fn restore_cursor(&mut self) {
        if let Some(saved) = self.saved_cursor {
            self.cursor = saved;
        }
    }

    // -- scrolling --------------------------------------------------------

    fn full_screen_region(&self) -> bool {
        self.top == 0 && self.bottom == self.lines.saturating_sub(1)
    }

    fn scroll_region_up(&mut self, n: usize) {
        for y in self.top..=self.bottom {
            let src = y + n;
            if src > self.bottom {
                self.clear_row(y);
                continue;
            }
            match self.buffer.remove(&self.absolute_row(src)) {
                Some(cells) => {
                    self.buffer.insert(self.absolute_row(y), cells);
                }
                None => self.clear_row(y),
            }
        }
    }

    fn scroll_region_down(&mut self, n: usize) {
        for y in (self.top..=self.bottom).rev() {
            if y < self.top + n {
                self.clear_row(y);
                continue;
            }
            let src = y - n;
            match self.buffer.remove(&self.absolute_row(src)) {
                Some(cells) => {
                    self.buffer.insert(self.absolute_row(y), cells);
                }
                None => self.clear_row(y),
            }
        }
    }

    fn index(&mut self) {
        if self.cursor.y == self.bottom {
            if self.full_screen_region() {
                self.line_offset += 1;
            } else {
                self.scroll_region_up(1);
            }
        } else {
            self.cursor.y = (self.cursor.y + 1).min(self.lines.saturating_sub(1));
        }
    }

    fn reverse_index(&mut self) {
        if self.cursor.y == self.top {
            if self.full_screen_region() && self.line_offset > 0 {
                self.line_offset -= 1;
            } else {
                self.scroll_region_down(1);
            }
        } else {
            self.cursor.y = self.cursor.y.saturating_sub(1).max(self.top);
        }
    }

    fn insert_lines(&mut self, n: usize) {
        if self.cursor.y < self.top || self.cursor.y > self.bottom {
            return;
        }
        let n = n.max(1);
        let mut y = self.bottom;
        while y >= self.cursor.y + n {
            let src = y - n;
            if let Some(cells) = self.buffer.remove(&self.absolute_row(src)) {
                self.buffer.insert(self.absolute_row(y), cells);
            } else {
                self.clear_row(y);
            }
            if y == self.cursor.y + n {
                break;
            }
            y -= 1;
        }
        for y in self.cursor.y..(self.cursor.y + n).min(self.bottom + 1) {
            self.clear_row(y);
        }
    }

    fn delete_lines(&mut self, n: usize) {
        if self.cursor.y < self.top || self.cursor.y > self.bottom {
            return;
        }
        let n = n.max(1);
        for y in self.cursor.y..=self.bottom {
            let src = y + n;
            if src > self.bottom {
                self.clear_row(y);
                continue;
            }
            if let Some(cells) = self.buffer.remove(&self.absolute_row(src)) {
                self.buffer.insert(self.absolute_row(y), cells);
            } else {
                self.clear_row(y);
            }
        }
    }

    fn insert_characters(&mut self, n: usize) {
        let n = n.max(1);
        let row = self.absolute_row(self.cursor.y);
        let columns = self.columns;
        let x = self.cursor.x;
        let Some(cells) = self.buffer.get(&row) else {
            return;
        };
        let mut shifted: Row = BTreeMap::new();
        for (&col, &cell) in cells.range(x..) {
            let new_col = col + n;
            if new_col < columns {
                shifted.insert(new_col, cell);
            }
        }
        let entry = self.buffer.entry(row).or_default();
        entry.retain(|&col, _| col < x);
        entry.extend(shifted);
    }

    fn delete_characters(&mut self, n: usize) {
        let n = n.max(1);
        let row = self.absolute_row(self.cursor.y);
        let x = self.cursor.x;
        let Some(cells) = self.buffer.get(&row) else {
            return;
        };
        let mut shifted: Row = BTreeMap::new();
        for (&col, &cell) in cells.range(x + n..) {
            shifted.insert(col - n, cell);
        }
        let entry = self.buffer.entry(row).or_default();
        entry.retain(|&col, _| col < x);
        entry.extend(shifted);
        if entry.is_empty() {
            self.buffer.remove(&row);
        }
    }

    fn erase_characters(&mut self, n: usize) {
        let n = n.max(1);
        let end = (self.cursor.x + n).min(self.columns);
        self.clear_row_range(self.cursor.y, self.cursor.x, end);
    }

    fn erase_in_line(&mut self, kind: u16) {
        match kind {
            0 => self.clear_row_range(self.cursor.y, self.cursor.x, self.columns),
            1 => self.clear_row_range(self.cursor.y, 0, self.cursor.x + 1),
            2 => self.clear_row(self.cursor.y),
            _ => {}
        }
    }

    fn erase_in_display(&mut self, kind: u16) {
        match kind {
            0 => {
                self.clear_row_range(self.cursor.y, self.cursor.x, self.columns);
                for y in (self.cursor.y + 1)..self.lines {
                    self.clear_row(y);
                }
            }
            1 => {
                for y in 0..self.cursor.y {
                    self.clear_row(y);
                }
                self.clear_row_range(self.cursor.y, 0, self.cursor.x + 1);
            }
            2 => {
                for y in 0..self.lines {
                    self.clear_row(y);
                }
            }
            _ => {}
        }
    }

    // -- tabs ---------------------------------------------------------------

    fn horizontal_tab(&mut self) {
        let last = self.columns.saturating_sub(1);
        self.cursor.x = self
            .tabstops
            .iter()
            .find(|&&t| t > self.cursor.x)
            .copied()
            .unwrap_or(last)
            .min(last);
    }

    fn back_tab(&mut self) {
        self.cursor.x = self
            .tabstops
            .iter()
            .rev()
            .find(|&&t| t < self.cursor.x)
            .copied()
            .unwrap_or(0);
    }

    fn set_tab_stop(&mut self) {
        self.tabstops.insert(self.cursor.x);
    }

    fn clear_tab_stop(&mut self, kind: u16) {
        match kind {
            0 => {
                self.tabstops.remove(&self.cursor.x);
            }
            3 => self.tabstops.clear(),
            _ => {}
        }
    }

    // -- graphic rendition ----------------------------------------------

    fn select_graphic_rendition(&mut self, attrs: &[u16]) {
        let codes: Vec<u16> = if attrs.is_empty() {
            vec![0]
        } else {
            attrs.to_vec()
        };
        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                0 => {
                    self.cursor.attrs.fg = Color::Default;
                    self.cursor.attrs.bg = Color::Default;
                    self.cursor.attrs.bold = false;
                    self.cursor.attrs.underscore = false;
                    self.cursor.attrs.reverse = false;
                    self.cursor.attrs.strikethrough = false;
                }
                1 => self.cursor.attrs.bold = true,
                4 => self.cursor.attrs.underscore = true,
                7 => self.cursor.attrs.reverse = true,
                9 => self.cursor.attrs.strikethrough = true,
                22 => self.cursor.attrs.bold = false,
                24 => self.cursor.attrs.underscore = false,
                27 => self.cursor.attrs.reverse = false,
                29 => self.cursor.attrs.strikethrough = false,
                38 => {
                    if codes.get(i + 1) == Some(&5) {
                        if let Some(&n) = codes.get(i + 2) {
                            self.cursor.attrs.fg = Color::Indexed(n as u8);
                            i += 2;
                        }
                    }
                }
                48 => {
                    if codes.get(i + 1) == Some(&5) {
                        if let Some(&n) = codes.get(i + 2) {
                            self.cursor.attrs.bg = Color::Indexed(n as u8);
                            i += 2;
                        }
                    }
                }
                39 => self.cursor.attrs.fg = Color::Default,
                49 => self.cursor.attrs.bg = Color::Default,
                code => {
                    if let Some(color) = Color::from_sgr(code) {
                        if (30..=37).contains(&code) || (90..=97).contains(&code) {
                            self.cursor.attrs.fg = color;
                        } else {
                            self.cursor.attrs.bg = color;
                        }
                    }
                }
            }
            i += 1;
        }
    }

    fn flip_reverse_video(&mut self) {
        for row in self.buffer.values_mut() {
            for cell in row.values_mut() {
                cell.reverse = !cell.reverse;
            }
        }
        self.cursor.attrs.reverse = !self.cursor.attrs.reverse;
    }

    // -- alternate screen -------------------------------------------------

    fn enter_alternate_screen(&mut self) {
        if self.alternate.is_some() {
            return;
        }
        let snapshot = AlternateSnapshot {
            buffer: std::mem::take(&mut self.buffer),
            cursor: self.cursor,
            saved_cursor: self.saved_cursor.take(),
            top: self.top,
            bottom: self.bottom,
            line_offset: self.line_offset,
            charset: self.charset,
            g0_charset: self.g0_charset,
            g1_charset: self.g1_charset,
            tabstops: std::mem::take(&mut self.tabstops),
            modes: self.modes.clone(),
        };
        self.alternate = Some(snapshot);
        self.cursor = Cursor::default();
        self.line_offset = 0;
        self.top = 0;
        self.bottom = self.lines.saturating_sub(1);
        self.charset = 0;
        self.g0_charset = Charset::default();
        self.g1_charset = Charset::default();
        self.tabstops = default_tabstops(self.columns);
        self.modes = Self::default_modes();
        self.modes.set_private(NamedPrivateMode::AlternateScreen);
    }

    fn leave_alternate_screen(&mut self) {
        if let Some(snapshot) = self.alternate.take() {
            self.buffer = snapshot.buffer;
            self.cursor = snapshot.cursor;
            self.saved_cursor = snapshot.saved_cursor;
            self.top = snapshot.top;
            self.bottom = snapshot.bottom;
            self.line_offset = snapshot.line_offset;
            self.charset = snapshot.charset;
            self.g0_charset = snapshot.g0_charset;
            self.g1_charset = snapshot.g1_charset;
            self.tabstops = snapshot.tabstops;
            self.modes = snapshot.modes;
        }
    }

    // -- modes --------------------------------------------------------------

    fn set_mode(&mut self, codes: &[u16], private: bool) {
        for &code in codes {
            if private {
                self.set_private_mode(code);
            } else {
                self.set_public_mode(code);
            }
        }
    }

    fn reset_mode(&mut self, codes: &[u16], private: bool) {
        for &code in codes {
            if private {
                self.reset_private_mode(code);
            } else {
                self.reset_public_mode(code);
            }
        }
    }

    fn set_private_mode(&mut self, code: u16) {
        match code {
            c if c == NamedPrivateMode::ColumnMode.raw() => {
                self.modes.set_private(NamedPrivateMode::ColumnMode);
                self.resize(self.lines, 132);
                self.erase_in_display(2);
                self.cursor.x = 0;
                self.cursor.y = 0;
            }
            c if c == NamedPrivateMode::Origin.raw() => {
                self.modes.set_private(NamedPrivateMode::Origin);
                self.cursor.x = 0;
                self.cursor.y = self.top;
            }
            c if c == NamedPrivateMode::ReverseVideo.raw() => {
                self.modes.set_private(NamedPrivateMode::ReverseVideo);
                self.flip_reverse_video();
            }
            c if c == NamedPrivateMode::ShowCursor.raw() => {
                self.modes.set_private(NamedPrivateMode::ShowCursor);
                self.cursor.hidden = false;
            }
            c if c == NamedPrivateMode::AlternateScreen.raw() => self.enter_alternate_screen(),
            other => self.modes.set_raw(other, true),
        }
    }

    fn reset_private_mode(&mut self, code: u16) {
        match code {
            c if c == NamedPrivateMode::ColumnMode.raw() => {
                self.modes.reset_private(NamedPrivateMode::ColumnMode);
                self.resize(self.lines, 80);
                self.erase_in_display(2);
                self.cursor.x = 0;
                self.cursor.y = 0;
            }
            c if c == NamedPrivateMode::Origin.raw() => {
                self.modes.reset_private(NamedPrivateMode::Origin);
                self.cursor.x = 0;
                self.cursor.y = 0;
            }
            c if c == NamedPrivateMode::ReverseVideo.raw() => {
                self.modes.reset_private(NamedPrivateMode::ReverseVideo);
                self.flip_reverse_video();
            }
            c if c == NamedPrivateMode::ShowCursor.raw() => {
                self.modes.reset_private(NamedPrivateMode::ShowCursor);
                self.cursor.hidden = true;
            }
            c if c == NamedPrivateMode::AlternateScreen.raw() => self.leave_alternate_screen(),
            other => self.modes.reset_raw(other, true),
        }
    }

    fn set_public_mode(&mut self, code: u16) {
        if code == NamedMode::Insert.raw() {
            self.modes.set_public(NamedMode::Insert);
        } else {
            self.modes.set_raw(code, false);
        }
    }

    fn reset_public_mode(&mut self, code: u16) {
        if code == NamedMode::Insert.raw() {
            self.modes.reset_public(NamedMode::Insert);
        } else {
            self.modes.reset_raw(code, false);
        }
    }

    fn set_scroll_margins(&mut self, top: u16, bottom: u16) {
        let top = (top as usize).saturating_sub(1);
        let bottom = if bottom == 0 {
            self.lines - 1
        } else {
            (bottom as usize - 1).min(self.lines - 1)
        };
        if top < bottom {
            self.top = top;
            self.bottom = bottom;
        } else {
            self.top = 0;
            self.bottom = self.lines.saturating_sub(1);
        }
        let origin = self.modes.contains_private(NamedPrivateMode::Origin);
        self.cursor.x = 0;
        self.cursor.y = if origin { self.top } else { 0 };
    }

    // -- resize / reset -----------------------------------------------------

    fn resize(&mut self, lines: usize, columns: usize) {
        let lines = lines.max(1);
        let columns = columns.max(1);
        self.lines = lines;
        self.columns = columns;
        self.top = 0;
        self.bottom = lines - 1;
        if let Some(&max_row) = self.buffer.keys().next_back() {
            let new_offset = (max_row - lines as i64 + 4).max(0);
            let delta = new_offset - self.line_offset;
            self.line_offset = new_offset;
            self.cursor.y = ((self.cursor.y as i64) - delta).clamp(0, lines as i64 - 1) as usize;
        }
        self.cursor.x = self.cursor.x.min(columns);
        self.tabstops = default_tabstops(columns);
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = Cursor::default();
        self.saved_cursor = None;
        self.top = 0;
        self.bottom = self.lines.saturating_sub(1);
        self.line_offset = 0;
        self.charset = 0;
        self.g0_charset = Charset::default();
        self.g1_charset = Charset::default();
        self.tabstops = default_tabstops(self.columns);
        self.modes = Self::default_modes();
        self.alternate = None;
    }

    fn write_glyph(&mut self, c: char) {
        if self.cursor.x >= self.columns {
            if self.modes.contains_private(NamedPrivateMode::AutoWrap) {
                self.carriage_return();
                self.index();
            } else {
                self.cursor.x = self.columns.saturating_sub(1);
            }
        }
        if self.modes.contains_public(NamedMode::Insert) {
            self.insert_characters(1);
        }
        let translated = self.active_charset().translate(c);
        let cell = self.cursor.attrs.with_data(translated);
        self.set_cell(self.cursor.y, self.cursor.x, cell);
        self.cursor.x += 1;
    }

    fn handle_esc(&mut self, intermediates: &[u8], byte: u8) {
        if let Some(&designator) = intermediates.first() {
            if designator == b'(' || designator == b')' {
                let charset = Charset::from_designator(byte);
                if designator == b'(' {
                    self.g0_charset = charset;
                } else {
                    self.g1_charset = charset;
                }
                return;
            }
        }
        match byte as char {
            'D' => self.index(),
            'E' => {
                self.carriage_return();
                self.index();
            }
            'H' => self.set_tab_stop(),
            'M' => self.reverse_index(),
            '7' => self.save_cursor(),
            '8' => self.restore_cursor(),
            'c' => self.reset(),
            _ => {}
        }
    }

    fn handle_csi(&mut self, params: &[CsiParam], byte: u8) {
        let private = params.first().is_some_and(CsiParam::is_private_marker);
        let ints = csi_integers(params);

        match byte as char {
            'A' => self.cursor_up(csi_count(&ints, 0, 1)),
            'B' | 'e' => self.cursor_down(csi_count(&ints, 0, 1)),
            'C' | 'a' => self.cursor_forward(csi_count(&ints, 0, 1)),
            'D' => self.cursor_back(csi_count(&ints, 0, 1)),
            'E' => {
                self.cursor_down(csi_count(&ints, 0, 1));
                self.carriage_return();
            }
            'F' => {
                self.cursor_up(csi_count(&ints, 0, 1));
                self.carriage_return();
            }
            'G' | '`' => {
                let col = csi_count(&ints, 0, 1) - 1;
                self.cursor.x = col.min(self.columns.saturating_sub(1));
            }
            'H' | 'f' => {
                let row = csi_count(&ints, 0, 1) - 1;
                let col = csi_count(&ints, 1, 1) - 1;
                self.cursor_position(row, col);
            }
            'I' => {
                for _ in 0..csi_count(&ints, 0, 1) {
                    self.horizontal_tab();
                }
            }
            'J' => self.erase_in_display(ints.first().copied().unwrap_or(0)),
            'K' => self.erase_in_line(ints.first().copied().unwrap_or(0)),
            'L' => self.insert_lines(csi_count(&ints, 0, 1)),
            'M' => self.delete_lines(csi_count(&ints, 0, 1)),
            'P' => self.delete_characters(csi_count(&ints, 0, 1)),
            'S' => {
                for _ in 0..csi_count(&ints, 0, 1) {
                    self.index();
                }
            }
            'T' => {
                for _ in 0..csi_count(&ints, 0, 1) {
                    self.reverse_index();
                }
            }
            'X' => self.erase_characters(csi_count(&ints, 0, 1)),
            'Z' => {
                for _ in 0..csi_count(&ints, 0, 1) {
                    self.back_tab();
                }
            }
            'd' => {
                let row = csi_count(&ints, 0, 1) - 1;
                self.cursor_position(row, self.cursor.x);
            }
            '@' => self.insert_characters(csi_count(&ints, 0, 1)),
            'g' => self.clear_tab_stop(ints.first().copied().unwrap_or(0)),
            'h' => self.set_mode(&ints, private),
            'l' => self.reset_mode(&ints, private),
            'm' => self.select_graphic_rendition(&ints),
            'r' => {
                let top = ints.first().copied().unwrap_or(0);
                let bottom = ints.get(1).copied().unwrap_or(0);
                self.set_scroll_margins(top, bottom);
            }
            's' if !private => self.save_cursor(),
            'u' => self.restore_cursor(),
            _ => {}
        }
    }
}

/// Extract the decimal integer parameters, ignoring separators and the
/// private-mode marker.
fn csi_integers(params: &[CsiParam]) -> Vec<u16> {
    params
        .iter()
        .filter_map(CsiParam::as_integer)
        .map(|v| v.clamp(0, u16::MAX as i64) as u16)
        .collect()
}

/// The `n`th parameter as a movement count: an omitted or zero value means
/// `default`, per ECMA-48 convention.
fn csi_count(ints: &[u16], index: usize, default: usize) -> usize {
    match ints.get(index) {
        Some(&0) | None => default,
        Some(&n) => n as usize,
    }
}

impl Actor for ScreenState {
    fn print(&mut self, c: char) {
        self.write_glyph(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => {} // BEL: no screen-state effect
            0x08 => self.cursor_back(1),
            0x09 => self.horizontal_tab(),
            0x0a | 0x0b | 0x0c => self.index(),
            0x0d => self.carriage_return(),
            0x0e => self.charset = 1,
            0x0f => self.charset = 0,
            _ => {}
        }
    }

    fn hook(&mut self, _byte: u8, _params: &[i64], _intermediates: &[u8], _ignored_excess_intermediates: bool) {}

    fn unhook(&mut self) {}

    fn put(&mut self, _byte: u8) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]]) {}

    fn csi_dispatch(&mut self, params: &[CsiParam], _intermediates: &[u8], _parameters_truncated: bool, byte: u8) {
        self.handle_csi(params, byte);
    }

    fn esc_dispatch(&mut self, _params: &[i64], intermediates: &[u8], _ignored_excess_intermediates: bool, byte: u8) {
        self.handle_esc(intermediates, byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_glyph_advances_cursor_and_clamps_to_screen() {
        let mut screen = Screen::new(24, 80);
        screen.feed(b"hello\r\n");
        assert_eq!(screen.cell_at(0, 0).data, 'h');
        assert_eq!(screen.cell_at(0, 4).data, 'o');
        assert_eq!(screen.cursor().x, 0);
        assert_eq!(screen.cursor().y, 1);
    }

    #[test]
    fn cursor_stays_in_bounds_for_arbitrary_bytes() {
        let mut screen = Screen::new(5, 10);
        let bytes: Vec<u8> = (0..=255u8).collect();
        screen.feed(&bytes);
        let cursor = screen.cursor();
        assert!(cursor.x <= screen.columns());
        assert!(cursor.y < screen.lines());
    }

    #[test]
    fn autowrap_moves_to_next_line() {
        let mut screen = Screen::new(2, 3);
        screen.feed(b"abcd");
        assert_eq!(screen.cell_at(0, 0).data, 'a');
        assert_eq!(screen.cell_at(0, 2).data, 'c');
        assert_eq!(screen.cell_at(1, 0).data, 'd');
    }

    #[test]
    fn sgr_reset_clears_color_after_red_a() {
        let mut screen = Screen::new(1, 10);
        screen.feed(b"\x1b[31mA\x1b[0mB");
        let a = screen.cell_at(0, 0);
        let b = screen.cell_at(0, 1);
        assert_eq!(a.data, 'A');
        assert_eq!(a.fg, Color::Named(crate::color::NamedColor::Red));
        assert_eq!(b.data, 'B');
        assert_eq!(b.fg, Color::Default);
    }

    #[test]
    fn alternate_screen_round_trips_exactly() {
        let mut screen = Screen::new(4, 10);
        screen.feed(b"before");
        screen.feed(b"\x1b[?1049h");
        screen.feed(b"scratch data that should vanish");
        screen.feed(b"\x1b[?1049l");
        assert_eq!(screen.cell_at(0, 0).data, 'b');
        assert_eq!(screen.cursor().x, 6);
    }

    #[test]
    fn full_screen_scroll_preserves_history_via_line_offset() {
        let mut screen = Screen::new(2, 5);
        screen.feed(b"one\r\ntwo\r\nthree");
        assert_eq!(screen.line_offset(), 1);
        assert_eq!(screen.cell_at(0, 0).data, 't');
    }

    #[test]
    fn insert_and_delete_characters_shift_row_contents() {
        let mut screen = Screen::new(1, 5);
        screen.feed(b"abcde");
        screen.feed(b"\x1b[H\x1b[2P");
        assert_eq!(screen.cell_at(0, 0).data, 'c');
        assert_eq!(screen.cell_at(0, 1).data, 'd');
        assert_eq!(screen.cell_at(0, 2).data, 'e');
    }

    #[test]
    fn mode_set_reset_round_trip_is_a_no_op() {
        let mut screen = Screen::new(10, 10);
        let before_autowrap = screen.modes().contains_private(NamedPrivateMode::AutoWrap);
        screen.feed(b"\x1b[?7h\x1b[?7l");
        assert_ne!(before_autowrap, screen.modes().contains_private(NamedPrivateMode::AutoWrap));
        screen.feed(b"\x1b[?7h");
        assert_eq!(before_autowrap, screen.modes().contains_private(NamedPrivateMode::AutoWrap));
    }
}
