//! Renderers consume a repaint's invalidation mask plus the current window
//! state and emit an ANSI byte stream that updates only what changed.

use std::io::{self, Write};

use chrono::Utc;
use termite_term::Char;

use crate::layout::Location;
use crate::session::{Redraw, StatusBar};
use crate::window::{Window, WindowId};

/// Border cell membership, one bit per touching pane edge.
mod border_bits {
    pub const TOP: u8 = 1;
    pub const BOTTOM: u8 = 2;
    pub const LEFT: u8 = 4;
    pub const RIGHT: u8 = 8;
}

fn border_glyph(mask: u8) -> Option<char> {
    use border_bits::{BOTTOM, LEFT, RIGHT, TOP};
    Some(match mask {
        m if m == (TOP | BOTTOM | LEFT | RIGHT) => '┼',
        m if m == (LEFT | RIGHT | TOP) => '┴',
        m if m == (LEFT | RIGHT | BOTTOM) => '┬',
        m if m == (RIGHT | TOP | BOTTOM) => '├',
        m if m == (LEFT | TOP | BOTTOM) => '┤',
        m if m == (LEFT | RIGHT) => '─',
        m if m == (TOP | BOTTOM) => '│',
        m if m == (LEFT | TOP) => '┘',
        m if m == (LEFT | BOTTOM) => '┐',
        m if m == (RIGHT | TOP) => '└',
        m if m == (RIGHT | BOTTOM) => '┌',
        0 => return None,
        _ => return None,
    })
}

/// A cell's border contribution from a single pane: which edges it touches,
/// or `None` if the cell is outside the pane's one-cell border band.
fn pane_border_bits(location: Location, x: usize, y: usize) -> Option<u8> {
    let (px, py, sx, sy) = (location.px, location.py, location.sx, location.sy);
    let (xi, yi) = (x as i64, y as i64);
    if xi < px as i64 - 1 || xi > (px + sx) as i64 || yi < py as i64 - 1 || yi > (py + sy) as i64 {
        return None;
    }
    // Inside the pane proper: contributes nothing (and the caller should
    // treat this as "inside", not "no border").
    if x >= px && x < px + sx && y >= py && y < py + sy {
        return Some(0);
    }

    let mut mask = 0u8;
    if y + 1 == py {
        mask |= border_bits::TOP;
    }
    if y == py + sy {
        mask |= border_bits::BOTTOM;
    }
    if x + 1 == px {
        mask |= border_bits::LEFT;
    }
    if x == px + sx {
        mask |= border_bits::RIGHT;
    }
    Some(mask)
}

/// Consumes repaints and writes an ANSI byte stream somewhere. Implemented
/// by [`PipeRenderer`] for a raw byte sink; hosts may implement it directly
/// for other targets (a test buffer, a network socket).
pub trait Renderer: Send {
    #[allow(clippy::too_many_arguments)]
    fn repaint(
        &mut self,
        parts: Redraw,
        status_bar: &StatusBar,
        sx: usize,
        sy: usize,
        windows: &mut [Window],
        active_window: Option<WindowId>,
    ) -> io::Result<()>;

    /// Tell the renderer the real size of the canvas it draws into. This is
    /// deliberately distinct from `repaint`'s `sx`/`sy`, which is the
    /// session's own layout rectangle: a renderer's host terminal can be
    /// larger than that rectangle (a client attached with a bigger window
    /// than the session currently occupies), and the gap between the two is
    /// exactly what [`emit_background`] paints.
    fn set_host_size(&mut self, sx: usize, sy: usize);
}

/// Renders to any `Write` byte sink (a pipe to the host terminal's stdout,
/// typically): the canonical renderer used by example hosts.
pub struct PipeRenderer<W: Write + Send> {
    sink: W,
    last_size: Option<(usize, usize)>,
    /// The real size of the host canvas this renderer draws into, as last
    /// reported via `set_host_size`. `None` until a host reports one, in
    /// which case no background gap is painted.
    host_size: Option<(usize, usize)>,
}

impl<W: Write + Send> PipeRenderer<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, last_size: None, host_size: None }
    }
}

impl<W: Write + Send> Renderer for PipeRenderer<W> {
    fn repaint(
        &mut self,
        parts: Redraw,
        status_bar: &StatusBar,
        sx: usize,
        sy: usize,
        windows: &mut [Window],
        active_window: Option<WindowId>,
    ) -> io::Result<()> {
        let mut out = Vec::new();

        if parts.contains(Redraw::CLEAR_FIRST) {
            out.extend_from_slice(b"\x1b[2J");
        }
        out.extend_from_slice(b"\x1b[?25l");

        if parts.contains(Redraw::PANES) {
            if let Some(window) = active_window.and_then(|id| windows.iter_mut().find(|w| w.id() == id)) {
                let force_full = parts.contains(Redraw::CLEAR_FIRST);
                for pane in window.panes_mut() {
                    let diff = pane.take_diff(force_full);
                    emit_pane_diff(&mut out, pane.location(), &diff);
                }
            }
        }

        if parts.contains(Redraw::BORDERS) {
            if let Some(window) = active_window.and_then(|id| windows.iter().find(|w| w.id() == id)) {
                emit_borders(&mut out, window, sx, sy);
            }
        }

        if parts.contains(Redraw::CLEAR_FIRST) || self.last_size != self.host_size {
            if let Some((host_sx, host_sy)) = self.host_size {
                emit_background(&mut out, sx, sy, host_sx, host_sy);
            }
            self.last_size = self.host_size;
        }

        if parts.contains(Redraw::STATUS_BAR) {
            emit_status_bar(&mut out, status_bar, sx, sy);
        }

        if let Some(window) = active_window.and_then(|id| windows.iter().find(|w| w.id() == id)) {
            if let Some(pane) = window.active_pane() {
                let screen = pane.screen();
                let cursor = screen.cursor();
                if !cursor.hidden {
                    let loc = pane.location();
                    out.extend_from_slice(
                        format!("\x1b[{};{}H", loc.py + cursor.y + 1, loc.px + cursor.x + 1).as_bytes(),
                    );
                    out.extend_from_slice(b"\x1b[?25h");
                }
                if screen.modes().contains_private(termite_term::NamedPrivateMode::CursorKeys) {
                    out.extend_from_slice(b"\x1b[?1h");
                } else {
                    out.extend_from_slice(b"\x1b[?1l");
                }
            }
        }

        self.sink.write_all(&out)?;
        self.sink.flush()
    }

    fn set_host_size(&mut self, sx: usize, sy: usize) {
        self.host_size = Some((sx, sy));
    }
}

fn emit_pane_diff(out: &mut Vec<u8>, location: Location, diff: &termite_term::CharacterDiff) {
    let mut last_fg = None;
    let mut last_bg = None;
    let mut last_bold = false;
    let mut last_underscore = false;
    let mut last_reverse = false;
    let mut last_pos: Option<(usize, usize)> = None;

    out.extend_from_slice(b"\x1b[0m");

    for (&row, cells) in diff {
        for (&col, cell) in cells {
            let contiguous = last_pos.is_some_and(|(r, c)| r == row && c + 1 == col);
            let wrapped_line = last_pos.is_some_and(|(r, c)| r + 1 == row && col == 0 && c + 1 == location.sx);
            if wrapped_line {
                out.extend_from_slice(b"\r\n");
            } else if !contiguous {
                out.extend_from_slice(
                    format!("\x1b[{};{}H", location.py + row + 1, location.px + col + 1).as_bytes(),
                );
            }
            last_pos = Some((row, col));

            if (last_bold && !cell.bold) || (last_underscore && !cell.underscore) || (last_reverse && !cell.reverse) {
                out.extend_from_slice(b"\x1b[0m");
                last_fg = None;
                last_bg = None;
                last_bold = false;
                last_underscore = false;
                last_reverse = false;
            }

            emit_color(out, cell, &mut last_fg, &mut last_bg);

            if cell.bold && !last_bold {
                out.extend_from_slice(b"\x1b[1m");
                last_bold = true;
            }
            if cell.underscore && !last_underscore {
                out.extend_from_slice(b"\x1b[4m");
                last_underscore = true;
            }
            if cell.reverse && !last_reverse {
                out.extend_from_slice(b"\x1b[7m");
                last_reverse = true;
            }

            let mut buf = [0u8; 4];
            out.extend_from_slice(cell.data.encode_utf8(&mut buf).as_bytes());
        }
    }
}

fn emit_color(
    out: &mut Vec<u8>,
    cell: &Char,
    last_fg: &mut Option<termite_term::Color>,
    last_bg: &mut Option<termite_term::Color>,
) {
    use termite_term::Color;

    if *last_fg != Some(cell.fg) {
        match cell.fg {
            Color::Indexed(index) => {
                out.extend_from_slice(format!("\x1b[38;5;{index}m").as_bytes());
            },
            other => {
                if let Some(code) = other.sgr_foreground_code() {
                    out.extend_from_slice(format!("\x1b[0;{code}m").as_bytes());
                }
            },
        }
        *last_fg = Some(cell.fg);
    }

    if *last_bg != Some(cell.bg) {
        match cell.bg {
            Color::Indexed(index) => {
                out.extend_from_slice(format!("\x1b[48;5;{index}m").as_bytes());
            },
            other => {
                if let Some(code) = other.sgr_background_code() {
                    out.extend_from_slice(format!("\x1b[{code}m").as_bytes());
                }
            },
        }
        *last_bg = Some(cell.bg);
    }
}

fn emit_borders(out: &mut Vec<u8>, window: &Window, sx: usize, sy: usize) {
    let active_pane_id = window.active_pane().map(|p| p.id());

    for y in 0..sy.saturating_sub(1) {
        for x in 0..sx {
            let mut mask = 0u8;
            let mut is_inside = false;
            let mut touches_active = false;

            for pane in window.panes() {
                match pane_border_bits(pane.location(), x, y) {
                    Some(0) => {
                        is_inside = true;
                    },
                    Some(bits) => {
                        mask |= bits;
                        if Some(pane.id()) == active_pane_id {
                            touches_active = true;
                        }
                    },
                    None => {},
                }
            }

            if is_inside || mask == 0 {
                continue;
            }

            if let Some(glyph) = border_glyph(mask) {
                out.extend_from_slice(format!("\x1b[{};{}H", y + 1, x + 1).as_bytes());
                out.extend_from_slice(b"\x1b[0m");
                if touches_active {
                    out.extend_from_slice(b"\x1b[0;32m");
                }
                let mut buf = [0u8; 4];
                out.extend_from_slice(glyph.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

/// Paints every host-canvas cell outside the session's `sx`×`sy` rectangle
/// with `.` on a yellow/white background, so a host window bigger than the
/// session reads as "unused" rather than stale terminal content. Only the
/// gap is touched; cells within the session rectangle are left to
/// `emit_pane_diff`/`emit_borders`/`emit_status_bar`.
fn emit_background(out: &mut Vec<u8>, sx: usize, sy: usize, host_sx: usize, host_sy: usize) {
    out.extend_from_slice(b"\x1b[37m\x1b[43m");
    for y in 0..host_sy.saturating_sub(1) {
        for x in 0..host_sx {
            if x >= sx || y >= sy {
                out.extend_from_slice(format!("\x1b[{};{}H.", y + 1, x + 1).as_bytes());
            }
        }
    }
}

fn emit_status_bar(out: &mut Vec<u8>, status_bar: &StatusBar, sx: usize, sy: usize) {
    out.extend_from_slice(format!("\x1b[{};0H", sy).as_bytes());
    out.extend_from_slice(b"\x1b[43m\x1b[30m\x1b[1m");

    let left: String = status_bar
        .window_names
        .iter()
        .map(|(id, name)| {
            if Some(*id) == status_bar.active_window {
                format!("[{name}]")
            } else {
                name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let right = Utc::now().to_rfc3339();

    let mut line = left;
    let padding = sx.saturating_sub(line.len() + right.len());
    line.push_str(&" ".repeat(padding));
    line.push_str(&right);
    line.truncate(sx);

    out.extend_from_slice(line.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::emit_background;

    #[test]
    fn paints_only_the_gap_outside_the_session_rectangle() {
        let mut out = Vec::new();
        emit_background(&mut out, 4, 3, 6, 5);
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("\x1b[37m\x1b[43m"));
        assert_eq!(text.matches('.').count(), 6 * 4 - 4 * 3);
        assert!(text.contains("\x1b[1;5H."));
        assert!(!text.contains("\x1b[1;1H."));
    }

    #[test]
    fn host_no_larger_than_session_paints_nothing() {
        let mut out = Vec::new();
        emit_background(&mut out, 4, 3, 4, 3);
        assert_eq!(out, b"\x1b[37m\x1b[43m");
    }
}
