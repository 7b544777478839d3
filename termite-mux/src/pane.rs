//! A pane: leaf of the layout tree, owning a virtual [`Screen`] and the byte
//! channel to its child process.

use termite_pty::{PtySize, Session as PtySession};
use termite_term::{CharacterDiff, Screen};

use crate::layout::Location;

/// A pane's stable identity within its window's `panes` list.
pub type PaneId = usize;

/// Leaf of the layout tree. Exclusively owns its virtual terminal and its
/// connection to the child process; holds no reference to its window (the
/// window holds this).
pub struct Pane {
    id: PaneId,
    screen: Screen,
    session: Box<dyn PtySession>,
    location: Location,
    last_dump: CharacterDiff,
}

impl Pane {
    pub fn new(id: PaneId, session: Box<dyn PtySession>, location: Location) -> Self {
        Self {
            id,
            screen: Screen::new(location.sy.max(1), location.sx.max(1)),
            session,
            location,
            last_dump: CharacterDiff::new(),
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Apply a new position/size: resize the virtual terminal and propagate
    /// to the pty slave so the child process's `ioctl(TIOCGWINSZ)` reflects
    /// the real viewport.
    pub fn set_location(&mut self, location: Location) {
        self.location = location;
        self.screen.resize(location.sy.max(1), location.sx.max(1));
        let _ = self.session.resize(PtySize {
            rows: location.sy.min(u16::MAX as usize) as u16,
            cols: location.sx.min(u16::MAX as usize) as u16,
            cell_width: 0,
            cell_height: 0,
        });
    }

    /// Feed output produced by the child process into this pane's screen.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.screen.feed(bytes);
    }

    /// Forward keystrokes to the child process's stdin.
    pub fn write_input(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.session
            .write(data)
            .map(|_| ())
            .map_err(|err| std::io::Error::other(err.to_string()))
    }

    pub fn session_mut(&mut self) -> &mut dyn PtySession {
        self.session.as_mut()
    }

    /// Whether `(x, y)` falls inside this pane's rectangle.
    pub fn is_inside(&self, x: i64, y: i64) -> bool {
        let loc = self.location;
        x >= loc.px as i64
            && x < (loc.px + loc.sx) as i64
            && y >= loc.py as i64
            && y < (loc.py + loc.sy) as i64
    }

    /// Produce the diff against the last dump handed to the renderer and
    /// fold the changed cells into the cache for next time. When
    /// `force_full` is set (the repaint includes `ClearFirst`) the
    /// comparison is made against nothing, so every cell is reported.
    pub fn take_diff(&mut self, force_full: bool) -> CharacterDiff {
        let previous = if force_full { None } else { Some(&self.last_dump) };
        let diff = termite_term::dump_character_diff(&self.screen, previous);
        for (&row, cells) in &diff {
            let row_entry = self.last_dump.entry(row).or_default();
            for (&col, &cell) in cells {
                row_entry.insert(col, cell);
            }
        }
        diff
    }
}
