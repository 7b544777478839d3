//! The session: root object owning windows and renderers, and the
//! coalescing invalidation/repaint scheduler.

use bitflags::bitflags;

use crate::error::Result;
use crate::layout::{Direction, Location};
use crate::pane::{Pane, PaneId};
use crate::renderer::Renderer;
use crate::window::{Window, WindowId};

bitflags! {
    /// What the next repaint needs to redraw. Bits are OR-merged by
    /// [`Session::invalidate`] and consumed atomically by the next repaint.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Redraw: u8 {
        const CURSOR     = 0b0000_0001;
        const BORDERS    = 0b0000_0010;
        const PANES      = 0b0000_0100;
        const STATUS_BAR = 0b0000_1000;
        const CLEAR_FIRST = 0b0001_0000;
        const ALL = Self::CURSOR.bits() | Self::BORDERS.bits() | Self::PANES.bits()
            | Self::STATUS_BAR.bits() | Self::CLEAR_FIRST.bits();
    }
}

/// Left/right text shown on the status bar row.
#[derive(Debug, Default, Clone)]
pub struct StatusBar {
    pub window_names: Vec<(WindowId, String)>,
    pub active_window: Option<WindowId>,
}

/// Root object of the multiplexer: owns every window and renderer, and
/// schedules exactly one repaint at a time across accumulated
/// invalidations.
pub struct Session {
    windows: Vec<Window>,
    active_window: Option<WindowId>,
    renderers: Vec<Box<dyn Renderer>>,
    status_bar: StatusBar,
    invalidate_mask: Redraw,
    repaint_pending: bool,
    sx: usize,
    sy: usize,
    next_window_id: WindowId,
    next_pane_id: PaneId,
}

impl Session {
    pub fn new(sx: usize, sy: usize) -> Self {
        Self {
            windows: Vec::new(),
            active_window: None,
            renderers: Vec::new(),
            status_bar: StatusBar::default(),
            invalidate_mask: Redraw::empty(),
            repaint_pending: false,
            sx,
            sy,
            next_window_id: 0,
            next_pane_id: 0,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.sx, self.sy)
    }

    pub fn next_pane_id(&mut self) -> PaneId {
        let id = self.next_pane_id;
        self.next_pane_id += 1;
        id
    }

    pub fn add_window(&mut self) -> WindowId {
        let id = self.next_window_id;
        self.next_window_id += 1;
        self.windows.push(Window::new(id));
        if self.active_window.is_none() {
            self.active_window = Some(id);
        }
        self.status_bar.window_names.push((id, format!("win{id}")));
        self.status_bar.active_window = self.active_window;
        self.invalidate(Redraw::ALL);
        id
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.push(renderer);
    }

    /// Drop a renderer whose output sink failed; the session continues
    /// running with whatever renderers remain.
    pub fn remove_failed_renderer(&mut self, index: usize) {
        if index < self.renderers.len() {
            self.renderers.remove(index);
        }
    }

    pub fn active_window(&self) -> Option<&Window> {
        let id = self.active_window?;
        self.windows.iter().find(|w| w.id() == id)
    }

    pub fn active_window_mut(&mut self) -> Option<&mut Window> {
        let id = self.active_window?;
        self.windows.iter_mut().find(|w| w.id() == id)
    }

    pub fn active_pane(&self) -> Option<&Pane> {
        self.active_window()?.active_pane()
    }

    /// OR-merge `parts` into the pending mask and schedule exactly one
    /// repaint if none is already pending. Returns whether a caller running
    /// the event loop needs to invoke [`Session::repaint`] this tick.
    pub fn invalidate(&mut self, parts: Redraw) -> bool {
        self.invalidate_mask |= parts;
        if self.repaint_pending {
            return false;
        }
        self.repaint_pending = true;
        true
    }

    /// Forward bytes produced by a pane's child process into its screen and
    /// mark the window dirty, mirroring the single-thread ordering
    /// guarantee: bytes from one pane are applied in arrival order, and the
    /// repaint never races a screen mutation because both run on this
    /// thread.
    pub fn feed_pane(&mut self, window: WindowId, pane: PaneId, bytes: &[u8]) {
        let is_active_window = self.active_window == Some(window);
        if let Some(win) = self.windows.iter_mut().find(|w| w.id() == window) {
            if let Some(p) = win.panes_mut().iter_mut().find(|p| p.id() == pane) {
                p.feed(bytes);
            }
        }
        if is_active_window {
            self.invalidate(Redraw::PANES);
        }
    }

    pub fn send_input_to_current_pane(&mut self, data: &[u8]) -> std::io::Result<()> {
        if let Some(window) = self.active_window_mut() {
            if let Some(pane) = window.active_pane_mut() {
                return pane.write_input(data);
            }
        }
        Ok(())
    }

    pub fn focus_next_window(&mut self) {
        let Some(current) = self.active_window else { return };
        let Some(index) = self.windows.iter().position(|w| w.id() == current) else {
            return;
        };
        let next = self.windows[(index + 1) % self.windows.len()].id();
        self.active_window = Some(next);
        self.status_bar.active_window = Some(next);
        self.invalidate(Redraw::ALL);
    }

    pub fn move_focus(&mut self, direction: Direction) {
        if let Some(window) = self.active_window_mut() {
            window.move_focus(direction);
        }
        self.invalidate(Redraw::CURSOR | Redraw::BORDERS);
    }

    pub fn resize_current_tile(&mut self, direction: Direction, amount: u32) -> Result<()> {
        let (sx, sy) = (self.sx, self.sy);
        if let Some(window) = self.active_window_mut() {
            window.resize_current_tile(direction, amount)?;
            window.reflow(Location { px: 0, py: 0, sx, sy: sy.saturating_sub(1) });
        }
        self.invalidate(Redraw::ALL);
        Ok(())
    }

    pub fn kill_current_pane(&mut self) -> Result<()> {
        let Some(window) = self.active_window_mut() else { return Ok(()) };
        let Some(pane_id) = window.active_pane().map(Pane::id) else { return Ok(()) };
        window.remove_pane(pane_id)?;
        self.invalidate(Redraw::ALL);
        Ok(())
    }

    /// Apply a new host terminal size: reserve the bottom row for the
    /// status bar and reflow every window.
    pub fn update_size(&mut self, sx: usize, sy: usize) {
        self.sx = sx;
        self.sy = sy;
        for window in &mut self.windows {
            window.reflow(Location {
                px: 0,
                py: 0,
                sx,
                sy: sy.saturating_sub(1),
            });
        }
        self.invalidate(Redraw::ALL);
    }

    pub fn status_bar(&self) -> &StatusBar {
        &self.status_bar
    }

    /// Report each attached renderer's real host-canvas size, independent of
    /// `update_size`'s session rectangle. A host whose terminal is bigger
    /// than the session (e.g. a client that attached with a larger window)
    /// calls this so the next repaint paints the gap rather than leaving it
    /// stale.
    pub fn update_host_size(&mut self, sx: usize, sy: usize) {
        for renderer in &mut self.renderers {
            renderer.set_host_size(sx, sy);
        }
        self.invalidate(Redraw::ALL);
    }

    /// Run the accumulated repaint across every attached renderer, then
    /// clear the mask. If invalidations arrived while repainting (not
    /// possible on a single thread without re-entrancy, but kept symmetric
    /// with the scheduling contract), a follow-up repaint remains armed.
    pub fn repaint(&mut self) {
        if !self.repaint_pending {
            return;
        }
        let parts = self.invalidate_mask;
        self.invalidate_mask = Redraw::empty();
        self.repaint_pending = false;

        let mut failed = Vec::new();
        for (index, renderer) in self.renderers.iter_mut().enumerate() {
            if renderer.repaint(parts, &self.status_bar, self.sx, self.sy, &mut self.windows, self.active_window).is_err() {
                failed.push(index);
            }
        }
        for index in failed.into_iter().rev() {
            self.remove_failed_renderer(index);
        }

        if self.invalidate_mask != Redraw::empty() {
            self.invalidate(self.invalidate_mask);
        }
    }
}
