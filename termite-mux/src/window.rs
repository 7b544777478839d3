//! A window: a set of panes sharing one layout tree and one focused pane.

use crate::error::{MuxError, Result};
use crate::layout::{Axis, Direction, Handle, Layout, Location};
use crate::pane::{Pane, PaneId};

pub type WindowId = usize;

/// Collection of panes sharing a layout, with focus tracking.
pub struct Window {
    id: WindowId,
    layout: Layout,
    panes: Vec<Pane>,
    active_leaf: Option<Handle>,
}

impl Window {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            layout: Layout::empty(),
            panes: Vec::new(),
            active_leaf: None,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn panes_mut(&mut self) -> &mut [Pane] {
        &mut self.panes
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn active_pane(&self) -> Option<&Pane> {
        let handle = self.active_leaf?;
        let pane_id = self.layout.pane_of(handle)?;
        self.panes.iter().find(|p| p.id() == pane_id)
    }

    pub fn active_pane_mut(&mut self) -> Option<&mut Pane> {
        let handle = self.active_leaf?;
        let pane_id = self.layout.pane_of(handle)?;
        self.panes.iter_mut().find(|p| p.id() == pane_id)
    }

    fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|p| p.id() == id)
    }

    /// Add a pane to the window. If there is already an active pane, this
    /// splits its tile; otherwise the pane becomes the sole content of the
    /// layout.
    pub fn add_pane(&mut self, pane: Pane, vsplit: bool) -> Result<()> {
        let pane_id = pane.id();

        let leaf = match self.active_leaf {
            Some(target) => {
                let axis = if vsplit { Axis::Vertical } else { Axis::Horizontal };
                self.layout.split(target, pane_id, axis)?
            },
            None => {
                self.layout = Layout::with_single_pane(pane_id);
                self.layout.root().expect("just created")
            },
        };

        self.panes.push(pane);
        self.active_leaf = Some(leaf);
        Ok(())
    }

    /// Remove a pane from the window, moving focus to the next one first if
    /// this was the focused pane and others remain.
    pub fn remove_pane(&mut self, pane_id: PaneId) -> Result<()> {
        let was_active = self.active_pane().is_some_and(|p| p.id() == pane_id);
        if was_active && self.panes.len() > 1 {
            self.focus_next();
        }

        let handle = self
            .layout
            .root()
            .map(|root| self.find_leaf(root, pane_id))
            .flatten()
            .ok_or(MuxError::Configuration("pane not present in this window's layout"))?;

        self.layout.remove(handle)?;
        self.panes.retain(|p| p.id() != pane_id);

        if self.layout.is_empty() {
            self.active_leaf = None;
        }

        Ok(())
    }

    fn find_leaf(&self, handle: Handle, pane_id: PaneId) -> Option<Handle> {
        if self.layout.pane_of(handle) == Some(pane_id) {
            return Some(handle);
        }
        None
    }

    /// Advance focus to the next pane in insertion order.
    pub fn focus_next(&mut self) {
        let Some(active) = self.active_pane().map(Pane::id) else {
            return;
        };
        let Some(index) = self.panes.iter().position(|p| p.id() == active) else {
            return;
        };
        let next_id = self.panes[(index + 1) % self.panes.len()].id();
        self.active_leaf = self.leaf_for_pane(next_id);
    }

    fn leaf_for_pane(&self, pane_id: PaneId) -> Option<Handle> {
        self.layout.root().and_then(|root| self.find_leaf(root, pane_id))
    }

    /// Move focus to the pane whose rectangle contains a probe point two
    /// cells beyond the active pane's edge in the given direction. Leaves
    /// focus unchanged if no pane occupies that point.
    pub fn move_focus(&mut self, direction: Direction) {
        let Some(active) = self.active_pane() else {
            return;
        };
        let loc = active.location();
        let (x, y): (i64, i64) = match direction {
            Direction::Up => (loc.px as i64, loc.py as i64 - 2),
            Direction::Down => (loc.px as i64, (loc.py + loc.sy) as i64 + 2),
            Direction::Left => (loc.px as i64 - 2, loc.py as i64),
            Direction::Right => ((loc.px + loc.sx) as i64 + 2, loc.py as i64),
        };

        if let Some(target) = self.panes.iter().find(|p| p.is_inside(x, y)) {
            let target_id = target.id();
            self.active_leaf = self.leaf_for_pane(target_id);
        }
    }

    /// Shift weight between the two children of the container nearest the
    /// active pane whose axis matches `direction`.
    pub fn resize_current_tile(&mut self, direction: Direction, amount: u32) -> Result<()> {
        let Some(leaf) = self.active_leaf else {
            return Ok(());
        };
        self.layout.resize_tile(leaf, direction, amount)
    }

    /// Recompute every pane's location for the window's available extent
    /// (the session reserves the bottom row for the status bar).
    pub fn reflow(&mut self, location: Location) {
        let mut updates = Vec::new();
        self.layout.reflow(location, |pane_id, loc| updates.push((pane_id, loc)));
        for (pane_id, loc) in updates {
            if let Some(pane) = self.pane_mut(pane_id) {
                pane.set_location(loc);
            }
        }
    }
}
