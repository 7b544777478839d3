//! The layout tree: a binary tiling tree whose leaves are panes and whose
//! interior nodes are horizontal or vertical splits.
//!
//! Containers and panes are addressed by arena handles rather than owned
//! pointers so that the tree can hold parent back-references without
//! `Rc`/`Weak` bookkeeping.

use crate::error::{MuxError, Result};

/// An index into a [`Layout`]'s arena. Stable across removals elsewhere in
/// the tree; the slot a removed handle pointed to is never reused.
pub type Handle = usize;

/// The axis a split divides space along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// One child on top of the other; divides height.
    Horizontal,
    /// One child to the left of the other; divides width.
    Vertical,
}

/// A navigation direction used by focus movement and tile resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Horizontal,
            Direction::Left | Direction::Right => Axis::Vertical,
        }
    }

    /// Whether this direction shrinks the first child ("first") or the
    /// second ("second") of the two-child split it resizes.
    fn shrinks_first(self) -> bool {
        matches!(self, Direction::Up | Direction::Left)
    }
}

/// A pane's position and size within the host terminal, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub px: usize,
    pub py: usize,
    pub sx: usize,
    pub sy: usize,
}

#[derive(Debug)]
enum NodeKind {
    Leaf(usize),
    Split {
        axis: Axis,
        children: [Handle; 2],
        sizes: [u32; 2],
    },
}

#[derive(Debug)]
struct Node {
    parent: Option<Handle>,
    kind: NodeKind,
}

/// A minimum weight below which a split side refuses to shrink further.
const MIN_TILE_SIZE: u32 = 2;

/// The tiling tree for one window. Always has a root, unless every pane has
/// been removed, in which case the tree is empty and ready to receive a
/// fresh leaf.
#[derive(Debug, Default)]
pub struct Layout {
    arena: Vec<Option<Node>>,
    root: Option<Handle>,
}

impl Layout {
    /// An empty layout with no panes.
    pub fn empty() -> Self {
        Self {
            arena: Vec::new(),
            root: None,
        }
    }

    /// A layout whose sole content is `pane`.
    pub fn with_single_pane(pane: usize) -> Self {
        let mut layout = Self::empty();
        let handle = layout.push(Node {
            parent: None,
            kind: NodeKind::Leaf(pane),
        });
        layout.root = Some(handle);
        layout
    }

    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn pane_of(&self, handle: Handle) -> Option<usize> {
        match self.node(handle).ok()?.kind {
            NodeKind::Leaf(pane) => Some(pane),
            NodeKind::Split { .. } => None,
        }
    }

    pub fn parent_of(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).ok()?.parent
    }

    fn push(&mut self, node: Node) -> Handle {
        self.arena.push(Some(node));
        self.arena.len() - 1
    }

    fn node(&self, handle: Handle) -> Result<&Node> {
        self.arena
            .get(handle)
            .and_then(Option::as_ref)
            .ok_or(MuxError::Configuration("unknown layout handle"))
    }

    fn node_mut(&mut self, handle: Handle) -> Result<&mut Node> {
        self.arena
            .get_mut(handle)
            .and_then(Option::as_mut)
            .ok_or(MuxError::Configuration("unknown layout handle"))
    }

    /// Replace `old` with `new` in `parent`'s children list.
    fn replace_child(&mut self, parent: Handle, old: Handle, new: Handle) -> Result<()> {
        if let NodeKind::Split { children, .. } = &mut self.node_mut(parent)?.kind {
            if let Some(slot) = children.iter_mut().find(|c| **c == old) {
                *slot = new;
                return Ok(());
            }
        }
        Err(MuxError::Configuration("child not found in parent"))
    }

    /// Split `target` (a leaf) into a new container holding `target` and a
    /// fresh leaf for `new_pane`, along the given axis. Returns the new
    /// leaf's handle, which becomes the focus target.
    pub fn split(&mut self, target: Handle, new_pane: usize, axis: Axis) -> Result<Handle> {
        if !matches!(self.node(target)?.kind, NodeKind::Leaf(_)) {
            return Err(MuxError::Configuration("split target is not a leaf"));
        }

        let parent = self.node(target)?.parent;
        let new_leaf = self.push(Node {
            parent: None,
            kind: NodeKind::Leaf(new_pane),
        });
        let split = self.push(Node {
            parent,
            kind: NodeKind::Split {
                axis,
                children: [target, new_leaf],
                sizes: [10, 10],
            },
        });

        self.node_mut(target)?.parent = Some(split);
        self.node_mut(new_leaf)?.parent = Some(split);

        match parent {
            Some(p) => self.replace_child(p, target, split)?,
            None => self.root = Some(split),
        }

        Ok(new_leaf)
    }

    /// Remove `handle` from the tree, collapsing single-child containers and
    /// removing emptied ones, all the way up to the root if necessary.
    pub fn remove(&mut self, handle: Handle) -> Result<()> {
        let parent = self.node(handle)?.parent;
        self.arena[handle] = None;

        let Some(parent) = parent else {
            // Removing the root: the tree becomes empty.
            self.root = None;
            return Ok(());
        };

        let remaining = match &mut self.node_mut(parent)?.kind {
            NodeKind::Split { children, .. } => {
                let mut remaining: Vec<Handle> =
                    children.iter().copied().filter(|c| *c != handle).collect();
                remaining.pop()
            },
            NodeKind::Leaf(_) => unreachable!("parent of a node is always a split"),
        };

        match remaining {
            Some(only_child) => {
                // One child left: collapse this container into its slot.
                let grandparent = self.node(parent)?.parent;
                self.node_mut(only_child)?.parent = grandparent;
                self.arena[parent] = None;

                match grandparent {
                    Some(g) => self.replace_child(g, parent, only_child)?,
                    None => self.root = Some(only_child),
                }
            },
            None => {
                // No children left: the container removes itself too.
                self.remove(parent)?;
            },
        }

        Ok(())
    }

    /// Shift weight between the two children of the nearest ancestor
    /// container (starting at `start`, typically a leaf's parent) whose
    /// axis matches `direction`. Falls through to the grandparent when the
    /// axis doesn't match, as the original design does.
    pub fn resize_tile(&mut self, start: Handle, direction: Direction, amount: u32) -> Result<()> {
        let mut current = start;
        loop {
            let (axis, sizes, parent) = match &self.node(current)?.kind {
                NodeKind::Split { axis, sizes, .. } => (*axis, *sizes, self.node(current)?.parent),
                NodeKind::Leaf(_) => {
                    let parent = self
                        .node(current)?
                        .parent
                        .ok_or(MuxError::Configuration("leaf has no container to resize"))?;
                    current = parent;
                    continue;
                },
            };

            if axis != direction.axis() {
                match parent {
                    Some(p) => {
                        current = p;
                        continue;
                    },
                    None => return Ok(()),
                }
            }

            let [w0, w1] = sizes;
            let new_sizes = if direction.shrinks_first() {
                if w0 <= MIN_TILE_SIZE {
                    return Ok(());
                }
                let diff = amount.min(w0 - MIN_TILE_SIZE);
                [w0 - diff, w1 + diff]
            } else {
                if w1 <= MIN_TILE_SIZE {
                    return Ok(());
                }
                let diff = amount.min(w1 - MIN_TILE_SIZE);
                [w0 + diff, w1 - diff]
            };

            if let NodeKind::Split { sizes, .. } = &mut self.node_mut(current)?.kind {
                *sizes = new_sizes;
            }
            return Ok(());
        }
    }

    /// Recompute every leaf's [`Location`] for the given root extent and
    /// invoke `on_leaf` for each one.
    pub fn reflow(&self, location: Location, mut on_leaf: impl FnMut(usize, Location)) {
        if let Some(root) = self.root {
            self.reflow_node(root, location, &mut on_leaf);
        }
    }

    fn reflow_node(&self, handle: Handle, location: Location, on_leaf: &mut impl FnMut(usize, Location)) {
        let Ok(node) = self.node(handle) else { return };
        match &node.kind {
            NodeKind::Leaf(pane) => on_leaf(*pane, location),
            NodeKind::Split { axis, children, sizes } => {
                let available = match axis {
                    Axis::Horizontal => location.sy.saturating_sub(1),
                    Axis::Vertical => location.sx.saturating_sub(1),
                };
                let total: u32 = sizes.iter().sum();
                let size0 = if total == 0 {
                    available / 2
                } else {
                    (available as u64 * sizes[0] as u64 / total as u64) as usize
                };
                let size1 = available.saturating_sub(size0);
                let slot_sizes = [size0, size1];

                let mut offset = 0usize;
                for (child, size) in children.iter().zip(slot_sizes) {
                    let child_location = match axis {
                        Axis::Horizontal => Location {
                            px: location.px,
                            py: location.py + offset,
                            sx: location.sx,
                            sy: size,
                        },
                        Axis::Vertical => Location {
                            px: location.px + offset,
                            py: location.py,
                            sx: size,
                            sy: location.sy,
                        },
                    };
                    self.reflow_node(*child, child_location, on_leaf);
                    offset += size + 1;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_then_remove_collapses_back_to_single_pane() {
        let mut layout = Layout::with_single_pane(0);
        let root = layout.root().unwrap();
        let second = layout.split(root, 1, Axis::Vertical).unwrap();

        layout.remove(second).unwrap();
        assert_eq!(layout.pane_of(layout.root().unwrap()), Some(0));
    }

    #[test]
    fn removing_last_pane_empties_the_layout() {
        let mut layout = Layout::with_single_pane(0);
        let root = layout.root().unwrap();
        layout.remove(root).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn vertical_split_of_80x23_places_border_at_expected_column() {
        let mut layout = Layout::with_single_pane(0);
        let root = layout.root().unwrap();
        layout.split(root, 1, Axis::Vertical).unwrap();

        let mut locations = Vec::new();
        layout.reflow(
            Location {
                px: 0,
                py: 0,
                sx: 80,
                sy: 23,
            },
            |pane, loc| locations.push((pane, loc)),
        );
        locations.sort_by_key(|(pane, _)| *pane);

        assert_eq!(
            locations[0].1,
            Location {
                px: 0,
                py: 0,
                sx: 39,
                sy: 23
            }
        );
        assert_eq!(
            locations[1].1,
            Location {
                px: 40,
                py: 0,
                sx: 40,
                sy: 23
            }
        );
    }

    #[test]
    fn resize_tile_shrinks_first_child_towards_up() {
        let mut layout = Layout::with_single_pane(0);
        let root = layout.root().unwrap();
        let second = layout.split(root, 1, Axis::Horizontal).unwrap();

        layout.resize_tile(second, Direction::Up, 3).unwrap();

        let mut locations = Vec::new();
        layout.reflow(
            Location {
                px: 0,
                py: 0,
                sx: 20,
                sy: 20,
            },
            |pane, loc| locations.push((pane, loc)),
        );
        locations.sort_by_key(|(pane, _)| *pane);
        // first child (pane 0) shrank, second (pane 1) grew.
        assert!(locations[0].1.sy < locations[1].1.sy);
    }

    #[test]
    fn resize_tile_never_shrinks_below_minimum() {
        let mut layout = Layout::with_single_pane(0);
        let root = layout.root().unwrap();
        let second = layout.split(root, 1, Axis::Vertical).unwrap();

        for _ in 0..20 {
            layout.resize_tile(second, Direction::Left, 5).unwrap();
        }

        let mut locations = Vec::new();
        layout.reflow(
            Location {
                px: 0,
                py: 0,
                sx: 20,
                sy: 20,
            },
            |pane, loc| locations.push((pane, loc)),
        );
        locations.sort_by_key(|(pane, _)| *pane);
        assert!(locations[0].1.sx >= 1);
    }
}
