//! Stopping points for event navigation.
//!
//! An event node carries commentary or starts a branch (its sibling set has
//! more than one member).

use crate::tree::{GameTree, NodeId};

pub fn is_branch(tree: &GameTree, id: NodeId) -> bool {
    tree.prev_var(id).is_some() || tree.next_var(id).is_some()
}

pub fn is_event(tree: &GameTree, id: NodeId) -> bool {
    tree.get(id).has_comment() || is_branch(tree, id)
}

/// Forward skipping halts here: an event, or the end of the line.
pub fn stops_forward(tree: &GameTree, id: NodeId) -> bool {
    tree.child(id).is_none() || is_event(tree, id)
}

/// Backward skipping halts here: an event, or the root.
pub fn stops_backward(tree: &GameTree, id: NodeId) -> bool {
    tree.parent(id).is_none() || is_event(tree, id)
}
