//! Arena-based move tree.
//!
//! Nodes live in a flat `Vec<MoveNode>` and refer to each other through
//! `NodeId` indices. The arena is the only owner; dropping the tree frees
//! every node at once. The root is always `NodeId(0)`.
//!
//! Children of a node form a doubly linked sibling chain in file order. The
//! first entry of that chain is the node's primary child.

use crate::board::{Color, Marker, Point};
use crate::constants::{
    DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, PROP_ADD_BLACK, PROP_ADD_WHITE, PROP_BLACK, PROP_CIRCLE,
    PROP_COMMENT, PROP_MARK, PROP_SIZE, PROP_SQUARE, PROP_TRIANGLE, PROP_WHITE,
};
use crate::sgf::{expand_points, parse_point};

/// Index into the [`GameTree`] node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One SGF property: identifier plus its raw values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub ident: String,
    pub values: Vec<String>,
}

/// A single board mutation produced by a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Stone {
        point: Point,
        color: Color,
        is_move: bool,
    },
    Marker {
        point: Point,
        marker: Marker,
    },
    /// Wipe the markup left by the parent node.
    ClearMarkers,
}

/// One position in the move tree.
#[derive(Clone, Debug)]
pub struct MoveNode {
    pub props: Vec<Property>,
    /// Depth from the root (root = 0).
    pub move_num: usize,
    /// Layout lane for the variation window.
    pub draw_lvl: usize,
    /// Board mutations this node performs, in property order.
    pub effects: Vec<Effect>,
    parent: Option<NodeId>,
    child: Option<NodeId>,
    next_var: Option<NodeId>,
    prev_var: Option<NodeId>,
}

impl MoveNode {
    fn new(props: Vec<Property>, parent: Option<NodeId>) -> Self {
        Self {
            props,
            move_num: 0,
            draw_lvl: 0,
            effects: Vec::new(),
            parent,
            child: None,
            next_var: None,
            prev_var: None,
        }
    }

    /// First value of a property.
    pub fn prop(&self, ident: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|p| p.ident == ident)
            .and_then(|p| p.values.first())
            .map(String::as_str)
    }

    pub fn prop_values(&self, ident: &str) -> &[String] {
        self.props
            .iter()
            .find(|p| p.ident == ident)
            .map(|p| p.values.as_slice())
            .unwrap_or(&[])
    }

    /// Integer value of a property. Accepts the `19:19` form of `SZ` and
    /// truncates reals such as `TM[1800.5]`.
    pub fn int_prop(&self, ident: &str) -> Option<i64> {
        let raw = self.prop(ident)?.trim();
        let head = raw.split(':').next().unwrap_or(raw).trim();
        head.parse::<i64>()
            .ok()
            .or_else(|| head.parse::<f64>().ok().map(|f| f as i64))
    }

    pub fn comment(&self) -> Option<&str> {
        self.prop(PROP_COMMENT)
    }

    pub fn has_comment(&self) -> bool {
        self.comment().is_some()
    }

    /// Color of the move played at this node, if any.
    pub fn move_color(&self) -> Option<Color> {
        if self.prop(PROP_BLACK).is_some() {
            Some(Color::Black)
        } else if self.prop(PROP_WHITE).is_some() {
            Some(Color::White)
        } else {
            None
        }
    }

    pub fn board_effects(&self) -> usize {
        self.effects.len()
    }
}

/// The whole game record.
#[derive(Clone, Debug)]
pub struct GameTree {
    nodes: Vec<MoveNode>,
}

impl GameTree {
    /// Create a tree holding only a root with the given properties.
    pub fn new(root_props: Vec<Property>) -> Self {
        Self {
            nodes: vec![MoveNode::new(root_props, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Append a node under `parent`. The first child becomes the primary
    /// continuation; later ones are chained as variations in call order.
    pub fn add_child(&mut self, parent: NodeId, props: Vec<Property>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut node = MoveNode::new(props, Some(parent));

        match self.nodes[parent.index()].child {
            None => self.nodes[parent.index()].child = Some(id),
            Some(first) => {
                let mut last = first;
                while let Some(next) = self.nodes[last.index()].next_var {
                    last = next;
                }
                self.nodes[last.index()].next_var = Some(id);
                node.prev_var = Some(last);
            }
        }

        self.nodes.push(node);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    /// Primary continuation.
    pub fn child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).child
    }

    pub fn next_var(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).next_var
    }

    pub fn prev_var(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).prev_var
    }

    pub fn first_sibling(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(prev) = self.prev_var(cur) {
            cur = prev;
        }
        cur
    }

    /// Every node sharing `id`'s branch point, in file order, `id` included.
    pub fn siblings(&self, id: NodeId) -> Siblings<'_> {
        self.variations_from(self.first_sibling(id))
    }

    /// `id` and the variations that follow it.
    pub fn variations_from(&self, id: NodeId) -> Siblings<'_> {
        Siblings {
            tree: self,
            next: Some(id),
        }
    }

    pub fn sibling_count(&self, id: NodeId) -> usize {
        self.siblings(id).count()
    }

    /// Nodes from the root down to `id`, both included.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            path.push(parent);
            cur = parent;
        }
        path.reverse();
        path
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Board size from the root `SZ`, falling back to 19.
    pub fn board_size(&self) -> usize {
        match self.get(self.root()).int_prop(PROP_SIZE) {
            Some(sz) if sz >= 1 && sz as usize <= MAX_BOARD_SIZE => sz as usize,
            _ => DEFAULT_BOARD_SIZE,
        }
    }

    /// Compute move numbers, board effects and draw lanes. Markup is per
    /// node, so a node below a marked parent starts by clearing it.
    /// Recomputes everything on each call.
    pub fn annotate(&mut self) {
        let size = self.board_size();
        // Parents are always allocated before their children.
        for i in 0..self.nodes.len() {
            let move_num = match self.nodes[i].parent {
                Some(p) => self.nodes[p.index()].move_num + 1,
                None => 0,
            };
            let parent_marked = self.nodes[i].parent.is_some_and(|p| {
                self.nodes[p.index()]
                    .effects
                    .iter()
                    .any(|e| matches!(e, Effect::Marker { .. }))
            });

            let mut effects = Vec::new();
            if parent_marked {
                effects.push(Effect::ClearMarkers);
            }
            effects.extend(node_effects(&self.nodes[i].props, size));
            self.nodes[i].move_num = move_num;
            self.nodes[i].effects = effects;
        }
        self.assign_draw_levels();
    }

    /// Top-down lane assignment. A primary child stays in its parent's lane;
    /// every further variation opens a fresh lane below everything laid out
    /// so far, so sibling lanes grow in file order.
    fn assign_draw_levels(&mut self) {
        let mut max_lane = 0;
        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(self.root(), Some(0))];

        while let Some((id, lane)) = stack.pop() {
            let lane = lane.unwrap_or(max_lane + 1);
            max_lane = max_lane.max(lane);
            self.nodes[id.index()].draw_lvl = lane;

            let children: Vec<NodeId> = match self.child(id) {
                Some(first) => self.variations_from(first).collect(),
                None => continue,
            };
            for (i, &c) in children.iter().enumerate().rev() {
                stack.push((c, if i == 0 { Some(lane) } else { None }));
            }
        }
    }
}

/// Iterator over a sibling chain.
pub struct Siblings<'a> {
    tree: &'a GameTree,
    next: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.next_var(cur);
        Some(cur)
    }
}

fn node_effects(props: &[Property], size: usize) -> Vec<Effect> {
    let mut effects = Vec::new();
    for prop in props {
        let ident = prop.ident.as_str();
        match ident {
            PROP_BLACK | PROP_WHITE => {
                let color = if ident == PROP_BLACK { Color::Black } else { Color::White };
                // A pass decodes to no point and leaves the board alone.
                if let Some(point) = prop.values.first().and_then(|v| parse_point(v, size)) {
                    effects.push(Effect::Stone { point, color, is_move: true });
                }
            }
            PROP_ADD_BLACK | PROP_ADD_WHITE => {
                let color = if ident == PROP_ADD_BLACK { Color::Black } else { Color::White };
                effects.extend(
                    points(&prop.values, size).map(|point| Effect::Stone { point, color, is_move: false }),
                );
            }
            _ => {
                if let Some(marker) = marker_for(ident) {
                    effects.extend(points(&prop.values, size).map(|point| Effect::Marker { point, marker }));
                }
            }
        }
    }
    effects
}

fn points(values: &[String], size: usize) -> impl Iterator<Item = Point> + '_ {
    values.iter().flat_map(move |v| expand_points(v, size))
}

fn marker_for(ident: &str) -> Option<Marker> {
    match ident {
        PROP_SQUARE => Some(Marker::Square),
        PROP_CIRCLE => Some(Marker::Circle),
        PROP_TRIANGLE => Some(Marker::Triangle),
        PROP_MARK => Some(Marker::Cross),
        _ => None,
    }
}
