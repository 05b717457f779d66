//! Variation overview.
//!
//! A small grid beside the comment: one column per move starting just
//! before the current branch point, one row per draw lane. The data here is
//! what a UI needs to draw it; [`render`] gives a plain-text version.

use crate::board::Color;
use crate::tree::{GameTree, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    BlackMove,
    WhiteMove,
    /// Setup-only or empty node.
    NoMove,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariationCell {
    pub node: NodeId,
    pub lane: usize,
    pub kind: NodeKind,
    pub has_comment: bool,
    pub is_current: bool,
    /// Lane of the parent, when the parent sits in the previous column.
    pub parent_lane: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariationColumn {
    pub move_num: usize,
    pub cells: Vec<VariationCell>,
}

/// Lay out up to `width` columns and `height` lanes around `cursor`.
///
/// The first column is the parent of the cursor's branch point (or the
/// branch point itself at the root). Each following column is the primary
/// continuation of the previous one, listed together with the variations
/// that follow it in file order.
pub fn variation_window(tree: &GameTree, cursor: NodeId, width: usize, height: usize) -> Vec<VariationColumn> {
    let first = tree.first_sibling(cursor);
    let begin = tree.parent(first).unwrap_or(first);

    let mut columns: Vec<VariationColumn> = Vec::with_capacity(width);
    let mut column_head = Some(begin);
    while let Some(head) = column_head {
        if columns.len() >= width {
            break;
        }
        let is_first_column = columns.is_empty();
        let cells = tree
            .variations_from(head)
            .filter(|&id| tree.get(id).draw_lvl < height)
            .map(|id| {
                let node = tree.get(id);
                VariationCell {
                    node: id,
                    lane: node.draw_lvl,
                    kind: match node.move_color() {
                        Some(Color::Black) => NodeKind::BlackMove,
                        Some(Color::White) => NodeKind::WhiteMove,
                        None => NodeKind::NoMove,
                    },
                    has_comment: node.has_comment(),
                    is_current: id == cursor,
                    parent_lane: match tree.parent(id) {
                        Some(p) if !is_first_column => Some(tree.get(p).draw_lvl),
                        _ => None,
                    },
                }
            })
            .collect();
        columns.push(VariationColumn {
            move_num: tree.get(head).move_num,
            cells,
        });
        column_head = tree.child(head);
    }
    columns
}

/// Text grid: `X`/`O` for moves, `-` for nodes without a move, a trailing
/// `*` for commented nodes, and brackets around the cursor.
pub fn render(columns: &[VariationColumn], height: usize) -> String {
    let mut out = String::new();
    for lane in 0..height {
        let mut line = String::new();
        for column in columns {
            let cell = column.cells.iter().find(|c| c.lane == lane);
            let text = match cell {
                Some(c) => {
                    let stone = match c.kind {
                        NodeKind::BlackMove => 'X',
                        NodeKind::WhiteMove => 'O',
                        NodeKind::NoMove => '-',
                    };
                    let note = if c.has_comment { "*" } else { "" };
                    if c.is_current {
                        format!("[{stone}{note}]")
                    } else {
                        format!(" {stone}{note} ")
                    }
                }
                None => "    ".to_string(),
            };
            line.push_str(&format!("{text:<5}"));
        }
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::parse;

    #[test]
    fn test_window_starts_before_branch_point() {
        let tree = parse("(;SZ[9];B[aa];W[bb](;B[cc]C[main];W[dd])(;B[ee]))").unwrap();
        let w2 = tree.child(tree.child(tree.root()).unwrap()).unwrap();
        let b3 = tree.child(w2).unwrap();
        let alt = tree.next_var(b3).unwrap();

        let columns = variation_window(&tree, alt, 4, 6);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].move_num, 2);
        assert_eq!(columns[0].cells[0].parent_lane, None);

        let branch = &columns[1].cells;
        assert_eq!(branch.len(), 2);
        assert_eq!(branch[0].kind, NodeKind::BlackMove);
        assert!(branch[0].has_comment);
        assert!(branch[1].is_current);
        assert_eq!(branch[1].lane, 1);
        assert_eq!(branch[1].parent_lane, Some(0));

        assert_eq!(columns[2].cells[0].kind, NodeKind::WhiteMove);
    }

    #[test]
    fn test_window_at_root_and_limits() {
        let tree = parse("(;SZ[9];B[aa];W[bb];B[cc];W[dd];B[ee])").unwrap();
        let columns = variation_window(&tree, tree.root(), 3, 6);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].cells[0].kind, NodeKind::NoMove);
        assert!(columns[0].cells[0].is_current);

        let clipped = variation_window(&tree, tree.root(), 3, 0);
        assert!(clipped.iter().all(|c| c.cells.is_empty()));
    }

    #[test]
    fn test_render_marks_cursor_and_comments() {
        let tree = parse("(;SZ[9](;B[aa]C[hi])(;B[bb]))").unwrap();
        let first = tree.child(tree.root()).unwrap();
        let text = render(&variation_window(&tree, first, 4, 6), 6);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], " -   [X*]");
        assert_eq!(lines[1], "      X");
    }
}
