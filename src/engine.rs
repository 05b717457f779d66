//! Navigation engine.
//!
//! The engine owns the loaded [`GameTree`], the cursor into it, and the
//! [`Board`] collaborator, and keeps one invariant: the board always shows
//! the cumulative effect of every node on the root→cursor path, each applied
//! exactly once.
//!
//! Moving down the tree applies a node's effects; moving up undoes exactly as
//! many board mutations as the node produced. Variation switching climbs from
//! the cursor and the target to their lowest common ancestor, undoing on the
//! cursor side and recording the target side, then replays the recorded path.
//!
//! Every navigation call returns `false` and changes nothing when no game is
//! loaded or while the fullscreen comment is shown.

use std::cmp::Reverse;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};

use crate::board::Board;
use crate::comment::CommentView;
use crate::constants::{DEFAULT_BOARD_SIZE, UNKNOWN};
use crate::error::LoadError;
use crate::event;
use crate::metadata::GameMetadata;
use crate::sgf;
use crate::tree::{Effect, GameTree, MoveNode, NodeId};
use crate::window::{self, VariationColumn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Cursor-derived status line: move number and prisoners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    pub move_num: usize,
    pub captured_black: u32,
    pub captured_white: u32,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Move {}\nCap.: B[{}] W[{}]",
            self.move_num, self.captured_black, self.captured_white
        )
    }
}

/// Tree, cursor and header of the open game. They only exist together.
struct LoadedGame {
    tree: GameTree,
    cursor: NodeId,
    metadata: GameMetadata,
}

/// Replay state: the board, the open game and the comment overlay.
pub struct Engine<B: Board> {
    board: B,
    game: Option<LoadedGame>,
    comment: CommentView,
    fullscreen_comment: bool,
    placeholder: String,
}

impl<B: Board + Default> Default for Engine<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: Board> Engine<B> {
    /// Create an engine with no game loaded, driving `board`.
    pub fn new(board: B) -> Self {
        Self {
            board,
            game: None,
            comment: CommentView::default(),
            fullscreen_comment: false,
            placeholder: UNKNOWN.to_string(),
        }
    }

    /// Text used for missing game-info fields of games opened from now on.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Open an SGF file. The previous game is discarded first, so on error
    /// the engine is left with no game loaded.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        self.close();

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Game record {} does not exist", path.display());
                return Err(LoadError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        self.open_str(&String::from_utf8_lossy(&bytes))?;
        info!("Opened {}", path.display());
        Ok(())
    }

    /// Open a game from SGF text already in memory.
    pub fn open_str(&mut self, text: &str) -> Result<(), LoadError> {
        self.close();
        let tree = sgf::parse(text).inspect_err(|e| warn!("Rejected game record: {e}"))?;
        self.load_tree(tree);
        Ok(())
    }

    /// Install an already built tree, positioned at the root with the root's
    /// setup applied. The tree is annotated here, so hand-built trees need
    /// no extra step.
    pub fn load_tree(&mut self, mut tree: GameTree) {
        self.close();
        tree.annotate();
        let metadata = GameMetadata::with_placeholder(&tree, &self.placeholder);
        let root = tree.root();

        self.board.reset(metadata.board_size);
        apply_node(&tree, root, &mut self.board);
        self.comment.update(tree.get(root).comment());

        debug!(
            "Loaded game tree: {} nodes, {}x{} board",
            tree.len(),
            metadata.board_size,
            metadata.board_size
        );
        self.game = Some(LoadedGame {
            tree,
            cursor: root,
            metadata,
        });
    }

    /// Drop the game and reset comment, overlay and board.
    pub fn close(&mut self) {
        if self.game.take().is_some() {
            info!("Closed game");
        }
        self.comment.clear();
        self.fullscreen_comment = false;
        self.board.reset(DEFAULT_BOARD_SIZE);
    }

    /// Whether a game is open. Every navigation call is a no-op otherwise.
    pub fn is_game_loaded(&self) -> bool {
        self.game.is_some()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Play the primary continuation. No-op at a leaf.
    pub fn step_forward(&mut self) -> bool {
        if self.fullscreen_comment {
            return false;
        }
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        let moved = game.forward(&mut self.board);
        if moved {
            self.refresh_comment();
        }
        moved
    }

    /// Take back the current node. No-op at the root.
    pub fn step_back(&mut self) -> bool {
        if self.fullscreen_comment {
            return false;
        }
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        let moved = game.back(&mut self.board);
        if moved {
            self.refresh_comment();
        }
        moved
    }

    /// Switch to the sibling variation with the nearest greater lane.
    pub fn switch_variation_down(&mut self) -> bool {
        self.switch_variation(Direction::Down)
    }

    /// Switch to the sibling variation with the nearest lesser lane.
    pub fn switch_variation_up(&mut self) -> bool {
        self.switch_variation(Direction::Up)
    }

    fn switch_variation(&mut self, direction: Direction) -> bool {
        if self.fullscreen_comment {
            return false;
        }
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        let Some(target) = game.variation_target(direction) else {
            return false;
        };
        game.traverse_to(target, &mut self.board);
        self.refresh_comment();
        true
    }

    /// Step forward at least once, then until a comment, a branch or the
    /// end of the line.
    pub fn move_to_next_event(&mut self) -> bool {
        if self.fullscreen_comment {
            return false;
        }
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        let start = game.cursor;

        game.forward(&mut self.board);
        while !event::stops_forward(&game.tree, game.cursor) {
            game.forward(&mut self.board);
        }

        let moved = game.cursor != start;
        if moved {
            self.refresh_comment();
        }
        moved
    }

    /// Step back at least once, then until a comment, a branch or the root.
    pub fn move_to_previous_event(&mut self) -> bool {
        if self.fullscreen_comment {
            return false;
        }
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        let start = game.cursor;

        game.back(&mut self.board);
        while !event::stops_backward(&game.tree, game.cursor) {
            game.back(&mut self.board);
        }

        let moved = game.cursor != start;
        if moved {
            self.refresh_comment();
        }
        moved
    }

    /// Walk along the current line until the cursor's move number is `n`, or
    /// the root or a leaf is hit first.
    pub fn jump_to_move_index(&mut self, n: usize) -> bool {
        if self.fullscreen_comment {
            return false;
        }
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        let start = game.cursor;
        let current = game.move_num();
        if n == current {
            return false;
        }

        if n < current {
            while game.move_num() > n && game.back(&mut self.board) {}
        } else {
            while game.move_num() < n && game.forward(&mut self.board) {}
        }

        let moved = game.cursor != start;
        if moved {
            debug!("Jumped from move {current} to move {}", game.move_num());
            self.refresh_comment();
        }
        moved
    }

    /// Flip the fullscreen comment overlay. Only possible while a comment
    /// is shown; never moves the cursor.
    pub fn toggle_fullscreen_comment(&mut self) -> bool {
        if self.game.is_none() || !self.comment.is_shown() {
            return false;
        }
        self.fullscreen_comment = !self.fullscreen_comment;
        true
    }

    fn refresh_comment(&mut self) {
        if let Some(game) = &self.game {
            self.comment.update(game.tree.get(game.cursor).comment());
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The board collaborator, showing the root→cursor position.
    pub fn board(&self) -> &B {
        &self.board
    }

    /// The open game's move tree.
    pub fn tree(&self) -> Option<&GameTree> {
        self.game.as_ref().map(|g| &g.tree)
    }

    /// The current node, `None` when no game is loaded.
    pub fn cursor(&self) -> Option<NodeId> {
        self.game.as_ref().map(|g| g.cursor)
    }

    /// The node under the cursor.
    pub fn current_node(&self) -> Option<&MoveNode> {
        self.game.as_ref().map(|g| g.tree.get(g.cursor))
    }

    /// Depth of the cursor below the root (root = 0).
    pub fn move_index(&self) -> Option<usize> {
        self.game.as_ref().map(LoadedGame::move_num)
    }

    /// Game-info header of the open game.
    pub fn metadata(&self) -> Option<&GameMetadata> {
        self.game.as_ref().map(|g| &g.metadata)
    }

    /// Comment currently shown, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.text()
    }

    /// Whether the shown comment changed since the last
    /// [`Engine::mark_comment_drawn`].
    pub fn is_comment_dirty(&self) -> bool {
        self.comment.is_dirty()
    }

    /// Acknowledge that the UI has drawn the current comment.
    pub fn mark_comment_drawn(&mut self) {
        self.comment.mark_drawn();
    }

    /// Whether the fullscreen comment overlay is up.
    pub fn is_fullscreen_comment(&self) -> bool {
        self.fullscreen_comment
    }

    /// Move number and prisoner counts at the cursor.
    pub fn status(&self) -> Option<Status> {
        let game = self.game.as_ref()?;
        let (captured_black, captured_white) = self.board.captured_counts();
        Some(Status {
            move_num: game.move_num(),
            captured_black,
            captured_white,
        })
    }

    /// Columns of the variation overview around the cursor.
    pub fn variation_window(&self, width: usize, height: usize) -> Vec<VariationColumn> {
        match &self.game {
            Some(game) => window::variation_window(&game.tree, game.cursor, width, height),
            None => Vec::new(),
        }
    }
}

impl LoadedGame {
    fn move_num(&self) -> usize {
        self.tree.get(self.cursor).move_num
    }

    fn forward<B: Board>(&mut self, board: &mut B) -> bool {
        let Some(child) = self.tree.child(self.cursor) else {
            return false;
        };
        apply_node(&self.tree, child, board);
        self.cursor = child;
        true
    }

    /// Cursor movement depends only on the tree and the node's recorded
    /// effect count, so zero-effect nodes (passes, comment-only nodes) are
    /// stepped over like any other.
    fn back<B: Board>(&mut self, board: &mut B) -> bool {
        let Some(parent) = self.tree.parent(self.cursor) else {
            return false;
        };
        undo_node(&self.tree, self.cursor, board);
        self.cursor = parent;
        true
    }

    fn variation_target(&self, direction: Direction) -> Option<NodeId> {
        let lane = |id: NodeId| self.tree.get(id).draw_lvl;
        let current = lane(self.cursor);
        let siblings = self.tree.siblings(self.cursor);
        match direction {
            Direction::Down => siblings.filter(|&s| lane(s) > current).min_by_key(|&s| lane(s)),
            Direction::Up => siblings
                .filter(|&s| lane(s) < current)
                .min_by_key(|&s| Reverse(lane(s))),
        }
    }

    /// Move the cursor to `target` through the lowest common ancestor.
    ///
    /// # Panics
    ///
    /// If `target` is not a node of this tree.
    fn traverse_to<B: Board>(&mut self, target: NodeId, board: &mut B) {
        assert!(
            self.tree.contains(target),
            "{target} does not belong to the loaded game tree"
        );
        let source = self.cursor;
        let depth = |tree: &GameTree, id: NodeId| tree.get(id).move_num;

        let mut walker = target;
        let mut path = Vec::new();

        while depth(&self.tree, self.cursor) > depth(&self.tree, walker) {
            self.back(board);
        }
        while depth(&self.tree, walker) > depth(&self.tree, self.cursor) {
            path.push(walker);
            walker = self.ascend(walker, source, target);
        }
        while self.cursor != walker {
            if !self.back(board) {
                panic!("{source} and {target} share no common ancestor");
            }
            path.push(walker);
            walker = self.ascend(walker, source, target);
        }

        debug!(
            "Variation switch {source} -> {target}: common ancestor {walker}, {} node(s) to replay",
            path.len()
        );
        for id in path.into_iter().rev() {
            apply_node(&self.tree, id, board);
            self.cursor = id;
        }
    }

    fn ascend(&self, id: NodeId, source: NodeId, target: NodeId) -> NodeId {
        self.tree
            .parent(id)
            .unwrap_or_else(|| panic!("{source} and {target} share no common ancestor"))
    }
}

/// Apply every effect of one node, in property order.
pub fn apply_node<B: Board>(tree: &GameTree, id: NodeId, board: &mut B) {
    for effect in &tree.get(id).effects {
        match *effect {
            Effect::Stone {
                point,
                color,
                is_move,
            } => board.place_stone(point, color, is_move),
            Effect::Marker { point, marker } => board.place_marker(point, marker),
            Effect::ClearMarkers => board.clear_markers(),
        }
    }
}

fn undo_node<B: Board>(tree: &GameTree, id: NodeId, board: &mut B) {
    let expected = tree.get(id).board_effects();
    for done in 0..expected {
        if !board.undo_last_mutation() {
            warn!("Board out of sync: undid {done} of {expected} mutation(s) for {id}");
            break;
        }
    }
}

/// Reset `board` and apply every node from the root down to `id`.
pub fn replay<B: Board>(tree: &GameTree, id: NodeId, board: &mut B) {
    board.reset(tree.board_size());
    for node in tree.path_from_root(id) {
        apply_node(tree, node, board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, GoBoard, Marker, Point};
    use crate::tree::Property;

    /// Board double that only counts mutations and can refuse undos.
    #[derive(Default)]
    struct CountingBoard {
        placed: usize,
        undone: usize,
        refuse_undo: bool,
    }

    impl Board for CountingBoard {
        fn reset(&mut self, _size: usize) {
            self.placed = 0;
            self.undone = 0;
        }

        fn place_stone(&mut self, _point: Point, _color: Color, _is_move: bool) {
            self.placed += 1;
        }

        fn place_marker(&mut self, _point: Point, _marker: Marker) {
            self.placed += 1;
        }

        fn clear_markers(&mut self) {
            self.placed += 1;
        }

        fn undo_last_mutation(&mut self) -> bool {
            if self.refuse_undo || self.undone >= self.placed {
                return false;
            }
            self.undone += 1;
            true
        }

        fn captured_counts(&self) -> (u32, u32) {
            (0, 0)
        }
    }

    fn property(ident: &str, value: &str) -> Property {
        Property {
            ident: ident.to_string(),
            values: vec![value.to_string()],
        }
    }

    const LINEAR: &str = "(;SZ[9];B[cc];W[gg]C[White takes the corner])";
    const FORK: &str = "(;SZ[9](;B[aa])(;B[bb]))";

    fn engine(sgf: &str) -> Engine<GoBoard> {
        let mut engine = Engine::new(GoBoard::default());
        engine.open_str(sgf).unwrap();
        engine
    }

    #[test]
    fn test_open_positions_cursor_at_root() {
        let engine = engine("(;SZ[9]AB[aa]C[start];B[cc])");
        assert!(engine.is_game_loaded());
        assert_eq!(engine.move_index(), Some(0));
        assert_eq!(engine.board().get(0, 0), Some(Color::Black));
        assert_eq!(engine.comment(), Some("start"));
        assert_eq!(engine.board().size, 9);
    }

    #[test]
    fn test_linear_comment_scenario() {
        let mut engine = engine(LINEAR);
        engine.mark_comment_drawn();

        assert!(engine.step_forward());
        assert_eq!(engine.move_index(), Some(1));
        assert_eq!(engine.comment(), None);
        assert!(!engine.is_comment_dirty());

        assert!(engine.step_forward());
        assert_eq!(engine.comment(), Some("White takes the corner"));
        assert!(engine.is_comment_dirty());
        engine.mark_comment_drawn();

        assert!(engine.step_back());
        assert_eq!(engine.move_index(), Some(1));
        assert_eq!(engine.board().get(6, 6), None);
        assert_eq!(engine.board().get(2, 2), Some(Color::Black));
        assert_eq!(engine.comment(), None);
        assert!(engine.is_comment_dirty());
    }

    #[test]
    fn test_step_forward_at_leaf_is_noop() {
        let mut engine = engine(LINEAR);
        engine.jump_to_move_index(2);
        assert!(!engine.step_forward());
        assert_eq!(engine.move_index(), Some(2));
    }

    #[test]
    fn test_step_back_at_root_keeps_setup() {
        let mut engine = engine("(;SZ[9]AB[ee];B[aa])");
        assert!(!engine.step_back());
        assert_eq!(engine.board().get(4, 4), Some(Color::Black));
    }

    #[test]
    fn test_step_back_over_pass_and_comment_nodes() {
        let mut engine = engine("(;SZ[9];B[aa];W[];C[just talk];B[bb])");
        assert!(engine.jump_to_move_index(4));
        assert!(engine.step_back());
        assert!(engine.step_back());
        assert!(engine.step_back());
        assert_eq!(engine.move_index(), Some(1));
        assert_eq!(engine.board().get(0, 0), Some(Color::Black));
        assert_eq!(engine.board().history_len(), 1);
    }

    #[test]
    fn test_switch_variation_down_replaces_stone() {
        let mut engine = engine(FORK);
        assert!(engine.step_forward());
        assert_eq!(engine.board().get(0, 0), Some(Color::Black));

        assert!(engine.switch_variation_down());
        assert_eq!(engine.board().get(0, 0), None);
        assert_eq!(engine.board().get(1, 1), Some(Color::Black));
        assert_eq!(engine.move_index(), Some(1));

        assert!(!engine.switch_variation_down());
        assert!(engine.switch_variation_up());
        assert_eq!(engine.board().get(0, 0), Some(Color::Black));
        assert_eq!(engine.board().get(1, 1), None);
    }

    #[test]
    fn test_switch_without_siblings_is_noop() {
        let mut engine = engine(LINEAR);
        engine.step_forward();
        assert!(!engine.switch_variation_down());
        assert!(!engine.switch_variation_up());
        assert_eq!(engine.move_index(), Some(1));
    }

    #[test]
    fn test_traverse_between_different_depths() {
        let mut engine = engine("(;SZ[9](;B[aa];W[ab];B[ac])(;B[ba];W[bb]))");
        engine.jump_to_move_index(3);
        let target = {
            let tree = engine.tree().unwrap();
            let second = tree.next_var(tree.child(tree.root()).unwrap()).unwrap();
            tree.child(second).unwrap()
        };
        let game = engine.game.as_mut().unwrap();
        game.traverse_to(target, &mut engine.board);

        assert_eq!(engine.cursor(), Some(target));
        let mut expected = GoBoard::default();
        replay(engine.tree().unwrap(), target, &mut expected);
        assert!(engine.board().same_position(&expected));
    }

    #[test]
    fn test_navigation_requires_game() {
        let mut engine: Engine<GoBoard> = Engine::default();
        assert!(!engine.step_forward());
        assert!(!engine.step_back());
        assert!(!engine.switch_variation_down());
        assert!(!engine.move_to_next_event());
        assert!(!engine.jump_to_move_index(3));
        assert!(!engine.toggle_fullscreen_comment());
        assert_eq!(engine.status(), None);
    }

    #[test]
    fn test_fullscreen_comment_blocks_navigation() {
        let mut engine = engine("(;SZ[9]C[intro];B[aa])");
        assert!(engine.toggle_fullscreen_comment());
        assert!(engine.is_fullscreen_comment());
        assert!(!engine.step_forward());
        assert_eq!(engine.move_index(), Some(0));

        assert!(engine.toggle_fullscreen_comment());
        assert!(engine.step_forward());
    }

    #[test]
    fn test_toggle_needs_a_comment() {
        let mut engine = engine(LINEAR);
        assert!(!engine.toggle_fullscreen_comment());
        assert!(!engine.is_fullscreen_comment());
    }

    #[test]
    fn test_status_reports_captures() {
        let mut engine = engine("(;SZ[9];B[ba];W[aa];B[ab])");
        engine.jump_to_move_index(3);
        let status = engine.status().unwrap();
        assert_eq!(status.captured_black, 1);
        assert_eq!(status.to_string(), "Move 3\nCap.: B[1] W[0]");
    }

    #[test]
    fn test_close_resets_everything() {
        let mut engine = engine("(;SZ[9]C[x];B[aa])");
        engine.step_forward();
        engine.close();
        assert!(!engine.is_game_loaded());
        assert_eq!(engine.comment(), None);
        assert_eq!(engine.board().history_len(), 0);
        assert_eq!(engine.board().size, DEFAULT_BOARD_SIZE);
    }

    #[test]
    fn test_load_tree_annotates_hand_built_tree() {
        let mut tree = GameTree::new(vec![property("SZ", "9")]);
        let b = tree.add_child(tree.root(), vec![property("B", "cc")]);
        tree.add_child(b, vec![property("W", "gg")]);

        let mut engine = Engine::new(GoBoard::default());
        engine.load_tree(tree);
        assert_eq!(engine.board().size, 9);

        assert!(engine.step_forward());
        assert_eq!(engine.move_index(), Some(1));
        assert_eq!(engine.board().get(2, 2), Some(Color::Black));

        engine.step_back();
        assert!(engine.jump_to_move_index(2));
        assert_eq!(engine.move_index(), Some(2));
        assert_eq!(engine.board().get(6, 6), Some(Color::White));
    }

    #[test]
    fn test_board_calls_match_effect_counts() {
        let mut engine = Engine::new(CountingBoard::default());
        engine
            .open_str("(;SZ[9]AB[aa][bb];B[cc]TR[dd][ee];W[];B[ff])")
            .unwrap();
        assert_eq!(engine.board().placed, 2);

        let mut expected = 2;
        while engine.step_forward() {
            expected += engine.current_node().unwrap().board_effects();
            assert_eq!(engine.board().placed, expected);
        }
        // Stone and two markers, the pass clears them, then one stone.
        assert_eq!(expected, 7);

        let mut undone = 0;
        while engine.move_index() != Some(0) {
            undone += engine.current_node().unwrap().board_effects();
            assert!(engine.step_back());
            assert_eq!(engine.board().undone, undone);
        }
        assert_eq!(undone, 5);
    }

    #[test]
    fn test_refused_undo_still_moves_cursor() {
        let mut engine = Engine::new(CountingBoard::default());
        engine.open_str("(;SZ[9];B[aa];W[bb])").unwrap();
        engine.jump_to_move_index(2);
        engine.board.refuse_undo = true;

        assert!(engine.step_back());
        assert_eq!(engine.move_index(), Some(1));
        assert_eq!(engine.board().undone, 0);
    }

    #[test]
    #[should_panic(expected = "does not belong")]
    fn test_traverse_to_foreign_node_panics() {
        let mut engine = engine(FORK);
        let other = sgf::parse("(;SZ[9];B[aa];W[bb];B[cc];W[dd];B[ee])").unwrap();
        let foreign = other.ids().last().unwrap();

        let game = engine.game.as_mut().unwrap();
        game.traverse_to(foreign, &mut engine.board);
    }

    #[test]
    fn test_pass_clears_parent_markup() {
        let mut engine = engine("(;SZ[9];B[aa]TR[bb];W[])");
        engine.jump_to_move_index(1);
        assert_eq!(engine.board().marker(1, 1), Some(Marker::Triangle));

        assert!(engine.step_forward());
        assert_eq!(engine.board().marker(1, 1), None);

        assert!(engine.step_back());
        assert_eq!(engine.board().marker(1, 1), Some(Marker::Triangle));
    }
}
