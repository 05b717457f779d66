//! Game-info header read from the root node.

use std::fmt;

use crate::constants::{
    DEFAULT_HANDICAP, DEFAULT_TIME, PROP_APPLICATION, PROP_BLACK_RANK, PROP_DATE, PROP_EVENT,
    PROP_GAME_NAME, PROP_HANDICAP, PROP_KOMI, PROP_OVERTIME, PROP_PLAYER_BLACK, PROP_PLAYER_WHITE,
    PROP_RESULT, PROP_RULES, PROP_TIME, PROP_WHITE_RANK, UNKNOWN,
};
use crate::tree::{GameTree, MoveNode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub rank: String,
}

/// Immutable snapshot of the header fields, taken once at load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameMetadata {
    pub black: Player,
    pub white: Player,
    pub board_size: usize,
    pub komi: String,
    pub handicap: u32,
    pub date: String,
    pub result: String,
    /// Main time in seconds.
    pub time: u32,
    pub overtime: String,
    pub ruleset: String,
    pub game_name: Option<String>,
    pub event: Option<String>,
    pub application: Option<String>,
}

impl GameMetadata {
    pub fn from_tree(tree: &GameTree) -> Self {
        Self::with_placeholder(tree, UNKNOWN)
    }

    /// Like [`GameMetadata::from_tree`], substituting `placeholder` for
    /// missing text fields.
    pub fn with_placeholder(tree: &GameTree, placeholder: &str) -> Self {
        let root = tree.get(tree.root());
        let text = |ident| text_or(root, ident, placeholder);
        let count = |ident, default| {
            root.int_prop(ident)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(default)
        };
        let optional = |ident| root.prop(ident).map(str::to_string);

        Self {
            black: Player {
                name: text(PROP_PLAYER_BLACK),
                rank: text(PROP_BLACK_RANK),
            },
            white: Player {
                name: text(PROP_PLAYER_WHITE),
                rank: text(PROP_WHITE_RANK),
            },
            board_size: tree.board_size(),
            komi: text(PROP_KOMI),
            handicap: count(PROP_HANDICAP, DEFAULT_HANDICAP),
            date: text(PROP_DATE),
            result: text(PROP_RESULT),
            time: count(PROP_TIME, DEFAULT_TIME),
            overtime: text(PROP_OVERTIME),
            ruleset: text(PROP_RULES),
            game_name: optional(PROP_GAME_NAME),
            event: optional(PROP_EVENT),
            application: optional(PROP_APPLICATION),
        }
    }
}

fn text_or(node: &MoveNode, ident: &str, placeholder: &str) -> String {
    node.prop(ident)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

/// Two header lines: players, date and result; then time, komi, handicap
/// and ruleset.
impl fmt::Display for GameMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Black: {} [{}], White: {} [{}], Date: {}, Result: {}",
            self.black.name, self.black.rank, self.white.name, self.white.rank, self.date, self.result
        )?;
        write!(
            f,
            "Time: {} min ({}), Komi: {}, Handicap: {}, Ruleset: {}",
            self.time / 60,
            self.overtime,
            self.komi,
            self.handicap,
            self.ruleset
        )
    }
}
