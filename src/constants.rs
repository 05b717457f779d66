//! Constants for board dimensions, SGF property identifiers, and display defaults.
//!
//! Property identifiers are the FF[4] names with lower-case letters stripped,
//! so `AddBlack` from an old FF[1] file arrives here as `AB`.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when a record has no `SZ` property.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Largest board an SGF point can address (`a`-`z` then `A`-`Z`).
pub const MAX_BOARD_SIZE: usize = 52;

// =============================================================================
// Game Info Defaults
// =============================================================================

/// Placeholder shown for any missing textual game-info field.
pub const UNKNOWN: &str = "unknown";

/// Handicap used when a record has no `HA` property.
pub const DEFAULT_HANDICAP: u32 = 0;

/// Main time (seconds) used when a record has no `TM` property.
pub const DEFAULT_TIME: u32 = 0;

// =============================================================================
// Property Identifiers
// =============================================================================

/// Black move.
pub const PROP_BLACK: &str = "B";
/// White move.
pub const PROP_WHITE: &str = "W";
/// Black setup stones.
pub const PROP_ADD_BLACK: &str = "AB";
/// White setup stones.
pub const PROP_ADD_WHITE: &str = "AW";
/// Square marker.
pub const PROP_SQUARE: &str = "SQ";
/// Circle marker.
pub const PROP_CIRCLE: &str = "CR";
/// Triangle marker.
pub const PROP_TRIANGLE: &str = "TR";
/// Cross marker.
pub const PROP_MARK: &str = "MA";
/// Node commentary.
pub const PROP_COMMENT: &str = "C";

pub const PROP_PLAYER_BLACK: &str = "PB";
pub const PROP_BLACK_RANK: &str = "BR";
pub const PROP_PLAYER_WHITE: &str = "PW";
pub const PROP_WHITE_RANK: &str = "WR";
pub const PROP_SIZE: &str = "SZ";
pub const PROP_KOMI: &str = "KM";
pub const PROP_HANDICAP: &str = "HA";
pub const PROP_DATE: &str = "DT";
pub const PROP_RESULT: &str = "RE";
pub const PROP_TIME: &str = "TM";
pub const PROP_OVERTIME: &str = "OT";
pub const PROP_RULES: &str = "RU";
pub const PROP_GAME_NAME: &str = "GN";
pub const PROP_EVENT: &str = "EV";
pub const PROP_APPLICATION: &str = "AP";

// =============================================================================
// Display Defaults
// =============================================================================

/// Number of move columns in the variation window.
pub const VARIATION_WINDOW_WIDTH: usize = 4;

/// Number of lanes (rows) in the variation window.
pub const VARIATION_WINDOW_HEIGHT: usize = 6;

/// Default log file written by the binary.
pub const DEFAULT_LOG_FILE: &str = "goreplay.log";
