//! goreplay: a Go game record viewer core.
//!
//! Loads an SGF record into an arena-backed move tree and navigates it
//! while keeping a board in lock-step with the current position.
//!
//! ## Modules
//!
//! - [`sgf`] - SGF reader producing a [`tree::GameTree`]
//! - [`tree`] - Arena move tree, move numbers, draw lanes, board effects
//! - [`board`] - Board collaborator trait and the reference [`board::GoBoard`]
//! - [`engine`] - Navigation engine (stepping, variations, events, jumps)
//! - [`event`] - Stopping-point classification
//! - [`comment`] - Shown-comment cache with dirty flag
//! - [`metadata`] - Game-info header
//! - [`window`] - Variation overview layout
//! - [`session`] - Line-oriented replay loop
//! - [`walk`] - Random navigation walk with board verification
//! - [`config`] - Configuration file and resolution
//!
//! ## Example
//!
//! ```
//! use goreplay::board::GoBoard;
//! use goreplay::engine::Engine;
//!
//! let mut engine = Engine::new(GoBoard::default());
//! engine.open_str("(;SZ[9];B[ee]C[Tengen];W[cc])").unwrap();
//!
//! engine.move_to_next_event();
//! assert_eq!(engine.move_index(), Some(1));
//! assert_eq!(engine.comment(), Some("Tengen"));
//! ```

pub mod board;
pub mod comment;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod event;
pub mod metadata;
pub mod session;
pub mod sgf;
pub mod tree;
pub mod walk;
pub mod window;
