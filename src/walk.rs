//! Random navigation walk with board verification.
//!
//! Drives an engine with random navigation calls and, after every call,
//! compares its board with a fresh replay of the root→cursor path.

use log::debug;
use thiserror::Error;

use crate::board::GoBoard;
use crate::engine::{Engine, replay};
use crate::tree::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavOp {
    Forward,
    Back,
    VariationDown,
    VariationUp,
    NextEvent,
    PreviousEvent,
    Jump(usize),
}

impl NavOp {
    pub fn random(rng: &mut fastrand::Rng, max_jump: usize) -> NavOp {
        match rng.u8(0..7) {
            0 => NavOp::Forward,
            1 => NavOp::Back,
            2 => NavOp::VariationDown,
            3 => NavOp::VariationUp,
            4 => NavOp::NextEvent,
            5 => NavOp::PreviousEvent,
            _ => NavOp::Jump(rng.usize(0..=max_jump)),
        }
    }

    pub fn apply(self, engine: &mut Engine<GoBoard>) -> bool {
        match self {
            NavOp::Forward => engine.step_forward(),
            NavOp::Back => engine.step_back(),
            NavOp::VariationDown => engine.switch_variation_down(),
            NavOp::VariationUp => engine.switch_variation_up(),
            NavOp::NextEvent => engine.move_to_next_event(),
            NavOp::PreviousEvent => engine.move_to_previous_event(),
            NavOp::Jump(n) => engine.jump_to_move_index(n),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    #[error("no game loaded")]
    NoGame,
    #[error("board diverged from replay after step {step} ({op:?}) at {cursor}")]
    Diverged { step: usize, op: NavOp, cursor: NodeId },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub steps: usize,
    pub moves: usize,
    pub deepest: usize,
}

/// Check that the engine's board matches a replay of its cursor path.
pub fn board_matches_replay(engine: &Engine<GoBoard>) -> bool {
    let (Some(tree), Some(cursor)) = (engine.tree(), engine.cursor()) else {
        return false;
    };
    let mut expected = GoBoard::default();
    replay(tree, cursor, &mut expected);
    engine.board().same_position(&expected)
}

/// Perform `steps` random navigation calls, verifying the board after each.
pub fn random_walk(engine: &mut Engine<GoBoard>, rng: &mut fastrand::Rng, steps: usize) -> Result<WalkReport, WalkError> {
    let max_jump = engine
        .tree()
        .map(|t| t.ids().map(|id| t.get(id).move_num).max().unwrap_or(0))
        .ok_or(WalkError::NoGame)?;

    let mut report = WalkReport::default();
    for step in 0..steps {
        let op = NavOp::random(rng, max_jump);
        let moved = op.apply(engine);
        debug!("walk step {step}: {op:?} moved={moved}");

        report.steps += 1;
        if moved {
            report.moves += 1;
        }
        if let Some(n) = engine.move_index() {
            report.deepest = report.deepest.max(n);
        }

        if !board_matches_replay(engine) {
            let cursor = engine.cursor().ok_or(WalkError::NoGame)?;
            return Err(WalkError::Diverged { step, op, cursor });
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_without_game() {
        let mut engine = Engine::new(GoBoard::default());
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(random_walk(&mut engine, &mut rng, 10), Err(WalkError::NoGame));
    }

    #[test]
    fn test_walk_stays_in_sync() {
        let mut engine = Engine::new(GoBoard::default());
        engine
            .open_str("(;SZ[9]AB[ee];B[aa];W[ba](;B[ab]C[x];W[];B[cc])(;B[bb]TR[aa])(;B[dd]))")
            .unwrap();
        let mut rng = fastrand::Rng::with_seed(42);
        let report = random_walk(&mut engine, &mut rng, 500).unwrap();
        assert_eq!(report.steps, 500);
        assert!(report.moves > 0);
    }
}
