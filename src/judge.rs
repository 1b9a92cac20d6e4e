//! Offline replay of an answer against its instance, reproducing the
//! official judge: every move executes first on a computers-only field, then
//! every connect is checked against that final field and scored.
//!
//! The search trusts its own incremental bookkeeping while running; the
//! replay is the independent check an answer must pass before it is printed.

use crate::cluster::ClusterSet;
use crate::geom::{Pos, cells_between};
use crate::io::{Input, Output};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Positions in messages are row-first, as in the contest formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("{0} actions exceed the allowance of {1}")]
    BudgetExceeded(usize, usize),
    #[error("move touches ({0} {1}) outside the board")]
    MoveOutOfRange(i32, i32),
    #[error("move from ({0} {1}) which holds no computer")]
    MoveNoComputer(i32, i32),
    #[error("move from ({0} {1}) to non-adjacent ({2} {3})")]
    MoveNotAdjacent(i32, i32, i32, i32),
    #[error("move onto occupied ({0} {1})")]
    MoveDestOccupied(i32, i32),
    #[error("connect touches ({0} {1}) outside the board")]
    ConnectOutOfRange(i32, i32),
    #[error("connect at ({0} {1}) which holds no computer")]
    ConnectNoComputer(i32, i32),
    #[error("connect ({0} {1})-({2} {3}) is not axis-aligned")]
    ConnectNotAligned(i32, i32, i32, i32),
    #[error("connect joins computers of different types")]
    ConnectTypeMismatch,
    #[error("connect crosses a computer at ({0} {1})")]
    ConnectCrossesComputer(i32, i32),
    #[error("cell ({0} {1}) carries more than one cable")]
    CableCellReused(i32, i32),
    #[error("pair connected twice")]
    DuplicatePair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub score: i64,
    pub moves: usize,
    pub links: usize,
}

pub fn replay(input: &Input, output: &Output) -> Result<Replay, ReplayError> {
    if output.actions() > input.budget() {
        return Err(ReplayError::BudgetExceeded(output.actions(), input.budget()));
    }
    let mut field = input.board.clone();
    for &(from, to) in &output.moves {
        for p in [from, to] {
            if !p.in_board(input.n) {
                return Err(ReplayError::MoveOutOfRange(p.y, p.x));
            }
        }
        if field[from.y as usize][from.x as usize] == 0 {
            return Err(ReplayError::MoveNoComputer(from.y, from.x));
        }
        if from.dist(to) != 1 {
            return Err(ReplayError::MoveNotAdjacent(from.y, from.x, to.y, to.x));
        }
        if field[to.y as usize][to.x as usize] != 0 {
            return Err(ReplayError::MoveDestOccupied(to.y, to.x));
        }
        field[to.y as usize][to.x as usize] = field[from.y as usize][from.x as usize];
        field[from.y as usize][from.x as usize] = 0;
    }

    let mut ids: FxHashMap<Pos, usize> = FxHashMap::default();
    let mut types = vec![];
    for y in 0..input.n {
        for x in 0..input.n {
            if field[y][x] != 0 {
                ids.insert(Pos::new(x as i32, y as i32), types.len());
                types.push(field[y][x]);
            }
        }
    }
    let mut clusters = ClusterSet::new(&types, input.k);
    let mut used = vec![vec![false; input.n]; input.n];
    let mut pairs: FxHashSet<(Pos, Pos)> = FxHashSet::default();
    for &(a, b) in &output.links {
        for p in [a, b] {
            if !p.in_board(input.n) {
                return Err(ReplayError::ConnectOutOfRange(p.y, p.x));
            }
            if field[p.y as usize][p.x as usize] == 0 {
                return Err(ReplayError::ConnectNoComputer(p.y, p.x));
            }
        }
        if a.aligned(b).is_none() {
            return Err(ReplayError::ConnectNotAligned(a.y, a.x, b.y, b.x));
        }
        if field[a.y as usize][a.x as usize] != field[b.y as usize][b.x as usize] {
            return Err(ReplayError::ConnectTypeMismatch);
        }
        for p in cells_between(a, b) {
            if field[p.y as usize][p.x as usize] != 0 {
                return Err(ReplayError::ConnectCrossesComputer(p.y, p.x));
            }
            if used[p.y as usize][p.x as usize] {
                return Err(ReplayError::CableCellReused(p.y, p.x));
            }
            used[p.y as usize][p.x as usize] = true;
        }
        if !pairs.insert(if a <= b { (a, b) } else { (b, a) }) {
            return Err(ReplayError::DuplicatePair);
        }
        clusters.merge(ids[&a], ids[&b]);
    }
    Ok(Replay {
        score: clusters.total(),
        moves: output.moves.len(),
        links: output.links.len(),
    })
}
