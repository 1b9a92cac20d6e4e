//! Move planning: given two same-type nodes, find a cheap relocation
//! sequence after which linking them is legal.
//!
//! Aligned pairs get their run cleared directly. Non-aligned pairs are tried
//! through both L-corner cells with either node as the traveller; the
//! cheapest feasible candidate wins. Obstructing nodes are pushed to nearby
//! empty cells with conveyor shifts generated from shuffled direction orders.
//!
//! Candidates are evaluated speculatively with raw relocations and the grid
//! is restored before returning, so a returned plan always applies cleanly
//! to the state it was planned against. Paths never cross cables: a cable on
//! a cell the traveller or a pushed node would enter fails the candidate, so
//! committed plans splice no links and the cluster tracker stays exact.

use crate::geom::{Dir, Pos, cells_between};
use crate::grid::{Grid, NodeId};
use rand::prelude::*;
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Shuffled direction orders tried per conveyor shift.
const SHIFT_TRIALS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no clearing sequence within the trial budget")]
    Unplannable,
}

/// A relocation sequence making one link legal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    /// Single-step relocations in commit order.
    pub moves: Vec<(NodeId, Dir)>,
}

impl Plan {
    /// Actions the committed plan consumes: every move plus the link itself.
    pub fn cost(&self) -> usize {
        self.moves.len() + 1
    }
}

/// Plans relocations that make `link(a, b)` legal, preferring the fewest
/// actions. `fixed` nodes are never displaced. The grid is only mutated
/// speculatively; it is restored before returning.
pub fn plan_link(
    grid: &mut Grid,
    a: NodeId,
    b: NodeId,
    fixed: &FxHashSet<NodeId>,
    rng: &mut impl Rng,
) -> Result<Plan, PlanError> {
    let (pa, pb) = (grid.node(a).pos, grid.node(b).pos);
    if pa.aligned(pb).is_some() {
        return direct_plan(grid, a, b, fixed, rng);
    }
    let mut best: Option<Plan> = None;
    for (mover, stayer) in [(a, b), (b, a)] {
        let (pm, ps) = (grid.node(mover).pos, grid.node(stayer).pos);
        for corner in [Pos::new(pm.x, ps.y), Pos::new(ps.x, pm.y)] {
            if let Ok(plan) = corner_plan(grid, mover, stayer, corner, fixed, rng) {
                if best.as_ref().is_none_or(|p| plan.cost() < p.cost()) {
                    best = Some(plan);
                }
            }
        }
    }
    best.ok_or(PlanError::Unplannable)
}

fn direct_plan(
    grid: &mut Grid,
    a: NodeId,
    b: NodeId,
    fixed: &FxHashSet<NodeId>,
    rng: &mut impl Rng,
) -> Result<Plan, PlanError> {
    let (pa, pb) = (grid.node(a).pos, grid.node(b).pos);
    let Some(obstacles) = grid.run_obstacles(pa, pb) else {
        return Err(PlanError::Unplannable);
    };
    let mut reserved: FxHashSet<Pos> = cells_between(pa, pb).into_iter().collect();
    reserved.insert(pa);
    reserved.insert(pb);
    let mut plan = Plan::default();
    let ok = clear_run(grid, &obstacles, &reserved, fixed, &mut plan.moves, rng)
        && grid.link_check(a, b).is_ok();
    grid.reverse_raw(&plan.moves)
        .expect("speculative moves must reverse");
    if ok { Ok(plan) } else { Err(PlanError::Unplannable) }
}

fn corner_plan(
    grid: &mut Grid,
    mover: NodeId,
    stayer: NodeId,
    corner: Pos,
    fixed: &FxHashSet<NodeId>,
    rng: &mut impl Rng,
) -> Result<Plan, PlanError> {
    let (pm, ps) = (grid.node(mover).pos, grid.node(stayer).pos);
    let Some(link_obstacles) = grid.run_obstacles(corner, ps) else {
        return Err(PlanError::Unplannable);
    };
    let mut travel = cells_between(pm, corner);
    travel.push(corner);
    let link_run = cells_between(corner, ps);
    let mut reserved: FxHashSet<Pos> = travel.iter().chain(&link_run).copied().collect();
    reserved.insert(pm);
    reserved.insert(ps);

    let mut plan = Plan::default();
    let mut ok = clear_run(grid, &travel, &reserved, fixed, &mut plan.moves, rng)
        && clear_run(grid, &link_obstacles, &reserved, fixed, &mut plan.moves, rng);
    if ok {
        match head_moves(grid, mover, corner) {
            Some(steps) => {
                for &(id, dir) in &steps {
                    if grid.relocate_raw(id, dir).is_err() {
                        ok = false;
                        break;
                    }
                    plan.moves.push((id, dir));
                }
            }
            None => ok = false,
        }
    }
    ok = ok && grid.link_check(mover, stayer).is_ok();
    grid.reverse_raw(&plan.moves)
        .expect("speculative moves must reverse");
    if ok { Ok(plan) } else { Err(PlanError::Unplannable) }
}

/// Straight steps carrying `id` to `to`, or `None` when its links or a cable
/// forbid the walk. Own cable runs are passable (the link shortens); any
/// other cable on the path is a hard block.
fn head_moves(grid: &Grid, id: NodeId, to: Pos) -> Option<Vec<(NodeId, Dir)>> {
    let from = grid.node(id).pos;
    let dir = from.dir_to(to)?;
    let node = grid.node(id);
    for d in Dir::ALL {
        if d.axis() != dir.axis() && node.link(d).is_some() {
            return None;
        }
    }
    let ahead = node.link(dir);
    let mut steps = vec![];
    let mut p = from;
    while p != to {
        let q = p + dir;
        if grid.node_at(q).is_some() {
            return None;
        }
        if let Some(cable) = grid.cable_at(q) {
            if !ahead.is_some_and(|partner| cable.joins(id, partner)) {
                return None;
            }
        }
        steps.push((id, dir));
        p = q;
    }
    Some(steps)
}

/// Pushes every node standing on `run` to a nearby empty cell, applying the
/// shifts as raw moves and recording them in `moves`. Cells in `reserved`
/// never receive a pushed node.
fn clear_run(
    grid: &mut Grid,
    run: &[Pos],
    reserved: &FxHashSet<Pos>,
    fixed: &FxHashSet<NodeId>,
    moves: &mut Vec<(NodeId, Dir)>,
    rng: &mut impl Rng,
) -> bool {
    for &p in run {
        let Some(id) = grid.node_at(p) else { continue };
        if grid.node(id).linked() || fixed.contains(&id) {
            return false;
        }
        let Some(target) = grid.nearest_empty_cell(p, reserved) else {
            return false;
        };
        let Some(shift) = conveyor_shift(grid, p, target, reserved, fixed, rng) else {
            return false;
        };
        for &(id, dir) in &shift {
            if grid.relocate_raw(id, dir).is_err() {
                return false;
            }
            moves.push((id, dir));
        }
    }
    true
}

/// A move sequence that empties `from` by shifting the chain of nodes along
/// a random staircase walk toward the empty cell `to`, farthest node first.
/// Every cell entered must be unreserved and cable-free, and every node on
/// the walk must be unlinked and not fixed.
fn conveyor_shift(
    grid: &Grid,
    from: Pos,
    to: Pos,
    reserved: &FxHashSet<Pos>,
    fixed: &FxHashSet<NodeId>,
    rng: &mut impl Rng,
) -> Option<Vec<(NodeId, Dir)>> {
    let (dx, dy) = to - from;
    let mut dirs = vec![];
    for _ in 0..dx.abs() {
        dirs.push(if dx > 0 { Dir::Right } else { Dir::Left });
    }
    for _ in 0..dy.abs() {
        dirs.push(if dy > 0 { Dir::Down } else { Dir::Up });
    }
    'trial: for _ in 0..SHIFT_TRIALS {
        dirs.shuffle(rng);
        let mut chain = vec![];
        let mut p = from;
        for &dir in &dirs {
            if let Some(id) = grid.node_at(p) {
                if grid.node(id).linked() || fixed.contains(&id) {
                    continue 'trial;
                }
                chain.push((id, dir));
            }
            let q = p + dir;
            if !q.in_board(grid.n()) || reserved.contains(&q) || grid.cable_at(q).is_some() {
                continue 'trial;
            }
            p = q;
        }
        chain.reverse();
        return Some(chain);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::io::Input;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn apply(grid: &mut Grid, plan: &Plan, a: NodeId, b: NodeId) {
        for &(id, dir) in &plan.moves {
            grid.relocate(id, dir).unwrap();
        }
        grid.link(a, b).unwrap();
    }

    #[test]
    fn test_adjacent_pair_needs_only_the_link() {
        let input = Input::parse("4 2\n1100\n0000\n0000\n0002\n");
        let mut g = Grid::from_input(&input);
        let plan = plan_link(&mut g, 0, 1, &FxHashSet::default(), &mut rng()).unwrap();
        assert_eq!(plan.moves.len(), 0);
        assert_eq!(plan.cost(), 1);
    }

    #[test]
    fn test_direct_run_clearing() {
        let input = Input::parse("5 2\n10201\n00000\n00000\n00000\n00000\n");
        let mut g = Grid::from_input(&input);
        let before = g.clone();
        let fixed = [0, 2].into_iter().collect();
        let plan = plan_link(&mut g, 0, 2, &fixed, &mut rng()).unwrap();
        assert_eq!(g, before);
        assert_eq!(plan.moves.len(), 1);
        assert_eq!(plan.cost(), 2);
        apply(&mut g, &plan, 0, 2);
        assert_eq!(g.scan_score(), 1);
        assert!(g.node_at(Pos::new(2, 0)).is_none());
    }

    #[test]
    fn test_corner_plan() {
        let input = Input::parse("5 2\n10000\n00000\n00100\n00000\n00000\n");
        let mut g = Grid::from_input(&input);
        let before = g.clone();
        let plan = plan_link(&mut g, 0, 1, &FxHashSet::default(), &mut rng()).unwrap();
        assert_eq!(g, before);
        // Two travel steps to a corner, then the link.
        assert_eq!(plan.cost(), 3);
        apply(&mut g, &plan, 0, 1);
        assert_eq!(g.scan_score(), 1);
    }

    #[test]
    fn test_unplannable_when_cable_blocks() {
        let input = Input::parse("5 2\n00200\n00000\n10001\n00000\n00200\n");
        let mut g = Grid::from_input(&input);
        // Nodes: 0 = type 2 at (2,0), 1/2 = type 1 on row 2, 3 = type 2 at (2,4).
        g.link(0, 3).unwrap();
        let before = g.clone();
        let result = plan_link(&mut g, 1, 2, &FxHashSet::default(), &mut rng());
        assert_eq!(result, Err(PlanError::Unplannable));
        assert_eq!(g, before);
    }

    #[test]
    fn test_linked_obstacle_is_not_pushed() {
        let input = Input::parse("5 2\n00100\n00000\n10101\n00000\n00000\n");
        let mut g = Grid::from_input(&input);
        // Nodes: 0=1@(2,0), 1=1@(0,2), 2=1@(2,2), 3=1@(4,2).
        g.link(0, 2).unwrap();
        // Node 2 stands on the (1,3) run holding a vertical link; its cable
        // at (2,1) is off the run, so the node itself blocks the plan.
        let result = plan_link(&mut g, 1, 3, &[1, 3].into_iter().collect(), &mut rng());
        assert_eq!(result, Err(PlanError::Unplannable));
    }

    #[test]
    fn test_endpoint_drags_its_link() {
        let input = Input::parse("5 2\n00000\n10100\n00000\n00001\n00000\n");
        let mut g = Grid::from_input(&input);
        // Nodes: 0=1@(0,1), 1=1@(2,1), 2=1@(4,3).
        g.link(0, 1).unwrap();
        let plan = plan_link(&mut g, 1, 2, &[1, 2].into_iter().collect(), &mut rng()).unwrap();
        assert_eq!(plan.cost(), 3);
        apply(&mut g, &plan, 1, 2);
        assert_eq!(g.scan_score(), 3);
        assert_eq!(g.link_count(), 2);
    }

    #[test]
    fn test_plan_on_small_board() {
        let input = Input::parse("5 2\n00000\n00200\n00001\n10001\n00201\n");
        let mut g = Grid::from_input(&input);
        // Nodes: 0=2@(2,1), 1=1@(4,2), 2=1@(0,3), 3=1@(4,3), 4=2@(2,4), 5=1@(4,4).
        let mut r = rng();
        assert!(!g.same_component(1, 2));
        // Differing types never plan.
        assert_eq!(
            plan_link(&mut g, 0, 1, &FxHashSet::default(), &mut r),
            Err(PlanError::Unplannable)
        );
        let plan = plan_link(&mut g, 2, 1, &[1, 2].into_iter().collect(), &mut r).unwrap();
        // One step up to (0,2), then the link across row 2.
        assert_eq!(plan.cost(), 2);
        apply(&mut g, &plan, 2, 1);
        assert!(g.same_component(1, 2));
        assert_eq!(g.scan_score(), 1);
    }

    #[test]
    fn test_fixed_nodes_stay_put() {
        let input = Input::parse("5 2\n10201\n00000\n00000\n00000\n00000\n");
        let mut g = Grid::from_input(&input);
        let mut fixed: FxHashSet<NodeId> = [0, 2].into_iter().collect();
        fixed.insert(1);
        let result = plan_link(&mut g, 0, 2, &fixed, &mut rng());
        assert_eq!(result, Err(PlanError::Unplannable));
    }
}
