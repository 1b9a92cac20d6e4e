//! Board state: a node arena plus an N x N cell matrix with cable tags.
//!
//! Nodes are created once from the input and addressed by `NodeId` (arena
//! index, row-major order of appearance). A cell holds at most one node or
//! one cable tag at rest; a node may stand on a tagged cell only transiently
//! inside a speculative `relocate_raw` sequence.
//!
//! Relocation keeps links intact by rewriting tags as the node moves: a link
//! dragged from behind extends into the vacated cell, a link walked into
//! shortens, stepping onto the interior of another same-type link splices the
//! mover in (absorb), and stepping sideways off a run the mover interrupts
//! splices it out (bridge). Absorb and bridge are exact inverses, which makes
//! every committed relocation reversible by its opposite step.

use crate::SetMinMax;
use crate::geom::{Axis, Dir, Pos, cells_between};
use crate::io::Input;
use crate::mat;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use thiserror::Error;

pub type NodeId = usize;

/// Pop bound for the nearest-empty-cell search.
const EMPTY_TRIAL_LIMIT: usize = 50;
/// Pop bound for the same-type neighborhood flood.
const FLOOD_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("destination out of bounds")]
    OutOfBounds,
    #[error("destination occupied")]
    Occupied,
    #[error("move would sever a link")]
    WouldSever,
    #[error("conflicting cable in the way")]
    ConflictedCable,
    #[error("nodes not aligned")]
    NotAligned,
    #[error("node types differ")]
    TypeMismatch,
    #[error("path obstructed")]
    Obstructed,
    #[error("nodes already linked")]
    AlreadyLinked,
    #[error("nodes not linked")]
    NotLinked,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cable {
    pub ty: u8,
    pub axis: Axis,
    /// Endpoint ids, smaller first.
    pub ends: (NodeId, NodeId),
}

impl Cable {
    fn new(ty: u8, axis: Axis, a: NodeId, b: NodeId) -> Self {
        Self {
            ty,
            axis,
            ends: (a.min(b), a.max(b)),
        }
    }

    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        self.ends == (a.min(b), a.max(b))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Cell {
    pub node: Option<NodeId>,
    pub cable: Option<Cable>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Node {
    pub ty: u8,
    pub pos: Pos,
    /// Directly linked partner per direction, indexed by `Dir::id`.
    links: [Option<NodeId>; 4],
}

impl Node {
    pub fn link(&self, dir: Dir) -> Option<NodeId> {
        self.links[dir.id()]
    }

    pub fn linked(&self) -> bool {
        self.links.iter().any(|l| l.is_some())
    }

    /// Both-side partners along `axis`, when present.
    fn span(&self, axis: Axis) -> (Option<NodeId>, Option<NodeId>) {
        let [d1, d2] = axis.dirs();
        (self.link(d1), self.link(d2))
    }
}

/// What a committed relocation did to the link structure besides moving the
/// node. Both fields can be set at once (stepping off an interrupted run and
/// onto the interior of another).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RelocateOutcome {
    /// A link whose interior the node landed on; it now runs through the node.
    pub absorbed: Option<(NodeId, NodeId)>,
    /// Former both-side partners of the node, now linked directly.
    pub bridged: Option<(NodeId, NodeId)>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    n: usize,
    k: usize,
    nodes: Vec<Node>,
    cells: Vec<Vec<Cell>>,
    links: usize,
}

impl Grid {
    pub fn from_input(input: &Input) -> Self {
        let n = input.n;
        let mut nodes = vec![];
        let mut cells = mat![Cell::default(); n; n];
        for y in 0..n {
            for x in 0..n {
                let ty = input.board[y][x];
                if ty > 0 {
                    cells[y][x].node = Some(nodes.len());
                    nodes.push(Node {
                        ty,
                        pos: Pos::new(x as i32, y as i32),
                        links: [None; 4],
                    });
                }
            }
        }
        Self {
            n,
            k: input.k,
            nodes,
            cells,
            links: 0,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_of_type(&self, ty: u8) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].ty == ty)
            .collect()
    }

    fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[pos.y as usize][pos.x as usize]
    }

    fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.y as usize][pos.x as usize]
    }

    pub fn node_at(&self, pos: Pos) -> Option<NodeId> {
        self.cell(pos).node
    }

    pub fn cable_at(&self, pos: Pos) -> Option<Cable> {
        self.cell(pos).cable
    }

    pub fn is_empty(&self, pos: Pos) -> bool {
        let cell = self.cell(pos);
        cell.node.is_none() && cell.cable.is_none()
    }

    pub fn link_count(&self) -> usize {
        self.links
    }

    /// All links, each once, as id pairs.
    pub fn all_links(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = vec![];
        for id in 0..self.nodes.len() {
            for dir in [Dir::Right, Dir::Down] {
                if let Some(p) = self.nodes[id].link(dir) {
                    out.push((id, p));
                }
            }
        }
        out
    }

    /// Validates a single-step relocation without mutating, returning what it
    /// would do to the link structure.
    pub fn move_check(&self, id: NodeId, dir: Dir) -> Result<RelocateOutcome, GridError> {
        let node = &self.nodes[id];
        let to = node.pos + dir;
        if !to.in_board(self.n) {
            return Err(GridError::OutOfBounds);
        }
        if self.cell(to).node.is_some() {
            return Err(GridError::Occupied);
        }

        let behind = node.link(dir.rev());
        let ahead = node.link(dir);
        let bridged = match node.span(dir.axis().perp()) {
            (Some(a), Some(b)) => {
                // The vacated cell takes the bridged run's tag, so it cannot
                // also take the extension tag of a link dragged from behind.
                if behind.is_some() {
                    return Err(GridError::ConflictedCable);
                }
                Some((a, b))
            }
            (None, None) => None,
            _ => return Err(GridError::WouldSever),
        };

        let mut absorbed = None;
        if let Some(cable) = self.cell(to).cable {
            if cable.ty != node.ty {
                return Err(GridError::ConflictedCable);
            }
            if let Some(partner) = ahead {
                if !cable.joins(id, partner) {
                    return Err(GridError::ConflictedCable);
                }
                // Own tag: plain shorten.
            } else if cable.axis == dir.axis() {
                // A resting node adjacent to a same-axis interior cell would
                // itself be an endpoint; reachable only mid-speculation.
                return Err(GridError::ConflictedCable);
            } else {
                absorbed = Some(cable.ends);
            }
        }
        Ok(RelocateOutcome { absorbed, bridged })
    }

    /// Moves a node one step, maintaining every cable invariant.
    pub fn relocate(&mut self, id: NodeId, dir: Dir) -> Result<RelocateOutcome, GridError> {
        let outcome = self.move_check(id, dir)?;
        let from = self.nodes[id].pos;
        let to = from + dir;
        let ty = self.nodes[id].ty;
        let behind = self.nodes[id].link(dir.rev());
        let ahead = self.nodes[id].link(dir);

        self.cell_mut(from).node = None;
        self.nodes[id].pos = to;
        self.cell_mut(to).node = Some(id);

        if ahead.is_some() {
            // Stepped toward the partner: consume our tag at the destination.
            self.cell_mut(to).cable = None;
        }
        if let Some(partner) = behind {
            self.cell_mut(from).cable = Some(Cable::new(ty, dir.axis(), partner, id));
        }

        if let Some((a, b)) = outcome.bridged {
            let axis = dir.axis().perp();
            let [d1, d2] = axis.dirs();
            self.nodes[id].links[d1.id()] = None;
            self.nodes[id].links[d2.id()] = None;
            self.nodes[a].links[d2.id()] = Some(b);
            self.nodes[b].links[d1.id()] = Some(a);
            let (pa, pb) = (self.nodes[a].pos, self.nodes[b].pos);
            for p in cells_between(pa, pb) {
                self.cell_mut(p).cable = Some(Cable::new(ty, axis, a, b));
            }
            self.links -= 1;
        }

        if let Some((a, b)) = outcome.absorbed {
            // Split (a, b) at the landing cell into (a, id) and (id, b).
            self.cell_mut(to).cable = None;
            let axis = dir.axis().perp();
            let [d1, d2] = axis.dirs();
            let (u, v) = if to.dir_to(self.nodes[a].pos) == Some(d1) {
                (a, b)
            } else {
                (b, a)
            };
            self.nodes[id].links[d1.id()] = Some(u);
            self.nodes[id].links[d2.id()] = Some(v);
            self.nodes[u].links[d2.id()] = Some(id);
            self.nodes[v].links[d1.id()] = Some(id);
            let pu = self.nodes[u].pos;
            let pv = self.nodes[v].pos;
            for p in cells_between(pu, to) {
                self.cell_mut(p).cable = Some(Cable::new(ty, axis, u, id));
            }
            for p in cells_between(to, pv) {
                self.cell_mut(p).cable = Some(Cable::new(ty, axis, id, v));
            }
            self.links += 1;
        }
        Ok(outcome)
    }

    /// Moves a node one step ignoring cables entirely. Only the planner uses
    /// this, under its own rule that the touched nodes are unlinked (or the
    /// sequence is reversed before anyone observes the board).
    pub fn relocate_raw(&mut self, id: NodeId, dir: Dir) -> Result<(), GridError> {
        let from = self.nodes[id].pos;
        let to = from + dir;
        if !to.in_board(self.n) {
            return Err(GridError::OutOfBounds);
        }
        if self.cell(to).node.is_some() {
            return Err(GridError::Occupied);
        }
        self.cell_mut(from).node = None;
        self.nodes[id].pos = to;
        self.cell_mut(to).node = Some(id);
        Ok(())
    }

    /// Undoes a raw move sequence by applying inverse steps in reverse order.
    pub fn reverse_raw(&mut self, moves: &[(NodeId, Dir)]) -> Result<(), GridError> {
        for &(id, dir) in moves.iter().rev() {
            self.relocate_raw(id, dir.rev())?;
        }
        Ok(())
    }

    /// Validates a link without mutating.
    pub fn link_check(&self, a: NodeId, b: NodeId) -> Result<(), GridError> {
        if a == b {
            return Err(GridError::NotAligned);
        }
        if self.nodes[a].ty != self.nodes[b].ty {
            return Err(GridError::TypeMismatch);
        }
        let (pa, pb) = (self.nodes[a].pos, self.nodes[b].pos);
        let Some(dir) = pa.dir_to(pb) else {
            return Err(GridError::NotAligned);
        };
        if self.nodes[a].link(dir) == Some(b) {
            return Err(GridError::AlreadyLinked);
        }
        if self.nodes[a].link(dir).is_some() || self.nodes[b].link(dir.rev()).is_some() {
            return Err(GridError::Obstructed);
        }
        for p in cells_between(pa, pb) {
            if !self.is_empty(p) {
                return Err(GridError::Obstructed);
            }
        }
        Ok(())
    }

    /// Links two aligned same-type nodes over an empty run.
    pub fn link(&mut self, a: NodeId, b: NodeId) -> Result<(), GridError> {
        self.link_check(a, b)?;
        let (pa, pb) = (self.nodes[a].pos, self.nodes[b].pos);
        let dir = pa.dir_to(pb).unwrap();
        let ty = self.nodes[a].ty;
        for p in cells_between(pa, pb) {
            self.cell_mut(p).cable = Some(Cable::new(ty, dir.axis(), a, b));
        }
        self.nodes[a].links[dir.id()] = Some(b);
        self.nodes[b].links[dir.rev().id()] = Some(a);
        self.links += 1;
        Ok(())
    }

    /// Exact inverse of `link`.
    pub fn unlink(&mut self, a: NodeId, b: NodeId) -> Result<(), GridError> {
        let (pa, pb) = (self.nodes[a].pos, self.nodes[b].pos);
        let Some(dir) = pa.dir_to(pb) else {
            return Err(GridError::NotLinked);
        };
        if self.nodes[a].link(dir) != Some(b) {
            return Err(GridError::NotLinked);
        }
        for p in cells_between(pa, pb) {
            self.cell_mut(p).cable = None;
        }
        self.nodes[a].links[dir.id()] = None;
        self.nodes[b].links[dir.rev().id()] = None;
        self.links -= 1;
        Ok(())
    }

    /// Nearest empty cell by breadth-first distance, skipping `ignore`.
    /// Bounded; returns `None` when nothing close enough qualifies.
    pub fn nearest_empty_cell(&self, from: Pos, ignore: &FxHashSet<Pos>) -> Option<Pos> {
        let mut visited = mat![false; self.n; self.n];
        visited[from.y as usize][from.x as usize] = true;
        let mut queue = VecDeque::new();
        queue.push_back(from);
        let mut pops = 0;
        while let Some(p) = queue.pop_front() {
            pops += 1;
            if pops > EMPTY_TRIAL_LIMIT {
                return None;
            }
            if p != from && self.is_empty(p) && !ignore.contains(&p) {
                return Some(p);
            }
            for dir in Dir::ALL {
                let q = p + dir;
                if q.in_board(self.n) && !visited[q.y as usize][q.x as usize] {
                    visited[q.y as usize][q.x as usize] = true;
                    queue.push_back(q);
                }
            }
        }
        None
    }

    /// Same-type nodes reachable from `id` by flooding over empty cells,
    /// nearest first. Nodes are collected but not expanded through.
    pub fn near_same_type(&self, id: NodeId) -> Vec<NodeId> {
        let me = &self.nodes[id];
        let mut visited = mat![false; self.n; self.n];
        visited[me.pos.y as usize][me.pos.x as usize] = true;
        let mut queue = VecDeque::new();
        queue.push_back(me.pos);
        let mut found = vec![];
        let mut pops = 0;
        while let Some(p) = queue.pop_front() {
            pops += 1;
            if pops > FLOOD_LIMIT {
                break;
            }
            for dir in Dir::ALL {
                let q = p + dir;
                if !q.in_board(self.n) || visited[q.y as usize][q.x as usize] {
                    continue;
                }
                visited[q.y as usize][q.x as usize] = true;
                match self.cell(q).node {
                    Some(other) => {
                        if self.nodes[other].ty == me.ty {
                            found.push(other);
                        }
                    }
                    None => queue.push_back(q),
                }
            }
        }
        found
    }

    /// Node positions obstructing the open run between two aligned positions,
    /// or `None` when a cable (which moves cannot clear) lies on it.
    pub fn run_obstacles(&self, a: Pos, b: Pos) -> Option<Vec<Pos>> {
        a.aligned(b)?;
        let mut out = vec![];
        for p in cells_between(a, b) {
            if self.cell(p).cable.is_some() {
                return None;
            }
            if self.cell(p).node.is_some() {
                out.push(p);
            }
        }
        Some(out)
    }

    /// Positions reachable by sliding `id` in a straight line, with step
    /// counts. A linked node slides only along its link axis; runs of its own
    /// cable are passable (the link shortens underneath), anything else stops
    /// the slide.
    pub fn slide_targets(&self, id: NodeId, limit: usize) -> Vec<(Pos, usize)> {
        let node = &self.nodes[id];
        let dirs: Vec<Dir> = if !node.linked() {
            Dir::ALL.to_vec()
        } else {
            let mut axes: Vec<Axis> = vec![];
            for dir in Dir::ALL {
                if node.link(dir).is_some() && !axes.contains(&dir.axis()) {
                    axes.push(dir.axis());
                }
            }
            if axes.len() != 1 {
                return vec![];
            }
            axes[0].dirs().to_vec()
        };
        let mut out = vec![];
        for dir in dirs {
            let mut p = node.pos;
            for step in 1..=limit {
                p = p + dir;
                if !p.in_board(self.n) || self.cell(p).node.is_some() {
                    break;
                }
                match self.cell(p).cable {
                    None => out.push((p, step)),
                    Some(cable) => {
                        let partner = node.link(dir);
                        if partner.is_none_or(|q| !cable.joins(id, q)) {
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// All nodes connected to `id` through links.
    pub fn component_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut stack = vec![id];
        let mut out = vec![];
        while let Some(u) = stack.pop() {
            out.push(u);
            for dir in Dir::ALL {
                if let Some(v) = self.nodes[u].link(dir) {
                    if seen.insert(v) {
                        stack.push(v);
                    }
                }
            }
        }
        out
    }

    pub fn same_component(&self, a: NodeId, b: NodeId) -> bool {
        self.component_of(a).contains(&b)
    }

    /// Full-scan score over link components; the ground truth the cluster
    /// tracker is checked against.
    pub fn scan_score(&self) -> i64 {
        let mut seen = vec![false; self.nodes.len()];
        let mut score = 0;
        for id in 0..self.nodes.len() {
            if seen[id] {
                continue;
            }
            let mut counts = vec![0i32; self.k + 1];
            for u in self.component_of(id) {
                seen[u] = true;
                counts[self.nodes[u].ty as usize] += 1;
            }
            score += crate::cluster::cluster_score(&counts);
        }
        score
    }

    /// Board dump to stderr: digits for nodes, `-`/`|` for cables.
    pub fn dump(&self) {
        for y in 0..self.n {
            let mut line = String::new();
            for x in 0..self.n {
                let cell = &self.cells[y][x];
                line.push(match (cell.node, cell.cable) {
                    (Some(id), _) => (b'0' + self.nodes[id].ty) as char,
                    (None, Some(c)) if c.axis == Axis::Horizontal => '-',
                    (None, Some(_)) => '|',
                    (None, None) => '.',
                });
            }
            eprintln!("{}", line);
        }
    }

    /// Largest component size, for logging.
    pub fn largest_component(&self) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut best = 0;
        for id in 0..self.nodes.len() {
            if !seen[id] {
                let comp = self.component_of(id);
                for &u in &comp {
                    seen[u] = true;
                }
                best.setmax(comp.len());
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid5() -> Grid {
        let input = Input::parse("5 2\n00000\n00200\n00001\n10001\n00201\n");
        Grid::from_input(&input)
    }

    // Node ids in grid5, row-major:
    //   0: type 2 at (2,1)    1: type 1 at (4,2)
    //   2: type 1 at (0,3)    3: type 1 at (4,3)
    //   4: type 2 at (2,4)    5: type 1 at (4,4)

    #[test]
    fn test_from_input_layout() {
        let g = grid5();
        assert_eq!(g.node_count(), 6);
        assert_eq!(g.node(0).ty, 2);
        assert_eq!(g.node(0).pos, Pos::new(2, 1));
        assert_eq!(g.node(5).pos, Pos::new(4, 4));
        assert_eq!(g.node_at(Pos::new(4, 2)), Some(1));
        assert_eq!(g.nodes_of_type(1), vec![1, 2, 3, 5]);
        assert_eq!(g.link_count(), 0);
    }

    #[test]
    fn test_link_rules() {
        let mut g = grid5();
        assert!(g.link_check(1, 3).is_ok());
        assert!(g.link_check(2, 3).is_ok());
        assert!(g.link_check(0, 4).is_ok());
        assert_eq!(g.link_check(1, 5), Err(GridError::Obstructed));
        assert_eq!(g.link_check(2, 1), Err(GridError::NotAligned));
        assert_eq!(g.link_check(1, 1), Err(GridError::NotAligned));
        assert_eq!(g.link_check(0, 1), Err(GridError::TypeMismatch));

        g.link(0, 4).unwrap();
        assert_eq!(g.link(0, 4), Err(GridError::AlreadyLinked));
        // The vertical type-2 cable now crosses the horizontal type-1 run.
        assert_eq!(g.link_check(2, 3), Err(GridError::Obstructed));
    }

    #[test]
    fn test_link_and_unlink_tags() {
        let mut g = grid5();
        let fresh = g.clone();
        g.link(2, 3).unwrap();
        for x in 1..=3 {
            let c = g.cable_at(Pos::new(x, 3)).unwrap();
            assert_eq!((c.ty, c.axis, c.ends), (1, Axis::Horizontal, (2, 3)));
        }
        assert_eq!(g.link_count(), 1);
        assert_eq!(g.node(2).link(Dir::Right), Some(3));
        g.unlink(2, 3).unwrap();
        assert_eq!(g.unlink(2, 3), Err(GridError::NotLinked));
        assert_eq!(g, fresh);
    }

    #[test]
    fn test_extend_and_shorten() {
        let mut g = grid5();
        g.link(1, 3).unwrap();
        let linked = g.clone();
        assert_eq!(g.relocate(1, Dir::Up).unwrap(), RelocateOutcome::default());
        assert_eq!(g.node(1).pos, Pos::new(4, 1));
        let c = g.cable_at(Pos::new(4, 2)).unwrap();
        assert_eq!((c.ty, c.axis, c.ends), (1, Axis::Vertical, (1, 3)));
        assert_eq!(g.relocate(1, Dir::Down).unwrap(), RelocateOutcome::default());
        assert_eq!(g, linked);
    }

    #[test]
    fn test_would_sever() {
        let mut g = grid5();
        g.link(1, 3).unwrap();
        assert_eq!(g.relocate(1, Dir::Left), Err(GridError::WouldSever));
        assert_eq!(g.relocate(3, Dir::Left), Err(GridError::WouldSever));
    }

    #[test]
    fn test_absorb_and_bridge_round_trip() {
        let mut g = grid5();
        g.relocate(3, Dir::Left).unwrap();
        g.link(1, 5).unwrap();
        assert!(g.cable_at(Pos::new(4, 3)).is_some());
        let before = g.clone();

        // Node 3 steps back onto the interior of (1, 5) and splices in.
        let outcome = g.relocate(3, Dir::Right).unwrap();
        assert_eq!(outcome.absorbed, Some((1, 5)));
        assert_eq!(outcome.bridged, None);
        assert_eq!(g.link_count(), 2);
        assert_eq!(g.node(3).link(Dir::Up), Some(1));
        assert_eq!(g.node(3).link(Dir::Down), Some(5));
        assert_eq!(g.node(1).link(Dir::Down), Some(3));
        assert!(g.cable_at(Pos::new(4, 3)).is_none());
        assert_eq!(g.scan_score(), 3);

        // Stepping off again bridges the ex-partners: the exact inverse.
        let outcome = g.relocate(3, Dir::Left).unwrap();
        assert_eq!(outcome.bridged, Some((1, 5)));
        assert_eq!(outcome.absorbed, None);
        assert_eq!(g, before);
    }

    #[test]
    fn test_conflicted_cable() {
        let mut g = grid5();
        g.link(0, 4).unwrap();
        g.relocate(2, Dir::Right).unwrap();
        // (2,3) carries a type-2 cable; node 2 is type 1.
        assert_eq!(g.relocate(2, Dir::Right), Err(GridError::ConflictedCable));
    }

    #[test]
    fn test_bounds_and_occupied() {
        let mut g = grid5();
        assert_eq!(g.relocate(2, Dir::Left), Err(GridError::OutOfBounds));
        assert_eq!(g.relocate(1, Dir::Down), Err(GridError::Occupied));
        assert_eq!(g.relocate(3, Dir::Right), Err(GridError::OutOfBounds));
    }

    #[test]
    fn test_raw_round_trip() {
        let mut g = grid5();
        g.link(2, 3).unwrap();
        let before = g.clone();
        // Raw moves may stand nodes on tagged cells transiently.
        let moves = [(4, Dir::Up), (4, Dir::Up), (0, Dir::Left)];
        for &(id, dir) in &moves {
            g.relocate_raw(id, dir).unwrap();
        }
        assert_eq!(g.node(4).pos, Pos::new(2, 2));
        assert_ne!(g, before);
        g.reverse_raw(&moves).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn test_queries() {
        let g = grid5();
        let near = g.near_same_type(1);
        assert!(near.contains(&3));
        assert!(near.contains(&5));
        assert!(!near.contains(&0));
        assert_eq!(
            g.run_obstacles(Pos::new(4, 2), Pos::new(4, 4)),
            Some(vec![Pos::new(4, 3)])
        );
        assert_eq!(g.run_obstacles(Pos::new(0, 3), Pos::new(4, 3)), Some(vec![]));
        let mut g = g;
        g.link(0, 4).unwrap();
        assert_eq!(g.run_obstacles(Pos::new(0, 3), Pos::new(4, 3)), None);
    }

    #[test]
    fn test_nearest_empty_cell() {
        let g = grid5();
        let mut ignore = FxHashSet::default();
        let found = g.nearest_empty_cell(Pos::new(4, 3), &ignore).unwrap();
        assert_eq!(found.dist(Pos::new(4, 3)), 1);
        ignore.insert(Pos::new(3, 3));
        let found = g.nearest_empty_cell(Pos::new(4, 3), &ignore).unwrap();
        assert!(found != Pos::new(3, 3));
        assert!(g.is_empty(found));
    }

    #[test]
    fn test_slide_targets() {
        let g = grid5();
        let targets = g.slide_targets(2, 10);
        // Right along row 3 up to the node at (4,3); up the left column; one down.
        assert!(targets.contains(&(Pos::new(3, 3), 3)));
        assert!(!targets.iter().any(|&(p, _)| p == Pos::new(4, 3)));
        assert!(targets.contains(&(Pos::new(0, 0), 3)));
        assert!(targets.contains(&(Pos::new(0, 4), 1)));
    }

    #[test]
    fn test_components_and_scan_score() {
        let mut g = grid5();
        assert_eq!(g.scan_score(), 0);
        g.link(1, 3).unwrap();
        assert_eq!(g.scan_score(), 1);
        assert!(g.same_component(1, 3));
        assert!(!g.same_component(1, 5));
        g.link(3, 5).unwrap();
        assert_eq!(g.scan_score(), 3);
        assert!(g.same_component(1, 5));
        assert_eq!(g.component_of(5).len(), 3);
        assert_eq!(g.largest_component(), 3);
    }
}
