//! Positions, directions and axes on the square board.
//!
//! Coordinates are signed so that stepping off the board is representable;
//! `Pos::in_board` is the bounds check. `x` grows to the right (column),
//! `y` grows downward (row). The official I/O format prints `y` before `x`.

use std::ops::{Add, Sub};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn in_board(self, n: usize) -> bool {
        0 <= self.x && self.x < n as i32 && 0 <= self.y && self.y < n as i32
    }

    /// Manhattan distance.
    pub fn dist(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The shared axis of two distinct positions, if they are aligned.
    pub fn aligned(self, other: Pos) -> Option<Axis> {
        if self == other {
            None
        } else if self.y == other.y {
            Some(Axis::Horizontal)
        } else if self.x == other.x {
            Some(Axis::Vertical)
        } else {
            None
        }
    }

    /// The unit direction from `self` toward an aligned `other`.
    pub fn dir_to(self, other: Pos) -> Option<Dir> {
        match self.aligned(other) {
            Some(Axis::Horizontal) => Some(if other.x > self.x { Dir::Right } else { Dir::Left }),
            Some(Axis::Vertical) => Some(if other.y > self.y { Dir::Down } else { Dir::Up }),
            None => None,
        }
    }
}

impl Add<Dir> for Pos {
    type Output = Pos;
    fn add(self, dir: Dir) -> Pos {
        let (dx, dy) = dir.delta();
        Pos::new(self.x + dx, self.y + dy)
    }
}

impl Sub for Pos {
    type Output = (i32, i32);
    fn sub(self, other: Pos) -> (i32, i32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// Cells strictly between two aligned positions, nearest `a` first.
///
/// Empty when the positions are adjacent. Unaligned input also yields an
/// empty list; callers check alignment first.
pub fn cells_between(a: Pos, b: Pos) -> Vec<Pos> {
    let Some(dir) = a.dir_to(b) else {
        return vec![];
    };
    let mut out = vec![];
    let mut p = a + dir;
    while p != b {
        out.push(p);
        p = p + dir;
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Left,
    Up,
    Right,
    Down,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Left, Dir::Up, Dir::Right, Dir::Down];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Left => (-1, 0),
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
        }
    }

    pub fn rev(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Dir::Left | Dir::Right => Axis::Horizontal,
            Dir::Up | Dir::Down => Axis::Vertical,
        }
    }

    /// Index into per-direction slot arrays.
    pub fn id(self) -> usize {
        match self {
            Dir::Left => 0,
            Dir::Up => 1,
            Dir::Right => 2,
            Dir::Down => 3,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn perp(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// The two directions along this axis.
    pub fn dirs(self) -> [Dir; 2] {
        match self {
            Axis::Horizontal => [Dir::Left, Dir::Right],
            Axis::Vertical => [Dir::Up, Dir::Down],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_rev_and_axis() {
        for dir in Dir::ALL {
            assert_eq!(dir.rev().rev(), dir);
            assert_eq!(dir.axis(), dir.rev().axis());
            let (dx, dy) = dir.delta();
            let (rx, ry) = dir.rev().delta();
            assert_eq!((dx + rx, dy + ry), (0, 0));
        }
        assert_eq!(Axis::Horizontal.perp(), Axis::Vertical);
    }

    #[test]
    fn test_aligned_and_dir_to() {
        let a = Pos::new(2, 3);
        assert_eq!(a.aligned(Pos::new(5, 3)), Some(Axis::Horizontal));
        assert_eq!(a.aligned(Pos::new(2, 0)), Some(Axis::Vertical));
        assert_eq!(a.aligned(Pos::new(3, 4)), None);
        assert_eq!(a.aligned(a), None);
        assert_eq!(a.dir_to(Pos::new(5, 3)), Some(Dir::Right));
        assert_eq!(a.dir_to(Pos::new(2, 0)), Some(Dir::Up));
        assert_eq!(a.dir_to(Pos::new(0, 0)), None);
    }

    #[test]
    fn test_cells_between() {
        let a = Pos::new(1, 1);
        let b = Pos::new(4, 1);
        assert_eq!(
            cells_between(a, b),
            vec![Pos::new(2, 1), Pos::new(3, 1)]
        );
        assert_eq!(cells_between(a, Pos::new(2, 1)), vec![]);
        assert_eq!(cells_between(a, Pos::new(2, 2)), vec![]);
        assert_eq!(cells_between(b, a), vec![Pos::new(3, 1), Pos::new(2, 1)]);
    }

    #[test]
    fn test_in_board() {
        assert!(Pos::new(0, 0).in_board(5));
        assert!(Pos::new(4, 4).in_board(5));
        assert!(!Pos::new(5, 0).in_board(5));
        assert!(!Pos::new(-1, 2).in_board(5));
    }
}
