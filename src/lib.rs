// # AHC013: Connect the Computers
//
// Solver library for the grid clustering problem: typed nodes on an N x N
// board are relocated along empty cells and linked with straight cables so
// that same-type nodes form large connected clusters. Every relocation and
// every link consumes one unit of the shared K*100 action budget, and the
// whole search runs against a wall-clock deadline.
//
// The crate is organized leaves-first: `geom` and `cluster` know nothing of
// the board, `grid` owns the board state and its invariants, `planner` builds
// obstacle-clearing move sequences on top of it, `search` runs the greedy
// growth phases, and `select` drives restarts and validates the winner with
// `judge` before printing.

/// Board geometry: positions, directions, axes.
pub mod geom;

/// Board state: node arena, cells, cables, relocation and linking rules.
pub mod grid;

/// Union-find cluster tracker with incremental scoring.
pub mod cluster;

/// Obstacle-clearing move planner with speculative execution.
pub mod planner;

/// Greedy growth driver: the four search phases.
pub mod search;

/// Restart loop, candidate ranking, replay validation.
pub mod select;

/// Official-rules replay of an action log (the local judge).
pub mod judge;

/// Input/output parsing and formatting.
pub mod io;

/// Explicit wall-clock deadline passed through the search.
pub mod clock;

/// A trait for conveniently updating a value to its minimum or maximum.
pub trait SetMinMax {
    /// If `v` is less than `self`, updates `self` to `v` and returns `true`.
    /// Otherwise, returns `false`.
    fn setmin(&mut self, v: Self) -> bool;
    /// If `v` is greater than `self`, updates `self` to `v` and returns `true`.
    /// Otherwise, returns `false`.
    fn setmax(&mut self, v: Self) -> bool;
}
impl<T> SetMinMax for T
where
    T: PartialOrd,
{
    fn setmin(&mut self, v: T) -> bool {
        *self > v && {
            *self = v;
            true
        }
    }
    fn setmax(&mut self, v: T) -> bool {
        *self < v && {
            *self = v;
            true
        }
    }
}

/// A macro for convenient initialization of vectors, including nested vectors for multi-dimensional arrays.
///
/// # Examples
///
/// ```
/// use ahc013::mat;
/// // A simple vector
/// let v1 = mat![1, 2, 3];
///
/// // A 2x3 matrix initialized with zeros
/// let m1 = mat![0; 2; 3];
/// assert_eq!(m1, vec![vec![0, 0, 0], vec![0, 0, 0]]);
/// ```
#[macro_export]
macro_rules! mat {
    ($($e:expr),*) => { vec![$($e),*] };
    ($($e:expr,)*) => { vec![$($e),*] };
    ($e:expr; $d:expr) => { vec![$e; $d] };
    ($e:expr; $d:expr $(; $ds:expr)+) => { vec![mat![$e $(; $ds)*]; $d] };
}
