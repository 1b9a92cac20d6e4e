//! Contest I/O: the board description on stdin and the action lists on
//! stdout. Moves and connects are printed row-first, matching the judge.

use crate::geom::Pos;
use anyhow::{Context, Result, bail};
use proconio::input;
use proconio::marker::Chars;
use proconio::source::once::OnceSource;
use std::fmt;

/// Problem instance: an `n` x `n` board with `100 * k` typed nodes.
#[derive(Clone, Debug)]
pub struct Input {
    pub n: usize,
    pub k: usize,
    /// `board[y][x]` is `0` for an empty cell, otherwise the node type.
    pub board: Vec<Vec<u8>>,
}

impl Input {
    pub fn parse(s: &str) -> Input {
        let mut src = OnceSource::from(s);
        input! { from &mut src, n: usize, k: usize, rows: [Chars; n] }
        let board: Vec<Vec<u8>> = rows
            .iter()
            .map(|row| {
                assert_eq!(row.len(), n);
                row.iter().map(|&c| (c as u8) - b'0').collect()
            })
            .collect();
        for row in &board {
            for &v in row {
                assert!(v as usize <= k);
            }
        }
        Input { n, k, board }
    }

    pub fn read_stdin() -> Input {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).unwrap();
        Input::parse(&buf)
    }

    /// Total action allowance, moves and connects combined.
    pub fn budget(&self) -> usize {
        self.k * 100
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.n, self.k)?;
        for row in &self.board {
            for &v in row {
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Submitted answer: relocations in order, then the cable list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub moves: Vec<(Pos, Pos)>,
    pub links: Vec<(Pos, Pos)>,
}

impl Output {
    pub fn actions(&self) -> usize {
        self.moves.len() + self.links.len()
    }

    /// Parses the two action lists. Counts are validated and trailing tokens
    /// rejected so truncated or concatenated files fail loudly.
    pub fn parse(s: &str) -> Result<Output> {
        let mut tokens = s.split_whitespace();
        let moves = read_pair_list(&mut tokens, "move")?;
        let links = read_pair_list(&mut tokens, "connect")?;
        if let Some(extra) = tokens.next() {
            bail!("trailing token {extra:?}");
        }
        Ok(Output { moves, links })
    }
}

fn next_int<'a>(tokens: &mut impl Iterator<Item = &'a str>, name: &str) -> Result<i32> {
    let t = tokens
        .next()
        .with_context(|| format!("missing {name} token"))?;
    t.parse()
        .with_context(|| format!("bad {name} token {t:?}"))
}

fn read_pair_list<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<Vec<(Pos, Pos)>> {
    let count = next_int(tokens, name)?;
    if count < 0 {
        bail!("negative {name} count {count}");
    }
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let y0 = next_int(tokens, name)?;
        let x0 = next_int(tokens, name)?;
        let y1 = next_int(tokens, name)?;
        let x1 = next_int(tokens, name)?;
        out.push((Pos::new(x0, y0), Pos::new(x1, y1)));
    }
    Ok(out)
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.moves.len())?;
        for (a, b) in &self.moves {
            writeln!(f, "{} {} {} {}", a.y, a.x, b.y, b.x)?;
        }
        writeln!(f, "{}", self.links.len())?;
        for (a, b) in &self.links {
            writeln!(f, "{} {} {} {}", a.y, a.x, b.y, b.x)?;
        }
        Ok(())
    }
}
