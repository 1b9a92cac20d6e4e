use ahc013::io::Input;
use anyhow::{Context, Result, bail};
use clap::Parser;
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;
use std::fs;
use std::path::PathBuf;

/// Instance generator: an n x n board holding exactly 100 computers of each
/// of k types, uniformly placed.
#[derive(Parser, Debug)]
struct Cli {
    /// Board side; drawn from the contest range when omitted.
    #[clap(long, short = 'n')]
    n: Option<usize>,
    /// Number of types; drawn to fit the board when omitted.
    #[clap(long, short = 'k')]
    k: Option<usize>,
    /// RNG seed.
    #[clap(long, short = 's', default_value_t = 0)]
    seed: u64,
    /// How many instances to generate.
    #[clap(long, short = 'c', default_value_t = 1)]
    count: usize,
    /// Directory for numbered instance files; stdout when omitted.
    #[clap(long, short = 'o')]
    out_dir: Option<PathBuf>,
}

fn generate(rng: &mut ChaCha20Rng, n: Option<usize>, k: Option<usize>) -> Result<Input> {
    let n = n.unwrap_or_else(|| rng.random_range(15..=48));
    if !(15..=48).contains(&n) {
        bail!("n must be in 15..=48, got {n}");
    }
    let k_max = (n * n / 100).min(5);
    let k = k.unwrap_or_else(|| rng.random_range(2..=k_max));
    if !(2..=k_max).contains(&k) {
        bail!("k must be in 2..={k_max} for n = {n}, got {k}");
    }
    let mut cells: Vec<(usize, usize)> = (0..n)
        .flat_map(|y| (0..n).map(move |x| (x, y)))
        .collect();
    cells.shuffle(rng);
    let mut types: Vec<u8> = (0..100 * k).map(|i| (i % k + 1) as u8).collect();
    types.shuffle(rng);
    let mut board = vec![vec![0u8; n]; n];
    for (&(x, y), &ty) in cells.iter().zip(&types) {
        board[y][x] = ty;
    }
    Ok(Input { n, k, board })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = ChaCha20Rng::seed_from_u64(cli.seed);
    match &cli.out_dir {
        None => {
            if cli.count != 1 {
                bail!("multiple instances need --out-dir");
            }
            print!("{}", generate(&mut rng, cli.n, cli.k)?);
        }
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
            for i in 0..cli.count {
                let input = generate(&mut rng, cli.n, cli.k)?;
                let path = dir.join(format!("{i:04}.txt"));
                fs::write(&path, input.to_string())
                    .with_context(|| format!("cannot write {}", path.display()))?;
            }
        }
    }
    Ok(())
}
