#![cfg_attr(feature = "skip_lint", allow(clippy::all, clippy::pedantic, warnings))]
use ahc013::clock::Deadline;
use ahc013::io::Input;
use ahc013::{judge, select};
use clap::Parser;

/// Solver: reads an instance from stdin and prints the answer to stdout.
#[derive(Parser, Debug)]
struct Args {
    /// Base RNG seed; restarts step it.
    #[clap(long, short = 's', default_value_t = 1)]
    seed: u64,
    /// Search window in milliseconds.
    #[clap(long, default_value_t = 2500)]
    search_ms: u64,
    /// Hard stop in milliseconds.
    #[clap(long, default_value_t = 2800)]
    hard_ms: u64,
}

fn main() {
    let args = Args::parse();
    // The clock starts before reading so parse time counts against the limit.
    let deadline = Deadline::start(args.search_ms, args.hard_ms);
    let input = Input::read_stdin();
    let out = select::search(&input, &deadline, args.seed);
    print!("{out}");
    eprintln!("!log time {:.3}", deadline.elapsed().as_secs_f64());
    // Self-check by replay, skipped once the hard stop has passed.
    if !deadline.hard_expired() {
        match judge::replay(&input, &out) {
            Ok(replay) => eprintln!("!log score {}", replay.score),
            Err(err) => eprintln!("[WARN] printed answer fails replay: {err}"),
        }
    }
}
