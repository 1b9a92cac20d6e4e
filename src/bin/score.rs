use ahc013::io::{Input, Output};
use ahc013::judge;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;

/// Offline scorer: replays an answer file against its instance file.
#[derive(Parser, Debug)]
struct Cli {
    /// Path to the instance file.
    input: String,
    /// Path to the answer file.
    output: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let input_text =
        fs::read_to_string(&cli.input).with_context(|| format!("cannot read {}", cli.input))?;
    let output_text =
        fs::read_to_string(&cli.output).with_context(|| format!("cannot read {}", cli.output))?;
    let input = Input::parse(&input_text);
    match Output::parse(&output_text).map_err(|err| err.to_string()).and_then(|out| {
        judge::replay(&input, &out).map_err(|err| err.to_string())
    }) {
        Ok(replay) => {
            println!("Score = {}", replay.score);
            eprintln!("!log status AC");
            eprintln!("!log score {}", replay.score);
        }
        Err(err) => {
            eprintln!("{err}");
            println!("Score = 0");
            eprintln!("!log status WA");
            eprintln!("!log score 0");
        }
    }
    Ok(())
}
