use ahc013::io::{Input, Output};
use ahc013::judge;
use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Batch runner: executes a solver command over a directory of instances in
/// parallel and aggregates replayed scores.
#[derive(Parser, Debug)]
struct Cli {
    /// Shell command running the solver (reads stdin, writes stdout).
    cmd: String,
    /// Directory of instance files (*.txt).
    #[clap(long, short = 'c', default_value = "tools/in")]
    cases: PathBuf,
    /// Directory for answer files.
    #[clap(long, short = 'o', default_value = "tools/out")]
    out_dir: PathBuf,
    /// Write a JSON summary here.
    #[clap(long)]
    json: Option<PathBuf>,
    /// Worker threads; rayon's default when omitted.
    #[clap(long, short = 'j')]
    jobs: Option<usize>,
}

#[derive(Serialize, Clone)]
struct CaseResult {
    case: String,
    score: i64,
    status: String,
    time_ms: u64,
}

#[derive(Serialize)]
struct Summary {
    cases: usize,
    total_score: i64,
    average_score: f64,
    worst: Option<CaseResult>,
    results: Vec<CaseResult>,
}

fn run_case(cmd: &str, case: &Path, out_path: &Path) -> Result<CaseResult> {
    let name = case
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let input_file =
        fs::File::open(case).with_context(|| format!("no such input: {}", case.display()))?;
    let output_file = fs::File::create(out_path)
        .with_context(|| format!("cannot create {}", out_path.display()))?;
    let stime = std::time::Instant::now();
    let status = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::from(input_file))
        .stdout(Stdio::from(output_file))
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to execute: {cmd}"))?;
    let time_ms = stime.elapsed().as_millis() as u64;
    if !status.success() {
        return Ok(CaseResult {
            case: name,
            score: 0,
            status: "RE".to_string(),
            time_ms,
        });
    }
    let input = Input::parse(&fs::read_to_string(case)?);
    let answer = fs::read_to_string(out_path)?;
    let replayed = Output::parse(&answer)
        .map_err(|err| err.to_string())
        .and_then(|out| judge::replay(&input, &out).map_err(|err| err.to_string()));
    Ok(match replayed {
        Ok(replay) => CaseResult {
            case: name,
            score: replay.score,
            status: "AC".to_string(),
            time_ms,
        },
        Err(_) => CaseResult {
            case: name,
            score: 0,
            status: "WA".to_string(),
            time_ms,
        },
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(jobs) = cli.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()?;
    }
    let mut cases: Vec<PathBuf> = fs::read_dir(&cli.cases)
        .with_context(|| format!("cannot read {}", cli.cases.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    cases.sort();
    if cases.is_empty() {
        bail!("no cases under {}", cli.cases.display());
    }
    fs::create_dir_all(&cli.out_dir)?;

    let bar = ProgressBar::new(cases.len() as u64);
    let results: Vec<CaseResult> = cases
        .par_iter()
        .map(|case| {
            let out_path = cli.out_dir.join(case.file_name().unwrap());
            let result = run_case(&cli.cmd, case, &out_path);
            bar.inc(1);
            result
        })
        .collect::<Result<Vec<_>>>()?;
    bar.finish();

    let total: i64 = results.iter().map(|r| r.score).sum();
    let summary = Summary {
        cases: results.len(),
        total_score: total,
        average_score: total as f64 / results.len() as f64,
        worst: results.iter().min_by_key(|r| r.score).cloned(),
        results,
    };
    for r in &summary.results {
        println!("{}\t{}\t{}\t{} ms", r.case, r.status, r.score, r.time_ms);
    }
    println!(
        "cases {}  total {}  average {:.1}",
        summary.cases, summary.total_score, summary.average_score
    );
    if let Some(path) = &cli.json {
        fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }
    Ok(())
}
