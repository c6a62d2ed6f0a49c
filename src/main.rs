use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use aoc2021::{solve, Heuristic, Options};

#[derive(Parser, Debug)]
#[command(about = "Advent of Code 2021 solvers")]
struct Args {
    /// Day number
    day: u8,

    /// Puzzle part
    #[arg(value_parser = clap::value_parser!(u8).range(1 ..= 2))]
    part: u8,

    /// Run on example input N (reads dayDAYtestN.in); repeatable
    #[arg(short, long)]
    test: Vec<u32>,

    /// Explicit input file; repeatable
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Remaining-cost estimator for path searches
    #[arg(long, env = "ESTIMATOR", value_enum, default_value_t)]
    heuristic: Heuristic,

    /// Print search progress and decoded structure to stderr
    #[arg(long, env = "TRACE", value_parser = clap::builder::FalseyValueParser::new())]
    trace: bool,
}

impl Args {
    fn inputs(&self) -> Vec<PathBuf> {
        let mut inputs = self.input.clone();
        inputs.extend(self.test.iter().map(|n| PathBuf::from(format!("day{}test{}.in", self.day, n))));
        if inputs.is_empty() {inputs.push(PathBuf::from(format!("day{}.in", self.day)))};
        inputs
    }
}

fn run(args: &Args, options: &Options, fname: &Path) -> anyhow::Result<String> {
    let input = std::fs::read_to_string(fname)
        .with_context(|| format!("cannot read {}", fname.display()))?;
    Ok(solve(args.day, args.part, &input, options)?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let options = Options {heuristic: args.heuristic, trace: args.trace};

    let inputs = args.inputs();
    let mut failed = 0;
    for fname in &inputs {
        let time = std::time::Instant::now();
        match run(&args, &options, fname) {
            Ok(answer) => {
                println!("{}: {}", fname.display(), answer);
                println!("{} seconds elapsed", time.elapsed().as_secs_f32());
            },
            Err(err) => {
                eprintln!("cannot process {}: {:#}", fname.display(), err);
                failed += 1;
            },
        }
    }
    if failed > 0 {bail!("{} of {} inputs failed", failed, inputs.len())};
    Ok(())
}
