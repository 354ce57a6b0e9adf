use std::{
    fs,
    io::{self, Write},
    process::exit,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use simpfuzz_config as config;
use simpfuzz_fuzz::{Campaign, Outcome, Params};
use simpfuzz_simplify::Simplify;

mod logger;

/// Exit status when the simplifier is caught producing a non-equivalent expression.
const EXIT_MISMATCH: i32 = -1;
const EXIT_ERR: i32 = config::EXIT_FAILURE;

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("failed to run `simpfuzz`, error={e:#}");
            EXIT_ERR
        }
    };
    let _ = io::stdout().flush();
    exit(exit_code)
}

fn run() -> Result<i32> {
    logger::install().context("cannot install logger")?;

    // Report the seed before doing any work so failures can be replayed with `SIMPFUZZ_SEED`.
    let seed = config::seed().unwrap_or_else(time_seed);
    println!("Simplify fuzz test seed: {seed}");

    let campaign = Campaign::new(Params::from_config(config::get()), Simplify);
    let outcome = campaign.run(seed);
    let Some(mismatch) = &outcome.mismatch else {
        println!("Success!");
        return Ok(0);
    };
    print!("{mismatch}");
    if config::dump_mismatch() {
        dump_outcome(&outcome)?;
    }
    Ok(EXIT_MISMATCH)
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn dump_outcome(outcome: &Outcome) -> Result<()> {
    let log_dir = config::log_dir();
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!("mismatch-{}.json", outcome.seed));
    let file = fs::File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(file, outcome)?;
    Ok(())
}
