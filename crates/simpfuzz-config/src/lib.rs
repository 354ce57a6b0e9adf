//! Campaign configuration.
//!
//! The tool takes no flags. Every knob has a default that reproduces the standard campaign and
//! can be overridden through a `SIMPFUZZ_<KEY>` environment variable, e.g. `SIMPFUZZ_SEED` to
//! replay a previously printed seed.
use std::{path::PathBuf, process, sync::LazyLock};

use config::{ConfigError, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "SIMPFUZZ";

/// Exit status code used for invalid configuration.
pub const EXIT_FAILURE: i32 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of random expressions tested per element type and vector width.
    pub trials: u32,
    /// Depth of the randomly generated expression trees.
    pub depth: u32,
    /// Number of random variable bindings each expression is evaluated under.
    pub samples: u32,
    /// Widths `1, 2, 4, ...` up to and including this one are tested.
    pub max_vector_width: u32,
    /// Fixed seed. When absent the seed is derived from the current time.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Directory where traces and mismatch reports are dumped. Defaults to `./log/`.
    pub log_dir: PathBuf,
    /// Saves a JSON trace of the campaign in [`Self::log_dir`] (debugging)
    pub dump_trace: bool,
    /// Saves the failure report as JSON in [`Self::log_dir`]
    pub dump_mismatch: bool,
    /// Print progress to stderr
    pub verbose: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::build(Environment::with_prefix(ENV_PREFIX))
    }

    fn build(env: Environment) -> Result<Config, ConfigError> {
        config::Config::builder()
            .set_default("trials", 1000)?
            .set_default("depth", 5)?
            .set_default("samples", 3)?
            .set_default("max_vector_width", 4)?
            .set_default("log_dir", "./log/")?
            .set_default("dump_trace", false)?
            .set_default("dump_mismatch", false)?
            .set_default("verbose", false)?
            .add_source(env.ignore_empty(true).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// The vector widths exercised by the campaign: powers of two up to `max_vector_width`.
    pub fn vector_widths(&self) -> impl Iterator<Item = u32> + use<> {
        let max = self.max_vector_width.max(1);
        std::iter::successors(Some(1u32), |w| w.checked_mul(2)).take_while(move |w| *w <= max)
    }
}

static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().unwrap_or_else(|err| {
        eprintln!("error: invalid simpfuzz configuration - `{err}`");
        process::exit(EXIT_FAILURE);
    })
});

pub fn get() -> &'static Config {
    &CONFIG
}

pub fn seed() -> Option<u64> {
    CONFIG.seed
}

pub fn log_dir() -> &'static PathBuf {
    &CONFIG.log_dir
}

pub fn dump_trace() -> bool {
    CONFIG.dump_trace
}

pub fn dump_mismatch() -> bool {
    CONFIG.dump_mismatch
}

pub fn verbose() -> bool {
    CONFIG.verbose
}
