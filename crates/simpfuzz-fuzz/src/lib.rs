//! Differential fuzzing of an expression simplifier.
//!
//! Random well-typed expressions are [generated](generate::generate), simplified, and the two
//! forms are [checked](check::check_equivalent) for agreement on random bindings of their free
//! variables. A [`Campaign`] repeats this over every element type and vector width.
pub mod campaign;
pub mod check;
pub mod generate;
pub mod sample;

pub use campaign::{Campaign, CampaignStats, Outcome, Params};
pub use check::{Mismatch, SampleStats, Verdict, check_equivalent};
pub use generate::{Generator, generate, random_literal};
pub use sample::{evaluate, sample_environment};
