use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use simpfuzz_config::Config;
use simpfuzz_ir::{ElementType, fold::TypeVisitable};
use simpfuzz_simplify::Simplifier;
use tracing::{debug, error, info, info_span};

use crate::{
    check::{Mismatch, SampleStats, Verdict, check_equivalent},
    generate::generate,
};

/// Shape of a campaign: how many expressions of which types, how large, and how often each is
/// sampled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub trials: u32,
    pub depth: u32,
    pub samples: u32,
    pub widths: Vec<u32>,
    pub types: Vec<ElementType>,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            trials: 1000,
            depth: 5,
            samples: 3,
            widths: vec![1, 2, 4],
            types: ElementType::ALL.to_vec(),
        }
    }
}

impl Params {
    pub fn from_config(config: &Config) -> Params {
        Params {
            trials: config.trials,
            depth: config.depth,
            samples: config.samples,
            widths: config.vector_widths().collect(),
            types: ElementType::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize)]
pub struct CampaignStats {
    /// Expressions generated and checked.
    pub cases: u64,
    #[serde(flatten)]
    pub samples: SampleStats,
}

/// The result of a campaign: statistics, plus the failure that stopped it if any.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub seed: u64,
    pub stats: CampaignStats,
    pub mismatch: Option<Box<Mismatch>>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.mismatch.is_none()
    }
}

pub struct Campaign<S> {
    params: Params,
    simplifier: S,
}

impl<S: Simplifier> Campaign<S> {
    pub fn new(params: Params, simplifier: S) -> Self {
        Campaign { params, simplifier }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Runs every element type and width for the configured number of trials, stopping at the
    /// first mismatch. All randomness derives from `seed`.
    pub fn run(&self, seed: u64) -> Outcome {
        let _span = info_span!("campaign", seed).entered();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut stats = CampaignStats::default();

        for &elem in &self.params.types {
            for &width in &self.params.widths {
                let ty = elem.vector_of(width);
                let _span = info_span!("type", %ty).entered();
                for trial in 0..self.params.trials {
                    let test = generate(ty, self.params.depth, &mut rng);
                    let simplified = self.simplifier.simplify(&test);
                    debug!(trial, nodes = test.node_count(), %test, %simplified, "generated");
                    stats.cases += 1;

                    match check_equivalent(
                        &test,
                        &simplified,
                        self.params.samples,
                        &self.simplifier,
                        &mut rng,
                    ) {
                        Verdict::Equivalent(samples) => stats.samples += samples,
                        Verdict::Mismatch(mismatch) => {
                            error!(trial, lane = mismatch.lane, "simplifier mismatch");
                            return Outcome { seed, stats, mismatch: Some(mismatch) };
                        }
                    }
                }
                info!(cases = stats.cases, "type done");
            }
        }
        info!(
            cases = stats.cases,
            compared = stats.samples.compared,
            skipped = stats.samples.skipped,
            "campaign finished"
        );
        Outcome { seed, stats, mismatch: None }
    }
}
