use std::fmt;

use rand::Rng;
use serde::{Serialize, Serializer};
use simpfuzz_ir::{Constant, ElementType, Environment, Expr, VectorType, fold::TypeVisitable};
use simpfuzz_simplify::Simplifier;
use tracing::debug;

use crate::sample::{evaluate, sample_environment};

/// Counts of lane comparisons performed by [`check_equivalent`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize)]
pub struct SampleStats {
    /// Comparisons where both sides reduced to literals.
    pub compared: u64,
    /// Comparisons skipped because one side was undefined.
    pub skipped: u64,
}

impl std::ops::AddAssign for SampleStats {
    fn add_assign(&mut self, rhs: Self) {
        self.compared += rhs.compared;
        self.skipped += rhs.skipped;
    }
}

#[derive(Debug)]
pub enum Verdict {
    Equivalent(SampleStats),
    Mismatch(Box<Mismatch>),
}

impl Verdict {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Verdict::Equivalent(_))
    }
}

/// A binding under which an expression and its simplification disagree in some lane.
#[derive(Debug, Clone, Serialize)]
pub struct Mismatch {
    #[serde(serialize_with = "serialize_bindings")]
    pub bindings: Environment,
    #[serde(serialize_with = "serialize_display")]
    pub ty: VectorType,
    #[serde(serialize_with = "serialize_display")]
    pub original: Expr,
    #[serde(serialize_with = "serialize_display")]
    pub simplified: Expr,
    pub lane: u32,
    #[serde(serialize_with = "serialize_display")]
    pub original_lane: Expr,
    #[serde(serialize_with = "serialize_display")]
    pub simplified_lane: Expr,
    pub original_value: Constant,
    pub simplified_value: Constant,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bindings)?;
        writeln!(f, "{}", self.original)?;
        writeln!(f, "{}", self.simplified)?;
        writeln!(f, "In vector lane {}:", self.lane)?;
        writeln!(f, "{} -> {}", self.original_lane, self.original_value)?;
        writeln!(f, "{} -> {}", self.simplified_lane, self.simplified_value)
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(v: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}

fn serialize_bindings<S: Serializer>(env: &Environment, s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(env.iter().map(|(var, c)| (var.to_string(), c.to_string())))
}

/// Checks `original` and `simplified` for agreement under `samples` random bindings of the free
/// variables, lane by lane. Comparisons where either side is undefined are skipped; the first
/// disagreement between two literals is reported.
///
/// Bindings take the element type of the variables, which may differ from the result type (a
/// comparison of `int32` variables is a `bool`).
pub fn check_equivalent(
    original: &Expr,
    simplified: &Expr,
    samples: u32,
    simplifier: &impl Simplifier,
    rng: &mut impl Rng,
) -> Verdict {
    let ty = original.ty();
    let pool = pool_type(original, simplified).unwrap_or(ty.elem());
    let lanes: Vec<(Expr, Expr)> = (0..ty.width())
        .map(|j| (original.extract_lane(j), simplified.extract_lane(j)))
        .collect();

    let mut stats = SampleStats::default();
    for _ in 0..samples {
        let env = sample_environment(pool, rng);
        for (lane, (original_lane, simplified_lane)) in (0..).zip(&lanes) {
            let (Some(original_value), Some(simplified_value)) = (
                evaluate(original_lane, &env, simplifier),
                evaluate(simplified_lane, &env, simplifier),
            ) else {
                debug!(lane, "undefined under sample, skipped");
                stats.skipped += 1;
                continue;
            };
            if original_value != simplified_value {
                return Verdict::Mismatch(Box::new(Mismatch {
                    bindings: env,
                    ty,
                    original: original.clone(),
                    simplified: simplified.clone(),
                    lane,
                    original_lane: original_lane.clone(),
                    simplified_lane: simplified_lane.clone(),
                    original_value,
                    simplified_value,
                }));
            }
            stats.compared += 1;
        }
    }
    Verdict::Equivalent(stats)
}

/// The element type of the variable pool, if either side mentions a variable.
fn pool_type(original: &Expr, simplified: &Expr) -> Option<ElementType> {
    let mut vars = original.free_vars().into_iter().chain(simplified.free_vars());
    vars.next().map(|(_, elem)| elem)
}
