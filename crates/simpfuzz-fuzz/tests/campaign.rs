use simpfuzz_fuzz::{Campaign, Params};
use simpfuzz_ir::{
    ArithOp, Expr, ExprKind,
    fold::{TypeFoldable, TypeFolder, TypeSuperFoldable},
};
use simpfuzz_simplify::{Simplifier, Simplify};

fn small() -> Params {
    Params { trials: 40, depth: 3, ..Params::default() }
}

/// Simplifies, then turns every remaining `min` into a `max`.
struct ConfusesMinMax;

impl Simplifier for ConfusesMinMax {
    fn simplify(&self, expr: &Expr) -> Expr {
        struct Swap;

        impl TypeFolder for Swap {
            fn fold_expr(&mut self, expr: &Expr) -> Expr {
                match expr.kind() {
                    ExprKind::Arith(ArithOp::Min, e1, e2) => {
                        Expr::arith(ArithOp::Max, e1.fold_with(self), e2.fold_with(self))
                    }
                    _ => expr.super_fold_with(self),
                }
            }
        }

        Simplify.simplify(expr).fold_with(&mut Swap)
    }
}

#[test]
fn reference_simplifier_passes() {
    let outcome = Campaign::new(small(), Simplify).run(1_700_000_000);
    if let Some(mismatch) = &outcome.mismatch {
        panic!("unexpected mismatch:\n{mismatch}");
    }
    let types = Params::default().types.len() as u64;
    assert_eq!(outcome.stats.cases, 40 * 3 * types);
    assert!(outcome.stats.samples.compared > 0);
}

#[test]
fn same_seed_same_statistics() {
    let campaign = Campaign::new(Params { trials: 10, ..small() }, Simplify);
    let first = campaign.run(42);
    let second = campaign.run(42);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn buggy_simplifier_is_stopped_early() {
    let campaign = Campaign::new(Params { trials: 1000, ..small() }, ConfusesMinMax);
    let outcome = campaign.run(7);
    let Some(mismatch) = &outcome.mismatch else {
        panic!("min/max confusion went unnoticed after {} cases", outcome.stats.cases);
    };
    assert_ne!(mismatch.original_value, mismatch.simplified_value);
    assert!(outcome.stats.cases <= u64::from(campaign.params().trials) * 21);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["seed"], 7);
    assert!(json["mismatch"]["lane"].is_u64());
}
