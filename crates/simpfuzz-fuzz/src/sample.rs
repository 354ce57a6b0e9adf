use rand::Rng;
use simpfuzz_ir::{Constant, ElementType, Environment, Expr, Var};
use simpfuzz_simplify::Simplifier;

use crate::generate::random_literal;

/// Binds every pool variable, in order, to a fresh literal of type `elem`.
pub fn sample_environment(elem: ElementType, rng: &mut impl Rng) -> Environment {
    Var::all().map(|var| (var, random_literal(elem, &mut *rng))).collect()
}

/// Substitutes `env` into `expr` and reduces it. `None` means the expression is undefined under
/// `env` (the simplifier could not fold it to a literal).
pub fn evaluate(expr: &Expr, env: &Environment, simplifier: &impl Simplifier) -> Option<Constant> {
    simplifier.simplify(&expr.substitute(env)).as_constant()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use simpfuzz_ir::{ArithOp, VAR_COUNT};
    use simpfuzz_simplify::Simplify;

    use super::*;

    #[test]
    fn environment_binds_whole_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let env = sample_environment(ElementType::UInt16, &mut rng);
        assert_eq!(env.len(), usize::from(VAR_COUNT));
        assert!(env.iter().all(|(_, c)| c.ty() == ElementType::UInt16));
    }

    #[test]
    fn evaluates_bound_expressions() {
        let a = Expr::var(Var::new(0), ElementType::Int32);
        let env: Environment =
            [(Var::new(0), Constant::new(ElementType::Int32, 6))].into_iter().collect();

        let e = Expr::mul(&a, Constant::new(ElementType::Int32, 7));
        assert_eq!(evaluate(&e, &env, &Simplify), Some(Constant::new(ElementType::Int32, 42)));

        let e = Expr::arith(ArithOp::Mod, &a, Constant::zero(ElementType::Int32));
        assert_eq!(evaluate(&e, &env, &Simplify), None);
    }
}
