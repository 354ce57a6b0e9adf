use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use simpfuzz_fuzz::{Generator, check_equivalent, generate};
use simpfuzz_ir::{ElementType, VectorType, fold::TypeVisitable};
use simpfuzz_simplify::{Simplifier, Simplify};

fn vector_type() -> impl Strategy<Value = VectorType> {
    (0..ElementType::ALL.len(), prop::sample::select(vec![1u32, 2, 4]))
        .prop_map(|(i, width)| ElementType::ALL[i].vector_of(width))
}

/// Upper bound on the size of a tree of the given depth. A leaf has at most five nodes and the
/// largest interior node, a select, adds two nodes over four subtrees.
fn max_nodes(depth: u32) -> usize {
    (0..depth).fold(5, |n, _| 2 + 4 * n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn generated_trees_are_well_typed(seed in any::<u64>(), ty in vector_type(), depth in 0u32..5) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let e = generate(ty, depth, &mut rng);
        prop_assert_eq!(e.type_check(), Ok(ty));
        prop_assert!(e.node_count() <= max_nodes(depth));
    }

    #[test]
    fn generation_is_reproducible(seed in any::<u64>(), ty in vector_type()) {
        let e1 = generate(ty, 4, &mut ChaCha8Rng::seed_from_u64(seed));
        let e2 = generate(ty, 4, &mut ChaCha8Rng::seed_from_u64(seed));
        prop_assert_eq!(e1, e2);
    }

    #[test]
    fn simplification_preserves_type(seed in any::<u64>(), ty in vector_type()) {
        let e = generate(ty, 4, &mut ChaCha8Rng::seed_from_u64(seed));
        let simplified = Simplify.simplify(&e);
        prop_assert_eq!(simplified.type_check(), Ok(ty));
    }

    #[test]
    fn lanes_are_well_typed_scalars(seed in any::<u64>(), ty in vector_type()) {
        let e = generate(ty, 3, &mut ChaCha8Rng::seed_from_u64(seed));
        for lane in 0..ty.width() {
            prop_assert_eq!(e.extract_lane(lane).type_check(), Ok(ty.element_of()));
        }
    }

    #[test]
    fn reference_simplifier_survives_the_checker(seed in any::<u64>(), ty in vector_type()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let e = generate(ty, 5, &mut rng);
        let simplified = Simplify.simplify(&e);
        let verdict = check_equivalent(&e, &simplified, 3, &Simplify, &mut rng);
        prop_assert!(verdict.is_equivalent(), "{:?}", verdict);
    }

    #[test]
    fn literal_leaves_need_no_retries(seed in any::<u64>(), i in 0..ElementType::ALL.len()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let elem = ElementType::ALL[i];
        let leaf = Generator::new(elem, &mut rng).leaf(elem.scalar(), true);
        prop_assert_eq!(leaf.as_constant().map(|c| c.ty()), Some(elem));
    }
}
