//! Property tests for deriva-core: canonical forms and the expression model.

use proptest::prelude::*;

use deriva_core::{canonical_eq, canonicalize, Expression, VariableSet};

// Disjoint name pools keep randomly generated probability terms valid
// (target, given, and do sets must never overlap).
const TARGET_POOL: &[&str] = &["t1", "t2"];
const GIVEN_POOL: &[&str] = &["g1", "g2"];
const DO_POOL: &[&str] = &["d1", "d2"];
const SUM_POOL: &[&str] = &["s1", "s2"];

fn varset(pool: &'static [&'static str], min: usize) -> impl Strategy<Value = VariableSet> {
    prop::collection::btree_set(prop::sample::select(pool.to_vec()), min..=pool.len())
        .prop_map(|names| names.into_iter().collect())
}

fn prob_strategy() -> impl Strategy<Value = Expression> {
    (varset(TARGET_POOL, 1), varset(GIVEN_POOL, 0), varset(DO_POOL, 0)).prop_map(
        |(target, given, do_set)| {
            Expression::prob(target, given, do_set).expect("pools are disjoint")
        },
    )
}

fn expr_strategy() -> impl Strategy<Value = Expression> {
    prob_strategy().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            (varset(SUM_POOL, 1), inner.clone())
                .prop_map(|(over, body)| Expression::sum(over, body).expect("non-empty over")),
            prop::collection::vec(inner.clone(), 1..=3)
                .prop_map(|factors| Expression::product(factors).expect("non-empty factors")),
            (inner.clone(), inner.clone())
                .prop_map(|(numerator, denominator)| Expression::ratio(numerator, denominator)),
            (inner.clone(), inner.clone())
                .prop_map(|(left, right)| Expression::difference(left, right)),
        ]
    })
}

// =============================================================================
// Canonicalization is idempotent: canon(canon(e)) == canon(e)
// =============================================================================
proptest! {
    #[test]
    fn canonicalize_is_idempotent(expr in expr_strategy()) {
        let once = canonicalize(&expr);
        let twice = canonicalize(&once);
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// Factor order never affects canonical form
// =============================================================================
proptest! {
    #[test]
    fn product_factor_order_is_irrelevant(factors in prop::collection::vec(expr_strategy(), 2..4)) {
        let forward = Expression::product(factors.clone()).expect("non-empty");
        let mut reversed_factors = factors;
        reversed_factors.reverse();
        let reversed = Expression::product(reversed_factors).expect("non-empty");
        prop_assert!(canonical_eq(&forward, &reversed));
    }
}

// =============================================================================
// Canonical form survives a serde round trip
// =============================================================================
proptest! {
    #[test]
    fn serde_round_trip_preserves_canonical_form(expr in expr_strategy()) {
        let canon = canonicalize(&expr);
        let json = serde_json::to_string(&canon).expect("serialize");
        let back: Expression = serde_json::from_str(&json).expect("deserialize");
        prop_assert_eq!(canon, back);
    }
}

// =============================================================================
// Canonicalization never invents or drops variables
// =============================================================================
proptest! {
    #[test]
    fn canonicalize_preserves_variables(expr in expr_strategy()) {
        let canon = canonicalize(&expr);
        prop_assert_eq!(expr.variables(), canon.variables());
    }
}
