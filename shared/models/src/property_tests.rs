//! Property-based tests for the reconciliation primitives.
//!
//! Validates the comparator's strict-weak-ordering obligations and the
//! deduplicator's structural guarantees across generated observations. The
//! comparator is only ever applied within one property family, so the
//! generators draw units from a single family at a time.

use std::cmp::Ordering;
use std::collections::HashSet;

use proptest::option;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::{compare_properties, deduplicate_properties, NumericProperty, Unit};

fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        "-[0-9]{1,3}\\.[0-9]{1,2}",
        Just(String::new()),
        "[a-z]{3,8}( [a-z]{3,8}){0,3}",
    ]
}

fn arb_source() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("PubChem".to_string()),
        Just("Wikipedia".to_string()),
        Just("ChemSpider".to_string()),
    ]
}

fn arb_temperature_unit() -> impl Strategy<Value = Unit> {
    prop_oneof![
        Just(Unit::Celsius),
        Just(Unit::Fahrenheit),
        Just(Unit::Unknown),
    ]
}

fn arb_density_unit() -> impl Strategy<Value = Unit> {
    prop_oneof![Just(Unit::GramsPerCubicCentimeter), Just(Unit::Unknown)]
}

prop_compose! {
    fn arb_temperature_property()(
        value in arb_value(),
        unit in arb_temperature_unit(),
        original in option::of("[ -~]{1,20}"),
        source in arb_source()
    ) -> NumericProperty {
        NumericProperty {
            value,
            unit,
            original,
            source,
            source_link: "https://example.org/source".to_string(),
        }
    }
}

prop_compose! {
    fn arb_density_property()(
        value in arb_value(),
        unit in arb_density_unit(),
        original in option::of("[ -~]{1,20}"),
        source in arb_source()
    ) -> NumericProperty {
        NumericProperty {
            value,
            unit,
            original,
            source,
            source_link: "https://example.org/source".to_string(),
        }
    }
}

fn assert_transitive(
    a: &NumericProperty,
    b: &NumericProperty,
    c: &NumericProperty,
) -> Result<(), TestCaseError> {
    let ab = compare_properties(a, b);
    let bc = compare_properties(b, c);
    if ab == Ordering::Less && bc == Ordering::Less {
        prop_assert_eq!(compare_properties(a, c), Ordering::Less);
    }
    if ab == Ordering::Equal && bc == Ordering::Equal {
        prop_assert_eq!(compare_properties(a, c), Ordering::Equal);
    }
    Ok(())
}

proptest! {
    /// Swapping the arguments reverses the ordering, so no pair can be
    /// mutually preferred.
    #[test]
    fn comparator_is_antisymmetric(
        a in arb_temperature_property(),
        b in arb_temperature_property()
    ) {
        prop_assert_eq!(
            compare_properties(&a, &b),
            compare_properties(&b, &a).reverse()
        );
    }

    /// Precedence and equivalence are both transitive for temperature
    /// observations.
    #[test]
    fn comparator_is_transitive_for_temperatures(
        a in arb_temperature_property(),
        b in arb_temperature_property(),
        c in arb_temperature_property()
    ) {
        assert_transitive(&a, &b, &c)?;
    }

    /// Precedence and equivalence are both transitive for density
    /// observations.
    #[test]
    fn comparator_is_transitive_for_densities(
        a in arb_density_property(),
        b in arb_density_property(),
        c in arb_density_property()
    ) {
        assert_transitive(&a, &b, &c)?;
    }

    /// Deduplicating an already-deduplicated sequence is a no-op.
    #[test]
    fn dedup_is_idempotent(
        properties in prop::collection::vec(arb_temperature_property(), 0..12)
    ) {
        let once = deduplicate_properties(properties);
        let twice = deduplicate_properties(once.clone());
        prop_assert_eq!(once, twice);
    }

    /// Every value present in the input keeps exactly one representative.
    #[test]
    fn dedup_keeps_one_representative_per_value(
        properties in prop::collection::vec(arb_temperature_property(), 0..12)
    ) {
        let input_values: HashSet<String> =
            properties.iter().map(|p| p.value.clone()).collect();
        let output = deduplicate_properties(properties);
        let output_values: Vec<String> =
            output.iter().map(|p| p.value.clone()).collect();
        let distinct: HashSet<String> = output_values.iter().cloned().collect();
        prop_assert_eq!(output_values.len(), distinct.len());
        prop_assert_eq!(distinct, input_values);
    }
}
