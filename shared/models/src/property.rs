//! Property observations and the reconciliation primitives.
//!
//! Defines the unit model, numeric property observations, GHS hazards, and
//! the comparator and deduplicator that turn raw per-provider output into
//! the single ranked view each property family is displayed from.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::provider::PREFERRED_PROVIDER;

/// Unit attached to a numeric observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
    #[serde(rename = "g/cu cm")]
    GramsPerCubicCentimeter,
}

impl Unit {
    /// Classifies a trailing-unit string. Total over all inputs: anything
    /// unrecognized is `Unknown`.
    pub fn classify(suffix: Option<&str>) -> Unit {
        let Some(s) = suffix else {
            return Unit::Unknown;
        };
        if s.is_empty() {
            return Unit::Unknown;
        }
        // PUG View emits the density unit both as plain ASCII and as a
        // mis-encoded superscript-3 variant.
        if s.ends_with("g/cmÂ³") || s.ends_with("g/cu cm") {
            return Unit::GramsPerCubicCentimeter;
        }
        match s.chars().last() {
            Some('C') => Unit::Celsius,
            Some('F') => Unit::Fahrenheit,
            _ => Unit::Unknown,
        }
    }
}

/// One observed value for a numeric property family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericProperty {
    /// String-encoded number or free text; not guaranteed parseable.
    pub value: String,
    pub unit: Unit,
    /// The verbatim source string, present when the value was parsed out of
    /// free text rather than supplied as a structured number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    /// Name of the provider that produced the observation.
    pub source: String,
    /// Deep link to the origin record, ideally as close to it on the page
    /// as possible.
    pub source_link: String,
}

/// One GHS hazard statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hazard {
    /// The H-code, possibly several codes joined by `+`.
    pub code: String,
    pub hazard_statement: String,
    /// Comma-joined pictogram class codes, e.g. `GHS07`; absent when the
    /// code is not in the pictogram table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pictogram: Option<String>,
}

/// Per-compound output of a single provider. A `None` family means the
/// provider does not report it at all; an empty list means it reported the
/// family with no observations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResult {
    pub melting_point: Option<Vec<NumericProperty>>,
    pub boiling_point: Option<Vec<NumericProperty>>,
    pub density: Option<Vec<NumericProperty>>,
    /// Maps H-codes to hazards. The first write per code wins, and
    /// iteration order is the code-ascending output order.
    pub hazards: Option<BTreeMap<String, Hazard>>,
}

/// The reconciled per-compound property set. Each family is `None` until a
/// provider round resolves it, then replaced wholesale on every pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    pub melting_point: Option<Vec<NumericProperty>>,
    pub boiling_point: Option<Vec<NumericProperty>>,
    pub density: Option<Vec<NumericProperty>>,
    pub hazards: Option<Vec<Hazard>>,
}

/// Orders observations within one property family, best first.
///
/// Unit rank decides first: `Unknown` always sorts last, and Celsius is
/// preferred over Fahrenheit. With equal units, parseable values sort
/// before unparseable ones, then more digits after the decimal point sort
/// first, then the preferred provider wins. The precision rule counts
/// digits in the value string; trailing zeros inflate it, and display
/// ordering depends on that behavior.
pub fn compare_properties(a: &NumericProperty, b: &NumericProperty) -> Ordering {
    if a.unit != b.unit {
        if a.unit == Unit::Unknown {
            return Ordering::Greater;
        }
        if b.unit == Unit::Unknown {
            return Ordering::Less;
        }
        // A mix of density and temperature units within one family breaks
        // the data model; resolve as a neutral tie instead of crashing.
        if a.unit == Unit::GramsPerCubicCentimeter || b.unit == Unit::GramsPerCubicCentimeter {
            error!(
                a = ?a,
                b = ?b,
                "mixed density and temperature units in one property family"
            );
            return Ordering::Equal;
        }
        if a.unit == Unit::Celsius {
            return Ordering::Less;
        }
        // `b.unit` must be Celsius.
        return Ordering::Greater;
    }

    let a_unparseable = !parses_as_number(&a.value);
    let b_unparseable = !parses_as_number(&b.value);
    if a_unparseable || b_unparseable {
        // `false < true`, so the parseable one sorts first.
        return a_unparseable.cmp(&b_unparseable);
    }

    let a_decimals = decimal_digits(&a.value);
    let b_decimals = decimal_digits(&b.value);
    if a_decimals != b_decimals {
        return b_decimals.cmp(&a_decimals);
    }

    if a.source != b.source {
        if a.source == PREFERRED_PROVIDER.as_str() {
            return Ordering::Less;
        }
        if b.source == PREFERRED_PROVIDER.as_str() {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}

// The empty string is not a number, and neither is "NaN".
fn parses_as_number(value: &str) -> bool {
    value.trim().parse::<f64>().map_or(false, |n| !n.is_nan())
}

// Digits after the decimal point; no decimal point counts as zero.
fn decimal_digits(value: &str) -> usize {
    let mut parts = value.split('.');
    parts.next();
    parts.next().map(str::len).unwrap_or(0)
}

/// Collapses observations sharing an identical value string, keeping one
/// representative per value in first-seen order.
///
/// A later duplicate replaces the kept representative only when it upgrades
/// it: the kept one has no resolved unit, or the duplicate comes from the
/// preferred provider and carries a resolved unit. A resolved unit is never
/// downgraded back to `Unknown`.
pub fn deduplicate_properties(properties: Vec<NumericProperty>) -> Vec<NumericProperty> {
    let mut kept: Vec<NumericProperty> = Vec::with_capacity(properties.len());
    let mut index_by_value: HashMap<String, usize> = HashMap::new();

    for property in properties {
        match index_by_value.get(&property.value) {
            Some(&i) => {
                let existing = &kept[i];
                let upgrades = (existing.unit == Unit::Unknown && property.unit != Unit::Unknown)
                    || (property.source == PREFERRED_PROVIDER.as_str()
                        && property.unit != Unit::Unknown);
                if upgrades {
                    kept[i] = property;
                }
            }
            None => {
                index_by_value.insert(property.value.clone(), kept.len());
                kept.push(property);
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::KnownProvider;

    fn prop(value: &str, unit: Unit, source: KnownProvider) -> NumericProperty {
        NumericProperty {
            value: value.to_string(),
            unit,
            original: None,
            source: source.as_str().to_string(),
            source_link: String::new(),
        }
    }

    #[test]
    fn classify_is_total() {
        assert_eq!(Unit::classify(None), Unit::Unknown);
        assert_eq!(Unit::classify(Some("")), Unit::Unknown);
        assert_eq!(Unit::classify(Some("°C")), Unit::Celsius);
        assert_eq!(Unit::classify(Some("deg F")), Unit::Fahrenheit);
        assert_eq!(Unit::classify(Some("1.03 g/cu cm")), Unit::GramsPerCubicCentimeter);
        assert_eq!(Unit::classify(Some("g/cmÂ³")), Unit::GramsPerCubicCentimeter);
        assert_eq!(Unit::classify(Some("kPa")), Unit::Unknown);
        assert_eq!(Unit::classify(Some("µ")), Unit::Unknown);
    }

    #[test]
    fn unknown_unit_sorts_last() {
        let a = prop("10", Unit::Unknown, KnownProvider::PubChem);
        let b = prop("10", Unit::Celsius, KnownProvider::PubChem);
        assert_eq!(compare_properties(&a, &b), Ordering::Greater);
        assert_eq!(compare_properties(&b, &a), Ordering::Less);
    }

    #[test]
    fn celsius_sorts_before_fahrenheit() {
        let c = prop("100", Unit::Celsius, KnownProvider::PubChem);
        let f = prop("212", Unit::Fahrenheit, KnownProvider::PubChem);
        assert_eq!(compare_properties(&c, &f), Ordering::Less);
        assert_eq!(compare_properties(&f, &c), Ordering::Greater);
    }

    #[test]
    fn mixed_family_units_are_a_neutral_tie() {
        let c = prop("100", Unit::Celsius, KnownProvider::PubChem);
        let d = prop("1.2", Unit::GramsPerCubicCentimeter, KnownProvider::PubChem);
        assert_eq!(compare_properties(&c, &d), Ordering::Equal);
        assert_eq!(compare_properties(&d, &c), Ordering::Equal);
    }

    #[test]
    fn more_decimal_precision_sorts_first() {
        let precise = prop("100.5", Unit::Celsius, KnownProvider::PubChem);
        let coarse = prop("100", Unit::Celsius, KnownProvider::PubChem);
        assert_eq!(compare_properties(&precise, &coarse), Ordering::Less);
        assert_eq!(compare_properties(&coarse, &precise), Ordering::Greater);
    }

    #[test]
    fn unparseable_values_sort_after_parseable_ones() {
        let parseable = prop("12.5", Unit::Unknown, KnownProvider::PubChem);
        let freetext = prop("12.5 - 13.0 °C at 760 mmHg", Unit::Unknown, KnownProvider::PubChem);
        let empty = prop("", Unit::Unknown, KnownProvider::PubChem);
        assert_eq!(compare_properties(&parseable, &freetext), Ordering::Less);
        assert_eq!(compare_properties(&freetext, &parseable), Ordering::Greater);
        assert_eq!(compare_properties(&freetext, &empty), Ordering::Equal);
    }

    #[test]
    fn preferred_provider_wins_exact_precision_ties() {
        let wikidata = prop("100", Unit::Celsius, KnownProvider::Wikidata);
        let pubchem = prop("100", Unit::Celsius, KnownProvider::PubChem);
        assert_eq!(compare_properties(&wikidata, &pubchem), Ordering::Less);
        assert_eq!(compare_properties(&pubchem, &wikidata), Ordering::Greater);
        assert_eq!(compare_properties(&pubchem, &pubchem), Ordering::Equal);
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        let input = vec![
            prop("100", Unit::Celsius, KnownProvider::PubChem),
            prop("95", Unit::Celsius, KnownProvider::PubChem),
            prop("100", Unit::Celsius, KnownProvider::PubChem),
        ];
        let output = deduplicate_properties(input);
        let values: Vec<&str> = output.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["100", "95"]);
    }

    #[test]
    fn dedup_upgrades_unknown_units() {
        let input = vec![
            prop("10", Unit::Unknown, KnownProvider::PubChem),
            prop("10", Unit::Celsius, KnownProvider::PubChem),
        ];
        let output = deduplicate_properties(input);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].unit, Unit::Celsius);
    }

    #[test]
    fn dedup_prefers_resolved_preferred_provider_entries() {
        let input = vec![
            prop("100", Unit::Celsius, KnownProvider::PubChem),
            prop("100", Unit::Celsius, KnownProvider::Wikidata),
        ];
        let output = deduplicate_properties(input);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].source, KnownProvider::Wikidata.as_str());
    }

    #[test]
    fn dedup_never_downgrades_a_resolved_unit() {
        let input = vec![
            prop("100", Unit::Celsius, KnownProvider::PubChem),
            prop("100", Unit::Unknown, KnownProvider::Wikidata),
        ];
        let output = deduplicate_properties(input);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].unit, Unit::Celsius);
        assert_eq!(output[0].source, KnownProvider::PubChem.as_str());
    }

    #[test]
    fn unit_serializes_to_its_display_form() {
        assert_eq!(serde_json::to_string(&Unit::Celsius).unwrap(), "\"C\"");
        assert_eq!(
            serde_json::to_string(&Unit::GramsPerCubicCentimeter).unwrap(),
            "\"g/cu cm\""
        );
        assert_eq!(serde_json::to_string(&Unit::Unknown).unwrap(), "\"UNKNOWN\"");
    }
}
