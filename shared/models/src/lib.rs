//! # ChemTable Core Domain Models
//!
//! Data model for the property reconciliation engine: units, numeric
//! property observations, GHS hazards, per-provider results, and the
//! reconciled per-compound property set, together with the comparator and
//! deduplicator that produce the ranked view.
//!
//! ## Key Models
//!
//! - **NumericProperty**: one observed value for a numeric property family
//!   (melting point, boiling point, density), tagged with unit, source and
//!   a deep link to the origin record
//! - **Hazard**: one GHS hazard statement with its pictogram classification
//! - **PropertyResult**: the per-compound output of a single provider
//! - **Properties**: the final reconciled property set of a compound
//! - **Compound**: a compound as displayed in the table, with core identity
//!   fields and its reconciled properties
//!
//! ## Reconciliation primitives
//!
//! `compare_properties` is the total order used to rank observations within
//! one property family, and `deduplicate_properties` collapses observations
//! sharing an identical value. Both are pure functions; the aggregation
//! service drives them.

pub mod compound;
pub mod property;
pub mod provider;

#[cfg(test)]
mod property_tests;

pub use compound::{Compound, CoreFields};
pub use property::{
    compare_properties, deduplicate_properties, Hazard, NumericProperty, Properties,
    PropertyResult, Unit,
};
pub use provider::{KnownProvider, PREFERRED_PROVIDER};
