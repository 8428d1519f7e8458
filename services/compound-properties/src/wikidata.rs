//! Wikidata provider.
//!
//! Secondary data provider: numeric properties retrieved with one SPARQL
//! query keyed by the compound's PubChem CID statement. Never produces
//! hazards.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use chemtable_models::{KnownProvider, NumericProperty, PropertyResult, Unit};
use chemtable_utils::ChemTableResult;

use crate::provider::PropertyProvider;

const MELTING_POINT_PROPERTY: &str = "P2101";
const BOILING_POINT_PROPERTY: &str = "P2102";
const DENSITY_PROPERTY: &str = "P2054";

/// Maps Wikidata unit entities to units.
fn unit_for_entity(entity: &str) -> Unit {
    match entity {
        "http://www.wikidata.org/entity/Q25267" => Unit::Celsius,
        "http://www.wikidata.org/entity/Q42289" => Unit::Fahrenheit,
        "http://www.wikidata.org/entity/Q13147228" => Unit::GramsPerCubicCentimeter,
        _ => Unit::Unknown,
    }
}

pub struct WikidataClient {
    client: Client,
    base_url: String,
}

impl WikidataClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn perform_query(&self, cid: &str) -> ChemTableResult<SparqlResponse> {
        let query = format!(
            r#"
      SELECT DISTINCT ?item ?itemLabel ?meltingPoint ?meltingPointUnit ?boilingPoint ?boilingPointUnit ?density ?densityUnit ?densityUnitLabel WHERE {{
        ?item p:P662 ?statement0.
        ?statement0 ps:P662 "{cid}".
        {{
          OPTIONAL {{
            ?item p:P2101 ?statement1.
            ?statement1 psv:P2101 ?valueNode1.
            ?valueNode1 wikibase:quantityAmount ?meltingPoint;
              wikibase:quantityUnit ?meltingPointUnit.
          }}
        }}
        UNION
        {{
          OPTIONAL {{
            ?item p:P2102 ?statement2.
            ?statement2 psv:P2102 ?valueNode2.
            ?valueNode2 wikibase:quantityAmount ?boilingPoint;
              wikibase:quantityUnit ?boilingPointUnit.
          }}
        }}
        UNION
        {{
          OPTIONAL {{
            ?item p:P2054 ?statement3.
            ?statement3 psv:P2054 ?valueNode3.
            ?valueNode3 wikibase:quantityAmount ?density;
              wikibase:quantityUnit ?densityUnit.
          }}
        }}
        SERVICE wikibase:label {{ bd:serviceParam wikibase:language "[AUTO_LANGUAGE],mul,en". }}
      }}
    "#
        );

        let resp = self
            .client
            .get(format!("{}/sparql", self.base_url))
            .query(&[("query", query.as_str())])
            .header(ACCEPT, "application/sparql-results+json")
            .send()
            .await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl PropertyProvider for WikidataClient {
    fn name(&self) -> &str {
        KnownProvider::Wikidata.as_str()
    }

    async fn get_properties(&self, cid: &str) -> ChemTableResult<PropertyResult> {
        let mut melting_point = Vec::new();
        let mut boiling_point = Vec::new();
        let mut density = Vec::new();

        let data = self.perform_query(cid).await?;
        for row in &data.results.bindings {
            let Some(item) = &row.item else { continue };

            if let (Some(value), Some(unit)) = (&row.melting_point, &row.melting_point_unit) {
                melting_point.push(construct_property(
                    &item.value,
                    MELTING_POINT_PROPERTY,
                    &value.value,
                    &unit.value,
                    None,
                ));
            }
            if let (Some(value), Some(unit)) = (&row.boiling_point, &row.boiling_point_unit) {
                boiling_point.push(construct_property(
                    &item.value,
                    BOILING_POINT_PROPERTY,
                    &value.value,
                    &unit.value,
                    None,
                ));
            }
            if let (Some(value), Some(unit)) = (&row.density, &row.density_unit) {
                density.push(construct_property(
                    &item.value,
                    DENSITY_PROPERTY,
                    &value.value,
                    &unit.value,
                    row.density_unit_label.as_ref().map(|label| label.value.as_str()),
                ));
            }
        }

        Ok(PropertyResult {
            melting_point: Some(melting_point),
            boiling_point: Some(boiling_point),
            density: Some(density),
            hazards: None,
        })
    }
}

fn construct_property(
    entity: &str,
    property: &str,
    value: &str,
    unit_entity: &str,
    unit_label: Option<&str>,
) -> NumericProperty {
    let unit = unit_for_entity(unit_entity);
    // An unmapped unit keeps the labelled original around for display.
    let original = match (unit, unit_label) {
        (Unit::Unknown, Some(label)) => Some(format!("{} {}", value, label)),
        _ => None,
    };

    NumericProperty {
        value: value.to_string(),
        unit,
        original,
        source: KnownProvider::Wikidata.as_str().to_string(),
        source_link: format!("{}#{}", entity, property),
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<RowBinding>,
}

#[derive(Debug, Deserialize)]
struct RowBinding {
    item: Option<BindingValue>,
    #[serde(rename = "meltingPoint")]
    melting_point: Option<BindingValue>,
    #[serde(rename = "meltingPointUnit")]
    melting_point_unit: Option<BindingValue>,
    #[serde(rename = "boilingPoint")]
    boiling_point: Option<BindingValue>,
    #[serde(rename = "boilingPointUnit")]
    boiling_point_unit: Option<BindingValue>,
    density: Option<BindingValue>,
    #[serde(rename = "densityUnit")]
    density_unit: Option<BindingValue>,
    #[serde(rename = "densityUnitLabel")]
    density_unit_label: Option<BindingValue>,
}

#[derive(Debug, Deserialize)]
struct BindingValue {
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_bindings(value: serde_json::Value) -> SparqlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn known_unit_entities_map_to_units() {
        assert_eq!(
            unit_for_entity("http://www.wikidata.org/entity/Q25267"),
            Unit::Celsius
        );
        assert_eq!(
            unit_for_entity("http://www.wikidata.org/entity/Q42289"),
            Unit::Fahrenheit
        );
        assert_eq!(
            unit_for_entity("http://www.wikidata.org/entity/Q13147228"),
            Unit::GramsPerCubicCentimeter
        );
        assert_eq!(
            unit_for_entity("http://www.wikidata.org/entity/Q11570"),
            Unit::Unknown
        );
    }

    #[test]
    fn bindings_become_sourced_observations() {
        let response = parse_bindings(json!({
            "results": { "bindings": [
                {
                    "item": { "type": "uri", "value": "http://www.wikidata.org/entity/Q283" },
                    "meltingPoint": { "type": "literal", "value": "0" },
                    "meltingPointUnit": { "type": "uri", "value": "http://www.wikidata.org/entity/Q25267" }
                },
                {
                    "item": { "type": "uri", "value": "http://www.wikidata.org/entity/Q283" },
                    "boilingPoint": { "type": "literal", "value": "99.98" },
                    "boilingPointUnit": { "type": "uri", "value": "http://www.wikidata.org/entity/Q25267" }
                }
            ] }
        }));

        let mut melting_point = Vec::new();
        for row in &response.results.bindings {
            let item = row.item.as_ref().unwrap();
            if let (Some(value), Some(unit)) = (&row.melting_point, &row.melting_point_unit) {
                melting_point.push(construct_property(
                    &item.value,
                    MELTING_POINT_PROPERTY,
                    &value.value,
                    &unit.value,
                    None,
                ));
            }
        }

        assert_eq!(melting_point.len(), 1);
        assert_eq!(melting_point[0].value, "0");
        assert_eq!(melting_point[0].unit, Unit::Celsius);
        assert_eq!(melting_point[0].source, "Wikipedia");
        assert_eq!(
            melting_point[0].source_link,
            "http://www.wikidata.org/entity/Q283#P2101"
        );
    }

    #[test]
    fn unmapped_units_preserve_the_labelled_original() {
        let property = construct_property(
            "http://www.wikidata.org/entity/Q283",
            DENSITY_PROPERTY,
            "997",
            "http://www.wikidata.org/entity/Q844211",
            Some("kilogram per cubic metre"),
        );

        assert_eq!(property.unit, Unit::Unknown);
        assert_eq!(
            property.original.as_deref(),
            Some("997 kilogram per cubic metre")
        );
    }

    #[test]
    fn mapped_units_carry_no_original_text() {
        let property = construct_property(
            "http://www.wikidata.org/entity/Q283",
            DENSITY_PROPERTY,
            "1",
            "http://www.wikidata.org/entity/Q13147228",
            Some("gram per cubic centimetre"),
        );

        assert_eq!(property.unit, Unit::GramsPerCubicCentimeter);
        assert_eq!(property.original, None);
    }
}
