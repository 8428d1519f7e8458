//! PubChem provider.
//!
//! Primary data provider: compound autocomplete, core identity fields via
//! PUG, and experimental properties / GHS hazard statements via PUG View.
//! This module also owns the normalizers that flatten PUG View payloads
//! into typed observations.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use chemtable_models::{
    CoreFields, Hazard, KnownProvider, NumericProperty, PropertyResult, Unit,
};
use chemtable_utils::{ChemTableError, ChemTableResult};

use crate::ghs::pictogram_for;
use crate::provider::PropertyProvider;

/// Parses GHS hazard statements as they are presented by PUG View: one or
/// more `+`-joined H-codes, an optional parenthetical note, the statement
/// text, and a bracketed trailing annotation.
static HAZARD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?:\+?H\d{3}[A-z]*)+)(?: \(.+\))?: ([^\[]+) \[.+\]")
        .expect("hazard statement pattern compiles")
});

const MELTING_POINT_PATH: [&str; 3] = [
    "Chemical and Physical Properties",
    "Experimental Properties",
    "Melting Point",
];
const BOILING_POINT_PATH: [&str; 3] = [
    "Chemical and Physical Properties",
    "Experimental Properties",
    "Boiling Point",
];
const DENSITY_PATH: [&str; 3] = [
    "Chemical and Physical Properties",
    "Experimental Properties",
    "Density",
];
const HAZARDS_PATH: [&str; 3] = [
    "Safety and Hazards",
    "Hazards Identification",
    "GHS Classification",
];
const HAZARD_INFORMATION_NAME: &str = "GHS Hazard Statements";

pub struct PubChemClient {
    client: Client,
    base_url: String,
}

impl PubChemClient {
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

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest{}/json", self.base_url, path)
    }

    /// Link to an image of the compound's skeletal structure.
    pub fn structure_image_link(&self, cid: &str) -> String {
        format!("{}/rest/pug/compound/cid/{}/png", self.base_url, cid)
    }

    /// Autocomplete suggestions for a partial compound name.
    pub async fn get_suggestions(&self, query: &str) -> ChemTableResult<Vec<String>> {
        let url = self.rest_url(&format!("/autocomplete/compound/{}", query));
        let resp = self.client.get(&url).send().await?;
        let data: AutocompleteResponse = resp.json().await?;

        if data.status.error.is_some() || data.total == 0 {
            return Ok(Vec::new());
        }
        Ok(data
            .dictionary_terms
            .map(|terms| terms.compound)
            .unwrap_or_default())
    }

    /// Core identity fields for a compound name. Failures here are fatal to
    /// the lookup: reconciliation cannot proceed without a CID.
    pub async fn get_core_fields(&self, compound: &str) -> ChemTableResult<CoreFields> {
        let url = self.rest_url(&format!(
            "/pug/compound/name/{}/property/IUPACName,MolecularWeight",
            compound
        ));
        let resp = self.client.get(&url).send().await?;
        let data: PugResponse = resp.json().await?;

        if let Some(fault) = data.fault {
            return Err(ChemTableError::provider(
                KnownProvider::PubChem.as_str(),
                format!(
                    "PUG fault while getting core fields for '{}': {}",
                    compound,
                    fault.describe()
                ),
            ));
        }
        let row = data
            .property_table
            .and_then(|table| table.properties.into_iter().next())
            .ok_or_else(|| {
                ChemTableError::parse(format!("PUG returned no properties for '{}'", compound))
            })?;

        Ok(CoreFields {
            cid: row.cid.to_string(),
            iupac_name: row.iupac_name,
            molecular_weight: row.molecular_weight,
        })
    }

    async fn get_index(&self, cid: &str) -> ChemTableResult<Vec<Section>> {
        let url = self.rest_url(&format!("/pug_view/index/compound/{}", cid));
        let resp = self.client.get(&url).send().await?;
        let data: PugViewResponse = resp.json().await?;

        if let Some(fault) = data.fault {
            return Err(ChemTableError::provider(
                KnownProvider::PubChem.as_str(),
                format!(
                    "PUG View fault while retrieving index for CID {}: {}",
                    cid,
                    fault.describe()
                ),
            ));
        }
        Ok(data.record.map(|record| record.section).unwrap_or_default())
    }

    async fn get_heading_information(
        &self,
        cid: &str,
        heading: &str,
    ) -> ChemTableResult<Vec<InformationEntry>> {
        let url = format!(
            "{}/rest/pug_view/data/compound/{}/json",
            self.base_url, cid
        );
        let resp = self
            .client
            .get(&url)
            .query(&[("heading", heading)])
            .send()
            .await?;
        let data: PugViewResponse = resp.json().await?;

        if let Some(fault) = data.fault {
            return Err(ChemTableError::provider(
                KnownProvider::PubChem.as_str(),
                format!(
                    "PUG View fault while retrieving '{}' for CID {}: {}",
                    heading,
                    cid,
                    fault.describe()
                ),
            ));
        }
        Ok(data.record.map(nested_information).unwrap_or_default())
    }

    fn section_link(&self, cid: &str, toc_heading: &str) -> String {
        format!(
            "{}/compound/{}#section={}",
            self.base_url,
            cid,
            toc_heading.replace(' ', "-")
        )
    }
}

#[async_trait]
impl PropertyProvider for PubChemClient {
    fn name(&self) -> &str {
        KnownProvider::PubChem.as_str()
    }

    /// Checks the compound's PUG View index for each known property family
    /// and fetches the families that are present.
    async fn get_properties(&self, cid: &str) -> ChemTableResult<PropertyResult> {
        let mut results = PropertyResult::default();
        let index = self.get_index(cid).await?;

        if contains_path(&index, &MELTING_POINT_PATH) {
            let heading = MELTING_POINT_PATH[2];
            let information = self.get_heading_information(cid, heading).await?;
            results.melting_point = Some(normalize_numeric_information(
                &information,
                &self.section_link(cid, heading),
            ));
        }

        if contains_path(&index, &BOILING_POINT_PATH) {
            let heading = BOILING_POINT_PATH[2];
            let information = self.get_heading_information(cid, heading).await?;
            results.boiling_point = Some(normalize_numeric_information(
                &information,
                &self.section_link(cid, heading),
            ));
        }

        if contains_path(&index, &DENSITY_PATH) {
            let heading = DENSITY_PATH[2];
            let information = self.get_heading_information(cid, heading).await?;
            results.density = Some(normalize_numeric_information(
                &information,
                &self.section_link(cid, heading),
            ));
        }

        if contains_path(&index, &HAZARDS_PATH) {
            let heading = HAZARDS_PATH[2];
            let information = self.get_heading_information(cid, heading).await?;
            let statements: Vec<&InformationEntry> = information
                .iter()
                .filter(|entry| entry.name.as_deref() == Some(HAZARD_INFORMATION_NAME))
                .collect();
            results.hazards = Some(normalize_hazard_information(&statements));
        }

        Ok(results)
    }
}

/// Whether a heading path exists in the PUG View index tree.
fn contains_path(sections: &[Section], path: &[&str]) -> bool {
    let Some((head, rest)) = path.split_first() else {
        return true;
    };
    sections
        .iter()
        .find(|section| section.toc_heading == *head)
        .is_some_and(|section| rest.is_empty() || contains_path(&section.section, rest))
}

/// Requested headings come back nested three section levels deep.
fn nested_information(record: PugViewRecord) -> Vec<InformationEntry> {
    let mut section = match record.section.into_iter().next() {
        Some(section) => section,
        None => return Vec::new(),
    };
    for _ in 0..2 {
        match section.section.into_iter().next() {
            Some(child) => section = child,
            None => return Vec::new(),
        }
    }
    section.information
}

/// Flattens PUG View information entries into numeric observations, in
/// input order. Structured numeric values keep the entry's classified unit;
/// free-text values go through the token rules below.
fn normalize_numeric_information(
    information: &[InformationEntry],
    source_link: &str,
) -> Vec<NumericProperty> {
    let source = KnownProvider::PubChem.as_str();
    let mut normalized = Vec::new();

    for value in information.iter().filter_map(|entry| entry.value.as_ref()) {
        if !value.number.is_empty() {
            let unit = Unit::classify(value.unit.as_deref());
            for number in &value.number {
                normalized.push(NumericProperty {
                    value: number.to_string(),
                    unit,
                    original: None,
                    source: source.to_string(),
                    source_link: source_link.to_string(),
                });
            }
        } else {
            for swm in &value.string_with_markup {
                normalized.push(normalize_free_text(&swm.string, source, source_link));
            }
        }
    }
    normalized
}

/// Free-text observations of the form "<value>" or "<value> <unit>" (or the
/// three-token density form "<value> g/cu cm") are split into a value and a
/// classified unit. Longer or irregular text (ranges, qualifiers) is
/// preserved verbatim for display rather than discarded.
fn normalize_free_text(text: &str, source: &str, source_link: &str) -> NumericProperty {
    let parts: Vec<&str> = text.split(' ').collect();
    if parts.len() <= 2 || (parts.len() == 3 && text.ends_with("g/cu cm")) {
        NumericProperty {
            value: parts[0].to_string(),
            unit: Unit::classify(Some(text)),
            original: Some(text.to_string()),
            source: source.to_string(),
            source_link: source_link.to_string(),
        }
    } else {
        NumericProperty {
            value: text.to_string(),
            unit: Unit::Unknown,
            original: Some(text.to_string()),
            source: source.to_string(),
            source_link: source_link.to_string(),
        }
    }
}

/// Parses "GHS Hazard Statements" entries into hazards keyed by H-code.
/// Statements the pattern does not match are logged and skipped; the first
/// occurrence of a code wins within one provider payload.
fn normalize_hazard_information(information: &[&InformationEntry]) -> BTreeMap<String, Hazard> {
    let mut normalized = BTreeMap::new();

    for value in information.iter().filter_map(|entry| entry.value.as_ref()) {
        for swm in &value.string_with_markup {
            let Some(captures) = HAZARD_REGEX.captures(&swm.string) else {
                error!(statement = %swm.string, "failed to parse hazard statement");
                continue;
            };
            let code = captures[1].to_string();
            if !normalized.contains_key(&code) {
                let pictogram = pictogram_for(&code).map(str::to_string);
                normalized.insert(
                    code.clone(),
                    Hazard {
                        code,
                        hazard_statement: captures[2].to_string(),
                        pictogram,
                    },
                );
            }
        }
    }
    normalized
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: AutocompleteStatus,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    dictionary_terms: Option<DictionaryTerms>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteStatus {
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DictionaryTerms {
    #[serde(default)]
    compound: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PugResponse {
    #[serde(rename = "PropertyTable")]
    property_table: Option<PropertyTable>,
    #[serde(rename = "Fault")]
    fault: Option<PugFault>,
}

#[derive(Debug, Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties")]
    properties: Vec<PugProperty>,
}

#[derive(Debug, Deserialize)]
struct PugProperty {
    #[serde(rename = "CID")]
    cid: u64,
    #[serde(rename = "IUPACName")]
    iupac_name: String,
    #[serde(rename = "MolecularWeight")]
    molecular_weight: String,
}

#[derive(Debug, Deserialize)]
struct PugFault {
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
    #[serde(rename = "Details", default)]
    details: Vec<String>,
}

impl PugFault {
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(code.clone());
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        parts.extend(self.details.iter().cloned());
        parts.join("; ")
    }
}

#[derive(Debug, Deserialize)]
struct PugViewResponse {
    #[serde(rename = "Record")]
    record: Option<PugViewRecord>,
    #[serde(rename = "Fault")]
    fault: Option<PugFault>,
}

#[derive(Debug, Deserialize)]
struct PugViewRecord {
    #[serde(rename = "Section", default)]
    section: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(rename = "TOCHeading")]
    toc_heading: String,
    #[serde(rename = "Section", default)]
    section: Vec<Section>,
    #[serde(rename = "Information", default)]
    information: Vec<InformationEntry>,
}

#[derive(Debug, Deserialize)]
struct InformationEntry {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Value")]
    value: Option<InformationValue>,
}

#[derive(Debug, Deserialize)]
struct InformationValue {
    #[serde(rename = "Number", default)]
    number: Vec<f64>,
    #[serde(rename = "Unit")]
    unit: Option<String>,
    #[serde(rename = "StringWithMarkup", default)]
    string_with_markup: Vec<StringWithMarkup>,
}

#[derive(Debug, Deserialize)]
struct StringWithMarkup {
    #[serde(rename = "String")]
    string: String,
}
