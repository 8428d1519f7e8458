//! Chemical compound aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::property::Properties;

/// Core identity fields, required before any property reconciliation can
/// proceed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreFields {
    /// The unique PubChem CID.
    pub cid: String,
    pub iupac_name: String,
    /// In g/mol, as reported by the provider.
    pub molecular_weight: String,
}

/// A chemical compound as displayed in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compound {
    /// The unique PubChem CID for this compound.
    pub cid: String,
    /// Name used when searching for the compound.
    pub name: String,
    pub iupac_name: String,
    /// Link to an image of the skeletal structure of the compound.
    pub structure_image_link: String,
    pub molecular_weight: String,
    pub properties: Properties,
    pub last_updated: DateTime<Utc>,
}

impl Compound {
    pub fn new(name: impl Into<String>, core: CoreFields, structure_image_link: String) -> Self {
        Self {
            cid: core.cid,
            name: name.into(),
            iupac_name: core.iupac_name,
            structure_image_link,
            molecular_weight: core.molecular_weight,
            properties: Properties::default(),
            last_updated: Utc::now(),
        }
    }

    /// Replaces the reconciled property set wholesale.
    pub fn set_properties(&mut self, properties: Properties) {
        self.properties = properties;
        self.last_updated = Utc::now();
    }
}
