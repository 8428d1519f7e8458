//! Provider capability contract.

use async_trait::async_trait;

use chemtable_models::PropertyResult;
use chemtable_utils::ChemTableResult;

/// A property data provider.
///
/// Implementations are stateless aside from their own transport. Failures
/// from non-primary providers are non-fatal to the aggregate; the
/// reconciliation pass catches them and substitutes an empty result.
#[async_trait]
pub trait PropertyProvider: Send + Sync {
    /// Stable identifier used in source attribution and tie-breaks.
    fn name(&self) -> &str;

    /// Fetches every property family this provider knows for a compound,
    /// identified by its PubChem CID.
    async fn get_properties(&self, cid: &str) -> ChemTableResult<PropertyResult>;
}
