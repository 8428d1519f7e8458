//! Compound aggregation service.
//!
//! Orchestrates one reconciliation pass per compound: query the primary
//! provider and every configured secondary provider, deduplicate and rank
//! the combined observations, and publish the assembled property set to the
//! compound table.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use chemtable_models::{
    compare_properties, deduplicate_properties, Compound, Hazard, NumericProperty, Properties,
    PropertyResult,
};
use chemtable_utils::{AppConfig, ChemTableResult};

use crate::cache::CompoundCache;
use crate::provider::PropertyProvider;
use crate::pubchem::PubChemClient;
use crate::wikidata::WikidataClient;

#[derive(Clone)]
pub struct CompoundService {
    pubchem: Arc<PubChemClient>,
    providers: Vec<Arc<dyn PropertyProvider>>,
    compounds: Arc<RwLock<HashMap<String, Compound>>>,
    cache: Option<Arc<CompoundCache>>,
}

impl CompoundService {
    pub fn new(config: &AppConfig) -> Self {
        let timeout = Duration::from_secs(config.providers.request_timeout_seconds);
        let pubchem = Arc::new(PubChemClient::new(&config.providers.pubchem_base_url, timeout));
        let wikidata: Arc<dyn PropertyProvider> = Arc::new(WikidataClient::new(
            &config.providers.wikidata_base_url,
            timeout,
        ));

        let cache = match CompoundCache::new(config.cache.clone()) {
            Ok(cache) => Some(Arc::new(cache)),
            Err(err) => {
                warn!(error = %err, "compound cache unavailable, lookups will not be cached");
                None
            }
        };

        Self {
            pubchem,
            providers: vec![wikidata],
            compounds: Arc::new(RwLock::new(HashMap::new())),
            cache,
        }
    }

    /// Autocomplete passthrough to the primary provider.
    pub async fn suggestions(&self, query: &str) -> ChemTableResult<Vec<String>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.pubchem.get_suggestions(query).await
    }

    /// Looks up a compound by a user-entered name: resolve core fields, run
    /// one reconciliation pass across all providers, publish to the table.
    ///
    /// A compound already in the table is returned as-is.
    pub async fn lookup(&self, name: &str) -> ChemTableResult<Compound> {
        let core = self.pubchem.get_core_fields(name).await?;

        if let Some(existing) = self.compounds.read().await.get(&core.cid) {
            return Ok(existing.clone());
        }

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&core.cid).await {
                self.publish(cached.clone()).await;
                return Ok(cached);
            }
        }

        let structure_image_link = self.pubchem.structure_image_link(&core.cid);
        let mut compound = Compound::new(name, core, structure_image_link);
        let properties = reconcile(self.pubchem.as_ref(), &self.providers, &compound.cid).await?;
        compound.set_properties(properties);

        if let Some(cache) = &self.cache {
            cache.set(&compound).await;
        }
        self.publish(compound.clone()).await;
        Ok(compound)
    }

    pub async fn list(&self) -> Vec<Compound> {
        self.compounds.read().await.values().cloned().collect()
    }

    pub async fn get(&self, cid: &str) -> Option<Compound> {
        self.compounds.read().await.get(cid).cloned()
    }

    /// Removes one compound from the table. Returns whether it was present.
    pub async fn remove(&self, cid: &str) -> bool {
        let removed = self.compounds.write().await.remove(cid).is_some();
        if removed {
            if let Some(cache) = &self.cache {
                cache.invalidate(cid).await;
            }
        }
        removed
    }

    /// Clears the table. Returns how many compounds were dropped.
    pub async fn clear(&self) -> usize {
        let mut table = self.compounds.write().await;
        let cleared = table.len();
        table.clear();
        drop(table);

        if let Some(cache) = &self.cache {
            cache.clear().await;
        }
        cleared
    }

    /// Publishes a compound to the table. Superseding lookups race only
    /// here, and the later completion wins.
    async fn publish(&self, compound: Compound) {
        info!(cid = %compound.cid, name = %compound.name, "publishing compound");
        self.compounds
            .write()
            .await
            .insert(compound.cid.clone(), compound);
    }
}

/// One reconciliation pass for a CID.
///
/// The primary provider's result is required and its failure propagates.
/// Secondary providers are queried concurrently; a failing secondary is
/// logged with its identity and contributes an empty result. All provider
/// queries complete before deduplication and ranking run over the combined
/// set.
pub async fn reconcile(
    primary: &dyn PropertyProvider,
    secondaries: &[Arc<dyn PropertyProvider>],
    cid: &str,
) -> ChemTableResult<Properties> {
    let primary_result = primary.get_properties(cid).await?;

    let secondary_results = join_all(secondaries.iter().map(|provider| {
        let provider = Arc::clone(provider);
        let cid = cid.to_string();
        async move {
            match provider.get_properties(&cid).await {
                Ok(result) => result,
                Err(err) => {
                    error!(
                        provider = provider.name(),
                        cid = %cid,
                        error = %err,
                        "secondary provider failed, contributing an empty result"
                    );
                    PropertyResult::default()
                }
            }
        }
    }))
    .await;

    let mut results = Vec::with_capacity(1 + secondary_results.len());
    results.push(primary_result);
    results.extend(secondary_results);
    Ok(assemble_properties(results))
}

/// Assembles the final property set from per-provider results, in pass
/// order (primary first).
///
/// Numeric families are concatenated across providers, deduplicated, and
/// ranked. Hazards are merged first-occurrence-wins by code and emitted
/// code-ascending. A family no provider reported stays unresolved.
pub fn assemble_properties(results: Vec<PropertyResult>) -> Properties {
    let mut melting_point: Option<Vec<NumericProperty>> = None;
    let mut boiling_point: Option<Vec<NumericProperty>> = None;
    let mut density: Option<Vec<NumericProperty>> = None;
    let mut hazards: Option<BTreeMap<String, Hazard>> = None;

    for result in results {
        collect_family(&mut melting_point, result.melting_point);
        collect_family(&mut boiling_point, result.boiling_point);
        collect_family(&mut density, result.density);

        if let Some(provider_hazards) = result.hazards {
            let merged = hazards.get_or_insert_with(BTreeMap::new);
            for (code, hazard) in provider_hazards {
                merged.entry(code).or_insert(hazard);
            }
        }
    }

    Properties {
        melting_point: melting_point.map(finalize_family),
        boiling_point: boiling_point.map(finalize_family),
        density: density.map(finalize_family),
        hazards: hazards.map(|merged| merged.into_values().collect()),
    }
}

fn collect_family(acc: &mut Option<Vec<NumericProperty>>, found: Option<Vec<NumericProperty>>) {
    if let Some(mut observations) = found {
        acc.get_or_insert_with(Vec::new).append(&mut observations);
    }
}

fn finalize_family(observations: Vec<NumericProperty>) -> Vec<NumericProperty> {
    let mut deduplicated = deduplicate_properties(observations);
    deduplicated.sort_by(compare_properties);
    deduplicated
}
