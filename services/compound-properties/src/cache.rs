//! Compound cache.
//!
//! Redis-backed caching for reconciled compound lookups, so a restart does
//! not refetch every compound. Cache failures are never fatal: they are
//! logged and treated as misses.

use redis::{AsyncCommands, Client};
use tracing::warn;

use chemtable_models::Compound;
use chemtable_utils::{CacheConfig, ChemTableResult};

pub struct CompoundCache {
    client: Client,
    config: CacheConfig,
}

impl CompoundCache {
    pub fn new(config: CacheConfig) -> ChemTableResult<Self> {
        let client = Client::open(config.redis_url.clone())?;
        Ok(Self { client, config })
    }

    fn key(&self, cid: &str) -> String {
        format!("{}{}", self.config.prefix, cid)
    }

    /// Cached compound for a CID, if present and readable.
    pub async fn get(&self, cid: &str) -> Option<Compound> {
        match self.fetch(cid).await {
            Ok(found) => found,
            Err(err) => {
                warn!(cid, error = %err, "compound cache read failed");
                None
            }
        }
    }

    async fn fetch(&self, cid: &str) -> ChemTableResult<Option<Compound>> {
        let mut con = self.client.get_async_connection().await?;
        let payload: Option<String> = con.get(self.key(cid)).await?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Stores a compound with the configured TTL.
    pub async fn set(&self, compound: &Compound) {
        if let Err(err) = self.store(compound).await {
            warn!(cid = %compound.cid, error = %err, "compound cache write failed");
        }
    }

    async fn store(&self, compound: &Compound) -> ChemTableResult<()> {
        let payload = serde_json::to_string(compound)?;
        let mut con = self.client.get_async_connection().await?;
        // Set with expiration (EX)
        let _: () = redis::cmd("SET")
            .arg(self.key(&compound.cid))
            .arg(payload)
            .arg("EX")
            .arg(self.config.ttl_seconds)
            .query_async(&mut con)
            .await?;
        Ok(())
    }

    /// Drops one cached compound.
    pub async fn invalidate(&self, cid: &str) {
        if let Err(err) = self.delete(cid).await {
            warn!(cid, error = %err, "compound cache invalidation failed");
        }
    }

    async fn delete(&self, cid: &str) -> ChemTableResult<()> {
        let mut con = self.client.get_async_connection().await?;
        let _: () = con.del(self.key(cid)).await?;
        Ok(())
    }

    /// Clears every cached compound.
    pub async fn clear(&self) {
        if let Err(err) = self.flush().await {
            warn!(error = %err, "compound cache clear failed");
        }
    }

    async fn flush(&self) -> ChemTableResult<()> {
        let mut con = self.client.get_async_connection().await?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut con).await?;
        Ok(())
    }
}
