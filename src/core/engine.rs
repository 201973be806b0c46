use crate::config::toml_config::EngineConfig;
use crate::core::filter::ListingQuery;
use crate::core::query;
use crate::domain::model::{
    DestinationGuide, DirectoryStats, DiscoverCatalog, ListingEntitlements, QueryResponse,
};
use crate::domain::ports::ListingStore;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Caller-facing entry point. Pulls a fresh snapshot from the store for
/// every request and runs the pure read paths over it.
pub struct DirectoryEngine<S: ListingStore> {
    store: S,
    config: Arc<EngineConfig>,
}

impl<S: ListingStore> DirectoryEngine<S> {
    pub fn new(store: S, config: Arc<EngineConfig>) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn query(&self, query: &ListingQuery) -> Result<QueryResponse> {
        self.query_with_cancel(query, &CancellationToken::new()).await
    }

    /// 解析原始參數後查詢，錯誤參數直接回傳 InvalidArgument
    pub async fn query_params<I, K, V>(&self, params: I) -> Result<QueryResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = ListingQuery::from_params(params)?;
        self.query(&query).await
    }

    pub async fn query_with_cancel(
        &self,
        query: &ListingQuery,
        cancel: &CancellationToken,
    ) -> Result<QueryResponse> {
        tracing::debug!("Running listing query: {:?}", query);
        let snapshot = self.store.snapshot().await?;
        query::execute(&snapshot, query, &self.config, cancel)
    }

    pub async fn guide(&self, destination: &str) -> Result<DestinationGuide> {
        self.guide_with_cancel(destination, &CancellationToken::new()).await
    }

    pub async fn guide_with_cancel(
        &self,
        destination: &str,
        cancel: &CancellationToken,
    ) -> Result<DestinationGuide> {
        let snapshot = self.store.snapshot().await?;
        query::build_guide(&snapshot, destination, &self.config, cancel)
    }

    pub fn discover(&self) -> DiscoverCatalog {
        query::discover_catalog(&self.config)
    }

    pub async fn stats(&self) -> Result<DirectoryStats> {
        let snapshot = self.store.snapshot().await?;
        Ok(query::compute_stats(&snapshot))
    }

    pub async fn entitlements(&self, listing_id: &str) -> Result<ListingEntitlements> {
        let snapshot = self.store.snapshot().await?;
        query::lookup_entitlements(&snapshot, listing_id, &self.config)
    }
}
