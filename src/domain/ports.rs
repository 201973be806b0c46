use crate::domain::model::Listing;
use crate::utils::error::Result;
use std::sync::Arc;

/// Supplies the candidate set for one request. The engine treats the
/// returned snapshot as immutable.
pub trait ListingStore: Send + Sync {
    fn snapshot(&self) -> impl std::future::Future<Output = Result<Arc<[Listing]>>> + Send;
}

impl<S: ListingStore> ListingStore for Arc<S> {
    async fn snapshot(&self) -> Result<Arc<[Listing]>> {
        self.as_ref().snapshot().await
    }
}
