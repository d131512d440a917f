use crate::api::error::ApiError;
use crate::models::{Listing, ListingSelector};
use async_trait::async_trait;
use url::Url;

/// Read side of the listings API as seen by the cache gateway.
/// Lets the gateway run against the real HTTP client or an in-memory double.
#[async_trait]
pub trait ListingsSource: Send + Sync {
    /// Fetch the public listings for `selector` from `endpoint`
    async fn fetch_listings(
        &self,
        endpoint: &Url,
        selector: ListingSelector,
    ) -> Result<Vec<Listing>, ApiError>;

    /// Name used in logs
    fn source_name(&self) -> &'static str;
}
