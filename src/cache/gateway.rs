use crate::api::{ApiError, ListingsSource};
use crate::cache::entry::CacheEntry;
use crate::cache::storage::LocalStorage;
use crate::models::{Category, Listing, ListingSelector};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings for one gateway instance
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint: Url,
    pub cache_key: String,
    pub ttl: Duration,
    pub category: ListingSelector,
    pub timeout: Duration,
}

/// Where the listings in a [`GatewayOutcome`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// Unexpired cache entry, no request made
    Cache,
    /// Fresh network fetch, now cached
    Network,
    /// Fetch failed; an expired entry was served instead
    StaleFallback,
    /// Fetch failed and nothing was cached
    Unavailable,
}

#[derive(Debug)]
pub struct GatewayOutcome {
    pub listings: Vec<Listing>,
    pub served: Served,
    pub error: Option<ApiError>,
}

impl GatewayOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self.served, Served::StaleFallback | Served::Unavailable)
    }

    /// Listings of one category, in served order
    pub fn of(&self, category: Category) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|listing| listing.category() == category)
            .collect()
    }
}

/// Serves one selector's listings from local storage while fresh, from the
/// network otherwise, and from stale storage when the network fails.
pub struct ListingsGateway {
    config: GatewayConfig,
    source: Arc<dyn ListingsSource>,
    storage: LocalStorage,
    clock: Arc<dyn Clock>,
}

impl ListingsGateway {
    pub fn new(
        config: GatewayConfig,
        source: Arc<dyn ListingsSource>,
        storage: LocalStorage,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            source,
            storage,
            clock,
        }
    }

    /// Current cache entry, fresh or not
    pub fn cached(&self) -> Option<CacheEntry> {
        self.storage.get_json(&self.config.cache_key)
    }

    pub async fn get_listings(&self) -> GatewayOutcome {
        let selector = self.config.category;
        let cached = self.cached();

        if let Some(entry) = &cached {
            if entry.is_fresh(self.now_millis(), self.config.ttl) {
                debug!("Serving {} listings from cache", selector);
                return GatewayOutcome {
                    listings: entry.data.clone(),
                    served: Served::Cache,
                    error: None,
                };
            }
            debug!("Cached {} listings are stale", selector);
        }

        match self.fetch().await {
            Ok(listings) => {
                let entry = CacheEntry::new(listings, self.now_millis());
                if let Err(e) = self.storage.set_json(&self.config.cache_key, &entry) {
                    warn!("Could not cache {} listings: {}", selector, e);
                }
                GatewayOutcome {
                    listings: entry.data,
                    served: Served::Network,
                    error: None,
                }
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!("Using expired {} cache after fetch error: {}", selector, e);
                    GatewayOutcome {
                        listings: entry.data,
                        served: Served::StaleFallback,
                        error: Some(e),
                    }
                }
                None => {
                    warn!("No {} listings available: {}", selector, e);
                    GatewayOutcome {
                        listings: Vec::new(),
                        served: Served::Unavailable,
                        error: Some(e),
                    }
                }
            },
        }
    }

    /// Drop the cache entry so the next read goes to the network
    pub fn invalidate(&self) {
        debug!("Invalidating {} cache", self.config.category);
        if let Err(e) = self.storage.remove_item(&self.config.cache_key) {
            warn!("Could not clear {} cache: {}", self.config.category, e);
        }
    }

    async fn fetch(&self) -> Result<Vec<Listing>, ApiError> {
        info!(
            "Fetching {} listings from {}",
            self.config.category,
            self.source.source_name()
        );
        let request = self
            .source
            .fetch_listings(&self.config.endpoint, self.config.category);
        match tokio::time::timeout(self.config.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.config.timeout.as_secs())),
        }
    }

    fn now_millis(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }
}

/// Settings shared by every gateway of a [`GatewaySet`]
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub endpoint: Url,
    pub cache_prefix: String,
    pub ttl: Duration,
    pub timeout: Duration,
}

impl GatewaySettings {
    pub fn config_for(&self, selector: ListingSelector) -> GatewayConfig {
        GatewayConfig {
            endpoint: self.endpoint.clone(),
            cache_key: format!("{}_{}", self.cache_prefix, selector),
            ttl: self.ttl,
            category: selector,
            timeout: self.timeout,
        }
    }
}

/// One gateway per selector, sharing a source, storage and clock
pub struct GatewaySet {
    houses: ListingsGateway,
    land: ListingsGateway,
    all: ListingsGateway,
}

impl GatewaySet {
    pub fn new(
        settings: &GatewaySettings,
        source: Arc<dyn ListingsSource>,
        storage: LocalStorage,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let build = |selector| {
            ListingsGateway::new(
                settings.config_for(selector),
                Arc::clone(&source),
                storage.clone(),
                Arc::clone(&clock),
            )
        };

        Self {
            houses: build(ListingSelector::Houses),
            land: build(ListingSelector::Land),
            all: build(ListingSelector::All),
        }
    }

    pub fn gateway(&self, selector: ListingSelector) -> &ListingsGateway {
        match selector {
            ListingSelector::Houses => &self.houses,
            ListingSelector::Land => &self.land,
            ListingSelector::All => &self.all,
        }
    }

    pub async fn get_listings(&self, selector: ListingSelector) -> GatewayOutcome {
        self.gateway(selector).get_listings().await
    }

    /// Drop cached data for `selector`. A single category also drops the
    /// combined entry, which holds a copy of it; `all` drops everything.
    pub fn invalidate(&self, selector: ListingSelector) {
        match selector {
            ListingSelector::All => ListingSelector::ALL
                .iter()
                .for_each(|s| self.gateway(*s).invalidate()),
            single => {
                self.gateway(single).invalidate();
                self.all.invalidate();
            }
        }
    }

    /// Invalidation after a mutation of a listing in `category`
    pub fn invalidate_category(&self, category: Category) {
        self.invalidate(category.selector());
    }
}
