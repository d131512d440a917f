pub mod entry;
pub mod gateway;
pub mod storage;

pub use entry::CacheEntry;
pub use gateway::{
    GatewayConfig, GatewayOutcome, GatewaySet, GatewaySettings, ListingsGateway, Served,
    DEFAULT_TIMEOUT, DEFAULT_TTL,
};
pub use storage::LocalStorage;
