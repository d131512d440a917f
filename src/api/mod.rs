pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::{ApiClient, ImageUpload, LoginGrant};
pub use error::ApiError;
pub use traits::ListingsSource;
pub use types::{ListingDraft, ListingPatch};
