use crate::api::{ApiClient, ApiError, ImageUpload, ListingDraft, ListingPatch, LoginGrant};
use crate::cache::GatewaySet;
use crate::models::{Category, Listing, Session};
use crate::session::SessionStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Write side of the listings API, as used by [`AdminService`]
#[async_trait]
pub trait ListingsAdmin: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError>;
    async fn list(&self, category: Category) -> Result<Vec<Listing>, ApiError>;
    async fn add(&self, token: &str, draft: &ListingDraft) -> Result<(), ApiError>;
    async fn update(&self, token: &str, id: &str, draft: &ListingDraft) -> Result<(), ApiError>;
    async fn delete(&self, token: &str, category: Category, id: &str) -> Result<(), ApiError>;
    async fn toggle_visibility(
        &self,
        token: &str,
        category: Category,
        id: &str,
    ) -> Result<(), ApiError>;
    async fn upload_image(&self, token: &str, image: ImageUpload) -> Result<String, ApiError>;
}

#[async_trait]
impl ListingsAdmin for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        ApiClient::login(self, username, password).await
    }

    async fn list(&self, category: Category) -> Result<Vec<Listing>, ApiError> {
        self.get_listings(category).await
    }

    async fn add(&self, token: &str, draft: &ListingDraft) -> Result<(), ApiError> {
        self.add_listing(token, draft).await
    }

    async fn update(&self, token: &str, id: &str, draft: &ListingDraft) -> Result<(), ApiError> {
        self.update_listing(token, id, draft).await
    }

    async fn delete(&self, token: &str, category: Category, id: &str) -> Result<(), ApiError> {
        self.delete_listing(token, category, id).await
    }

    async fn toggle_visibility(
        &self,
        token: &str,
        category: Category,
        id: &str,
    ) -> Result<(), ApiError> {
        ApiClient::toggle_visibility(self, token, category, id).await
    }

    async fn upload_image(&self, token: &str, image: ImageUpload) -> Result<String, ApiError> {
        ApiClient::upload_image(self, token, image).await
    }
}

/// Admin operations: session handling plus mutations that keep the public
/// cache honest by invalidating the touched category afterwards.
pub struct AdminService {
    api: Arc<dyn ListingsAdmin>,
    sessions: SessionStore,
    gateways: Arc<GatewaySet>,
}

impl AdminService {
    pub fn new(
        api: Arc<dyn ListingsAdmin>,
        sessions: SessionStore,
        gateways: Arc<GatewaySet>,
    ) -> Self {
        Self {
            api,
            sessions,
            gateways,
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.sessions.load()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let grant = self.api.login(username, password).await?;
        Ok(self.sessions.save(grant)?)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.sessions.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Live listings of one category, hidden ones included
    pub async fn list(&self, category: Category) -> Result<Vec<Listing>, ApiError> {
        self.require_session()?;
        self.api.list(category).await
    }

    pub async fn find(&self, category: Category, id: &str) -> Result<Listing, ApiError> {
        self.list(category)
            .await?
            .into_iter()
            .find(|listing| listing.id == id)
            .ok_or_else(|| ApiError::validation(format!("Listing {id} not found")))
    }

    pub async fn add(&self, draft: &ListingDraft) -> Result<(), ApiError> {
        let session = self.require_session()?;
        draft.validate()?;
        self.api.add(&session.token, draft).await?;
        info!("{} listing added", draft.category());
        self.gateways.invalidate_category(draft.category());
        Ok(())
    }

    /// Full replacement of an existing listing's fields
    pub async fn replace(&self, id: &str, draft: &ListingDraft) -> Result<(), ApiError> {
        let session = self.require_session()?;
        draft.validate()?;
        self.api.update(&session.token, id, draft).await?;
        info!("{} listing {} updated", draft.category(), id);
        self.gateways.invalidate_category(draft.category());
        Ok(())
    }

    /// Partial edit: current values are read back and only patched fields change
    pub async fn edit(
        &self,
        category: Category,
        id: &str,
        patch: ListingPatch,
    ) -> Result<(), ApiError> {
        let current = self.find(category, id).await?;
        let mut draft = ListingDraft::from_listing(&current);
        patch.apply(&mut draft)?;
        self.replace(id, &draft).await
    }

    pub async fn delete(&self, category: Category, id: &str) -> Result<(), ApiError> {
        let session = self.require_session()?;
        self.api.delete(&session.token, category, id).await?;
        info!("{} listing {} deleted", category, id);
        self.gateways.invalidate_category(category);
        Ok(())
    }

    pub async fn toggle_visibility(&self, category: Category, id: &str) -> Result<(), ApiError> {
        let session = self.require_session()?;
        self.api.toggle_visibility(&session.token, category, id).await?;
        info!("{} listing {} visibility toggled", category, id);
        self.gateways.invalidate_category(category);
        Ok(())
    }

    pub async fn upload_image(&self, image: ImageUpload) -> Result<String, ApiError> {
        let session = self.require_session()?;
        self.api.upload_image(&session.token, image).await
    }

    fn require_session(&self) -> Result<Session, ApiError> {
        self.sessions
            .load()
            .ok_or_else(|| ApiError::validation("not logged in"))
    }
}
