use crate::api::error::ApiError;
use crate::api::traits::ListingsSource;
use crate::api::types::{
    is_success, AdminListingsResponse, ListingDraft, LoginResponse, MutationResponse,
    PublicListingsResponse, RawListing, UploadResponse,
};
use crate::models::{Category, Listing, ListingSelector};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("listings-desk/", env!("CARGO_PKG_VERSION"));

/// Token and display name returned by a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub username: String,
    pub token: String,
}

/// Image file ready to be sent with `action=uploadImage`
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: mime::Mime,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Load an image from disk; anything that is not a known image type is refused
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::validation("no image selected"))?
            .to_string();
        let mime_type = image_mime(path)
            .ok_or_else(|| ApiError::validation(format!("{file_name} is not an image")))?;
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(ApiError::validation(format!("{file_name} is empty")));
        }
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}

fn image_mime(path: &Path) -> Option<mime::Mime> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(mime::IMAGE_JPEG),
        "png" => Some(mime::IMAGE_PNG),
        "gif" => Some(mime::IMAGE_GIF),
        "webp" => "image/webp".parse().ok(),
        _ => None,
    }
}

/// HTTP client for the spreadsheet-backed listings API
pub struct ApiClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client bound to one deployment of the API
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Public read path: `GET ?action=getPublicListings&type=..&t=..`
    pub async fn get_public_listings(
        &self,
        endpoint: &Url,
        selector: ListingSelector,
    ) -> Result<Vec<Listing>, ApiError> {
        let url = public_listings_url(endpoint, selector, Utc::now().timestamp_millis());
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let body: PublicListingsResponse = self.decode(response).await?;
        let listings = public_listings(body, selector)?;
        info!("Fetched {} {} listings", listings.len(), selector);
        Ok(listings)
    }

    /// Admin read path: every listing of one category, hidden ones included
    pub async fn get_listings(&self, category: Category) -> Result<Vec<Listing>, ApiError> {
        let form = Form::new()
            .text("action", "getListings")
            .text("type", category.selector().as_str());
        let body: AdminListingsResponse = self.post(form).await?;
        admin_listings(body, category)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::validation(
                "Please enter both username and password",
            ));
        }

        let form = Form::new()
            .text("action", "login")
            .text("username", username.to_string())
            .text("password", password.to_string());
        let body: LoginResponse = self.post(form).await?;
        if !is_success(&body.status) {
            return Err(ApiError::remote(body.message, "Login failed. Please try again."));
        }

        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response without token".to_string()))?;
        Ok(LoginGrant {
            username: body.username.unwrap_or_else(|| username.to_string()),
            token,
        })
    }

    pub async fn add_listing(&self, token: &str, draft: &ListingDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let form = Form::new()
            .text("action", "addListing")
            .text("token", token.to_string())
            .text("listingType", draft.category().as_str())
            .text("listingData", draft.to_payload().to_string());
        self.mutate(form, "Failed to add listing").await
    }

    pub async fn update_listing(
        &self,
        token: &str,
        id: &str,
        draft: &ListingDraft,
    ) -> Result<(), ApiError> {
        require_id(id)?;
        draft.validate()?;
        let form = Form::new()
            .text("action", "updateListing")
            .text("token", token.to_string())
            .text("listingType", draft.category().as_str())
            .text("listingId", id.to_string())
            .text("listingData", draft.to_payload().to_string());
        self.mutate(form, "Failed to update listing").await
    }

    pub async fn delete_listing(
        &self,
        token: &str,
        category: Category,
        id: &str,
    ) -> Result<(), ApiError> {
        require_id(id)?;
        let form = Form::new()
            .text("action", "deleteListing")
            .text("token", token.to_string())
            .text("listingType", category.as_str())
            .text("listingId", id.to_string());
        self.mutate(form, "Failed to delete listing").await
    }

    pub async fn toggle_visibility(
        &self,
        token: &str,
        category: Category,
        id: &str,
    ) -> Result<(), ApiError> {
        require_id(id)?;
        let form = Form::new()
            .text("action", "toggleVisibility")
            .text("token", token.to_string())
            .text("listingType", category.as_str())
            .text("listingId", id.to_string());
        self.mutate(form, "Failed to toggle visibility").await
    }

    /// Upload an image and return the URL the API stored it under
    pub async fn upload_image(&self, token: &str, image: ImageUpload) -> Result<String, ApiError> {
        let form = Form::new()
            .text("action", "uploadImage")
            .text("token", token.to_string())
            .text("fileName", image.file_name)
            .text("mimeType", image.mime_type.to_string())
            .text("fileData", BASE64.encode(&image.bytes));
        let body: UploadResponse = self.post(form).await?;
        if !is_success(&body.status) {
            return Err(ApiError::remote(body.message, "Failed to upload image"));
        }
        body.url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::Decode("upload response without url".to_string()))
    }

    async fn mutate(&self, form: Form, fallback: &str) -> Result<(), ApiError> {
        let body: MutationResponse = self.post(form).await?;
        if is_success(&body.status) {
            Ok(())
        } else {
            Err(ApiError::remote(body.message, fallback))
        }
    }

    /// Multipart POST, which the hosted script accepts without a CORS preflight
    async fn post<T: DeserializeOwned>(&self, form: Form) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            warn!("Listings API returned status: {}", status);
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.map_transport(e))?;
        debug!("Downloaded {} bytes of JSON", body.len());
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn map_transport(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout.as_secs())
        } else {
            ApiError::Transport(error)
        }
    }
}

#[async_trait]
impl ListingsSource for ApiClient {
    async fn fetch_listings(
        &self,
        endpoint: &Url,
        selector: ListingSelector,
    ) -> Result<Vec<Listing>, ApiError> {
        self.get_public_listings(endpoint, selector).await
    }

    fn source_name(&self) -> &'static str {
        "listings API"
    }
}

fn public_listings_url(endpoint: &Url, selector: ListingSelector, now_millis: i64) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("action", "getPublicListings")
        .append_pair("type", selector.as_str())
        .append_pair("t", &now_millis.to_string());
    url
}

/// Listings of a public read, both arrays merged and narrowed to `selector`
fn public_listings(
    body: PublicListingsResponse,
    selector: ListingSelector,
) -> Result<Vec<Listing>, ApiError> {
    if !is_success(&body.status) {
        warn!("Listings API reported failure for {}: {:?}", selector, body.message);
        return Err(ApiError::remote(body.message, "Failed to load listings"));
    }

    let mut listings = normalize_rows(body.houses.unwrap_or_default(), Category::House);
    listings.extend(normalize_rows(body.land.unwrap_or_default(), Category::Land));
    listings.retain(|listing| selector.covers(listing.category()));
    Ok(listings)
}

/// Admin rows of `category`; rows declaring another type are dropped
fn admin_listings(
    body: AdminListingsResponse,
    category: Category,
) -> Result<Vec<Listing>, ApiError> {
    if !is_success(&body.status) {
        return Err(ApiError::remote(body.message, "Failed to load listings"));
    }

    let rows = body
        .listings
        .unwrap_or_default()
        .into_iter()
        .filter(|row| row.declared_category() == Some(category))
        .collect();
    Ok(normalize_rows(rows, category))
}

fn normalize_rows(rows: Vec<RawListing>, category: Category) -> Vec<Listing> {
    rows.into_iter()
        .filter_map(|row| match row.into_listing(Some(category)) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Skipping {} row: {}", category, e);
                None
            }
        })
        .collect()
}

fn require_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        Err(ApiError::validation("listing id is required"))
    } else {
        Ok(())
    }
}
