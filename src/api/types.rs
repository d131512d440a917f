use crate::api::error::ApiError;
use crate::models::{Category, Listing, ListingDetails};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const PLOT_SIZE_KEYS: [&str; 4] = ["plotSize", "plotsize", "plot size", "plot_size"];
const FLOOR_AREA_KEYS: [&str; 2] = ["sqft", "floorArea"];

pub fn is_success(status: &str) -> bool {
    status.eq_ignore_ascii_case("success")
}

/// Response to `action=getPublicListings`
#[derive(Debug, Deserialize)]
pub struct PublicListingsResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub houses: Option<Vec<RawListing>>,
    #[serde(default)]
    pub land: Option<Vec<RawListing>>,
}

/// Response to the admin `action=getListings`
#[derive(Debug, Deserialize)]
pub struct AdminListingsResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub listings: Option<Vec<RawListing>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Response to add/update/delete/toggle
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One spreadsheet row exactly as the API sent it.
///
/// Rows are kept as a loose JSON object because the sheet's column names and
/// value types drift between deployments (`"Yes"` vs `true`, numeric strings,
/// several spellings of the plot size column). [`RawListing::into_listing`]
/// is the only place that interprets them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawListing(pub Map<String, Value>);

impl RawListing {
    fn field(&self, names: &[&str]) -> Option<&Value> {
        names
            .iter()
            .filter_map(|name| self.0.get(*name))
            .find(|value| !value.is_null())
    }

    fn text(&self, names: &[&str]) -> Option<String> {
        self.field(names).and_then(text_value)
    }

    fn number(&self, names: &[&str]) -> Option<f64> {
        self.field(names).and_then(number_value)
    }

    fn flag(&self, name: &str) -> Option<bool> {
        self.field(&[name]).and_then(bool_value)
    }

    /// Category declared by the row itself (`type` column), if any
    pub fn declared_category(&self) -> Option<Category> {
        self.text(&["type"]).and_then(|t| t.parse().ok())
    }

    /// Normalize into a [`Listing`].
    ///
    /// `fallback` is used when the row carries no `type`, which is the case for
    /// the public endpoint where the enclosing array decides the category.
    pub fn into_listing(self, fallback: Option<Category>) -> Result<Listing, ApiError> {
        let id = self
            .text(&["id"])
            .ok_or_else(|| ApiError::Decode("listing row without id".to_string()))?;
        let category = self
            .declared_category()
            .or(fallback)
            .ok_or_else(|| ApiError::Decode(format!("listing {id} has no category")))?;

        let details = match category {
            Category::House => ListingDetails::House {
                bedrooms: self.number(&["bedrooms"]).map(to_count).unwrap_or(0),
                bathrooms: self.number(&["bathrooms"]).map(to_count).unwrap_or(0),
                floor_area: self.number(&FLOOR_AREA_KEYS),
                images: self.field(&["images"]).map(image_list).unwrap_or_default(),
            },
            Category::Land => ListingDetails::Land {
                plot_size: self.text(&PLOT_SIZE_KEYS),
                area: self.number(&["area"]),
                image: self.text(&["image"]),
            },
        };

        Ok(Listing {
            title: self.text(&["title"]).unwrap_or_default(),
            location: self.text(&["location"]).unwrap_or_default(),
            price: self.number(&["price"]).unwrap_or(0.0),
            description: self.text(&["description"]),
            visible: self.flag("visible").unwrap_or(true),
            featured: self.flag("featured").unwrap_or(false),
            id,
            details,
        })
    }
}

fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

fn bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Images are stored one URL per line in the sheet; some deployments send an array
fn image_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => split_lines(s),
        Value::Array(items) => items.iter().filter_map(text_value).collect(),
        _ => Vec::new(),
    }
}

pub fn split_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_count(n: f64) -> u32 {
    if n.is_finite() && n > 0.0 {
        n.round() as u32
    } else {
        0
    }
}

/// Category-specific fields of a listing being created or edited
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum DraftDetails {
    #[serde(rename_all = "camelCase")]
    House {
        bedrooms: u32,
        bathrooms: u32,
        #[serde(default)]
        sqft: Option<f64>,
        #[serde(default)]
        images: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Land {
        #[serde(default)]
        plot_size: String,
        #[serde(default)]
        area: Option<f64>,
        #[serde(default)]
        image: String,
    },
}

/// Admin input for `addListing` / `updateListing`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    pub location: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(flatten)]
    pub details: DraftDetails,
}

impl ListingDraft {
    pub fn category(&self) -> Category {
        match self.details {
            DraftDetails::House { .. } => Category::House,
            DraftDetails::Land { .. } => Category::Land,
        }
    }

    /// Pre-populate an edit from the listing as currently stored
    pub fn from_listing(listing: &Listing) -> Self {
        let details = match &listing.details {
            ListingDetails::House {
                bedrooms,
                bathrooms,
                floor_area,
                images,
            } => DraftDetails::House {
                bedrooms: *bedrooms,
                bathrooms: *bathrooms,
                sqft: *floor_area,
                images: images.clone(),
            },
            ListingDetails::Land {
                plot_size,
                area,
                image,
            } => DraftDetails::Land {
                plot_size: plot_size.clone().unwrap_or_default(),
                area: *area,
                image: image.clone().unwrap_or_default(),
            },
        };

        Self {
            title: listing.title.clone(),
            location: listing.location.clone(),
            price: listing.price,
            description: listing.description.clone(),
            featured: listing.featured,
            details,
        }
    }

    /// Reject drafts the sheet would store half-filled
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::validation("title is required"));
        }
        if self.location.trim().is_empty() {
            return Err(ApiError::validation("location is required"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ApiError::validation("price must be a positive number"));
        }
        match &self.details {
            DraftDetails::House { images, .. } => {
                if images.iter().all(|url| url.trim().is_empty()) {
                    return Err(ApiError::validation("at least one image is required"));
                }
            }
            DraftDetails::Land {
                plot_size, image, ..
            } => {
                if plot_size.trim().is_empty() {
                    return Err(ApiError::validation("plot size is required"));
                }
                if image.trim().is_empty() {
                    return Err(ApiError::validation("an image is required"));
                }
            }
        }
        Ok(())
    }

    /// JSON object sent as the `listingData` form field
    pub fn to_payload(&self) -> Value {
        let description = self.description.clone().unwrap_or_default();
        match &self.details {
            DraftDetails::House {
                bedrooms,
                bathrooms,
                sqft,
                images,
            } => json!({
                "title": self.title.trim(),
                "location": self.location.trim(),
                "price": self.price,
                "bedrooms": bedrooms,
                "bathrooms": bathrooms,
                "sqft": optional_number(*sqft),
                "description": description,
                "images": images.join("\n"),
                "featured": self.featured,
            }),
            DraftDetails::Land {
                plot_size,
                area,
                image,
            } => json!({
                "title": self.title.trim(),
                "location": self.location.trim(),
                "price": self.price,
                "plotSize": plot_size.trim(),
                "area": optional_number(*area),
                "description": description,
                "image": image.trim(),
                "featured": self.featured,
            }),
        }
    }
}

/// Sheet cells for missing numbers are blank strings, not nulls
fn optional_number(n: Option<f64>) -> Value {
    n.map(Value::from).unwrap_or_else(|| Value::String(String::new()))
}

/// Partial edit: only the fields present are replaced
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub title: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub featured: Option<bool>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub sqft: Option<f64>,
    pub images: Option<Vec<String>>,
    pub plot_size: Option<String>,
    pub area: Option<f64>,
    pub image: Option<String>,
}

impl ListingPatch {
    fn has_house_fields(&self) -> bool {
        self.bedrooms.is_some()
            || self.bathrooms.is_some()
            || self.sqft.is_some()
            || self.images.is_some()
    }

    fn has_land_fields(&self) -> bool {
        self.plot_size.is_some() || self.area.is_some() || self.image.is_some()
    }

    /// Apply onto `draft`. A patch carrying fields of the other category is
    /// rejected before anything is changed.
    pub fn apply(self, draft: &mut ListingDraft) -> Result<(), ApiError> {
        match draft.category() {
            Category::House if self.has_land_fields() => {
                return Err(ApiError::validation("land fields cannot be set on a house"));
            }
            Category::Land if self.has_house_fields() => {
                return Err(ApiError::validation("house fields cannot be set on land"));
            }
            _ => {}
        }

        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
        if let Some(featured) = self.featured {
            draft.featured = featured;
        }

        match &mut draft.details {
            DraftDetails::House {
                bedrooms,
                bathrooms,
                sqft,
                images,
            } => {
                if let Some(v) = self.bedrooms {
                    *bedrooms = v;
                }
                if let Some(v) = self.bathrooms {
                    *bathrooms = v;
                }
                if let Some(v) = self.sqft {
                    *sqft = Some(v);
                }
                if let Some(v) = self.images {
                    *images = v;
                }
            }
            DraftDetails::Land {
                plot_size,
                area,
                image,
            } => {
                if let Some(v) = self.plot_size {
                    *plot_size = v;
                }
                if let Some(v) = self.area {
                    *area = Some(v);
                }
                if let Some(v) = self.image {
                    *image = v;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: Value) -> RawListing {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn house_row_normalizes_sheet_values() {
        let listing = raw(json!({
            "id": 17,
            "title": " Villa ",
            "location": "East Legon",
            "price": "1,250,000",
            "bedrooms": "4",
            "bathrooms": 3,
            "sqft": "",
            "images": "https://img/a.jpg\n\n https://img/b.jpg \n",
            "featured": "Yes",
            "visible": "No"
        }))
        .into_listing(Some(Category::House))
        .unwrap();

        assert_eq!(listing.id, "17");
        assert_eq!(listing.title, "Villa");
        assert_eq!(listing.price, 1_250_000.0);
        assert!(listing.featured);
        assert!(!listing.visible);
        assert_eq!(
            listing.details,
            ListingDetails::House {
                bedrooms: 4,
                bathrooms: 3,
                floor_area: None,
                images: vec!["https://img/a.jpg".to_string(), "https://img/b.jpg".to_string()],
            }
        );
    }

    #[test]
    fn land_row_accepts_legacy_plot_size_spellings() {
        for key in ["plotsize", "plotSize", "plot size"] {
            let mut row = Map::new();
            row.insert("id".to_string(), json!("L1"));
            row.insert(key.to_string(), json!("100 x 70"));
            let listing = RawListing(row).into_listing(Some(Category::Land)).unwrap();
            match listing.details {
                ListingDetails::Land { plot_size, .. } => {
                    assert_eq!(plot_size.as_deref(), Some("100 x 70"), "key {key}")
                }
                other => panic!("unexpected details {other:?}"),
            }
        }
    }

    #[test]
    fn declared_type_wins_over_fallback_and_missing_flags_default() {
        let listing = raw(json!({ "id": "L9", "type": "land", "featured": true }))
            .into_listing(Some(Category::House))
            .unwrap();
        assert_eq!(listing.category(), Category::Land);
        assert!(listing.featured);
        assert!(listing.visible);
    }

    #[test]
    fn row_without_id_is_rejected() {
        let err = raw(json!({ "title": "No id" }))
            .into_listing(Some(Category::House))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn draft_payload_matches_sheet_columns() {
        let draft: ListingDraft = serde_json::from_value(json!({
            "category": "house",
            "title": "Villa",
            "location": "Tema",
            "price": 300000.0,
            "bedrooms": 3,
            "bathrooms": 2,
            "images": ["https://img/1.jpg", "https://img/2.jpg"],
            "featured": true
        }))
        .unwrap();

        let payload = draft.to_payload();
        assert_eq!(payload["images"], "https://img/1.jpg\nhttps://img/2.jpg");
        assert_eq!(payload["sqft"], "");
        assert_eq!(payload["featured"], true);
        assert_eq!(draft.category(), Category::House);
    }

    #[test]
    fn land_draft_without_image_fails_validation() {
        let draft = ListingDraft {
            title: "Plot".to_string(),
            location: "Aburi".to_string(),
            price: 40_000.0,
            description: None,
            featured: false,
            details: DraftDetails::Land {
                plot_size: "50x100".to_string(),
                area: None,
                image: " ".to_string(),
            },
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid input: an image is required");
    }

    #[test]
    fn patch_replaces_only_given_fields() {
        let listing = raw(json!({
            "id": "H1", "title": "Villa", "location": "Tema", "price": 10,
            "bedrooms": 2, "bathrooms": 1, "images": "https://img/1.jpg"
        }))
        .into_listing(Some(Category::House))
        .unwrap();
        let mut draft = ListingDraft::from_listing(&listing);

        ListingPatch {
            price: Some(12.5),
            bedrooms: Some(3),
            ..Default::default()
        }
        .apply(&mut draft)
        .unwrap();

        assert_eq!(draft.title, "Villa");
        assert_eq!(draft.price, 12.5);
        assert!(matches!(draft.details, DraftDetails::House { bedrooms: 3, .. }));

        let err = ListingPatch {
            plot_size: Some("1 acre".to_string()),
            ..Default::default()
        }
        .apply(&mut draft)
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn cross_category_patch_leaves_draft_untouched() {
        let listing = raw(json!({
            "id": "L1", "title": "Plot", "location": "Oyibi", "price": 60000,
            "plotSize": "70x100", "image": "https://img/plot.jpg"
        }))
        .into_listing(Some(Category::Land))
        .unwrap();
        let mut draft = ListingDraft::from_listing(&listing);
        let before = draft.clone();

        let err = ListingPatch {
            title: Some("Renamed".to_string()),
            price: Some(1.0),
            bedrooms: Some(4),
            ..Default::default()
        }
        .apply(&mut draft)
        .unwrap_err();

        assert_eq!(err.to_string(), "invalid input: house fields cannot be set on land");
        assert_eq!(draft, before);
    }
}
