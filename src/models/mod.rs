use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of property a listing describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    House,
    Land,
}

impl Category {
    /// Value sent as `listingType` on admin mutations
    pub fn as_str(self) -> &'static str {
        match self {
            Category::House => "house",
            Category::Land => "land",
        }
    }

    /// The selector that reads back this category alone
    pub fn selector(self) -> ListingSelector {
        match self {
            Category::House => ListingSelector::Houses,
            Category::Land => ListingSelector::Land,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "house" | "houses" => Ok(Category::House),
            "land" => Ok(Category::Land),
            other => Err(format!("unknown listing category: {other}")),
        }
    }
}

/// Which slice of the public listings to read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListingSelector {
    Houses,
    Land,
    All,
}

impl ListingSelector {
    pub const ALL: [ListingSelector; 3] = [
        ListingSelector::Houses,
        ListingSelector::Land,
        ListingSelector::All,
    ];

    /// Value of the `type` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            ListingSelector::Houses => "houses",
            ListingSelector::Land => "land",
            ListingSelector::All => "all",
        }
    }

    pub fn covers(self, category: Category) -> bool {
        match self {
            ListingSelector::Houses => category == Category::House,
            ListingSelector::Land => category == Category::Land,
            ListingSelector::All => true,
        }
    }
}

impl fmt::Display for ListingSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "houses" | "house" => Ok(ListingSelector::Houses),
            "land" => Ok(ListingSelector::Land),
            "all" => Ok(ListingSelector::All),
            other => Err(format!("unknown listing selector: {other}")),
        }
    }
}

/// Category-specific part of a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ListingDetails {
    #[serde(rename_all = "camelCase")]
    House {
        bedrooms: u32,
        bathrooms: u32,
        floor_area: Option<f64>,
        images: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Land {
        plot_size: Option<String>,
        area: Option<f64>,
        image: Option<String>,
    },
}

/// Normalized property listing, as cached and rendered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub location: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(flatten)]
    pub details: ListingDetails,
}

fn default_visible() -> bool {
    true
}

impl Listing {
    pub fn category(&self) -> Category {
        match self.details {
            ListingDetails::House { .. } => Category::House,
            ListingDetails::Land { .. } => Category::Land,
        }
    }

    /// All images in display order; land plots carry at most one
    pub fn images(&self) -> Vec<&str> {
        match &self.details {
            ListingDetails::House { images, .. } => images.iter().map(String::as_str).collect(),
            ListingDetails::Land { image, .. } => image.iter().map(String::as_str).collect(),
        }
    }
}

/// Logged-in admin credentials, persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub token: String,
    pub login_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn land() -> Listing {
        Listing {
            id: "L1".to_string(),
            title: "Plot at Oyibi".to_string(),
            location: "Oyibi".to_string(),
            price: 85_000.0,
            description: None,
            visible: true,
            featured: false,
            details: ListingDetails::Land {
                plot_size: Some("100x70".to_string()),
                area: Some(7000.0),
                image: Some("https://img/land.jpg".to_string()),
            },
        }
    }

    #[test]
    fn listing_serializes_with_category_tag_and_camel_case() {
        let value = serde_json::to_value(land()).unwrap();
        assert_eq!(value["category"], "land");
        assert_eq!(value["plotSize"], "100x70");
        assert_eq!(value["visible"], true);
    }

    #[test]
    fn cached_listing_defaults_visibility_flags() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "H1",
            "title": "Villa",
            "location": "East Legon",
            "price": 250000.0,
            "category": "house",
            "bedrooms": 4,
            "bathrooms": 3,
            "floorArea": null,
            "images": []
        }))
        .unwrap();

        assert!(listing.visible);
        assert!(!listing.featured);
        assert_eq!(listing.category(), Category::House);
    }

    #[test]
    fn selectors_parse_and_cover_categories() {
        assert_eq!("Houses".parse::<ListingSelector>(), Ok(ListingSelector::Houses));
        assert!("plots".parse::<ListingSelector>().is_err());
        assert!(ListingSelector::All.covers(Category::Land));
        assert!(!ListingSelector::Houses.covers(Category::Land));
        assert_eq!(Category::Land.selector(), ListingSelector::Land);
    }

    #[test]
    fn land_images_expose_single_image() {
        assert_eq!(land().images(), vec!["https://img/land.jpg"]);
    }
}
