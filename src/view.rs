use crate::cache::{GatewayOutcome, GatewaySet, Served};
use crate::models::{Category, Listing, ListingSelector};
use tokio::sync::watch;
use tracing::debug;

/// What a category section should currently show
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading,
    Loaded {
        listings: Vec<Listing>,
        /// Served from an expired cache because the fetch failed
        degraded: bool,
    },
    Failed {
        message: String,
    },
}

impl ViewState {
    /// The slice of `outcome` belonging to `category`
    pub fn from_outcome(outcome: &GatewayOutcome, category: Category) -> Self {
        match outcome.served {
            Served::Unavailable => ViewState::Failed {
                message: outcome
                    .error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "listings unavailable".to_string()),
            },
            served => ViewState::Loaded {
                listings: outcome.of(category).into_iter().cloned().collect(),
                degraded: served == Served::StaleFallback,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Loaded { degraded: false, .. } => "loaded",
            ViewState::Loaded { degraded: true, .. } => "loaded (stale)",
            ViewState::Failed { .. } => "failed",
        }
    }

    pub fn listings(&self) -> &[Listing] {
        match self {
            ViewState::Loaded { listings, .. } => listings,
            _ => &[],
        }
    }
}

/// Per-category view state that renderers can subscribe to
pub struct ListingsView {
    houses: watch::Sender<ViewState>,
    land: watch::Sender<ViewState>,
}

impl Default for ListingsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingsView {
    pub fn new() -> Self {
        let (houses, _) = watch::channel(ViewState::Idle);
        let (land, _) = watch::channel(ViewState::Idle);
        Self { houses, land }
    }

    fn sender(&self, category: Category) -> &watch::Sender<ViewState> {
        match category {
            Category::House => &self.houses,
            Category::Land => &self.land,
        }
    }

    pub fn subscribe(&self, category: Category) -> watch::Receiver<ViewState> {
        self.sender(category).subscribe()
    }

    pub fn state(&self, category: Category) -> ViewState {
        self.sender(category).borrow().clone()
    }

    fn set(&self, category: Category, state: ViewState) {
        debug!("{} view -> {}", category, state.label());
        self.sender(category).send_replace(state);
    }

    /// Load one category through its own gateway
    pub async fn load_category(&self, gateways: &GatewaySet, category: Category) {
        self.set(category, ViewState::Loading);
        let outcome = gateways.get_listings(category.selector()).await;
        self.set(category, ViewState::from_outcome(&outcome, category));
    }

    /// Load both categories concurrently; each section updates as soon as
    /// its own request completes, in whatever order they finish
    pub async fn load_each(&self, gateways: &GatewaySet) {
        tokio::join!(
            self.load_category(gateways, Category::House),
            self.load_category(gateways, Category::Land)
        );
    }

    /// Load both categories with a single `type=all` read
    pub async fn load_combined(&self, gateways: &GatewaySet) {
        self.set(Category::House, ViewState::Loading);
        self.set(Category::Land, ViewState::Loading);
        let outcome = gateways.get_listings(ListingSelector::All).await;
        for category in [Category::House, Category::Land] {
            self.set(category, ViewState::from_outcome(&outcome, category));
        }
    }
}

/// Listings for a homepage strip: featured and visible, at most `max`
pub fn featured(listings: &[Listing], max: usize) -> Vec<&Listing> {
    listings
        .iter()
        .filter(|listing| listing.featured && listing.visible)
        .take(max)
        .collect()
}
