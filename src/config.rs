use crate::cache::{GatewaySettings, DEFAULT_TIMEOUT, DEFAULT_TTL};
use crate::models::{Category, ListingSelector};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Command-line client for the property listings sheet
#[derive(Debug, Parser)]
#[command(name = "listings-desk", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: AppConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every subcommand; each flag can also come from the environment
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Deployment URL of the listings API
    #[arg(long, env = "LISTINGS_API_URL")]
    pub endpoint: Url,

    /// Directory holding cached listings and the admin session
    #[arg(long, env = "LISTINGS_STORAGE_DIR", default_value = ".listings-desk")]
    pub storage_dir: PathBuf,

    #[arg(long, env = "LISTINGS_CACHE_TTL_SECS", default_value_t = DEFAULT_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    #[arg(long, env = "LISTINGS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Featured listings shown per category on the homepage
    #[arg(long, env = "LISTINGS_MAX_FEATURED", default_value_t = 3)]
    pub max_featured: usize,

    #[arg(long, env = "LISTINGS_CACHE_PREFIX", default_value = "pgp_listings")]
    pub cache_prefix: String,
}

impl AppConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Never zero, so a request always gets a chance to complete
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            endpoint: self.endpoint.clone(),
            cache_prefix: self.cache_prefix.clone(),
            ttl: self.ttl(),
            timeout: self.timeout(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print public listings (cached for the TTL)
    List {
        #[arg(default_value = "all")]
        selector: ListingSelector,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Render the homepage featured strips to HTML
    Featured {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render the public listings page to HTML
    Render {
        #[arg(long)]
        out: Option<PathBuf>,
        /// Load houses and land with separate requests instead of one `all` read
        #[arg(long)]
        each: bool,
    },
    /// Drop cached listings so the next read hits the API
    Invalidate {
        #[arg(default_value = "all")]
        selector: ListingSelector,
    },
    Login {
        username: String,
        #[arg(long, env = "LISTINGS_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the stored admin session
    Whoami,
    /// List live listings, hidden ones included
    AdminList {
        category: Option<Category>,
        /// Write the admin dashboard HTML here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Create a listing from a JSON draft file
    Add { draft: PathBuf },
    /// Edit a listing from a JSON file of changed fields
    Update {
        category: Category,
        id: String,
        changes: PathBuf,
        /// Treat the file as a complete draft instead of a partial edit
        #[arg(long)]
        replace: bool,
    },
    Delete {
        category: Category,
        id: String,
        /// Confirm the deletion; it cannot be undone
        #[arg(long)]
        yes: bool,
    },
    /// Show a hidden listing or hide a visible one
    Toggle { category: Category, id: String },
    /// Upload an image and print its hosted URL
    Upload { path: PathBuf },
}
