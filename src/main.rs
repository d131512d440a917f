use anyhow::{bail, Context, Result};
use clap::Parser;
use listings_desk::admin::AdminService;
use listings_desk::api::{ApiClient, ImageUpload, ListingDraft, ListingPatch};
use listings_desk::cache::{GatewaySet, LocalStorage, Served};
use listings_desk::config::{AppConfig, Cli, Command};
use listings_desk::models::{Category, Listing, ListingDetails};
use listings_desk::render::{admin_page, featured_page, listings_page};
use listings_desk::session::SessionStore;
use listings_desk::view::{ListingsView, ViewState};
use maud::Markup;
use mockable::{Clock, DefaultClock};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct App {
    config: AppConfig,
    gateways: Arc<GatewaySet>,
    admin: AdminService,
}

impl App {
    fn build(config: AppConfig) -> Result<Self> {
        let storage = LocalStorage::open(&config.storage_dir).with_context(|| {
            format!("Failed to open storage at {}", config.storage_dir.display())
        })?;
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let client = Arc::new(
            ApiClient::new(config.endpoint.clone(), config.timeout())
                .context("Failed to create HTTP client")?,
        );

        let gateways = Arc::new(GatewaySet::new(
            &config.gateway_settings(),
            client.clone(),
            storage.clone(),
            clock.clone(),
        ));
        let admin = AdminService::new(
            client,
            SessionStore::new(storage, clock),
            gateways.clone(),
        );

        Ok(Self {
            config,
            gateways,
            admin,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::build(cli.config)?;
    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::List { selector, json } => {
            let outcome = app.gateways.get_listings(selector).await;
            if let Some(error) = &outcome.error {
                warn!("{}", error);
            }
            if outcome.served == Served::Unavailable {
                bail!("Unable to load properties. Please try again later.");
            }
            if outcome.served == Served::StaleFallback {
                info!("Showing saved listings; live data is currently unavailable");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.listings)?);
            } else {
                print_listings(&outcome.listings);
            }
        }

        Command::Featured { out } => {
            let view = ListingsView::new();
            view.load_combined(&app.gateways).await;
            let html = featured_page(
                &view.state(Category::House),
                &view.state(Category::Land),
                app.config.max_featured,
            );
            write_page(html, out.as_deref()).await?;
        }

        Command::Render { out, each } => {
            let view = ListingsView::new();
            if each {
                view.load_each(&app.gateways).await;
            } else {
                view.load_combined(&app.gateways).await;
            }
            let html = listings_page(&view.state(Category::House), &view.state(Category::Land));
            write_page(html, out.as_deref()).await?;
        }

        Command::Invalidate { selector } => {
            app.gateways.invalidate(selector);
            info!("Cleared cached {} listings", selector);
        }

        Command::Login { username, password } => {
            let session = app.admin.login(&username, &password).await?;
            println!("Logged in as {}", session.username);
        }

        Command::Logout => {
            app.admin.logout()?;
            println!("Logged out");
        }

        Command::Whoami => match app.admin.current_session() {
            Some(session) => println!(
                "{} (logged in {})",
                session.username,
                session.login_time.to_rfc3339()
            ),
            None => println!("Not logged in"),
        },

        Command::AdminList { category, out } => {
            let categories = match category {
                Some(category) => vec![category],
                None => vec![Category::House, Category::Land],
            };

            let mut houses = ViewState::Idle;
            let mut land = ViewState::Idle;
            for category in categories {
                let state = match app.admin.list(category).await {
                    Ok(listings) => {
                        println!("{} {} listings", listings.len(), category);
                        print_listings(&listings);
                        ViewState::Loaded {
                            listings,
                            degraded: false,
                        }
                    }
                    Err(e) => {
                        warn!("Failed to load {} listings: {}", category, e);
                        ViewState::Failed {
                            message: e.to_string(),
                        }
                    }
                };
                match category {
                    Category::House => houses = state,
                    Category::Land => land = state,
                }
            }

            if let Some(path) = out {
                let username = app
                    .admin
                    .current_session()
                    .map(|s| s.username)
                    .unwrap_or_default();
                write_page(admin_page(&username, &houses, &land), Some(&path)).await?;
            }
        }

        Command::Add { draft } => {
            let draft: ListingDraft = read_json(&draft).await?;
            app.admin.add(&draft).await?;
            println!("{} listing added successfully!", capitalized(draft.category()));
        }

        Command::Update {
            category,
            id,
            changes,
            replace,
        } => {
            if replace {
                let draft: ListingDraft = read_json(&changes).await?;
                if draft.category() != category {
                    bail!("Draft is a {} listing, not {}", draft.category(), category);
                }
                app.admin.replace(&id, &draft).await?;
            } else {
                let patch: ListingPatch = read_json(&changes).await?;
                app.admin.edit(category, &id, patch).await?;
            }
            println!("{} listing updated successfully!", capitalized(category));
        }

        Command::Delete { category, id, yes } => {
            if !yes {
                bail!("Deleting {} cannot be undone; re-run with --yes to confirm", id);
            }
            app.admin.delete(category, &id).await?;
            println!("Listing deleted successfully!");
        }

        Command::Toggle { category, id } => {
            app.admin.toggle_visibility(category, &id).await?;
            println!("Visibility toggled successfully!");
        }

        Command::Upload { path } => {
            let image = ImageUpload::from_path(&path).await?;
            let url = app.admin.upload_image(image).await?;
            println!("{}", url);
        }
    }

    Ok(())
}

fn capitalized(category: Category) -> &'static str {
    match category {
        Category::House => "House",
        Category::Land => "Land",
    }
}

fn print_listings(listings: &[Listing]) {
    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({} {})", i + 1, listing.title, listing.price, listing.location);
        match &listing.details {
            ListingDetails::House {
                bedrooms,
                bathrooms,
                images,
                ..
            } => println!("   {} beds, {} baths, {} images", bedrooms, bathrooms, images.len()),
            ListingDetails::Land { plot_size, .. } => {
                println!("   Plot: {}", plot_size.as_deref().unwrap_or("N/A"))
            }
        }
        let mut flags = Vec::new();
        if listing.featured {
            flags.push("featured");
        }
        if !listing.visible {
            flags.push("hidden");
        }
        println!("   ID: {} {}", listing.id, flags.join(", "));
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

async fn write_page(html: Markup, out: Option<&Path>) -> Result<()> {
    let html = html.into_string();
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &html)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("💾 Saved page to {}", path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}
