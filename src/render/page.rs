use crate::models::{Category, Listing};
use crate::render::cards::{admin_card, public_card};
use crate::view::{featured, ViewState};
use maud::{html, Markup, DOCTYPE};

fn section_title(category: Category) -> &'static str {
    match category {
        Category::House => "Houses",
        Category::Land => "Land",
    }
}

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
            }
            body { (body) }
        }
    }
}

/// One category's block, rendered from whatever state it is in
fn section(
    category: Category,
    state: &ViewState,
    card: fn(&Listing) -> Markup,
    limit: Option<usize>,
) -> Markup {
    let body = match state {
        ViewState::Idle | ViewState::Loading => html! {
            div class="skeleton" { "Loading listings..." }
        },
        ViewState::Failed { .. } => html! {
            div class="error-state" {
                p { "Unable to load properties. Please try again later." }
            }
        },
        ViewState::Loaded { listings, degraded } => {
            let shown: Vec<&Listing> = match limit {
                Some(max) => featured(listings, max),
                None => listings.iter().collect(),
            };
            html! {
                @if *degraded {
                    p class="stale-notice" { "Showing saved listings; live data is currently unavailable." }
                }
                @if shown.is_empty() {
                    p class="empty-state" { "No listings available right now." }
                } @else {
                    div class="row" {
                        @for listing in shown {
                            (card(listing))
                        }
                    }
                }
            }
        }
    };

    html! {
        section class="listings" id=(format!("{}-container", category.selector())) {
            h2 { (section_title(category)) }
            (body)
        }
    }
}

/// Public listings page: every listing the API returned for each category
pub fn listings_page(houses: &ViewState, land: &ViewState) -> Markup {
    layout(
        "Properties",
        html! {
            (section(Category::House, houses, public_card, None))
            (section(Category::Land, land, public_card, None))
        },
    )
}

/// Homepage strips: up to `max_featured` featured, visible listings per category
pub fn featured_page(houses: &ViewState, land: &ViewState, max_featured: usize) -> Markup {
    layout(
        "Featured Properties",
        html! {
            (section(Category::House, houses, public_card, Some(max_featured)))
            (section(Category::Land, land, public_card, Some(max_featured)))
        },
    )
}

/// Admin dashboard grid, hidden listings included
pub fn admin_page(username: &str, houses: &ViewState, land: &ViewState) -> Markup {
    layout(
        "Admin Dashboard",
        html! {
            header { "Signed in as " span id="admin-username" { (username) } }
            span id="houses-count" { (houses.listings().len()) }
            span id="land-count" { (land.listings().len()) }
            (section(Category::House, houses, admin_card, None))
            (section(Category::Land, land, admin_card, None))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{house, land};
    use scraper::{Html, Selector};

    fn count(html: &str, css: &str) -> usize {
        let doc = Html::parse_document(html);
        doc.select(&Selector::parse(css).unwrap()).count()
    }

    #[test]
    fn sections_render_independently() {
        let houses = ViewState::Loaded {
            listings: vec![house("H1"), house("H2")],
            degraded: false,
        };
        let land_state = ViewState::Loading;

        let html = listings_page(&houses, &land_state).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(count(&html, "#houses-container .property-wrap"), 2);
        assert_eq!(count(&html, "#land-container .skeleton"), 1);
    }

    #[test]
    fn failure_and_stale_states_are_visible() {
        let houses = ViewState::Failed {
            message: "timeout".to_string(),
        };
        let land_state = ViewState::Loaded {
            listings: vec![land("L1")],
            degraded: true,
        };

        let html = listings_page(&houses, &land_state).into_string();

        assert_eq!(count(&html, "#houses-container .error-state"), 1);
        assert_eq!(count(&html, "#land-container .stale-notice"), 1);
        assert_eq!(count(&html, "#land-container .property-wrap"), 1);
    }

    #[test]
    fn featured_page_limits_and_filters() {
        let mut listings: Vec<Listing> = (1..=4).map(|i| house(&format!("H{i}"))).collect();
        listings.iter_mut().for_each(|l| l.featured = true);
        let houses = ViewState::Loaded {
            listings,
            degraded: false,
        };
        let land_state = ViewState::Loaded {
            listings: vec![land("L1")],
            degraded: false,
        };

        let html = featured_page(&houses, &land_state, 3).into_string();

        assert_eq!(count(&html, "#houses-container .property-wrap"), 3);
        assert_eq!(count(&html, "#land-container .empty-state"), 1);
    }

    #[test]
    fn admin_page_counts_all_listings() {
        let mut hidden = land("L2");
        hidden.visible = false;
        let land_state = ViewState::Loaded {
            listings: vec![land("L1"), hidden],
            degraded: false,
        };

        let html = admin_page("admin", &ViewState::Idle, &land_state).into_string();

        assert_eq!(count(&html, "#land-container .listing-card"), 2);
        assert_eq!(count(&html, ".listing-card.hidden"), 1);
        let doc = Html::parse_document(&html);
        let sel = Selector::parse("#land-count").unwrap();
        let text: String = doc.select(&sel).next().unwrap().text().collect();
        assert_eq!(text, "2");
    }
}
