use crate::models::{Category, Listing, ListingDetails};
use crate::render::carousel::carousel;
use crate::render::format::{format_amount, format_price, truncate};
use maud::{html, Markup};

pub const PLACEHOLDER_IMAGE: &str = "images/placeholder.jpg";
const DESCRIPTION_PREVIEW: usize = 100;
const CONTACT_LINK: &str = "index.html#request-form";

fn default_title(category: Category) -> &'static str {
    match category {
        Category::House => "House for Sale",
        Category::Land => "Land for Sale",
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn featured_badge() -> Markup {
    html! { span class="status" { "FEATURED" } }
}

fn single_image(url: &str, badge: Option<Markup>) -> Markup {
    html! {
        div class="img" style=(format!("background-image: url('{url}')")) {
            @if let Some(badge) = badge {
                (badge)
            }
        }
    }
}

fn detail_items(listing: &Listing) -> Markup {
    match &listing.details {
        ListingDetails::House {
            bedrooms,
            bathrooms,
            floor_area,
            ..
        } => html! {
            li { span class="flaticon-bed" {} " " (bedrooms) " Beds" }
            li { span class="flaticon-bathtub" {} " " (bathrooms) " Baths" }
            @if let Some(sqft) = floor_area {
                li { (format_amount(*sqft)) " sqft" }
            }
        },
        ListingDetails::Land {
            plot_size, area, ..
        } => html! {
            li { strong { "Plot Size:" } " " (plot_size.as_deref().unwrap_or("N/A")) }
            @if let Some(area) = area {
                li { strong { "Area:" } " " (format_amount(*area)) " sqft" }
            }
        },
    }
}

/// Card shown on the public listings and home pages
pub fn public_card(listing: &Listing) -> Markup {
    let category = listing.category();
    let images = listing.images();
    let badge = listing.featured.then(featured_badge);

    html! {
        div class="col-md-4" data-id=(listing.id) data-category=(category.as_str()) {
            div class="property-wrap" {
                @if images.len() > 1 {
                    (carousel(&images, badge))
                } @else {
                    (single_image(images.first().copied().unwrap_or(PLACEHOLDER_IMAGE), badge))
                }
                div class="text" {
                    p class="price" { span { (format_price(listing.price)) } }
                    h3 {
                        a href=(CONTACT_LINK) { (or_default(&listing.title, default_title(category))) }
                    }
                    p class="location" {
                        span class="icon-map-marker" {}
                        " " (or_default(&listing.location, "Ghana"))
                    }
                    ul class="property_list" { (detail_items(listing)) }
                    @if let Some(description) = listing.description.as_deref().filter(|d| !d.is_empty()) {
                        p class="description" { (truncate(description, DESCRIPTION_PREVIEW)) }
                    }
                    a href=(CONTACT_LINK) class="btn btn-primary" { "View Details" }
                }
            }
        }
    }
}

/// Card shown in the admin dashboard, with hidden listings marked
pub fn admin_card(listing: &Listing) -> Markup {
    let hidden = !listing.visible;
    let category = listing.category();
    let image = listing
        .images()
        .first()
        .copied()
        .unwrap_or(PLACEHOLDER_IMAGE);

    html! {
        div class=(if hidden { "listing-card hidden" } else { "listing-card" })
            data-id=(listing.id) data-category=(category.as_str()) {
            @if listing.featured {
                div class="listing-badge" { "Featured" }
            }
            @if hidden {
                div class="listing-badge hidden-badge" { "Hidden" }
            }
            img src=(image) alt=(listing.title) class="listing-image";
            div class="listing-content" {
                h4 class="listing-title" { (listing.title) }
                p class="listing-location" { i class="icon-location-pin" {} " " (listing.location) }
                div class="listing-price" { (format_price(listing.price)) }
                ul class="listing-details" { (detail_items(listing)) }
                div class="listing-actions" {
                    button class="btn btn-sm btn-outline-primary" data-action="edit" { "Edit" }
                    button class="btn btn-sm btn-outline-warning" data-action="toggle" {
                        (if hidden { "Show" } else { "Hide" })
                    }
                    button class="btn btn-sm btn-outline-danger" data-action="delete" { "Delete" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{house, land};
    use scraper::{Html, Selector};

    fn select_text(html: &str, css: &str) -> Vec<String> {
        let doc = Html::parse_fragment(html);
        let selector = Selector::parse(css).unwrap();
        doc.select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    }

    #[test]
    fn house_card_shows_price_rooms_and_single_image() {
        let html = public_card(&house("H1")).into_string();

        assert_eq!(select_text(&html, ".price span"), vec!["GHS 250,000"]);
        assert_eq!(select_text(&html, "h3 a"), vec!["House H1"]);
        assert_eq!(
            select_text(&html, ".property_list li"),
            vec!["3 Beds", "2 Baths", "1,800 sqft"]
        );
        assert_eq!(select_text(&html, ".property-carousel").len(), 0);
        assert_eq!(select_text(&html, ".status").len(), 0);
    }

    #[test]
    fn multi_image_featured_house_gets_carousel_with_badge_on_first_slide() {
        let mut listing = house("H2");
        listing.featured = true;
        listing.details = ListingDetails::House {
            bedrooms: 4,
            bathrooms: 3,
            floor_area: None,
            images: vec!["https://img/1.jpg".to_string(), "https://img/2.jpg".to_string()],
        };

        let html = public_card(&listing).into_string();
        let doc = Html::parse_fragment(&html);

        let slides = Selector::parse(".carousel-slide").unwrap();
        assert_eq!(doc.select(&slides).count(), 2);
        let active = Selector::parse(".carousel-slide.active .status").unwrap();
        assert_eq!(doc.select(&active).count(), 1);
    }

    #[test]
    fn land_card_falls_back_for_missing_fields() {
        let mut listing = land("L1");
        listing.title = String::new();
        listing.description = Some("x".repeat(120));
        listing.details = ListingDetails::Land {
            plot_size: None,
            area: Some(7000.0),
            image: None,
        };

        let html = public_card(&listing).into_string();

        assert_eq!(select_text(&html, "h3 a"), vec!["Land for Sale"]);
        assert_eq!(
            select_text(&html, ".property_list li"),
            vec!["Plot Size: N/A", "Area: 7,000 sqft"]
        );
        assert_eq!(select_text(&html, ".description"), vec![format!("{}...", "x".repeat(100))]);
        assert!(html.contains(PLACEHOLDER_IMAGE));
    }

    #[test]
    fn titles_are_escaped() {
        let mut listing = house("H3");
        listing.title = "<script>alert(1)</script>".to_string();

        let html = public_card(&listing).into_string();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn admin_card_marks_hidden_listing() {
        let mut listing = land("L2");
        listing.visible = false;

        let html = admin_card(&listing).into_string();

        assert_eq!(select_text(&html, ".hidden-badge"), vec!["Hidden"]);
        assert_eq!(select_text(&html, "[data-action=toggle]"), vec!["Show"]);
        assert_eq!(select_text(&html, ".listing-card.hidden").len(), 1);
    }
}
