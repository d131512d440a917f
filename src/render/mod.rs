pub mod cards;
pub mod carousel;
pub mod format;
pub mod page;

pub use cards::{admin_card, public_card};
pub use carousel::Carousel;
pub use page::{admin_page, featured_page, listings_page};
