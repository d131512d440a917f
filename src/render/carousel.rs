use maud::{html, Markup};

/// Which slide of a multi-image card is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, current: 0 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Move by `direction` slides, wrapping at both ends
    pub fn step(&mut self, direction: isize) -> usize {
        if self.len > 0 {
            let len = self.len as isize;
            self.current = (self.current as isize + direction).rem_euclid(len) as usize;
        }
        self.current
    }

    /// Auto-rotation tick
    pub fn advance(&mut self) -> usize {
        self.step(1)
    }
}

/// Slides for `images`, first one active, plus prev/next controls
pub fn carousel(images: &[&str], badge: Option<Markup>) -> Markup {
    html! {
        div class="property-carousel" data-slides=(images.len()) {
            @for (i, image) in images.iter().enumerate() {
                div class=(if i == 0 { "carousel-slide active" } else { "carousel-slide" })
                    style=(format!("background-image: url('{image}')")) {
                    @if i == 0 {
                        @if let Some(badge) = &badge {
                            (badge)
                        }
                    }
                }
            }
            button class="carousel-prev" type="button" data-step="-1" { "‹" }
            button class="carousel-next" type="button" data-step="1" { "›" }
        }
    }
}
