//! Doubles shared by the unit tests: a settable clock, a scripted listings
//! source, and listing fixtures.

use crate::api::{ApiError, ListingsSource};
use crate::models::{Listing, ListingDetails, ListingSelector};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct MutableClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MutableClock {
    pub fn at_epoch_secs(secs: i64) -> Self {
        let start = Utc
            .timestamp_opt(secs, 0)
            .single()
            .expect("valid fixture timestamp");
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock_clock();
        *now += chrono::Duration::from_std(by).expect("duration in range");
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().expect("clock lock poisoned")
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// What the scripted source does on its next call
pub enum Reply {
    Listings(Vec<Listing>),
    Fail(&'static str),
    Hang,
}

/// Listings source that replays scripted replies and counts calls.
/// Once the script runs out it keeps repeating the last reply.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Vec<Listing>>>,
    calls: AtomicUsize,
    selectors: Mutex<Vec<ListingSelector>>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn selectors(&self) -> Vec<ListingSelector> {
        self.selectors.lock().expect("selectors lock").clone()
    }
}

#[async_trait]
impl ListingsSource for ScriptedSource {
    async fn fetch_listings(
        &self,
        _endpoint: &Url,
        selector: ListingSelector,
    ) -> Result<Vec<Listing>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.selectors.lock().expect("selectors lock").push(selector);

        let reply = self.replies.lock().expect("replies lock").pop_front();
        match reply {
            Some(Reply::Listings(listings)) => {
                *self.last.lock().expect("last lock") = Some(listings.clone());
                Ok(listings)
            }
            Some(Reply::Fail(message)) => Err(ApiError::Remote(message.to_string())),
            Some(Reply::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
            None => match self.last.lock().expect("last lock").clone() {
                Some(listings) => Ok(listings),
                None => Err(ApiError::Remote("no scripted reply".to_string())),
            },
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

pub fn endpoint() -> Url {
    Url::parse("https://script.example.com/macros/s/test/exec").expect("valid url")
}

pub fn house(id: &str) -> Listing {
    Listing {
        id: id.to_string(),
        title: format!("House {id}"),
        location: "East Legon".to_string(),
        price: 250_000.0,
        description: None,
        visible: true,
        featured: false,
        details: ListingDetails::House {
            bedrooms: 3,
            bathrooms: 2,
            floor_area: Some(1800.0),
            images: vec!["https://img.example.com/front.jpg".to_string()],
        },
    }
}

pub fn land(id: &str) -> Listing {
    Listing {
        id: id.to_string(),
        title: format!("Plot {id}"),
        location: "Oyibi".to_string(),
        price: 60_000.0,
        description: None,
        visible: true,
        featured: false,
        details: ListingDetails::Land {
            plot_size: Some("70x100".to_string()),
            area: None,
            image: Some("https://img.example.com/plot.jpg".to_string()),
        },
    }
}
