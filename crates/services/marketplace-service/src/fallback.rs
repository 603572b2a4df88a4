//! Degraded mode: a static dataset served when a load fails.
//!
//! Screens keep rendering with this data instead of an error state. The
//! result always says where the data came from so callers can show a
//! banner or offer a retry.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use common::{AppError, AppResult};
use data_client::Table;
use domain::{Booking, BookingStatus, Review, ReviewAuthor, Service, Subscription, UserProfile};

/// Where a loaded value came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Backend,
    /// The backend call failed with `error`; data is the static dataset
    Fallback { error: AppError },
}

/// Value produced by `load_or_fallback`.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Loaded<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, DataSource::Fallback { .. })
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Keep a successful load, or substitute `fallback()` and record the error.
pub fn load_or_fallback<T>(result: AppResult<T>, fallback: impl FnOnce() -> T) -> Loaded<T> {
    match result {
        Ok(data) => Loaded {
            data,
            source: DataSource::Backend,
        },
        Err(error) => {
            warn!("Load failed ({}), showing local data: {}", error.code(), error);
            Loaded {
                data: fallback(),
                source: DataSource::Fallback { error },
            }
        }
    }
}

// =============================================================================
// Static dataset
// =============================================================================

struct ServiceSeed {
    title: &'static str,
    description: &'static str,
    price: f64,
    image: &'static str,
    rating: f64,
    reviews_count: u32,
    category: &'static str,
    duration: &'static str,
}

const SERVICE_SEEDS: [ServiceSeed; 6] = [
    ServiceSeed {
        title: "CNC Machining",
        description: "Precision machining services for complex parts",
        price: 50.0,
        image: "🔧",
        rating: 4.8,
        reviews_count: 124,
        category: "Machining",
        duration: "2-5 days",
    },
    ServiceSeed {
        title: "3D Printing",
        description: "Rapid prototyping and production parts",
        price: 25.0,
        image: "🖨️",
        rating: 4.6,
        reviews_count: 89,
        category: "Prototyping",
        duration: "1-3 days",
    },
    ServiceSeed {
        title: "Welding Services",
        description: "Professional welding for all materials",
        price: 40.0,
        image: "⚡",
        rating: 4.7,
        reviews_count: 156,
        category: "Fabrication",
        duration: "1-2 days",
    },
    ServiceSeed {
        title: "Sheet Metal Work",
        description: "Custom sheet metal fabrication",
        price: 35.0,
        image: "📐",
        rating: 4.5,
        reviews_count: 98,
        category: "Fabrication",
        duration: "2-4 days",
    },
    ServiceSeed {
        title: "Assembly Services",
        description: "Complete product assembly and testing",
        price: 30.0,
        image: "🔩",
        rating: 4.9,
        reviews_count: 203,
        category: "Assembly",
        duration: "1-3 days",
    },
    ServiceSeed {
        title: "Design Consultation",
        description: "Engineering design and optimization",
        price: 75.0,
        image: "📊",
        rating: 4.8,
        reviews_count: 67,
        category: "Consulting",
        duration: "1-2 days",
    },
];

const PLAN_ID_BASE: u128 = 0x200;
const BOOKING_ID_BASE: u128 = 0x100;
const REVIEWER_ID_BASE: u128 = 0x300;

/// Listed in catalog order (first entry is the newest).
static SERVICES: Lazy<Vec<Service>> = Lazy::new(|| {
    SERVICE_SEEDS
        .iter()
        .enumerate()
        .map(|(i, seed)| Service {
            id: Uuid::from_u128(i as u128 + 1),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            price: seed.price,
            category: seed.category.to_string(),
            duration: seed.duration.to_string(),
            rating: seed.rating,
            reviews_count: seed.reviews_count,
            image: seed.image.to_string(),
            created_at: Utc
                .with_ymd_and_hms(2024, 6, 30 - i as u32, 9, 0, 0)
                .single(),
        })
        .collect()
});

static SUBSCRIPTIONS: Lazy<Vec<Subscription>> = Lazy::new(|| {
    let plans: [(&str, f64, &[&str], bool); 3] = [
        (
            "Basic Plan",
            99.0,
            &["5 hours/month", "Basic support", "Standard materials"],
            false,
        ),
        (
            "Professional Plan",
            199.0,
            &["15 hours/month", "Priority support", "Premium materials", "Rush delivery"],
            true,
        ),
        (
            "Enterprise Plan",
            399.0,
            &["Unlimited hours", "24/7 support", "Custom materials", "Dedicated team"],
            false,
        ),
    ];
    plans
        .iter()
        .enumerate()
        .map(|(i, (name, price, features, popular))| Subscription {
            id: Uuid::from_u128(PLAN_ID_BASE + i as u128 + 1),
            name: name.to_string(),
            price: *price,
            features: features.iter().map(|f| f.to_string()).collect(),
            popular: *popular,
        })
        .collect()
});

/// (name, rating, comment, age in days)
const REVIEW_SEEDS: [(&str, u8, &str, i64); 3] = [
    ("John Smith", 5, "Excellent service! The quality exceeded my expectations.", 2),
    ("Sarah Johnson", 4, "Very professional team and fast delivery.", 7),
    ("Mike Wilson", 5, "Outstanding workmanship and great communication.", 14),
];

/// (service index, date, time, status, price)
const BOOKING_SEEDS: [(usize, (i32, u32, u32), &str, BookingStatus, f64); 5] = [
    (0, (2024, 10, 10), "2:00 PM", BookingStatus::Confirmed, 250.0),
    (2, (2024, 10, 12), "3:00 PM", BookingStatus::InProgress, 320.0),
    (1, (2024, 10, 8), "10:00 AM", BookingStatus::Completed, 180.0),
    (3, (2024, 10, 5), "1:00 PM", BookingStatus::Completed, 420.0),
    (4, (2024, 10, 2), "11:00 AM", BookingStatus::Completed, 290.0),
];

/// Catalog services, newest first
pub fn services() -> Vec<Service> {
    SERVICES.clone()
}

pub fn service(id: Uuid) -> Option<Service> {
    SERVICES.iter().find(|s| s.id == id).cloned()
}

/// Local search with the same title/description/category rule as the backend
pub fn search_services(query: &str) -> Vec<Service> {
    SERVICES
        .iter()
        .filter(|s| s.matches_query(query))
        .cloned()
        .collect()
}

/// Plans, cheapest first
pub fn subscriptions() -> Vec<Subscription> {
    SUBSCRIPTIONS.clone()
}

fn reviewer_id(index: usize) -> Uuid {
    Uuid::from_u128(REVIEWER_ID_BASE + index as u128 + 1)
}

/// Sample reviews attached to `service_id`, newest first
pub fn reviews(service_id: Uuid) -> Vec<Review> {
    let now = Utc::now();
    REVIEW_SEEDS
        .iter()
        .enumerate()
        .map(|(i, (name, rating, comment, age_days))| Review {
            id: Uuid::from_u128(
                service_id
                    .as_u128()
                    .wrapping_mul(16)
                    .wrapping_add(i as u128 + 1),
            ),
            service_id,
            user_id: reviewer_id(i),
            rating: *rating,
            comment: comment.to_string(),
            created_at: Some(now - Duration::days(*age_days)),
            user: Some(ReviewAuthor {
                name: name.to_string(),
                avatar: None,
            }),
        })
        .collect()
}

/// Sample bookings owned by `user_id`: two current, three in history
pub fn bookings(user_id: Uuid) -> Vec<Booking> {
    BOOKING_SEEDS
        .iter()
        .enumerate()
        .filter_map(|(i, (service_index, (y, m, d), time, status, price))| {
            let service = SERVICES.get(*service_index)?.clone();
            Some(Booking {
                id: Uuid::from_u128(BOOKING_ID_BASE + i as u128 + 1),
                user_id,
                service_id: service.id,
                date: NaiveDate::from_ymd_opt(*y, *m, *d)?,
                time: time.to_string(),
                status: *status,
                price: *price,
                created_at: Utc.with_ymd_and_hms(*y, *m, *d, 8, 0, 0).single(),
                service: Some(service),
            })
        })
        .collect()
}

fn to_rows<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

/// The whole dataset as table rows, for seeding an offline data client.
///
/// Bookings belong to `user_id` and reviewers get profile rows so joins
/// resolve.
pub fn seed_tables(user_id: Uuid) -> Vec<(Table, Vec<Value>)> {
    let reviews: Vec<Review> = SERVICES
        .iter()
        .flat_map(|s| reviews(s.id))
        .map(|mut r| {
            r.user = None;
            r
        })
        .collect();
    let bookings: Vec<Booking> = bookings(user_id)
        .into_iter()
        .map(|mut b| {
            b.service = None;
            b
        })
        .collect();
    let reviewers: Vec<UserProfile> = REVIEW_SEEDS
        .iter()
        .enumerate()
        .map(|(i, (name, ..))| UserProfile {
            name: name.to_string(),
            ..UserProfile::placeholder(reviewer_id(i))
        })
        .collect();

    vec![
        (Table::Services, to_rows(SERVICES.as_slice())),
        (Table::Subscriptions, to_rows(SUBSCRIPTIONS.as_slice())),
        (Table::Reviews, to_rows(&reviews)),
        (Table::Bookings, to_rows(&bookings)),
        (Table::Users, to_rows(&reviewers)),
    ]
}
