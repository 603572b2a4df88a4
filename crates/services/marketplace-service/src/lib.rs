//! Marketplace Service Library
//!
//! Domain wrappers over the data client: catalog, bookings, reviews,
//! subscription plans and profiles, plus the static dataset used when a
//! load fails.

pub mod fallback;
mod rows;
pub mod service;

pub use fallback::{load_or_fallback, DataSource, Loaded};
pub use service::{
    parallel, BookingManager, BookingService, Catalog, CatalogService, Marketplace,
    MarketplaceServices, ProfileManager, ProfileService, ReviewManager, ReviewService,
    SubscriptionManager, SubscriptionService,
};

#[cfg(any(test, feature = "test-utils"))]
pub use service::{
    MockBookingService, MockCatalogService, MockMarketplaceServices, MockProfileService,
    MockReviewService, MockSubscriptionService,
};
