//! Marketplace services - one wrapper per backend operation.
//!
//! Each wrapper composes a single data client call (two for the profile
//! upsert) and narrows the returned rows into domain records.

mod bookings;
mod catalog;
pub mod container;
mod profiles;
mod reviews;
mod subscriptions;

// Service Container
pub use container::{parallel, Marketplace, MarketplaceServices};

// Service traits and implementations
pub use bookings::{BookingManager, BookingService};
pub use catalog::{Catalog, CatalogService};
pub use profiles::{ProfileManager, ProfileService};
pub use reviews::{ReviewManager, ReviewService};
pub use subscriptions::{SubscriptionManager, SubscriptionService};

#[cfg(any(test, feature = "test-utils"))]
pub use bookings::MockBookingService;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog::MockCatalogService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockMarketplaceServices;
#[cfg(any(test, feature = "test-utils"))]
pub use profiles::MockProfileService;
#[cfg(any(test, feature = "test-utils"))]
pub use reviews::MockReviewService;
#[cfg(any(test, feature = "test-utils"))]
pub use subscriptions::MockSubscriptionService;
