//! Service Container - Centralized access to the marketplace services.
//!
//! Callers depend on `MarketplaceServices`, not on the concrete managers,
//! so screens and tests can swap in mocks.

use std::future::Future;
use std::sync::Arc;

use data_client::DataClient;

use super::{
    BookingManager, BookingService, Catalog, CatalogService, ProfileManager, ProfileService,
    ReviewManager, ReviewService, SubscriptionManager, SubscriptionService,
};
use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait MarketplaceServices: Send + Sync {
    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn bookings(&self) -> Arc<dyn BookingService>;

    fn reviews(&self) -> Arc<dyn ReviewService>;

    fn subscriptions(&self) -> Arc<dyn SubscriptionService>;

    fn profiles(&self) -> Arc<dyn ProfileService>;
}

/// Concrete implementation of MarketplaceServices
pub struct Marketplace {
    catalog: Arc<dyn CatalogService>,
    bookings: Arc<dyn BookingService>,
    reviews: Arc<dyn ReviewService>,
    subscriptions: Arc<dyn SubscriptionService>,
    profiles: Arc<dyn ProfileService>,
}

impl Marketplace {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        bookings: Arc<dyn BookingService>,
        reviews: Arc<dyn ReviewService>,
        subscriptions: Arc<dyn SubscriptionService>,
        profiles: Arc<dyn ProfileService>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            reviews,
            subscriptions,
            profiles,
        }
    }

    /// Create every service over one shared data client
    pub fn from_client(client: Arc<dyn DataClient>) -> Self {
        Self {
            catalog: Arc::new(Catalog::new(client.clone())),
            bookings: Arc::new(BookingManager::new(client.clone())),
            reviews: Arc::new(ReviewManager::new(client.clone())),
            subscriptions: Arc::new(SubscriptionManager::new(client.clone())),
            profiles: Arc::new(ProfileManager::new(client)),
        }
    }
}

impl MarketplaceServices for Marketplace {
    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingService> {
        self.bookings.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        self.reviews.clone()
    }

    fn subscriptions(&self) -> Arc<dyn SubscriptionService> {
        self.subscriptions.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileService> {
        self.profiles.clone()
    }
}

/// Run independent loads concurrently, e.g. a service detail view that
/// needs the service and its reviews at once.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}
