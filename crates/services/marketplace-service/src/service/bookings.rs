//! Booking service - create, list, move through the status lifecycle, delete.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use common::{AppError, AppResult};
use data_client::{DataClient, Embed, Filter, Order, Query, Select, Table};
use domain::{
    Booking, BookingUpdate, NewBooking, COLUMN_CREATED_AT, COLUMN_ID, COLUMN_SERVICE_ID,
    COLUMN_USER_ID,
};

use crate::rows::{decode_all, decode_first, encode};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Booking service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Insert a booking and return the stored row
    async fn create_booking(&self, booking: NewBooking) -> AppResult<Booking>;

    /// A user's bookings, newest first, each with its service attached
    async fn get_bookings(&self, user_id: Uuid) -> AppResult<Vec<Booking>>;

    /// Patch a booking and return the updated row
    async fn update_booking(&self, id: Uuid, update: BookingUpdate) -> AppResult<Booking>;

    async fn delete_booking(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of BookingService over a data client.
pub struct BookingManager {
    client: Arc<dyn DataClient>,
}

impl BookingManager {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BookingService for BookingManager {
    async fn create_booking(&self, booking: NewBooking) -> AppResult<Booking> {
        booking.check()?;

        let rows = self
            .client
            .insert(Table::Bookings, vec![encode(&booking)?])
            .await?;
        let created: Booking = decode_first(Table::Bookings, rows)?;

        info!("Booking {} created for service {}", created.id, created.service_id);
        Ok(created)
    }

    async fn get_bookings(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        let query = Query::new()
            .select(Select::all().embed(Embed::new(
                "service",
                Table::Services,
                COLUMN_SERVICE_ID,
            )))
            .filter(Filter::eq(COLUMN_USER_ID, user_id))
            .order(Order::desc(COLUMN_CREATED_AT));

        let rows = self.client.query(Table::Bookings, query).await?;
        debug!("Loaded {} bookings for user {}", rows.len(), user_id);
        decode_all(Table::Bookings, rows)
    }

    async fn update_booking(&self, id: Uuid, update: BookingUpdate) -> AppResult<Booking> {
        update.check()?;

        let rows = self
            .client
            .update(
                Table::Bookings,
                vec![Filter::eq(COLUMN_ID, id)],
                encode(&update)?,
            )
            .await?;
        let updated: Booking = decode_first(Table::Bookings, rows)?;

        info!("Booking {} updated ({})", updated.id, updated.status);
        Ok(updated)
    }

    async fn delete_booking(&self, id: Uuid) -> AppResult<()> {
        if id.is_nil() {
            return Err(AppError::validation("Booking id is required"));
        }
        self.client
            .remove(Table::Bookings, vec![Filter::eq(COLUMN_ID, id)])
            .await?;
        info!("Booking {} deleted", id);
        Ok(())
    }
}
