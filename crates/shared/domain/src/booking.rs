//! Booking entity, status lifecycle and write payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{DomainError, DomainResult};
use crate::serde_helpers::nullable;
use crate::service::Service;
use crate::validation::require_text;

/// Booking lifecycle status as stored in the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    /// Wire value (`in-progress`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Human-readable label (`In Progress`, ...)
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::InProgress => "In Progress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if the booking is still upcoming or underway
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::InProgress)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| DomainError::validation(format!("Unknown booking status: {}", s)))
    }
}

/// Booking row; `service` is present when the read joined `services(*)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "nullable")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
}

impl Booking {
    /// Check if the booking belongs on the "current" tab
    pub fn is_current(&self) -> bool {
        self.status.is_active()
    }
}

/// Split bookings into (current, history) while keeping their order.
pub fn partition_bookings(bookings: Vec<Booking>) -> (Vec<Booking>, Vec<Booking>) {
    bookings.into_iter().partition(Booking::is_current)
}

/// Insert payload for a new booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    /// Left to the backend default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
}

impl NewBooking {
    /// Validate fields a booking form requires before submitting.
    pub fn check(&self) -> DomainResult<()> {
        require_text("Time", &self.time)?;
        self.validate()?;
        Ok(())
    }
}

/// Booking patch; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl BookingUpdate {
    /// Patch that only moves the booking to `status`
    pub fn status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn check(&self) -> DomainResult<()> {
        if self.status.is_none() && self.date.is_none() && self.time.is_none() {
            return Err(DomainError::validation("Booking update has no changes"));
        }
        if let Some(time) = &self.time {
            require_text("Time", time)?;
        }
        Ok(())
    }
}
