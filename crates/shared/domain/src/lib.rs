//! Domain layer - Marketplace entities and client-side rules.
//!
//! This crate contains plain records with no transport dependencies.
//! Every row the backend returns is narrowed into one of these types.

pub mod booking;
pub mod constants;
pub mod error;
pub mod profile;
pub mod review;
pub mod serde_helpers;
pub mod service;
pub mod session;
pub mod subscription;
pub mod validation;

pub use booking::{partition_bookings, Booking, BookingStatus, BookingUpdate, NewBooking};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use profile::{ProfileUpdate, UserProfile};
pub use review::{NewReview, Review, ReviewAuthor};
pub use service::Service;
pub use session::Session;
pub use subscription::{NewSubscription, Subscription};
pub use validation::{
    require_text, validate_email_address, Credentials, SignUpRequest, Validated,
};
