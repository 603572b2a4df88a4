//! Booking commands for the signed-in user.

use serde_json::json;

use common::AppResult;
use domain::{partition_bookings, BookingUpdate, NewBooking};
use marketplace_service::{fallback, load_or_fallback};

use crate::cli::args::BookingsAction;
use crate::context::AppContext;
use crate::output;

pub async fn execute(action: BookingsAction, ctx: &AppContext) -> AppResult<()> {
    let bookings = ctx.services.bookings();
    let identity = ctx.identity().await?;

    match action {
        BookingsAction::List => {
            let loaded = load_or_fallback(bookings.get_bookings(identity).await, || {
                fallback::bookings(identity)
            });
            ctx.output.notice_source(&loaded);

            let (current, history) = partition_bookings(loaded.into_data());
            ctx.output.emit(
                &json!({ "current": current, "history": history }),
                |_| output::booking_tabs(&current, &history),
            )
        }
        BookingsAction::Create {
            service,
            date,
            time,
            price,
        } => {
            let price = match price {
                Some(price) => price,
                None => ctx.services.catalog().get_service(service).await?.price,
            };
            let booking = NewBooking {
                user_id: identity,
                service_id: service,
                date,
                time,
                price,
                status: None,
            };
            let created = bookings.create_booking(booking).await?;
            ctx.output.emit(&created, |b| format!("Booked: {}", output::booking_line(b)))
        }
        BookingsAction::Status { id, status } => {
            let updated = bookings
                .update_booking(id, BookingUpdate::status(status))
                .await?;
            ctx.output
                .emit(&updated, |b| format!("Updated: {}", output::booking_line(b)))
        }
        BookingsAction::Delete { id } => {
            bookings.delete_booking(id).await?;
            ctx.output.message(&format!("Deleted booking {}", id))
        }
    }
}
