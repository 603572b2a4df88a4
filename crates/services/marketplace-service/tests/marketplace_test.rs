//! Marketplace services against the in-memory data client.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use common::BackendError;
use data_client::{DataClient, MemoryDataClient, Table};
use domain::{BookingStatus, BookingUpdate, NewBooking, NewReview, ProfileUpdate};
use marketplace_service::fallback;
use marketplace_service::{load_or_fallback, Marketplace, MarketplaceServices};

const USER: Uuid = Uuid::from_u128(0xAA);

fn seeded() -> (Arc<MemoryDataClient>, Marketplace) {
    let client = Arc::new(MemoryDataClient::from_tables(fallback::seed_tables(USER)));
    let services = Marketplace::from_client(client.clone() as Arc<dyn DataClient>);
    (client, services)
}

fn booking_for(service_id: Uuid) -> NewBooking {
    NewBooking {
        user_id: USER,
        service_id,
        date: NaiveDate::from_ymd_opt(2024, 11, 4).unwrap(),
        time: "9:00 AM".to_string(),
        price: 50.0,
        status: None,
    }
}

#[tokio::test]
async fn test_search_matches_case_insensitively() {
    let (_, services) = seeded();

    let found = services.catalog().search_services("weld").await.unwrap();

    assert!(!found.is_empty());
    assert!(found.iter().all(|s| s.matches_query("weld")));
}

#[tokio::test]
async fn test_empty_search_equals_listing() {
    let (_, services) = seeded();

    let listed = services.catalog().get_services().await.unwrap();
    let searched = services.catalog().search_services("").await.unwrap();

    assert_eq!(listed, searched);
    assert!(listed
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn test_search_term_is_literal() {
    let (_, services) = seeded();

    let found = services.catalog().search_services("%").await.unwrap();

    assert!(found.is_empty());
}

#[tokio::test]
async fn test_get_service_by_id() {
    let (_, services) = seeded();
    let first = fallback::services().remove(0);

    let service = services.catalog().get_service(first.id).await.unwrap();
    assert_eq!(service.title, first.title);

    let err = services
        .catalog()
        .get_service(Uuid::from_u128(0xDEAD))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_created_booking_listed_with_service() {
    let (_, services) = seeded();
    let service = fallback::services().remove(2);

    let created = services
        .bookings()
        .create_booking(booking_for(service.id))
        .await
        .unwrap();
    assert_eq!(created.status, BookingStatus::Confirmed);

    let bookings = services.bookings().get_bookings(USER).await.unwrap();
    let listed = bookings.iter().find(|b| b.id == created.id).unwrap();

    assert_eq!(listed.service.as_ref().map(|s| s.id), Some(service.id));
    assert_eq!(bookings[0].id, created.id);
}

#[tokio::test]
async fn test_booking_for_unknown_service_has_no_join() {
    let (_, services) = seeded();

    let created = services
        .bookings()
        .create_booking(booking_for(Uuid::from_u128(0xBEEF)))
        .await
        .unwrap();

    let bookings = services.bookings().get_bookings(USER).await.unwrap();
    let listed = bookings.iter().find(|b| b.id == created.id).unwrap();
    assert!(listed.service.is_none());
}

#[tokio::test]
async fn test_deleted_booking_disappears() {
    let (_, services) = seeded();
    let before = services.bookings().get_bookings(USER).await.unwrap();
    let target = before[0].id;

    services.bookings().delete_booking(target).await.unwrap();

    let after = services.bookings().get_bookings(USER).await.unwrap();
    assert_eq!(after.len(), before.len() - 1);
    assert!(after.iter().all(|b| b.id != target));
}

#[tokio::test]
async fn test_booking_status_transition() {
    let (_, services) = seeded();
    let booking = services.bookings().get_bookings(USER).await.unwrap().remove(0);

    let updated = services
        .bookings()
        .update_booking(booking.id, BookingUpdate::status(BookingStatus::Cancelled))
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::Cancelled);
    assert!(!updated.is_current());
}

#[tokio::test]
async fn test_subscriptions_sorted_by_price() {
    let client = Arc::new(MemoryDataClient::new());
    for (name, price) in [("Enterprise", 399), ("Basic", 99), ("Free", 0), ("Pro", 199)] {
        client
            .insert(
                Table::Subscriptions,
                vec![json!({ "name": name, "price": price })],
            )
            .await
            .unwrap();
    }
    let services = Marketplace::from_client(client);

    let plans = services.subscriptions().get_subscriptions().await.unwrap();
    let prices: Vec<f64> = plans.iter().map(|p| p.price).collect();

    assert_eq!(prices, vec![0.0, 99.0, 199.0, 399.0]);
}

#[tokio::test]
async fn test_reviews_join_author_newest_first() {
    let (_, services) = seeded();
    let service = fallback::services().remove(0);

    let created = services
        .reviews()
        .create_review(NewReview {
            service_id: service.id,
            user_id: USER,
            rating: 4,
            comment: "Tight tolerances".to_string(),
        })
        .await
        .unwrap();

    let reviews = services.reviews().get_reviews(service.id).await.unwrap();

    assert_eq!(reviews.len(), 4);
    // the newest review's author has no profile row
    assert_eq!(reviews[0].id, created.id);
    assert!(reviews[0].user.is_none());
    assert_eq!(
        reviews[1].user.as_ref().map(|u| u.name.as_str()),
        Some("John Smith")
    );
}

#[tokio::test]
async fn test_missing_profile_is_placeholder() {
    let (_, services) = seeded();

    let profile = services.profiles().get_user_profile(USER).await.unwrap();

    assert_eq!(profile.id, USER);
    assert_eq!(profile.name, "User");
    assert_eq!(profile.email, "");
    assert_eq!(profile.phone, "");
}

#[tokio::test]
async fn test_profile_update_inserts_once() {
    let (client, services) = seeded();

    let first = services
        .profiles()
        .update_user_profile(USER, ProfileUpdate::name("X"))
        .await
        .unwrap();
    let second = services
        .profiles()
        .update_user_profile(USER, ProfileUpdate::name("X"))
        .await
        .unwrap();

    assert_eq!(first.id, USER);
    assert_eq!(first.name, "X");
    assert_eq!(second.name, "X");

    let rows = client.rows(Table::Users).await;
    let owned = rows
        .iter()
        .filter(|r| r["id"] == json!(USER.to_string()))
        .count();
    assert_eq!(owned, 1);

    let profile = services.profiles().get_user_profile(USER).await.unwrap();
    assert_eq!(profile.name, "X");
}

#[tokio::test]
async fn test_failed_load_falls_back() {
    let (client, services) = seeded();
    client
        .fail_with(BackendError::Network("offline".to_string()))
        .await;

    let loaded = load_or_fallback(
        services.catalog().get_services().await,
        fallback::services,
    );

    assert!(loaded.is_fallback());
    assert_eq!(loaded.data.len(), 6);
}
