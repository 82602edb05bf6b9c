//! End-to-end flows over the in-memory store: moderation, notifications,
//! engagement and the dashboards that read them.

mod common;

use std::sync::Arc;
use std::time::Duration;

use crate::common::{create_active_listing, create_pending_listing, new_listing};
use marketplace_core::common::{Actor, MarketplaceError, MemberId};
use marketplace_core::domains::analytics::AggregationEngine;
use marketplace_core::domains::engagement::EngagementRecorder;
use marketplace_core::domains::listings::{
    get_listing, transition, ListingStatus, ListingType, PropertyType,
};
use marketplace_core::domains::notifications::{notifications_for, NotificationType};
use marketplace_core::kernel::TestDependencies;

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn approving_a_listing_notifies_owner_and_counts_as_active() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let engine = AggregationEngine::new(deps.clone());
    let listing = create_pending_listing(&deps, 150_000, "Lisbon").await;
    assert_eq!(listing.status, ListingStatus::Pending);
    let before = engine.totals().await.unwrap();

    transition(
        &deps,
        &Actor::member(MemberId::new()),
        listing.id,
        ListingStatus::Active,
        None,
    )
    .await
    .unwrap();

    let notices = notifications_for(&deps, listing.owner_id, 10).await.unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].notification_type, NotificationType::Approval);
    assert_eq!(notices[0].listing_id, listing.id);

    let after = engine.totals().await.unwrap();
    assert_eq!(after.active_listings, before.active_listings + 1);
}

#[tokio::test]
async fn sale_price_lands_in_exactly_one_bucket() {
    let deps = TestDependencies::new().server_deps();
    create_pending_listing(&deps, 75_000, "Porto").await;

    let buckets = AggregationEngine::new(deps).price_distribution().await.unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].bucket_label, "50k–100k");
    assert_eq!(buckets[0].count, 1);
}

#[tokio::test]
async fn views_and_favorites_are_counted_per_session_and_actor() {
    let deps = TestDependencies::new().server_deps();
    let listing = create_pending_listing(&deps, 300_000, "Faro").await;
    let recorder = EngagementRecorder::new(deps.clone());

    for session in ["s-1", "s-2", "s-3"] {
        recorder.record_view(listing.id, session, None).await.unwrap();
    }
    for _ in 0..2 {
        recorder
            .toggle_favorite(listing.id, MemberId::new())
            .await
            .unwrap();
    }

    assert_eq!(recorder.count_views(listing.id, None).await.unwrap(), 3);
    assert_eq!(recorder.count_favorites(listing.id).await.unwrap(), 2);
}

#[tokio::test]
async fn rejected_listing_is_terminal_for_members() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let listing = create_pending_listing(&deps, 90_000, "Braga").await;
    let moderator = Actor::member(MemberId::new());

    let rejected = transition(
        &deps,
        &moderator,
        listing.id,
        ListingStatus::Rejected,
        Some("incomplete photos"),
    )
    .await
    .unwrap();
    assert_eq!(rejected.status, ListingStatus::Rejected);

    let notices = test_deps.store.notifications();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].notification_type, NotificationType::Rejection);
    assert!(notices[0].message.contains("incomplete photos"));

    let err = transition(&deps, &moderator, listing.id, ListingStatus::Active, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MarketplaceError::InvalidTransition {
            from: ListingStatus::Rejected,
            to: ListingStatus::Active,
        }
    ));
    assert_eq!(
        get_listing(&deps, listing.id).await.unwrap().status,
        ListingStatus::Rejected
    );
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn illegal_member_transitions_leave_status_unchanged() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let member = Actor::member(MemberId::new());

    for from in ListingStatus::ALL {
        for to in ListingStatus::ALL {
            if from.can_transition_to(to) {
                continue;
            }
            let listing = create_pending_listing(&deps, 1_000, "Evora").await;
            test_deps.store.force_status(listing.id, from).unwrap();

            let err = transition(&deps, &member, listing.id, to, Some("reason"))
                .await
                .unwrap_err();

            assert!(
                matches!(err, MarketplaceError::InvalidTransition { .. }),
                "{} -> {} should be refused",
                from,
                to
            );
            assert_eq!(get_listing(&deps, listing.id).await.unwrap().status, from);
        }
    }
    assert!(test_deps.store.notifications().is_empty());
}

#[tokio::test]
async fn admin_can_reinstate_a_rejected_listing() {
    let deps = TestDependencies::new().server_deps();
    let listing = create_pending_listing(&deps, 120_000, "Aveiro").await;
    let admin = Actor::admin(MemberId::new());

    transition(&deps, &admin, listing.id, ListingStatus::Rejected, Some("duplicate"))
        .await
        .unwrap();
    let reinstated = transition(&deps, &admin, listing.id, ListingStatus::Pending, None)
        .await
        .unwrap();

    assert_eq!(reinstated.status, ListingStatus::Pending);
    assert_eq!(reinstated.reviewed_by, Some(admin.member_id()));
    assert_eq!(reinstated.rejection_reason, None);
}

#[tokio::test]
async fn rejection_without_reason_creates_no_notification() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.server_deps();
    let listing = create_pending_listing(&deps, 10_000, "Leiria").await;

    let err = transition(
        &deps,
        &Actor::admin(MemberId::new()),
        listing.id,
        ListingStatus::Rejected,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MarketplaceError::Validation(_)));
    assert_eq!(err.user_message(), "a rejection reason is required");
    assert!(test_deps.store.notifications().is_empty());
}

#[tokio::test]
async fn type_distribution_sums_to_active_total() {
    let deps = TestDependencies::new().server_deps();
    for (property_type, listing_type, price) in [
        (PropertyType::Apartment, ListingType::Rent, 800),
        (PropertyType::Apartment, ListingType::Sale, 210_000),
        (PropertyType::Commercial, ListingType::Rent, 2_500),
        (PropertyType::Land, ListingType::Sale, 40_000),
    ] {
        create_active_listing(&deps, new_listing(property_type, listing_type, price, "Sintra"))
            .await;
    }
    create_pending_listing(&deps, 99_000, "Sintra").await;

    let engine = AggregationEngine::new(deps);
    let shares = engine.distribution_by_type(ListingStatus::Active).await.unwrap();

    let sum: u64 = shares.iter().map(|s| s.count).sum();
    assert_eq!(sum, engine.totals().await.unwrap().active_listings);
    assert!(shares.iter().all(|s| s.property_type != PropertyType::House));
}

#[tokio::test]
async fn same_session_views_collapse_across_concurrent_requests() {
    let deps = TestDependencies::new().server_deps();
    let listing = create_pending_listing(&deps, 65_000, "Coimbra").await;
    let recorder = Arc::new(EngagementRecorder::new(deps));
    let listing_id = listing.id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let recorder = recorder.clone();
            tokio::spawn(async move { recorder.record_view(listing_id, "tab-1", None).await })
        })
        .collect();
    let recorded = {
        let mut recorded = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().was_recorded() {
                recorded += 1;
            }
        }
        recorded
    };

    assert_eq!(recorded, 1);
    assert_eq!(recorder.count_views(listing_id, None).await.unwrap(), 1);
}

#[tokio::test]
async fn slow_store_surfaces_as_retryable_storage_error() {
    let test_deps = TestDependencies::new().store_timeout(Duration::from_millis(20));
    let deps = test_deps.server_deps();
    let listing = create_pending_listing(&deps, 65_000, "Tomar").await;
    test_deps.store.set_latency(Some(Duration::from_millis(200)));

    let err = transition(
        &deps,
        &Actor::member(MemberId::new()),
        listing.id,
        ListingStatus::Active,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MarketplaceError::Storage(_)));
    assert!(err.is_retryable());
}
