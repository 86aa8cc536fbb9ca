//! Tests for the refresh worker and poller against a fake LI-COR endpoint.
//!
//! Run with: cargo test --test refresh_test

mod common;

use axum::http::StatusCode;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde_json::json;
use std::time::Duration;

use common::{sample_payload, FakeLicor, LOGGER, TOKEN};
use station_dash::dashboard::RangeSelection;
use station_dash::error::AppError;
use station_dash::sync::scheduler::run_poller;
use station_dash::sync::worker::{refresh, select_and_refresh, Refresh, Trigger};

fn parse_api(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[tokio::test]
async fn user_refresh_publishes_aggregated_snapshot() {
    let upstream = FakeLicor::start().await;
    upstream.respond(StatusCode::OK, sample_payload());
    let state = upstream.app_state(&[]);

    let Refresh::Published(snapshot) = refresh(&state, Trigger::User).await.unwrap() else {
        panic!("expected a published snapshot");
    };

    assert_eq!(snapshot.records.len(), 2);
    assert_eq!(snapshot.records[0].timestamp, "2025-06-01 10:00:00");
    assert_eq!(snapshot.records[0].relative_humidity, Some(55.0));
    assert_eq!(snapshot.records[1].wind_direction, Some(90.0));
    assert!(snapshot.error.is_none());
    assert!(!snapshot.loading);
    assert!(snapshot.fetched_at.is_some());

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization, format!("Bearer {TOKEN}"));
    assert_eq!(requests[0].query["loggers"], LOGGER);

    let start = parse_api(&requests[0].query["start_date_time"]);
    let end = parse_api(&requests[0].query["end_date_time"]);
    assert_eq!(end - start, chrono::Duration::hours(24));
}

#[tokio::test]
async fn upstream_error_publishes_failed_snapshot() {
    let upstream = FakeLicor::start().await;
    upstream.respond(StatusCode::OK, sample_payload());
    let state = upstream.app_state(&[]);
    refresh(&state, Trigger::User).await.unwrap();

    upstream.respond(StatusCode::UNAUTHORIZED, json!({ "error": "bad token" }));
    let err = refresh(&state, Trigger::User).await.unwrap_err();

    assert!(matches!(err, AppError::LicorApi(_)));
    assert!(!err.is_rate_limited());

    let snapshot = state.dashboard.snapshot();
    assert!(snapshot.error.as_deref().unwrap().contains("HTTP 401"));
    assert!(snapshot.records.is_empty());
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn upstream_429_is_reported_as_rate_limited() {
    let upstream = FakeLicor::start().await;
    upstream.respond(StatusCode::TOO_MANY_REQUESTS, json!({}));
    let state = upstream.app_state(&[]);

    let err = refresh(&state, Trigger::User).await.unwrap_err();
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn empty_window_is_not_an_error() {
    let upstream = FakeLicor::start().await;
    upstream.respond(StatusCode::OK, json!({ "data": [] }));
    let state = upstream.app_state(&[]);

    let Refresh::Published(snapshot) = refresh(&state, Trigger::User).await.unwrap() else {
        panic!("expected a published snapshot");
    };
    assert!(snapshot.records.is_empty());
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn custom_range_is_fetched_once_and_not_polled() {
    let upstream = FakeLicor::start().await;
    upstream.respond(StatusCode::OK, sample_payload());
    let state = upstream.app_state(&[]);

    let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let selection = RangeSelection::custom(start, end, 744).unwrap();

    let outcome = select_and_refresh(&state, selection).await.unwrap();
    assert!(matches!(outcome, Refresh::Published(_)));

    let requests = upstream.requests();
    assert_eq!(requests[0].query["start_date_time"], "2025-06-01 00:00:00");
    assert_eq!(requests[0].query["end_date_time"], "2025-06-01 12:00:00");

    let outcome = refresh(&state, Trigger::Poll).await.unwrap();
    assert!(matches!(outcome, Refresh::Skipped));
    assert_eq!(upstream.requests().len(), 1);

    // A manual refresh re-fetches the same fixed window
    refresh(&state, Trigger::User).await.unwrap();
    let requests = upstream.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].query["start_date_time"], "2025-06-01 00:00:00");
}

#[tokio::test]
async fn poll_is_skipped_while_refresh_in_flight() {
    let upstream = FakeLicor::start().await;
    let state = upstream.app_state(&[]);

    let guard = state.dashboard.lock_refresh().await;
    let outcome = refresh(&state, Trigger::Poll).await.unwrap();
    drop(guard);

    assert!(matches!(outcome, Refresh::Skipped));
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn fetch_for_superseded_selection_is_discarded() {
    let upstream = FakeLicor::start().await;
    upstream.respond(StatusCode::OK, sample_payload());
    upstream.delay(Duration::from_millis(300));
    let state = upstream.app_state(&[]);

    let in_flight = {
        let state = state.clone();
        tokio::spawn(async move { refresh(&state, Trigger::User).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    state.dashboard.select(RangeSelection::Live { hours: 1 });

    let outcome = in_flight.await.unwrap().unwrap();
    assert!(matches!(outcome, Refresh::Superseded));

    let snapshot = state.dashboard.snapshot();
    assert_eq!(snapshot.selection, RangeSelection::Live { hours: 1 });
    assert!(snapshot.loading);
    assert!(snapshot.records.is_empty());
}

#[tokio::test]
async fn poller_fetches_on_startup() {
    let upstream = FakeLicor::start().await;
    upstream.respond(StatusCode::OK, sample_payload());
    let state = upstream.app_state(&[]);
    let mut updates = state.dashboard.subscribe();

    let poller = tokio::spawn(run_poller(state.clone()));

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("poller published in time")
        .unwrap();
    poller.abort();

    let snapshot = state.dashboard.snapshot();
    assert_eq!(snapshot.records.len(), 2);
    assert!(snapshot.fetched_at.is_some());
}
