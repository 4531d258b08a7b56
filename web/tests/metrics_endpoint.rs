//! Tests for the Prometheus exposition endpoint and its Basic-auth guard.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use roomshare_core::types::Actor;
use roomshare_core::InMemoryRoomStore;
use roomshare_testing::{
    test_clock, ticket, InMemoryOrderDirectory, InMemorySettingsStore, OrderBuilder, StaticGate,
};
use roomshare_web::{router, AppState, MetricsAuth};

/// One paid, housed order on `megacorp/conf`, guarded by the given
/// credentials (or left unguarded).
async fn server(auth: Option<MetricsAuth>) -> TestServer {
    let directory = Arc::new(InMemoryOrderDirectory::new());
    let event = directory.add_event("megacorp", "conf", false);
    let pass = ticket("Weekend Pass");
    directory.set_products(event.id, vec![pass.clone()]);
    let order = OrderBuilder::new(event.id, "AAAAA")
        .paid()
        .admission(pass, None)
        .build();
    let order_id = order.id;
    directory.add_order(order);

    let state = AppState::new(
        directory,
        Arc::new(InMemorySettingsStore::new()),
        Arc::new(StaticGate::deny_all()),
        Arc::new(InMemoryRoomStore::new()),
        Arc::new(test_clock()),
    )
    .with_metrics_auth(auth);
    let room = state
        .registry
        .create_or_update(event.id, None, "Night Owls", "hoot hoot", None)
        .await
        .unwrap();
    state
        .ledger
        .join(event.id, room.id, order_id, true, &Actor::System)
        .await
        .unwrap();

    TestServer::new(router(state)).unwrap()
}

fn basic(user: &str, passphrase: &str) -> HeaderValue {
    let token = STANDARD.encode(format!("{user}:{passphrase}"));
    HeaderValue::try_from(format!("Basic {token}")).unwrap()
}

const PATH: &str = "/metrics/rooms/megacorp/conf";

#[tokio::test]
async fn correct_credentials_render_the_exposition() {
    let server = server(Some(MetricsAuth::new("scraper", "hunter2"))).await;
    let response = server
        .get(PATH)
        .add_header(header::AUTHORIZATION, basic("scraper", "hunter2"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4"
    );

    let body = response.text();
    assert!(body.contains(
        "roomshare_paid{product=\"Weekend Pass\",subevent=\"\",has_room=\"true\"} 1\n"
    ));
    assert!(body.contains(
        "roomshare_paid_unique_rooms{product=\"Weekend Pass\",subevent=\"\"} 1\n"
    ));
}

#[tokio::test]
async fn every_failure_mode_answers_the_same_401() {
    let server = server(Some(MetricsAuth::new("scraper", "hunter2"))).await;

    let missing = server.get(PATH).await;
    let wrong_passphrase = server
        .get(PATH)
        .add_header(header::AUTHORIZATION, basic("scraper", "wrong"))
        .await;
    let unknown_user = server
        .get(PATH)
        .add_header(header::AUTHORIZATION, basic("intruder", "hunter2"))
        .await;
    let malformed = server
        .get(PATH)
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic not!base64"),
        )
        .await;

    for response in [&missing, &wrong_passphrase, &unknown_user, &malformed] {
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
    assert_eq!(missing.text(), wrong_passphrase.text());
    assert_eq!(missing.text(), unknown_user.text());
    assert_eq!(missing.text(), malformed.text());
}

#[tokio::test]
async fn unconfigured_credentials_reject_everything() {
    let server = server(None).await;

    // Even a well-formed header is turned away when no credentials were
    // ever configured; the response is indistinguishable from bad ones.
    let response = server
        .get(PATH)
        .add_header(header::AUTHORIZATION, basic("scraper", "hunter2"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ops_metrics_route_is_404_until_a_recorder_is_installed() {
    let server = server(Some(MetricsAuth::new("scraper", "hunter2"))).await;
    let response = server.get("/internal/metrics").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
