//! Demo server with seeded in-memory data.
//!
//! Runs the full HTTP surface against the in-memory store and the fake
//! order directory, so every route can be exercised without a host
//! platform behind it.
//!
//! # Running the Example
//!
//! ```bash
//! ROOMSHARE_METRICS_USER=metrics ROOMSHARE_METRICS_PASSPHRASE=scrape-me \
//!     cargo run --example demo
//! ```
//!
//! Then try:
//! - Room list: `curl -H 'x-roomshare-staff: alice' http://localhost:8374/control/event/demo/conf/rooms`
//! - Stats: `curl -H 'x-roomshare-staff: alice' http://localhost:8374/control/event/demo/conf/rooms/stats`
//! - Join: `curl -X POST http://localhost:8374/event/demo/conf/order/BBBBB/secret-b/room -H 'content-type: application/json' -d '{"action":"join","name":"Night Owls","password":"hoot hoot"}'`
//! - Metrics: `curl -u metrics:scrape-me http://localhost:8374/metrics/rooms/demo/conf`

#![allow(missing_docs)]
#![allow(clippy::expect_used)] // Examples can use expect

use std::sync::Arc;

use roomshare_core::types::Actor;
use roomshare_core::{InMemoryRoomStore, SystemClock};
use roomshare_testing::{InMemoryOrderDirectory, InMemorySettingsStore, OrderBuilder, StaticGate, ticket};
use roomshare_web::telemetry::{init_tracing, install_ops_recorder};
use roomshare_web::{router, ActorLayer, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration and telemetry
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    init_tracing(&config.log);
    let ops = if config.ops_metrics {
        install_ops_recorder()
    } else {
        None
    };

    // 2. Seed a demo event with a few orders
    let directory = Arc::new(InMemoryOrderDirectory::new());
    let event = directory.add_event("demo", "conf", false);
    let pass = ticket("Weekend Pass");
    directory.set_products(event.id, vec![pass.clone()]);

    let alice = OrderBuilder::new(event.id, "AAAAA")
        .paid()
        .secret("secret-a")
        .display_name("Alice")
        .admission(pass.clone(), None)
        .build();
    let bob = OrderBuilder::new(event.id, "BBBBB")
        .paid()
        .secret("secret-b")
        .display_name("Bob")
        .admission(pass.clone(), None)
        .build();
    let carol = OrderBuilder::new(event.id, "CCCCC")
        .secret("secret-c")
        .display_name("Carol")
        .admission(pass, None)
        .build();
    let alice_id = alice.id;
    for order in [alice, bob, carol] {
        directory.add_order(order);
    }

    // 3. Application state
    let state = AppState::new(
        directory,
        Arc::new(InMemorySettingsStore::new()),
        Arc::new(StaticGate::allow_all()),
        Arc::new(InMemoryRoomStore::new()),
        Arc::new(SystemClock),
    )
    .with_metrics_auth(config.metrics_auth())
    .with_ops_handle(ops);

    // 4. One room with Alice as its admin
    let room = state
        .registry
        .create_or_update(
            event.id,
            None,
            "Night Owls",
            "hoot hoot",
            Some((alice_id, &Actor::System)),
        )
        .await?;
    state
        .ledger
        .join(event.id, room.id, alice_id, true, &Actor::System)
        .await?;
    tracing::info!("✓ Seeded event demo/conf with room \"Night Owls\" (password: hoot hoot)");

    let app = router(state).layer(ActorLayer::from_header("x-roomshare-staff"));

    // 5. Serve
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "✓ Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
