//! Operational counters for the engine.
//!
//! Business statistics (per-event ticket/room breakdowns) live in
//! `roomshare-projections`; these counters only track engine activity for
//! the operations dashboard. Call [`describe_ops_metrics`] once at startup
//! so the exporter has metadata, then components record as they go.

use metrics::{counter, describe_counter};

/// Registers descriptions for all engine counters.
pub fn describe_ops_metrics() {
    describe_counter!(
        "roomshare_rooms_created_total",
        "Rooms created through checkout or post-placement modification"
    );
    describe_counter!(
        "roomshare_rooms_deleted_total",
        "Rooms deleted by staff, cascading their memberships"
    );
    describe_counter!(
        "roomshare_joins_total",
        "Memberships created (checkout materialization, joins, reassignments)"
    );
    describe_counter!(
        "roomshare_leaves_total",
        "Memberships removed (leaves, reassignments, room deletion cascades)"
    );
    describe_counter!(
        "roomshare_password_changes_total",
        "Room password changes by room admins or staff"
    );
    describe_counter!(
        "roomshare_materializations_total",
        "Order-placement materializer runs, labeled by outcome"
    );
}

/// Records a room creation.
pub fn record_room_created() {
    counter!("roomshare_rooms_created_total").increment(1);
}

/// Records a room deletion that cascaded `members` memberships.
pub fn record_room_deleted(members: u64) {
    counter!("roomshare_rooms_deleted_total").increment(1);
    counter!("roomshare_leaves_total").increment(members);
}

/// Records a membership creation.
pub fn record_join() {
    counter!("roomshare_joins_total").increment(1);
}

/// Records a voluntary or administrative membership removal.
pub fn record_leave() {
    counter!("roomshare_leaves_total").increment(1);
}

/// Records a room password change.
pub fn record_password_change() {
    counter!("roomshare_password_changes_total").increment(1);
}

/// Records one materializer run with its outcome label.
pub fn record_materialization(outcome: &'static str) {
    counter!("roomshare_materializations_total", "outcome" => outcome).increment(1);
}
