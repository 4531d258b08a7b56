//! End-to-end room lifecycle: checkout intent, placement, self-service,
//! staff administration.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use std::sync::Arc;

use roomshare_core::{
    Actor, AuditAction, CartRoomState, InMemoryRoomStore, LeaveOutcome, LifecycleHooks,
    MaterializeOutcome, MembershipLedger, OrderSnapshot, PasswordChangeOutcome, RoomRegistry,
    RoomStep, RoomStepInput, RoomStore, StepCompletion,
};
use roomshare_testing::{
    CartBuilder, InMemoryOrderDirectory, OrderBuilder, StaticGate, test_clock, ticket,
};

struct Rig {
    store: Arc<InMemoryRoomStore>,
    directory: Arc<InMemoryOrderDirectory>,
    registry: Arc<RoomRegistry>,
    ledger: MembershipLedger,
    step: Arc<RoomStep>,
    hooks: LifecycleHooks,
}

fn rig() -> Rig {
    let store = Arc::new(InMemoryRoomStore::new());
    let directory = Arc::new(InMemoryOrderDirectory::new());
    let gate = Arc::new(StaticGate::allow_all());
    let clock = Arc::new(test_clock());
    let registry = Arc::new(RoomRegistry::new(store.clone(), gate.clone(), clock.clone()));
    let ledger = MembershipLedger::new(store.clone(), directory.clone(), gate, clock.clone());
    let step = Arc::new(RoomStep::new(
        registry.clone(),
        store.clone(),
        directory.clone(),
    ));
    let materializer = Arc::new(roomshare_core::OrderMaterializer::new(store.clone(), clock));
    let hooks = LifecycleHooks::standard(step.clone(), materializer);
    Rig {
        store,
        directory,
        registry,
        ledger,
        step,
        hooks,
    }
}

/// Runs one buyer through checkout and placement, returning their order.
async fn place_order(rig: &Rig, event: roomshare_core::EventId, code: &str, input: RoomStepInput) -> OrderSnapshot {
    let cart = CartBuilder::new(event)
        .line(ticket("Weekend Pass"), None)
        .build();
    let mut state = CartRoomState::default();
    rig.step.submit(&mut state, &cart, &input).await.unwrap();
    assert_eq!(
        rig.step.is_complete(&state, &cart).await.unwrap(),
        StepCompletion::Complete
    );
    let intent = rig.hooks.meta.order_meta(&state);
    let order = OrderBuilder::new(event, code)
        .paid()
        .admission(ticket("Weekend Pass"), None)
        .display_name(&format!("Buyer {code}"))
        .build();
    rig.directory.add_order(order.clone());
    rig.hooks
        .placed
        .order_placed(event, order.id, intent)
        .await
        .unwrap();
    order
}

#[tokio::test]
async fn two_buyers_share_one_room_and_see_each_other() {
    let rig = rig();
    let event = rig.directory.add_event("megacorp", "con-2025", false).id;

    let alice = place_order(
        &rig,
        event,
        "ALICE",
        RoomStepInput::Create {
            name: "Alpha".to_owned(),
            password: "xyz123".to_owned(),
        },
    )
    .await;
    let bob = place_order(
        &rig,
        event,
        "BOB22",
        RoomStepInput::Join {
            name: "Alpha".to_owned(),
            password: "xyz123".to_owned(),
        },
    )
    .await;

    let alice_membership = rig.store.membership(alice.id).await.unwrap().unwrap();
    let bob_membership = rig.store.membership(bob.id).await.unwrap().unwrap();
    assert!(alice_membership.is_admin);
    assert!(!bob_membership.is_admin);
    assert_eq!(alice_membership.room, bob_membership.room);

    let fellows_of_alice = rig.ledger.fellow_members(event, alice.id).await.unwrap();
    assert_eq!(fellows_of_alice.len(), 1);
    assert_eq!(fellows_of_alice[0].code, "BOB22");
    let fellows_of_bob = rig.ledger.fellow_members(event, bob.id).await.unwrap();
    assert_eq!(fellows_of_bob.len(), 1);
    assert_eq!(fellows_of_bob[0].code, "ALICE");
}

#[tokio::test]
async fn self_service_leave_rejoin_and_password_change() {
    let rig = rig();
    let event = rig.directory.add_event("megacorp", "con-2025", false).id;

    let alice = place_order(
        &rig,
        event,
        "ALICE",
        RoomStepInput::Create {
            name: "Alpha".to_owned(),
            password: "xyz123".to_owned(),
        },
    )
    .await;
    let bob = place_order(
        &rig,
        event,
        "BOB22",
        RoomStepInput::Join {
            name: "Alpha".to_owned(),
            password: "xyz123".to_owned(),
        },
    )
    .await;
    let room = rig.store.membership(alice.id).await.unwrap().unwrap().room;

    // Bob leaves; the room stays even if it empties.
    assert_eq!(
        rig.ledger
            .leave(event, bob.id, &Actor::Order(bob.id))
            .await
            .unwrap(),
        LeaveOutcome::Left { room }
    );
    assert!(rig.store.membership(bob.id).await.unwrap().is_none());
    assert!(rig.store.room(event, room).await.unwrap().is_some());

    // Alice rotates the password; Bob rejoins with the new one.
    assert_eq!(
        rig.ledger
            .change_password(event, alice.id, "newpw1", &Actor::Order(alice.id))
            .await
            .unwrap(),
        PasswordChangeOutcome::Changed
    );
    let found = rig.registry.find_by_name(event, "Alpha").await.unwrap();
    assert!(
        roomshare_core::password::verify_password(&found.password_hash, "newpw1").unwrap()
    );
    rig.ledger
        .join(event, found.id, bob.id, false, &Actor::Order(bob.id))
        .await
        .unwrap();
    assert_eq!(
        rig.store.membership(bob.id).await.unwrap().unwrap().room,
        room
    );
}

#[tokio::test]
async fn staff_delete_cascades_and_the_audit_trail_tells_the_story() {
    let rig = rig();
    let event = rig.directory.add_event("megacorp", "con-2025", false).id;
    let staff = Actor::Staff("jo".to_owned());

    let alice = place_order(
        &rig,
        event,
        "ALICE",
        RoomStepInput::Create {
            name: "Alpha".to_owned(),
            password: "xyz123".to_owned(),
        },
    )
    .await;
    let bob = place_order(
        &rig,
        event,
        "BOB22",
        RoomStepInput::Join {
            name: "Alpha".to_owned(),
            password: "xyz123".to_owned(),
        },
    )
    .await;
    let room = rig.store.membership(alice.id).await.unwrap().unwrap().room;

    let removed = rig.registry.delete(event, room, &staff).await.unwrap();
    assert_eq!(removed, 2);
    assert!(rig.store.room(event, room).await.unwrap().is_none());
    assert!(rig.store.membership(alice.id).await.unwrap().is_none());
    assert!(rig.store.membership(bob.id).await.unwrap().is_none());

    let alice_log: Vec<_> = rig
        .store
        .audit_log(alice.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        alice_log,
        vec![AuditAction::RoomCreated, AuditAction::OrderLeft]
    );
    let bob_log: Vec<_> = rig
        .store
        .audit_log(bob.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        bob_log,
        vec![AuditAction::OrderJoined, AuditAction::OrderLeft]
    );
}

#[tokio::test]
async fn deleting_a_room_between_checkout_and_placement_skips_quietly() {
    let rig = rig();
    let event = rig.directory.add_event("megacorp", "con-2025", false).id;
    let staff = Actor::Staff("jo".to_owned());

    let cart = CartBuilder::new(event)
        .line(ticket("Weekend Pass"), None)
        .build();
    let mut state = CartRoomState::default();
    rig.step
        .submit(
            &mut state,
            &cart,
            &RoomStepInput::Create {
                name: "Alpha".to_owned(),
                password: "xyz123".to_owned(),
            },
        )
        .await
        .unwrap();
    let intent = rig.hooks.meta.order_meta(&state);

    // Staff sweeps the pending room away before the order lands.
    let pending = state.pending_create.unwrap();
    rig.registry.delete(event, pending, &staff).await.unwrap();

    let order = OrderBuilder::new(event, "LATE1").paid().build();
    rig.directory.add_order(order.clone());
    let outcome = rig
        .hooks
        .placed
        .order_placed(event, order.id, intent)
        .await
        .unwrap();
    assert_eq!(outcome, MaterializeOutcome::RoomVanished);
    assert!(rig.store.membership(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn read_only_staff_cannot_delete_rooms() {
    let store = Arc::new(InMemoryRoomStore::new());
    let clock = Arc::new(test_clock());
    let registry = RoomRegistry::new(store.clone(), Arc::new(StaticGate::read_only()), clock);
    let event = roomshare_core::EventId::new();
    let room = registry
        .create_or_update(event, None, "Alpha", "xyz123", None)
        .await
        .unwrap();
    assert_eq!(
        registry
            .delete(event, room.id, &Actor::Staff("jo".to_owned()))
            .await,
        Err(roomshare_core::RoomError::PermissionDenied)
    );
}
