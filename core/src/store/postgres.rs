//! Postgres-backed room store.
//!
//! Every mutating call runs in one transaction covering the row change and
//! its audit entries. Uniqueness of `(event, name)` and the
//! one-membership-per-order rule live in the schema, so concurrent creates
//! racing on the same name are settled by the database and the loser sees
//! `duplicate_name`. Hosts that want the materializer atomic with order
//! placement should run both on the same connection/transaction boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::audit::{AuditAction, AuditEntry};
use crate::error::{Result, RoomError};
use crate::store::RoomStore;
use crate::types::{Actor, EventId, Membership, OrderId, Room, RoomId};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS roomshare_rooms (
        id UUID PRIMARY KEY,
        event UUID NOT NULL,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created TIMESTAMPTZ NOT NULL,
        CONSTRAINT roomshare_rooms_event_name_key UNIQUE (event, name)
    )",
    "CREATE TABLE IF NOT EXISTS roomshare_memberships (
        order_id UUID PRIMARY KEY,
        room UUID NOT NULL REFERENCES roomshare_rooms(id) ON DELETE CASCADE,
        is_admin BOOLEAN NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS roomshare_memberships_room_idx
        ON roomshare_memberships (room)",
    "CREATE TABLE IF NOT EXISTS roomshare_audit_log (
        id UUID PRIMARY KEY,
        at TIMESTAMPTZ NOT NULL,
        actor JSONB NOT NULL,
        event UUID NOT NULL,
        order_id UUID,
        room UUID,
        action TEXT NOT NULL,
        data JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS roomshare_audit_log_order_idx
        ON roomshare_audit_log (order_id)",
];

/// Room store backed by Postgres.
#[derive(Clone)]
pub struct PostgresRoomStore {
    pool: PgPool,
}

impl PostgresRoomStore {
    /// Creates a store using an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL with a small dedicated pool.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::Storage`] if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| RoomError::Storage(format!("Failed to connect: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Creates the engine's tables and indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::Storage`] if a DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RoomError::Storage(format!("Schema bootstrap failed: {e}")))?;
        }
        Ok(())
    }

    /// The underlying connection pool, for host transaction plumbing.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_db(context: &str, e: sqlx::Error) -> RoomError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some("23505") => {
                return if db.constraint() == Some("roomshare_memberships_pkey") {
                    RoomError::AlreadyInRoom
                } else {
                    RoomError::DuplicateName
                };
            }
            Some("23503") => return RoomError::RoomNotFound,
            _ => {}
        }
    }
    RoomError::Storage(format!("{context}: {e}"))
}

type RoomRow = (Uuid, Uuid, String, String, DateTime<Utc>);

fn room_from_row((id, event, name, password_hash, created): RoomRow) -> Room {
    Room {
        id: RoomId::from_uuid(id),
        event: EventId::from_uuid(event),
        name,
        password_hash,
        created,
    }
}

async fn append_audit(tx: &mut Transaction<'_, Postgres>, entry: &AuditEntry) -> Result<()> {
    let actor = serde_json::to_value(&entry.actor)
        .map_err(|e| RoomError::Storage(format!("Failed to encode actor: {e}")))?;
    sqlx::query(
        "INSERT INTO roomshare_audit_log (id, at, actor, event, order_id, room, action, data)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(entry.id)
    .bind(entry.at)
    .bind(actor)
    .bind(entry.event.as_uuid())
    .bind(entry.order.map(|o| *o.as_uuid()))
    .bind(entry.room.map(|r| *r.as_uuid()))
    .bind(entry.action.key())
    .bind(&entry.data)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_db("Failed to append audit entry", e))?;
    Ok(())
}

async fn begin(pool: &PgPool) -> Result<Transaction<'_, Postgres>> {
    pool.begin()
        .await
        .map_err(|e| RoomError::Storage(format!("Failed to begin transaction: {e}")))
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<()> {
    tx.commit()
        .await
        .map_err(|e| RoomError::Storage(format!("Failed to commit: {e}")))
}

#[async_trait]
impl RoomStore for PostgresRoomStore {
    async fn room(&self, event: EventId, room: RoomId) -> Result<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as(
            "SELECT id, event, name, password_hash, created
             FROM roomshare_rooms WHERE id = $1 AND event = $2",
        )
        .bind(room.as_uuid())
        .bind(event.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db("Failed to fetch room", e))?;
        Ok(row.map(room_from_row))
    }

    async fn room_by_name(&self, event: EventId, name: &str) -> Result<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as(
            "SELECT id, event, name, password_hash, created
             FROM roomshare_rooms WHERE event = $1 AND name = $2",
        )
        .bind(event.as_uuid())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db("Failed to fetch room by name", e))?;
        Ok(row.map(room_from_row))
    }

    async fn rooms(&self, event: EventId) -> Result<Vec<Room>> {
        let rows: Vec<RoomRow> = sqlx::query_as(
            "SELECT id, event, name, password_hash, created
             FROM roomshare_rooms WHERE event = $1 ORDER BY name",
        )
        .bind(event.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db("Failed to list rooms", e))?;
        Ok(rows.into_iter().map(room_from_row).collect())
    }

    async fn membership(&self, order: OrderId) -> Result<Option<Membership>> {
        let row: Option<(Uuid, Uuid, bool)> = sqlx::query_as(
            "SELECT order_id, room, is_admin FROM roomshare_memberships WHERE order_id = $1",
        )
        .bind(order.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db("Failed to fetch membership", e))?;
        Ok(row.map(|(o, r, is_admin)| {
            Membership::new(OrderId::from_uuid(o), RoomId::from_uuid(r), is_admin)
        }))
    }

    async fn memberships_for_room(&self, room: RoomId) -> Result<Vec<Membership>> {
        let rows: Vec<(Uuid, Uuid, bool)> = sqlx::query_as(
            "SELECT order_id, room, is_admin FROM roomshare_memberships
             WHERE room = $1 ORDER BY order_id",
        )
        .bind(room.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db("Failed to list memberships", e))?;
        Ok(rows
            .into_iter()
            .map(|(o, r, is_admin)| {
                Membership::new(OrderId::from_uuid(o), RoomId::from_uuid(r), is_admin)
            })
            .collect())
    }

    async fn room_index(&self, event: EventId) -> Result<HashMap<OrderId, RoomId>> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT m.order_id, m.room
             FROM roomshare_memberships m
             JOIN roomshare_rooms r ON r.id = m.room
             WHERE r.event = $1",
        )
        .bind(event.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db("Failed to build room index", e))?;
        Ok(rows
            .into_iter()
            .map(|(o, r)| (OrderId::from_uuid(o), RoomId::from_uuid(r)))
            .collect())
    }

    async fn audit_log(&self, order: OrderId) -> Result<Vec<AuditEntry>> {
        type AuditRow = (
            Uuid,
            DateTime<Utc>,
            Value,
            Uuid,
            Option<Uuid>,
            Option<Uuid>,
            String,
            Value,
        );
        let rows: Vec<AuditRow> = sqlx::query_as(
            "SELECT id, at, actor, event, order_id, room, action, data
             FROM roomshare_audit_log WHERE order_id = $1 ORDER BY at, id",
        )
        .bind(order.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db("Failed to read audit log", e))?;

        rows.into_iter()
            .map(|(id, at, actor, event, order_id, room, action, data)| {
                let actor: Actor = serde_json::from_value(actor)
                    .map_err(|e| RoomError::Storage(format!("Corrupt audit actor: {e}")))?;
                let action = AuditAction::from_key(&action)
                    .ok_or_else(|| RoomError::Storage(format!("Unknown audit action: {action}")))?;
                Ok(AuditEntry {
                    id,
                    at,
                    actor,
                    event: EventId::from_uuid(event),
                    order: order_id.map(OrderId::from_uuid),
                    room: room.map(RoomId::from_uuid),
                    action,
                    data,
                })
            })
            .collect()
    }

    async fn insert_room(&self, room: &Room, audit: &[AuditEntry]) -> Result<()> {
        let mut tx = begin(&self.pool).await?;
        sqlx::query(
            "INSERT INTO roomshare_rooms (id, event, name, password_hash, created)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(room.id.as_uuid())
        .bind(room.event.as_uuid())
        .bind(&room.name)
        .bind(&room.password_hash)
        .bind(room.created)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db("Failed to insert room", e))?;
        for entry in audit {
            append_audit(&mut tx, entry).await?;
        }
        commit(tx).await
    }

    async fn update_room(&self, room: &Room, audit: &[AuditEntry]) -> Result<()> {
        let mut tx = begin(&self.pool).await?;
        let result = sqlx::query(
            "UPDATE roomshare_rooms SET name = $3, password_hash = $4
             WHERE id = $1 AND event = $2",
        )
        .bind(room.id.as_uuid())
        .bind(room.event.as_uuid())
        .bind(&room.name)
        .bind(&room.password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db("Failed to update room", e))?;
        if result.rows_affected() == 0 {
            return Err(RoomError::RoomNotFound);
        }
        for entry in audit {
            append_audit(&mut tx, entry).await?;
        }
        commit(tx).await
    }

    async fn delete_room(
        &self,
        event: EventId,
        room: RoomId,
        audit: &[AuditEntry],
    ) -> Result<Vec<Membership>> {
        let mut tx = begin(&self.pool).await?;
        let removed: Vec<(Uuid, Uuid, bool)> = sqlx::query_as(
            "SELECT order_id, room, is_admin FROM roomshare_memberships
             WHERE room = $1 FOR UPDATE",
        )
        .bind(room.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_db("Failed to collect memberships", e))?;

        let result = sqlx::query("DELETE FROM roomshare_rooms WHERE id = $1 AND event = $2")
            .bind(room.as_uuid())
            .bind(event.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db("Failed to delete room", e))?;
        if result.rows_affected() == 0 {
            return Err(RoomError::RoomNotFound);
        }
        for entry in audit {
            append_audit(&mut tx, entry).await?;
        }
        commit(tx).await?;
        Ok(removed
            .into_iter()
            .map(|(o, r, is_admin)| {
                Membership::new(OrderId::from_uuid(o), RoomId::from_uuid(r), is_admin)
            })
            .collect())
    }

    async fn insert_membership(&self, membership: &Membership, audit: &[AuditEntry]) -> Result<()> {
        let mut tx = begin(&self.pool).await?;
        sqlx::query(
            "INSERT INTO roomshare_memberships (order_id, room, is_admin)
             VALUES ($1, $2, $3)",
        )
        .bind(membership.order.as_uuid())
        .bind(membership.room.as_uuid())
        .bind(membership.is_admin)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db("Failed to insert membership", e))?;
        for entry in audit {
            append_audit(&mut tx, entry).await?;
        }
        commit(tx).await
    }

    async fn remove_membership(
        &self,
        order: OrderId,
        audit: &[AuditEntry],
    ) -> Result<Option<Membership>> {
        let mut tx = begin(&self.pool).await?;
        let removed: Option<(Uuid, Uuid, bool)> = sqlx::query_as(
            "DELETE FROM roomshare_memberships WHERE order_id = $1
             RETURNING order_id, room, is_admin",
        )
        .bind(order.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db("Failed to remove membership", e))?;
        if removed.is_some() {
            for entry in audit {
                append_audit(&mut tx, entry).await?;
            }
        }
        commit(tx).await?;
        Ok(removed.map(|(o, r, is_admin)| {
            Membership::new(OrderId::from_uuid(o), RoomId::from_uuid(r), is_admin)
        }))
    }
}
