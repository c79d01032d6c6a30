//! Per-platform sync attempt ledger.
//!
//! Every dispatched attempt gets a `pending` row before any network work
//! starts, and exactly one terminal update (`synced` or `failed`) when the
//! attempt resolves. The rows are the only durable record of fire-and-forget
//! work, so readers treat a lingering `pending` as "still running".

use crate::sync_ops::{PlatformKind, PriceUpdate};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Synced,
    Failed,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "synced" => SyncStatus::Synced,
            "failed" => SyncStatus::Failed,
            _ => SyncStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncLogEntry {
    pub id: i64,
    pub plan_name: String,
    pub plan_id: Option<i64>,
    pub old_price: Option<i64>,
    pub new_price: Option<i64>,
    pub status: SyncStatus,
    pub error_message: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// Shared handle over the sync-log tables. One table per platform so each
/// platform's history reads and prunes independently.
#[derive(Clone)]
pub struct SyncLog {
    conn: Arc<Mutex<Connection>>,
}

fn table(kind: PlatformKind) -> String {
    // slugs come from a closed enum, never from user input
    format!("{}_sync_log", kind.slug())
}

impl SyncLog {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        for kind in PlatformKind::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    plan_name TEXT NOT NULL,
                    plan_id INTEGER,
                    old_price INTEGER,
                    new_price INTEGER,
                    status TEXT NOT NULL DEFAULT 'pending',
                    error_message TEXT,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    completed_at DATETIME
                );",
                table(kind)
            ))
            .with_context(|| format!("creating {} table", table(kind)))?;
        }
        Ok(())
    }

    /// Record a dispatched attempt. The row exists before any network work
    /// so a crash mid-attempt still leaves a visible `pending` trace.
    pub async fn insert_pending(
        &self,
        kind: PlatformKind,
        plan_name: &str,
        plan_id: Option<i64>,
        old_price: Option<i64>,
        new_price: i64,
    ) -> Result<i64> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO {} (plan_name, plan_id, old_price, new_price, status)
                 VALUES (?1, ?2, ?3, ?4, 'pending')",
                table(kind)
            ),
            params![plan_name, plan_id, old_price, new_price],
        )
        .context("inserting pending sync row")?;
        Ok(conn.last_insert_rowid())
    }

    /// Resolve an attempt with its outcome. The remote-side old price, when
    /// the platform reported one, replaces the locally guessed value.
    pub async fn complete(
        &self,
        kind: PlatformKind,
        log_id: i64,
        update: &PriceUpdate,
    ) -> Result<()> {
        let status = if update.success {
            SyncStatus::Synced
        } else {
            SyncStatus::Failed
        };
        let error_message = if update.success {
            None
        } else {
            Some(update.message.as_str())
        };
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "UPDATE {} SET status = ?1, error_message = ?2,
                        old_price = COALESCE(?3, old_price),
                        completed_at = CURRENT_TIMESTAMP
                 WHERE id = ?4",
                table(kind)
            ),
            params![status.as_str(), error_message, update.old_price, log_id],
        )
        .context("completing sync row")?;
        Ok(())
    }

    /// Mark an attempt failed without a platform result (session failures,
    /// dispatch panics).
    pub async fn fail(&self, kind: PlatformKind, log_id: i64, message: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "UPDATE {} SET status = 'failed', error_message = ?1,
                        completed_at = CURRENT_TIMESTAMP
                 WHERE id = ?2",
                table(kind)
            ),
            params![message, log_id],
        )
        .context("failing sync row")?;
        Ok(())
    }

    pub async fn recent(&self, kind: PlatformKind, limit: u32) -> Result<Vec<SyncLogEntry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, plan_name, plan_id, old_price, new_price, status,
                    error_message, created_at, completed_at
             FROM {} ORDER BY id DESC LIMIT ?1",
            table(kind)
        ))?;
        let rows = stmt
            .query_map(params![limit], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("reading recent sync rows")?;
        Ok(rows)
    }

    /// Latest attempt per plan name: the dashboard's per-platform status list.
    pub async fn latest_per_target(&self, kind: PlatformKind) -> Result<Vec<SyncLogEntry>> {
        let conn = self.conn.lock().await;
        let t = table(kind);
        let mut stmt = conn.prepare(&format!(
            "SELECT id, plan_name, plan_id, old_price, new_price, status,
                    error_message, created_at, completed_at
             FROM {t}
             WHERE id IN (SELECT MAX(id) FROM {t} GROUP BY plan_name)
             ORDER BY created_at DESC"
        ))?;
        let rows = stmt
            .query_map([], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("reading latest sync rows")?;
        Ok(rows)
    }

    /// Latest status keyed by local plan id, for the cross-platform matrix.
    pub async fn latest_status_by_plan(
        &self,
        kind: PlatformKind,
    ) -> Result<HashMap<i64, SyncStatus>> {
        let conn = self.conn.lock().await;
        let t = table(kind);
        let mut stmt = conn.prepare(&format!(
            "SELECT plan_id, status FROM {t}
             WHERE plan_id IS NOT NULL
               AND id IN (SELECT MAX(id) FROM {t} GROUP BY plan_id)"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                let plan_id: i64 = row.get(0)?;
                let status: String = row.get(1)?;
                Ok((plan_id, SyncStatus::parse(&status)))
            })?
            .collect::<rusqlite::Result<HashMap<_, _>>>()
            .context("reading latest statuses")?;
        Ok(rows)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<SyncLogEntry> {
    let status: String = row.get(5)?;
    Ok(SyncLogEntry {
        id: row.get(0)?,
        plan_name: row.get(1)?,
        plan_id: row.get(2)?,
        old_price: row.get(3)?,
        new_price: row.get(4)?,
        status: SyncStatus::parse(&status),
        error_message: row.get(6)?,
        created_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}
