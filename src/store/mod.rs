//! Local pricing store: the source of truth the platforms are synced from.
//!
//! Three priced entity kinds (plans, homesites, available homes) grouped
//! under communities, plus an audit trail. Every price write records its
//! audit row under the same connection lock as the update, so the trail
//! never misses or double-counts a change.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: i64,
    pub community_id: i64,
    pub community_name: String,
    pub name: String,
    pub base_price: Option<i64>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Homesite {
    pub id: i64,
    pub community_id: i64,
    pub community_name: String,
    pub lot_number: String,
    pub address: Option<String>,
    pub premium_price: Option<i64>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableHome {
    pub id: i64,
    pub community_id: i64,
    pub community_name: String,
    pub plan_name: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub price: Option<i64>,
    pub sort_order: i64,
}

/// Result of a price write: what was there before and what is there now.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PriceChange {
    pub old: Option<i64>,
    pub new: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub changed_at: String,
}

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS communities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT UNIQUE NOT NULL
            );
            CREATE TABLE IF NOT EXISTS plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                community_id INTEGER REFERENCES communities(id),
                name TEXT NOT NULL,
                base_price INTEGER,
                sort_order INTEGER DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS homesites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                community_id INTEGER REFERENCES communities(id),
                lot_number TEXT NOT NULL,
                address TEXT,
                premium_price INTEGER,
                sort_order INTEGER DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS available_homes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                community_id INTEGER REFERENCES communities(id),
                plan_name TEXT,
                address TEXT,
                status TEXT DEFAULT 'available',
                price INTEGER,
                sort_order INTEGER DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS price_change_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_type TEXT NOT NULL,
                entity_id INTEGER NOT NULL,
                field_name TEXT NOT NULL,
                old_value TEXT,
                new_value TEXT,
                changed_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .context("creating store schema")?;
        Ok(())
    }

    /// Connectivity probe for the health endpoint.
    pub async fn ping(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }

    pub async fn all_plans(&self) -> Result<Vec<Plan>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.community_id, c.name, p.name, p.base_price, p.sort_order
             FROM plans p JOIN communities c ON c.id = p.community_id
             ORDER BY p.community_id, p.sort_order",
        )?;
        let rows = stmt
            .query_map([], row_to_plan)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("listing plans")?;
        Ok(rows)
    }

    pub async fn plans_for_community(&self, community_id: i64) -> Result<Vec<Plan>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.community_id, c.name, p.name, p.base_price, p.sort_order
             FROM plans p JOIN communities c ON c.id = p.community_id
             WHERE p.community_id = ?1
             ORDER BY p.sort_order",
        )?;
        let rows = stmt
            .query_map(params![community_id], row_to_plan)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("listing community plans")?;
        Ok(rows)
    }

    pub async fn get_plan(&self, id: i64) -> Result<Option<Plan>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT p.id, p.community_id, c.name, p.name, p.base_price, p.sort_order
             FROM plans p JOIN communities c ON c.id = p.community_id
             WHERE p.id = ?1",
            params![id],
            row_to_plan,
        )
        .optional()
        .context("reading plan")
    }

    pub async fn get_homesite(&self, id: i64) -> Result<Option<Homesite>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT h.id, h.community_id, c.name, h.lot_number, h.address,
                    h.premium_price, h.sort_order
             FROM homesites h JOIN communities c ON c.id = h.community_id
             WHERE h.id = ?1",
            params![id],
            |row| {
                Ok(Homesite {
                    id: row.get(0)?,
                    community_id: row.get(1)?,
                    community_name: row.get(2)?,
                    lot_number: row.get(3)?,
                    address: row.get(4)?,
                    premium_price: row.get(5)?,
                    sort_order: row.get(6)?,
                })
            },
        )
        .optional()
        .context("reading homesite")
    }

    pub async fn get_available_home(&self, id: i64) -> Result<Option<AvailableHome>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT a.id, a.community_id, c.name, a.plan_name, a.address,
                    a.status, a.price, a.sort_order
             FROM available_homes a JOIN communities c ON c.id = a.community_id
             WHERE a.id = ?1",
            params![id],
            |row| {
                Ok(AvailableHome {
                    id: row.get(0)?,
                    community_id: row.get(1)?,
                    community_name: row.get(2)?,
                    plan_name: row.get(3)?,
                    address: row.get(4)?,
                    status: row.get(5)?,
                    price: row.get(6)?,
                    sort_order: row.get(7)?,
                })
            },
        )
        .optional()
        .context("reading available home")
    }

    pub async fn set_plan_price(&self, id: i64, price: i64) -> Result<Option<PriceChange>> {
        self.set_price("plans", "base_price", id, price).await
    }

    pub async fn set_homesite_premium(&self, id: i64, premium: i64) -> Result<Option<PriceChange>> {
        self.set_price("homesites", "premium_price", id, premium)
            .await
    }

    pub async fn set_home_price(&self, id: i64, price: i64) -> Result<Option<PriceChange>> {
        self.set_price("available_homes", "price", id, price).await
    }

    // Read old value, write new value, append the audit row, all under one
    // lock acquisition. Table and field names come from the callers above.
    async fn set_price(
        &self,
        entity_table: &str,
        field: &str,
        id: i64,
        price: i64,
    ) -> Result<Option<PriceChange>> {
        let conn = self.conn.lock().await;
        let old: Option<Option<i64>> = conn
            .query_row(
                &format!("SELECT {field} FROM {entity_table} WHERE id = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()
            .context("reading current price")?;
        let Some(old) = old else {
            return Ok(None);
        };

        conn.execute(
            &format!("UPDATE {entity_table} SET {field} = ?1 WHERE id = ?2"),
            params![price, id],
        )
        .context("writing price")?;
        conn.execute(
            "INSERT INTO price_change_log (entity_type, entity_id, field_name, old_value, new_value)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entity_table,
                id,
                field,
                old.map(|v| v.to_string()),
                price.to_string()
            ],
        )
        .context("writing audit row")?;

        Ok(Some(PriceChange { old, new: price }))
    }

    pub async fn recent_price_changes(&self, limit: u32) -> Result<Vec<AuditEntry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, entity_type, entity_id, field_name, old_value, new_value, changed_at
             FROM price_change_log ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    entity_type: row.get(1)?,
                    entity_id: row.get(2)?,
                    field_name: row.get(3)?,
                    old_value: row.get(4)?,
                    new_value: row.get(5)?,
                    changed_at: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("reading audit rows")?;
        Ok(rows)
    }
}

fn row_to_plan(row: &rusqlite::Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: row.get(0)?,
        community_id: row.get(1)?,
        community_name: row.get(2)?,
        name: row.get(3)?,
        base_price: row.get(4)?,
        sort_order: row.get(5)?,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory store preloaded with one community and a couple of rows.
    pub async fn seeded_store(conn: Arc<Mutex<Connection>>) -> Store {
        let store = Store::new(conn.clone());
        store.ensure_schema().await.unwrap();
        let c = conn.lock().await;
        c.execute_batch(
            "INSERT INTO communities (id, name, slug) VALUES (1, 'Parkside', 'parkside');
             INSERT INTO plans (id, community_id, name, base_price, sort_order)
                 VALUES (1, 1, 'The Balboa', 724000, 1);
             INSERT INTO plans (id, community_id, name, base_price, sort_order)
                 VALUES (2, 1, 'The Cambridge', 749000, 2);
             INSERT INTO homesites (id, community_id, lot_number, address, premium_price)
                 VALUES (1, 1, '290', '2485 W Aurora Ave (# 290)', 56000);
             INSERT INTO available_homes (id, community_id, plan_name, address, price)
                 VALUES (1, 1, 'The Balboa', '2485 W Aurora Ave (# 290)', 779000);",
        )
        .unwrap();
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Store {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        testing::seeded_store(conn).await
    }

    #[tokio::test]
    async fn plan_reads_join_community_name() {
        let store = store().await;
        let plan = store.get_plan(1).await.unwrap().unwrap();
        assert_eq!(plan.name, "The Balboa");
        assert_eq!(plan.community_name, "Parkside");
        assert_eq!(plan.base_price, Some(724000));

        let all = store.all_plans().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sort_order, 1);

        assert!(store.get_plan(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn price_write_returns_old_and_audits() {
        let store = store().await;
        let change = store.set_plan_price(1, 730000).await.unwrap().unwrap();
        assert_eq!(change.old, Some(724000));
        assert_eq!(change.new, 730000);

        let plan = store.get_plan(1).await.unwrap().unwrap();
        assert_eq!(plan.base_price, Some(730000));

        let audit = store.recent_price_changes(10).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].entity_type, "plans");
        assert_eq!(audit[0].field_name, "base_price");
        assert_eq!(audit[0].old_value.as_deref(), Some("724000"));
        assert_eq!(audit[0].new_value, "730000");
    }

    #[tokio::test]
    async fn missing_entity_writes_nothing() {
        let store = store().await;
        assert!(store.set_plan_price(99, 1).await.unwrap().is_none());
        assert!(store.recent_price_changes(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn homesite_and_home_prices_update() {
        let store = store().await;
        let change = store.set_homesite_premium(1, 60000).await.unwrap().unwrap();
        assert_eq!(change.old, Some(56000));

        let change = store.set_home_price(1, 785000).await.unwrap().unwrap();
        assert_eq!(change.old, Some(779000));

        let home = store.get_available_home(1).await.unwrap().unwrap();
        assert_eq!(home.price, Some(785000));
        assert_eq!(home.community_name, "Parkside");

        let audit = store.recent_price_changes(10).await.unwrap();
        assert_eq!(audit.len(), 2);
    }
}
