//! Dispatch: turns one local price change into per-platform sync attempts.
//!
//! Single-plan syncs are fire-and-forget: the caller gets a receipt with a
//! log id per dispatched platform and the attempts run in spawned tasks,
//! each with its own session. Batches reuse one session per platform and
//! run sequentially against it. Either way every attempt owns exactly one
//! sync-log row and resolves it exactly once.

use crate::normalization::lot_number_from_address;
use crate::store::{AvailableHome, Homesite, Plan, Store};
use crate::sync_log::{SyncLog, SyncStatus};
use crate::sync_ops::{PlanTarget, PlatformKind, PriceUpdate, SyncPlatform};
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What happened to one platform at dispatch time. `Skipped` is the silent
/// not-mapped outcome; the platform gets no log row and no traffic.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchStatus {
    Dispatched { log_id: i64 },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanSyncReceipt {
    pub plan_id: i64,
    pub plan_name: String,
    pub new_price: i64,
    pub platforms: HashMap<String, DispatchStatus>,
}

impl PlanSyncReceipt {
    pub fn dispatched_count(&self) -> usize {
        self.platforms
            .values()
            .filter(|s| matches!(s, DispatchStatus::Dispatched { .. }))
            .count()
    }
}

/// One awaited batch item outcome, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub plan_id: i64,
    pub plan_name: String,
    pub update: PriceUpdate,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MasterSyncReceipt {
    pub total_plans: usize,
    pub sync_operations: usize,
}

/// One row of the cross-platform status matrix: latest outcome per platform
/// for one plan, `None` where that platform has never been attempted.
#[derive(Debug, Clone, Serialize)]
pub struct MasterStatusRow {
    pub plan_id: i64,
    pub name: String,
    pub platforms: HashMap<String, Option<SyncStatus>>,
}

#[derive(Clone)]
pub struct SyncOrchestrator {
    platforms: Vec<Arc<dyn SyncPlatform>>,
    log: SyncLog,
    store: Store,
}

impl SyncOrchestrator {
    pub fn new(platforms: Vec<Arc<dyn SyncPlatform>>, log: SyncLog, store: Store) -> Self {
        Self {
            platforms,
            log,
            store,
        }
    }

    pub fn platform(&self, kind: PlatformKind) -> Option<&Arc<dyn SyncPlatform>> {
        self.platforms.iter().find(|p| p.kind() == kind)
    }

    /// Fan a plan price out to every platform it is mapped on. `old_price`
    /// is the pre-change local price; the caller commits locally before
    /// dispatching, so the re-read plan row already carries the new value.
    /// Returns as soon as the pending rows exist; the attempts run in the
    /// background.
    pub async fn sync_plan(
        &self,
        plan: &Plan,
        old_price: Option<i64>,
        new_price: i64,
    ) -> Result<PlanSyncReceipt> {
        let mut receipt = PlanSyncReceipt {
            plan_id: plan.id,
            plan_name: plan.name.clone(),
            new_price,
            platforms: HashMap::new(),
        };

        for platform in &self.platforms {
            let kind = platform.kind();
            let status = match platform.resolve_plan(&plan.name) {
                None => DispatchStatus::Skipped {
                    reason: format!("{:?} is not mapped on {}", plan.name, kind.label()),
                },
                Some(external_id) => {
                    let log_id = self
                        .log
                        .insert_pending(kind, &plan.name, Some(plan.id), old_price, new_price)
                        .await?;
                    self.spawn_attempt(
                        Arc::clone(platform),
                        PlanTarget {
                            display_name: plan.name.clone(),
                            external_id,
                        },
                        new_price,
                        log_id,
                    );
                    DispatchStatus::Dispatched { log_id }
                }
            };
            receipt.platforms.insert(kind.slug().to_string(), status);
        }

        if receipt.dispatched_count() == 0 {
            warn!(plan = %plan.name, "plan is not mapped on any platform");
        }
        Ok(receipt)
    }

    /// Manual single-platform re-trigger. `Ok(None)` means the plan is not
    /// mapped there; the caller decides whether that is an error.
    pub async fn sync_plan_on(
        &self,
        kind: PlatformKind,
        plan: &Plan,
        new_price: i64,
    ) -> Result<Option<i64>> {
        let Some(platform) = self.platform(kind) else {
            bail!("platform {} is not configured", kind.slug());
        };
        let Some(external_id) = platform.resolve_plan(&plan.name) else {
            return Ok(None);
        };
        let log_id = self
            .log
            .insert_pending(kind, &plan.name, Some(plan.id), plan.base_price, new_price)
            .await?;
        self.spawn_attempt(
            Arc::clone(platform),
            PlanTarget {
                display_name: plan.name.clone(),
                external_id,
            },
            new_price,
            log_id,
        );
        Ok(Some(log_id))
    }

    // One background attempt with its own session and its own log row.
    fn spawn_attempt(
        &self,
        platform: Arc<dyn SyncPlatform>,
        target: PlanTarget,
        new_price: i64,
        log_id: i64,
    ) {
        let log = self.log.clone();
        tokio::spawn(async move {
            let kind = platform.kind();
            let mut session = match platform.acquire_session().await {
                Ok(session) => session,
                Err(e) => {
                    warn!(platform = %kind, plan = %target.display_name, error = %e, "session acquisition failed");
                    if let Err(log_err) = log.fail(kind, log_id, &e.to_string()).await {
                        error!(platform = %kind, error = %format!("{log_err:#}"), "failed to record sync failure");
                    }
                    return;
                }
            };
            let update = platform
                .update_plan_price(&mut session, &target, new_price)
                .await;
            platform.release_session(session).await;
            if let Err(log_err) = log.complete(kind, log_id, &update).await {
                error!(platform = %kind, error = %format!("{log_err:#}"), "failed to record sync result");
            }
        });
    }

    /// Awaited single-platform batch: one session, items in order, one
    /// result per input. A session failure fails every mapped item at once.
    pub async fn sync_batch(
        &self,
        kind: PlatformKind,
        items: Vec<(Plan, i64)>,
    ) -> Result<Vec<BatchItemResult>> {
        let Some(platform) = self.platform(kind) else {
            bail!("platform {} is not configured", kind.slug());
        };
        if items.is_empty() {
            return Ok(Vec::new());
        }

        // Pending rows exist for every mapped item before the session opens.
        let mut prepared = Vec::with_capacity(items.len());
        for (plan, new_price) in &items {
            let target = platform.resolve_plan(&plan.name).map(|external_id| PlanTarget {
                display_name: plan.name.clone(),
                external_id,
            });
            let log_id = match &target {
                Some(_) => Some(
                    self.log
                        .insert_pending(kind, &plan.name, Some(plan.id), plan.base_price, *new_price)
                        .await?,
                ),
                None => None,
            };
            prepared.push((plan.clone(), *new_price, target, log_id));
        }

        let mut session = match platform.acquire_session().await {
            Ok(session) => session,
            Err(e) => {
                let message = e.to_string();
                let mut results = Vec::with_capacity(prepared.len());
                for (plan, new_price, target, log_id) in prepared {
                    let update = match target {
                        Some(_) => {
                            if let Some(log_id) = log_id {
                                self.log.fail(kind, log_id, &message).await?;
                            }
                            PriceUpdate::failed(new_price, message.clone())
                        }
                        None => PriceUpdate::failed(
                            new_price,
                            format!("{:?} is not mapped on {}", plan.name, kind.label()),
                        ),
                    };
                    results.push(BatchItemResult {
                        plan_id: plan.id,
                        plan_name: plan.name,
                        update,
                    });
                }
                return Ok(results);
            }
        };

        let mut results = Vec::with_capacity(prepared.len());
        for (plan, new_price, target, log_id) in prepared {
            let update = match target {
                Some(target) => {
                    let update = platform
                        .update_plan_price(&mut session, &target, new_price)
                        .await;
                    if let Some(log_id) = log_id {
                        self.log.complete(kind, log_id, &update).await?;
                    }
                    update
                }
                None => PriceUpdate::failed(
                    new_price,
                    format!("{:?} is not mapped on {}", plan.name, kind.label()),
                ),
            };
            results.push(BatchItemResult {
                plan_id: plan.id,
                plan_name: plan.name,
                update,
            });
        }
        platform.release_session(session).await;
        Ok(results)
    }

    /// Push every plan's current price to every mapped platform. Each
    /// platform gets one background batch with one reused session.
    pub async fn master_sync(&self) -> Result<MasterSyncReceipt> {
        let plans = self.store.all_plans().await?;
        let mut sync_operations = 0;

        for platform in &self.platforms {
            let kind = platform.kind();
            let mut batch = Vec::new();
            for plan in &plans {
                let Some(price) = plan.base_price else { continue };
                let Some(external_id) = platform.resolve_plan(&plan.name) else {
                    continue;
                };
                let log_id = self
                    .log
                    .insert_pending(kind, &plan.name, Some(plan.id), plan.base_price, price)
                    .await?;
                batch.push((
                    PlanTarget {
                        display_name: plan.name.clone(),
                        external_id,
                    },
                    price,
                    log_id,
                ));
            }
            sync_operations += batch.len();
            if batch.is_empty() {
                continue;
            }
            self.spawn_batch(Arc::clone(platform), batch);
        }

        info!(
            total_plans = plans.len(),
            sync_operations, "master sync dispatched"
        );
        Ok(MasterSyncReceipt {
            total_plans: plans.len(),
            sync_operations,
        })
    }

    // Background single-session batch; pending rows already exist.
    fn spawn_batch(
        &self,
        platform: Arc<dyn SyncPlatform>,
        batch: Vec<(PlanTarget, i64, i64)>,
    ) {
        let log = self.log.clone();
        tokio::spawn(async move {
            let kind = platform.kind();
            let mut session = match platform.acquire_session().await {
                Ok(session) => session,
                Err(e) => {
                    warn!(platform = %kind, error = %e, "session acquisition failed; failing batch");
                    for (_, _, log_id) in batch {
                        if let Err(log_err) = log.fail(kind, log_id, &e.to_string()).await {
                            error!(platform = %kind, error = %format!("{log_err:#}"), "failed to record sync failure");
                        }
                    }
                    return;
                }
            };
            for (target, new_price, log_id) in batch {
                let update = platform
                    .update_plan_price(&mut session, &target, new_price)
                    .await;
                if let Err(log_err) = log.complete(kind, log_id, &update).await {
                    error!(platform = %kind, error = %format!("{log_err:#}"), "failed to record sync result");
                }
            }
            platform.release_session(session).await;
        });
    }

    /// Homesite premiums only exist on the inventory-syndication platform.
    /// Unmapped lots are reported without any session or network work.
    pub async fn sync_homesite_premium(
        &self,
        homesite: &Homesite,
        old_premium: Option<i64>,
        new_premium: i64,
    ) -> Result<DispatchStatus> {
        let kind = PlatformKind::Anewgo;
        let Some(platform) = self.platform(kind) else {
            return Ok(DispatchStatus::Skipped {
                reason: format!("platform {} is not configured", kind.slug()),
            });
        };
        let Some(lot_id) =
            platform.resolve_lot(&homesite.community_name, &homesite.lot_number)
        else {
            return Ok(DispatchStatus::Skipped {
                reason: format!(
                    "lot {} in {} is not mapped on {}",
                    homesite.lot_number,
                    homesite.community_name,
                    kind.label()
                ),
            });
        };

        let label = format!("{} lot {}", homesite.community_name, homesite.lot_number);
        let log_id = self
            .log
            .insert_pending(kind, &label, None, old_premium, new_premium)
            .await?;

        let platform = Arc::clone(platform);
        let log = self.log.clone();
        tokio::spawn(async move {
            let mut session = match platform.acquire_session().await {
                Ok(session) => session,
                Err(e) => {
                    if let Err(log_err) = log.fail(kind, log_id, &e.to_string()).await {
                        error!(error = %format!("{log_err:#}"), "failed to record sync failure");
                    }
                    return;
                }
            };
            let update = platform
                .update_lot_premium(&mut session, lot_id, new_premium)
                .await;
            platform.release_session(session).await;
            if let Err(log_err) = log.complete(kind, log_id, &update).await {
                error!(error = %format!("{log_err:#}"), "failed to record sync result");
            }
        });
        Ok(DispatchStatus::Dispatched { log_id })
    }

    /// Available-home prices propagate as inventory updates, addressed by
    /// the lot token in the home's street address.
    pub async fn sync_available_home_price(
        &self,
        home: &AvailableHome,
        old_price: Option<i64>,
        new_price: i64,
    ) -> Result<DispatchStatus> {
        let kind = PlatformKind::Anewgo;
        let Some(platform) = self.platform(kind) else {
            return Ok(DispatchStatus::Skipped {
                reason: format!("platform {} is not configured", kind.slug()),
            });
        };
        let address = home.address.clone().unwrap_or_default();
        let Some(lot_number) = lot_number_from_address(&address) else {
            return Ok(DispatchStatus::Skipped {
                reason: format!("no lot token in address {address:?}"),
            });
        };
        if platform
            .resolve_lot(&home.community_name, &lot_number)
            .is_none()
        {
            return Ok(DispatchStatus::Skipped {
                reason: format!(
                    "lot {} in {} is not mapped on {}",
                    lot_number,
                    home.community_name,
                    kind.label()
                ),
            });
        }

        let label = format!("{} lot {}", home.community_name, lot_number);
        let log_id = self
            .log
            .insert_pending(kind, &label, None, old_price, new_price)
            .await?;

        let platform = Arc::clone(platform);
        let log = self.log.clone();
        let community = home.community_name.clone();
        tokio::spawn(async move {
            let mut session = match platform.acquire_session().await {
                Ok(session) => session,
                Err(e) => {
                    if let Err(log_err) = log.fail(kind, log_id, &e.to_string()).await {
                        error!(error = %format!("{log_err:#}"), "failed to record sync failure");
                    }
                    return;
                }
            };
            let update = platform
                .update_inventory_price(&mut session, &community, &lot_number, new_price)
                .await;
            platform.release_session(session).await;
            if let Err(log_err) = log.complete(kind, log_id, &update).await {
                error!(error = %format!("{log_err:#}"), "failed to record sync result");
            }
        });
        Ok(DispatchStatus::Dispatched { log_id })
    }

    /// Latest outcome per plan per platform, for the master-sync view.
    pub async fn master_status(&self) -> Result<Vec<MasterStatusRow>> {
        let plans = self.store.all_plans().await?;
        let mut by_platform = HashMap::new();
        for kind in PlatformKind::ALL {
            by_platform.insert(kind, self.log.latest_status_by_plan(kind).await?);
        }

        Ok(plans
            .into_iter()
            .map(|plan| {
                let mut platforms = HashMap::new();
                for kind in PlatformKind::ALL {
                    let status = by_platform
                        .get(&kind)
                        .and_then(|m| m.get(&plan.id))
                        .copied();
                    platforms.insert(kind.slug().to_string(), status);
                }
                MasterStatusRow {
                    plan_id: plan.id,
                    name: plan.name,
                    platforms,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ExternalId;
    use crate::sync_ops::{PlatformSession, SessionError};
    use async_trait::async_trait;
    use rusqlite::Connection;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Mutex;

    struct FakePlatform {
        kind: PlatformKind,
        plans: HashMap<String, ExternalId>,
        lots: HashMap<String, ExternalId>,
        fail_session: bool,
        fail_updates: bool,
        sessions_opened: Arc<StdMutex<usize>>,
        updates: Arc<StdMutex<Vec<(ExternalId, i64)>>>,
    }

    impl FakePlatform {
        fn new(kind: PlatformKind, plans: &[(&str, ExternalId)]) -> Self {
            Self {
                kind,
                plans: plans.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                lots: HashMap::new(),
                fail_session: false,
                fail_updates: false,
                sessions_opened: Arc::new(StdMutex::new(0)),
                updates: Arc::new(StdMutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl SyncPlatform for FakePlatform {
        fn kind(&self) -> PlatformKind {
            self.kind
        }

        fn resolve_plan(&self, display_name: &str) -> Option<ExternalId> {
            self.plans.get(display_name).copied()
        }

        fn resolve_lot(&self, community: &str, lot_number: &str) -> Option<ExternalId> {
            self.lots
                .get(&format!("{}:{}", community.to_lowercase(), lot_number))
                .copied()
        }

        async fn acquire_session(&self) -> Result<PlatformSession, SessionError> {
            if self.fail_session {
                return Err(SessionError::LoginRejected);
            }
            *self.sessions_opened.lock().unwrap() += 1;
            Ok(PlatformSession::Bearer("fake".to_string()))
        }

        async fn update_plan_price(
            &self,
            _session: &mut PlatformSession,
            target: &PlanTarget,
            new_price: i64,
        ) -> PriceUpdate {
            self.updates
                .lock()
                .unwrap()
                .push((target.external_id, new_price));
            if self.fail_updates {
                PriceUpdate::failed(new_price, "remote rejected the write")
            } else {
                PriceUpdate::ok(Some(724000), new_price, "updated")
            }
        }

        async fn update_lot_premium(
            &self,
            _session: &mut PlatformSession,
            lot_id: ExternalId,
            new_premium: i64,
        ) -> PriceUpdate {
            self.updates.lock().unwrap().push((lot_id, new_premium));
            PriceUpdate::ok(None, new_premium, "updated premium")
        }
    }

    async fn harness(platforms: Vec<Arc<dyn SyncPlatform>>) -> (SyncOrchestrator, SyncLog) {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let log = SyncLog::new(conn.clone());
        log.ensure_schema().await.unwrap();
        let store = crate::store::testing::seeded_store(conn).await;
        (SyncOrchestrator::new(platforms, log.clone(), store), log)
    }

    fn balboa() -> Plan {
        Plan {
            id: 1,
            community_id: 1,
            community_name: "Parkside".to_string(),
            name: "The Balboa".to_string(),
            base_price: Some(724000),
            sort_order: 1,
        }
    }

    async fn wait_terminal(log: &SyncLog, kind: PlatformKind, id: i64) -> SyncStatus {
        for _ in 0..200 {
            let rows = log.recent(kind, 50).await.unwrap();
            if let Some(row) = rows.iter().find(|r| r.id == id) {
                if row.status != SyncStatus::Pending {
                    return row.status;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("attempt {id} never left pending");
    }

    #[tokio::test]
    async fn sync_plan_dispatches_only_to_mapped_platforms() {
        let mapped = Arc::new(FakePlatform::new(
            PlatformKind::Anewgo,
            &[("The Balboa", 6286)],
        ));
        let unmapped = Arc::new(FakePlatform::new(PlatformKind::Homefiniti, &[]));
        let updates = mapped.updates.clone();
        let (orchestrator, log) =
            harness(vec![mapped.clone(), unmapped.clone()]).await;

        let receipt = orchestrator.sync_plan(&balboa(), Some(724000), 730000).await.unwrap();
        assert_eq!(receipt.dispatched_count(), 1);
        assert!(matches!(
            receipt.platforms["anewgo"],
            DispatchStatus::Dispatched { .. }
        ));
        assert!(matches!(
            receipt.platforms["homefiniti"],
            DispatchStatus::Skipped { .. }
        ));

        let DispatchStatus::Dispatched { log_id } = receipt.platforms["anewgo"] else {
            unreachable!()
        };
        assert_eq!(
            wait_terminal(&log, PlatformKind::Anewgo, log_id).await,
            SyncStatus::Synced
        );
        assert_eq!(*updates.lock().unwrap(), vec![(6286, 730000)]);
        // the skipped platform never got a log row
        assert!(log.recent(PlatformKind::Homefiniti, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_failure_resolves_the_pending_row() {
        let mut platform = FakePlatform::new(PlatformKind::Homefiniti, &[("The Balboa", 178661)]);
        platform.fail_session = true;
        let (orchestrator, log) = harness(vec![Arc::new(platform)]).await;

        let receipt = orchestrator.sync_plan(&balboa(), Some(724000), 730000).await.unwrap();
        let DispatchStatus::Dispatched { log_id } = receipt.platforms["homefiniti"] else {
            panic!("expected dispatch");
        };
        assert_eq!(
            wait_terminal(&log, PlatformKind::Homefiniti, log_id).await,
            SyncStatus::Failed
        );
        let rows = log.recent(PlatformKind::Homefiniti, 10).await.unwrap();
        assert!(rows[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("login rejected"));
    }

    #[tokio::test]
    async fn failed_attempt_keeps_the_pre_change_price() {
        let mut platform = FakePlatform::new(PlatformKind::Anewgo, &[("The Balboa", 6286)]);
        platform.fail_updates = true;
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let log = SyncLog::new(conn.clone());
        log.ensure_schema().await.unwrap();
        let store = crate::store::testing::seeded_store(conn).await;
        let orchestrator =
            SyncOrchestrator::new(vec![Arc::new(platform)], log.clone(), store.clone());

        // the edit endpoint commits locally before dispatching, so the
        // re-read plan row already carries the new price
        let change = store.set_plan_price(1, 730000).await.unwrap().unwrap();
        let plan = store.get_plan(1).await.unwrap().unwrap();
        assert_eq!(plan.base_price, Some(730000));

        let receipt = orchestrator
            .sync_plan(&plan, change.old, 730000)
            .await
            .unwrap();
        let DispatchStatus::Dispatched { log_id } = receipt.platforms["anewgo"] else {
            panic!("expected dispatch");
        };
        assert_eq!(
            wait_terminal(&log, PlatformKind::Anewgo, log_id).await,
            SyncStatus::Failed
        );
        let rows = log.recent(PlatformKind::Anewgo, 10).await.unwrap();
        let row = rows.iter().find(|r| r.id == log_id).unwrap();
        assert_eq!(row.old_price, Some(724000));
        assert_eq!(row.new_price, Some(730000));
    }

    #[tokio::test]
    async fn batch_preserves_order_past_unmapped_items() {
        let platform = Arc::new(FakePlatform::new(
            PlatformKind::Anewgo,
            &[("The Balboa", 6286), ("The Cambridge", 6288)],
        ));
        let sessions = platform.sessions_opened.clone();
        let (orchestrator, _log) = harness(vec![platform.clone()]).await;

        let mut mystery = balboa();
        mystery.id = 9;
        mystery.name = "The Mystery".to_string();
        let mut cambridge = balboa();
        cambridge.id = 2;
        cambridge.name = "The Cambridge".to_string();

        let results = orchestrator
            .sync_batch(
                PlatformKind::Anewgo,
                vec![(balboa(), 730000), (mystery, 500000), (cambridge, 755000)],
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].update.success);
        assert!(!results[1].update.success);
        assert!(results[1].update.message.contains("not mapped"));
        assert!(results[2].update.success);
        assert_eq!(results[2].plan_name, "The Cambridge");
        // one session for the whole batch
        assert_eq!(*sessions.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn batch_session_failure_fails_every_mapped_item() {
        let mut platform = FakePlatform::new(
            PlatformKind::NewHomeFeed,
            &[("The Balboa", 5069443), ("The Cambridge", 5069444)],
        );
        platform.fail_session = true;
        let (orchestrator, log) = harness(vec![Arc::new(platform)]).await;

        let mut cambridge = balboa();
        cambridge.id = 2;
        cambridge.name = "The Cambridge".to_string();

        let results = orchestrator
            .sync_batch(
                PlatformKind::NewHomeFeed,
                vec![(balboa(), 730000), (cambridge, 755000)],
            )
            .await
            .unwrap();

        assert!(results.iter().all(|r| !r.update.success));
        let rows = log.recent(PlatformKind::NewHomeFeed, 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == SyncStatus::Failed));
    }

    #[tokio::test]
    async fn master_sync_reuses_one_session_per_platform() {
        let platform = Arc::new(FakePlatform::new(
            PlatformKind::Anewgo,
            &[("The Balboa", 6286), ("The Cambridge", 6288)],
        ));
        let sessions = platform.sessions_opened.clone();
        let updates = platform.updates.clone();
        let (orchestrator, log) = harness(vec![platform.clone()]).await;

        let receipt = orchestrator.master_sync().await.unwrap();
        assert_eq!(receipt.total_plans, 2);
        assert_eq!(receipt.sync_operations, 2);

        let rows = log.recent(PlatformKind::Anewgo, 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(
                wait_terminal(&log, PlatformKind::Anewgo, row.id).await,
                SyncStatus::Synced
            );
        }
        assert_eq!(*sessions.lock().unwrap(), 1);
        assert_eq!(updates.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unmapped_homesite_is_skipped_without_a_session() {
        let platform = Arc::new(FakePlatform::new(PlatformKind::Anewgo, &[]));
        let sessions = platform.sessions_opened.clone();
        let (orchestrator, log) = harness(vec![platform.clone()]).await;

        let homesite = Homesite {
            id: 1,
            community_id: 1,
            community_name: "Parkside".to_string(),
            lot_number: "999".to_string(),
            address: None,
            premium_price: Some(56000),
            sort_order: 1,
        };
        let status = orchestrator
            .sync_homesite_premium(&homesite, Some(56000), 60000)
            .await
            .unwrap();
        assert!(matches!(status, DispatchStatus::Skipped { .. }));
        assert_eq!(*sessions.lock().unwrap(), 0);
        assert!(log.recent(PlatformKind::Anewgo, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mapped_homesite_premium_dispatches() {
        let mut platform = FakePlatform::new(PlatformKind::Anewgo, &[]);
        platform.lots.insert("parkside:290".to_string(), 19760);
        let platform = Arc::new(platform);
        let updates = platform.updates.clone();
        let (orchestrator, log) = harness(vec![platform.clone()]).await;

        let homesite = Homesite {
            id: 1,
            community_id: 1,
            community_name: "Parkside".to_string(),
            lot_number: "290".to_string(),
            address: Some("2485 W Aurora Ave (# 290)".to_string()),
            premium_price: Some(56000),
            sort_order: 1,
        };
        let status = orchestrator
            .sync_homesite_premium(&homesite, Some(56000), 60000)
            .await
            .unwrap();
        let DispatchStatus::Dispatched { log_id } = status else {
            panic!("expected dispatch");
        };
        assert_eq!(
            wait_terminal(&log, PlatformKind::Anewgo, log_id).await,
            SyncStatus::Synced
        );
        assert_eq!(*updates.lock().unwrap(), vec![(19760, 60000)]);
    }

    #[tokio::test]
    async fn available_home_without_lot_token_is_skipped() {
        let platform = Arc::new(FakePlatform::new(PlatformKind::Anewgo, &[]));
        let (orchestrator, _log) = harness(vec![platform]).await;

        let home = AvailableHome {
            id: 1,
            community_id: 1,
            community_name: "Parkside".to_string(),
            plan_name: Some("The Balboa".to_string()),
            address: Some("2485 W Aurora Ave".to_string()),
            status: "available".to_string(),
            price: Some(779000),
            sort_order: 1,
        };
        let status = orchestrator
            .sync_available_home_price(&home, Some(779000), 785000)
            .await
            .unwrap();
        let DispatchStatus::Skipped { reason } = status else {
            panic!("expected skip");
        };
        assert!(reason.contains("no lot token"));
    }

    #[tokio::test]
    async fn master_status_covers_every_plan_and_platform() {
        let platform = Arc::new(FakePlatform::new(
            PlatformKind::Anewgo,
            &[("The Balboa", 6286)],
        ));
        let (orchestrator, log) = harness(vec![platform]).await;

        let receipt = orchestrator.sync_plan(&balboa(), Some(724000), 730000).await.unwrap();
        let DispatchStatus::Dispatched { log_id } = receipt.platforms["anewgo"] else {
            unreachable!()
        };
        wait_terminal(&log, PlatformKind::Anewgo, log_id).await;

        let matrix = orchestrator.master_status().await.unwrap();
        assert_eq!(matrix.len(), 2);
        let balboa_row = matrix.iter().find(|r| r.name == "The Balboa").unwrap();
        assert_eq!(balboa_row.platforms["anewgo"], Some(SyncStatus::Synced));
        assert_eq!(balboa_row.platforms["homefiniti"], None);
        let cambridge_row = matrix.iter().find(|r| r.name == "The Cambridge").unwrap();
        assert_eq!(cambridge_row.platforms["anewgo"], None);
    }
}
