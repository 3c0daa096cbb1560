//! The request lifecycle engine façade.
//!
//! Composes the pure core logic with a store and a notifier. Every mutating
//! operation is a serialized read-modify-write of the whole collection:
//! load the blob, apply one pure transition or sweep, save the blob. A
//! single mutex guarantees a sweep never interleaves with a user action.

use std::sync::Arc;

use deskflow_core::{
    sweep, transitions, Clock, CurrentUser, Notice, Request, SweepReport, SystemClock,
    TransitionOutcome,
};
use deskflow_store::{JsonFileStore, RequestStore, StoreError};
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::notify::{Notifier, TracingNotifier};

pub struct RequestEngine {
    store: Arc<dyn RequestStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    /// Serializes all mutating read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl RequestEngine {
    pub fn new(
        store: Arc<dyn RequestStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Engine wired with the production collaborators: a file store under
    /// the configured data directory, the tracing notifier, and the system
    /// clock.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Arc::new(JsonFileStore::new(&config.data_dir)),
            Arc::new(TracingNotifier),
            Arc::new(SystemClock),
        )
    }

    /// Load the collection, repairing legacy-shape records on the way in.
    ///
    /// Propagates store errors; use [`Self::sweep`] and the transition
    /// methods for the resilient paths.
    pub async fn load(&self) -> Result<Vec<Request>, EngineError> {
        let mut requests = self.store.load().await?;
        repair_all(&mut requests);
        Ok(requests)
    }

    /// Load for a mutation: a malformed blob degrades to an empty
    /// collection (with a warning) instead of failing the operation.
    async fn load_for_update(&self) -> Result<Vec<Request>, EngineError> {
        match self.store.load().await {
            Ok(mut requests) => {
                repair_all(&mut requests);
                Ok(requests)
            }
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(error = %e, "Collection blob malformed, starting from empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a transition outcome and fan out its notice.
    async fn commit(&self, outcome: TransitionOutcome) -> Result<Option<Notice>, EngineError> {
        self.store.save(&outcome.requests).await?;
        if let Some(notice) = &outcome.notice {
            self.notifier.notify(notice);
        }
        Ok(outcome.notice)
    }

    /// Accept a request or join a project.
    pub async fn accept(
        &self,
        item_id: &str,
        actor: &CurrentUser,
    ) -> Result<Option<Notice>, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome = transitions::accept(requests, item_id, &actor.username, self.clock.now())?;
        self.commit(outcome).await
    }

    /// Mark an item completed by the actor.
    pub async fn mark_completed(
        &self,
        item_id: &str,
        actor: &CurrentUser,
    ) -> Result<Option<Notice>, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome =
            transitions::mark_completed(requests, item_id, &actor.username, self.clock.now());
        self.commit(outcome).await
    }

    /// Reject / abandon an item the actor accepted.
    pub async fn abandon(
        &self,
        item_id: &str,
        actor: &CurrentUser,
    ) -> Result<Option<Notice>, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome = transitions::abandon(requests, item_id, &actor.username, self.clock.now());
        self.commit(outcome).await
    }

    /// Archive a pending project.
    pub async fn archive(&self, item_id: &str) -> Result<Option<Notice>, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome = transitions::archive(requests, item_id, self.clock.now())?;
        self.commit(outcome).await
    }

    /// Restore a project from the archive.
    pub async fn unarchive(&self, item_id: &str) -> Result<Option<Notice>, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome = transitions::unarchive(requests, item_id);
        self.commit(outcome).await
    }

    /// Permanently delete a record.
    pub async fn delete(&self, item_id: &str) -> Result<Option<Notice>, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome = transitions::delete(requests, item_id);
        self.commit(outcome).await
    }

    /// Clear the actor's completed and rejected history.
    pub async fn clear_history(&self, actor: &CurrentUser) -> Result<Option<Notice>, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome = transitions::clear_history(requests, &actor.username);
        self.commit(outcome).await
    }

    /// Run one sweep: expiration pass plus archive purge.
    ///
    /// Saves only when the sweep changed something, and notifies when
    /// archived projects were purged.
    pub async fn sweep(&self) -> Result<SweepReport, EngineError> {
        let _guard = self.write_lock.lock().await;
        let requests = self.load_for_update().await?;
        let outcome = sweep::run_sweep(requests, self.clock.now());

        if outcome.report.changed() {
            self.store.save(&outcome.requests).await?;
            tracing::info!(
                expired_marked = outcome.report.expired_marked,
                expired_removed = outcome.report.expired_removed,
                archived_purged = outcome.report.archived_purged,
                "Sweep changed the collection"
            );
        } else {
            tracing::debug!("Sweep found nothing to do");
        }

        if outcome.report.archived_purged > 0 {
            self.notifier.notify(&Notice::info(
                "Projects removed",
                "Some archived projects have been automatically deleted after 7 days.",
            ));
        }

        Ok(outcome.report)
    }
}

/// Repair every record, logging an aggregate count.
fn repair_all(requests: &mut [Request]) {
    let repairs: usize = requests.iter_mut().map(Request::repair).sum();
    if repairs > 0 {
        tracing::warn!(repairs, "Repaired records while loading collection");
    }
}
