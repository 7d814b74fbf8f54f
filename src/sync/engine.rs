//! Sync orchestration.
//!
//! [`SyncEngine`] decides when to push and pull, and publishes its progress
//! as a [`SyncState`]:
//!
//! - **Debounced push**: every store change whose collected content hash
//!   differs from the last synced hash (re)arms a deadline; the push fires
//!   once the burst of edits settles.
//! - **Periodic pull**: on every poll tick (the first one immediately) the
//!   remote envelope is fetched, decoded, resolved against local data by the
//!   [`ConflictPolicy`] and applied.
//! - **Manual sync**: [`SyncEngine::sync_now`] pulls and then pushes when
//!   needed, bypassing the debounce.
//!
//! All round-trips take the same async mutex, so no two ever overlap. Each
//! remote call is bounded by the configured timeout and there are no
//! automatic retries: the next edit or poll tick is the retry.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot, watch, Notify};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::codec;
use super::gc;
use super::hash::{has_changed, snapshot_hash};
use super::remote::{RemoteStore, RemoteTarget};
use super::types::{
    ConflictPolicy, ConflictPrompt, GcStats, Resolution, SyncAction, SyncError, SyncReport,
    SyncResult, SyncState, SyncStatus,
};
use crate::config::SyncConfig;
use crate::model::Snapshot;
use crate::storage::SyncMeta;
use crate::store::{ProfileUpdate, Store};

const PROMPT_BUFFER: usize = 4;

/// Handle to a sync engine. Clones share the same engine.
pub struct SyncEngine<R: RemoteStore> {
    inner: Arc<Inner<R>>,
}

impl<R: RemoteStore> Clone for SyncEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R> {
    store: Store,
    remote: R,
    config: SyncConfig,
    state: watch::Sender<SyncState>,
    meta: Mutex<SyncMeta>,
    /// Held for the duration of every round-trip
    round_trip: tokio::sync::Mutex<()>,
    prompts: Mutex<Option<mpsc::Sender<ConflictPrompt>>>,
    sync_requested: Notify,
}

impl<R: RemoteStore> SyncEngine<R> {
    /// Create an engine. `meta` is the bookkeeping persisted by a previous run.
    pub fn new(store: Store, remote: R, config: SyncConfig, meta: SyncMeta) -> Self {
        let initial = SyncState {
            last_synced_at: meta.last_synced_at,
            ..SyncState::default()
        };
        let (state, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                store,
                remote,
                config,
                state,
                meta: Mutex::new(meta),
                round_trip: tokio::sync::Mutex::new(()),
                prompts: Mutex::new(None),
                sync_requested: Notify::new(),
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Current sync state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Bookkeeping to persist between runs.
    #[must_use]
    pub fn meta(&self) -> SyncMeta {
        self.meta_lock().clone()
    }

    fn meta_lock(&self) -> MutexGuard<'_, SyncMeta> {
        self.inner.meta.lock().expect("sync meta lock poisoned")
    }

    /// Receive conflict prompts when the policy is [`ConflictPolicy::Ask`].
    ///
    /// Replaces any previous receiver. Without a live receiver, conflicts
    /// are auto-merged.
    pub fn conflict_prompts(&self) -> mpsc::Receiver<ConflictPrompt> {
        let (tx, rx) = mpsc::channel(PROMPT_BUFFER);
        *self.inner.prompts.lock().expect("prompt lock poisoned") = Some(tx);
        rx
    }

    /// Ask a running [`SyncEngine::run`] loop to sync now, cancelling any
    /// pending debounced push.
    pub fn request_sync(&self) {
        self.inner.sync_requested.notify_one();
    }

    /// Whether local data differs from what was last synced.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        let data = self.inner.store.state().data.clone();
        let hash = self.outbound(&data).1;
        has_changed(&hash, self.meta_lock().last_synced_hash.as_deref())
    }

    fn outbound(&self, data: &Snapshot) -> (Snapshot, String, GcStats) {
        let now = self.inner.store.stamper().now();
        let (collected, stats) = gc::collect(data, self.inner.config.retention, now);
        let hash = snapshot_hash(&collected);
        (collected, hash, stats)
    }

    fn record_synced(&self, hash: String) {
        let mut meta = self.meta_lock();
        meta.last_synced_hash = Some(hash);
        meta.last_synced_at = Some(self.inner.store.stamper().now());
    }

    // ── Public operations ────────────────────────────────────

    /// Push local data to the remote, creating the document if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CredentialsMissing`] when sync is off, or the
    /// remote failure.
    pub async fn push(&self) -> SyncResult<SyncReport> {
        self.attempt(async {
            let _guard = self.inner.round_trip.lock().await;
            self.push_locked().await
        })
        .await
    }

    /// Pull with the configured conflict policy.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::pull_with`].
    pub async fn pull(&self) -> SyncResult<SyncReport> {
        self.pull_with(self.inner.config.conflict_policy).await
    }

    /// Pull and resolve with an explicit policy.
    ///
    /// A missing remote document is nothing to pull and reports
    /// [`SyncAction::NoChanges`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CredentialsMissing`], [`SyncError::MalformedBackup`]
    /// or the remote failure. Local data is untouched on error.
    pub async fn pull_with(&self, policy: ConflictPolicy) -> SyncResult<SyncReport> {
        self.attempt(async {
            let _guard = self.inner.round_trip.lock().await;
            match self.pull_locked(policy).await {
                Err(SyncError::NoRemoteDocument) => {
                    info!("No remote document, nothing to pull");
                    Ok(SyncReport::new(SyncAction::NoChanges))
                }
                other => other,
            }
        })
        .await
    }

    /// Pull (when a remote document exists) and push if local data differs.
    ///
    /// # Errors
    ///
    /// Same as [`SyncEngine::pull_with`] and [`SyncEngine::push`].
    pub async fn sync_now(&self) -> SyncResult<SyncReport> {
        self.attempt(async {
            let _guard = self.inner.round_trip.lock().await;
            let pulled = match self.pull_locked(self.inner.config.conflict_policy).await {
                Ok(report) => Some(report),
                Err(SyncError::NoRemoteDocument) => None,
                Err(e) => return Err(e),
            };
            if !self.is_dirty() {
                return Ok(pulled.unwrap_or_else(|| SyncReport::new(SyncAction::NoChanges)));
            }

            let pushed = self.push_locked().await?;
            Ok(match pulled {
                Some(pull) if matches!(pull.action, SyncAction::Merged | SyncAction::Overwritten) => {
                    SyncReport {
                        collected: pushed.collected,
                        gist_id: pushed.gist_id,
                        ..pull
                    }
                }
                Some(pull) => SyncReport {
                    merge: pull.merge,
                    ..pushed
                },
                None => pushed,
            })
        })
        .await
    }

    /// Track status around one sync attempt.
    async fn attempt(&self, op: impl Future<Output = SyncResult<SyncReport>>) -> SyncResult<SyncReport> {
        if !self.inner.store.state().can_sync() {
            return Err(SyncError::CredentialsMissing);
        }

        self.inner.state.send_modify(|s| s.status = SyncStatus::Loading);
        let result = op.await;
        let synced_at = self.meta_lock().last_synced_at;

        self.inner.state.send_modify(|s| match &result {
            Ok(report) => {
                s.status = SyncStatus::Success(report.action);
                s.last_action = Some(report.action);
                s.last_error = None;
                s.last_synced_at = synced_at;
            }
            Err(e) => {
                s.status = SyncStatus::Error(e.to_string());
                s.last_error = Some(e.to_string());
            }
        });
        result
    }

    /// Bound a remote call by the request timeout.
    async fn call<T>(&self, what: &str, fut: impl Future<Output = SyncResult<T>>) -> SyncResult<T> {
        let timeout = self.inner.config.request_timeout;
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::RemoteUnavailable(format!(
                "{what} timed out after {}s",
                timeout.as_secs_f32()
            ))),
        }
    }

    // ── Round-trips (caller holds `round_trip`) ──────────────

    async fn push_locked(&self) -> SyncResult<SyncReport> {
        let state = self.inner.store.state();
        if !state.can_sync() {
            return Err(SyncError::CredentialsMissing);
        }
        let target = RemoteTarget::from_state(&state);

        let (outbound, hash, collected) = self.outbound(&state.data);
        let mut backup = codec::export(&state);
        backup.state.data = outbound;
        let content = codec::encode(&backup)?;

        let updated = if target.has_document() {
            match self.call("update", self.inner.remote.update(&target, &content)).await {
                Ok(()) => true,
                Err(SyncError::NoRemoteDocument) => {
                    warn!(gist = %target.document_id, "Remote document is gone, creating a new one");
                    false
                }
                Err(e) => return Err(e),
            }
        } else {
            false
        };

        let mut report = if updated {
            SyncReport::new(SyncAction::Updated)
        } else {
            let created = self
                .call("create", self.inner.remote.create(&target, &content))
                .await?;
            info!(gist = %created.id, url = %created.url, "Created remote document");
            self.inner.store.set_gist_id(&created.id);
            let mut report = SyncReport::new(SyncAction::Created);
            report.gist_id = Some(created.id);
            report
        };
        report.collected = collected;

        self.record_synced(hash);
        info!(
            remote = self.inner.remote.name(),
            action = %report.action,
            bytes = content.len(),
            collected = collected.total(),
            "Pushed"
        );
        Ok(report)
    }

    async fn pull_locked(&self, policy: ConflictPolicy) -> SyncResult<SyncReport> {
        let state = self.inner.store.state();
        if !state.can_sync() {
            return Err(SyncError::CredentialsMissing);
        }
        let target = RemoteTarget::from_state(&state);
        if !target.has_document() {
            return Err(SyncError::NoRemoteDocument);
        }

        let doc = self.call("fetch", self.inner.remote.fetch(&target)).await?;
        if let Some(owner) = doc.owner {
            self.inner.store.update_profile(&ProfileUpdate {
                user_name: owner.login.filter(|s| !s.is_empty()),
                avatar_url: owner.avatar_url.filter(|s| !s.is_empty()),
                ..ProfileUpdate::default()
            });
        }
        let Some(content) = doc.content else {
            debug!(file = %target.filename, "Remote document has no data file");
            return Err(SyncError::NoRemoteDocument);
        };

        let remote = codec::decode_backup(&content, self.inner.store.stamper().now())?.state.data;
        let remote_hash = snapshot_hash(&remote);
        let local = &state.data;
        if snapshot_hash(local) == remote_hash {
            self.record_synced(remote_hash);
            debug!("Remote matches local");
            return Ok(SyncReport::new(SyncAction::NoChanges));
        }

        let resolution = self.resolve(policy, local, &remote).await;
        debug!(?policy, ?resolution, "Resolving pull");
        match resolution {
            Resolution::UseRemote => {
                self.inner.store.replace_data_since(local, remote);
                self.record_synced(remote_hash);
                info!("Replaced local data with remote");
                Ok(SyncReport::new(SyncAction::Overwritten))
            }
            Resolution::KeepLocal => {
                info!("Keeping local data, overwriting remote");
                self.push_locked().await
            }
            Resolution::Merge => {
                // Merged against the store's current data, not the copy read
                // before the fetch. When local already holds everything the
                // remote has, the remote is simply behind and the next push
                // catches it up.
                let (changed, stats) = self.inner.store.merge_remote(&remote);
                let action = if changed { SyncAction::Merged } else { SyncAction::NoChanges };
                self.record_synced(remote_hash);

                info!(
                    %action,
                    from_remote = stats.from_remote,
                    conflicts = stats.conflicts,
                    resurrected = stats.resurrected,
                    "Pulled"
                );
                let mut report = SyncReport::new(action);
                report.merge = Some(stats);
                Ok(report)
            }
        }
    }

    /// Turn the configured policy into a resolution for this pull.
    ///
    /// `Ask` and `LocalWins` only apply when local data has unsynced edits;
    /// otherwise the remote is simply newer and gets merged in.
    async fn resolve(&self, policy: ConflictPolicy, local: &Snapshot, remote: &Snapshot) -> Resolution {
        let local_dirty = {
            let hash = self.outbound(local).1;
            has_changed(&hash, self.meta_lock().last_synced_hash.as_deref())
        };

        match policy {
            ConflictPolicy::AutoMerge => Resolution::Merge,
            ConflictPolicy::RemoteWins => Resolution::UseRemote,
            ConflictPolicy::LocalWins if local_dirty => Resolution::KeepLocal,
            ConflictPolicy::Ask if local_dirty => self.ask(local, remote).await,
            ConflictPolicy::LocalWins | ConflictPolicy::Ask => Resolution::Merge,
        }
    }

    async fn ask(&self, local: &Snapshot, remote: &Snapshot) -> Resolution {
        let sender = self.inner.prompts.lock().expect("prompt lock poisoned").clone();
        let Some(sender) = sender else {
            debug!("No conflict listener, merging");
            return Resolution::Merge;
        };

        let (reply, answer) = oneshot::channel();
        let prompt = ConflictPrompt {
            local_records: local.record_count(),
            remote_records: remote.record_count(),
            reply,
        };
        if sender.send(prompt).await.is_err() {
            debug!("Conflict listener gone, merging");
            return Resolution::Merge;
        }
        answer.await.unwrap_or(Resolution::Merge)
    }

    // ── Background loop ──────────────────────────────────────

    /// Run the debounce/poll loop until `shutdown` resolves.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        let config = &self.inner.config;
        let mut changes = self.inner.store.subscribe();
        let mut poll = tokio::time::interval(config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut deadline: Option<Instant> = None;
        tokio::pin!(shutdown);

        info!(
            remote = self.inner.remote.name(),
            debounce_ms = config.debounce.as_millis() as u64,
            poll_secs = config.poll_interval.as_secs(),
            policy = %config.conflict_policy,
            "Sync loop started"
        );

        loop {
            let armed = deadline;
            let debounce = async move {
                match armed {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                () = &mut shutdown => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    deadline = self.wants_push().then(|| Instant::now() + config.debounce);
                }
                () = debounce => {
                    deadline = None;
                    if self.wants_push() {
                        log_background("push", self.push().await);
                    }
                }
                _ = poll.tick() => {
                    log_background("pull", self.pull().await);
                    if deadline.is_none() && self.wants_push() {
                        deadline = Some(Instant::now() + config.debounce);
                    }
                }
                () = self.inner.sync_requested.notified() => {
                    deadline = None;
                    log_background("sync", self.sync_now().await);
                }
            }
        }
        info!("Sync loop stopped");
    }

    fn wants_push(&self) -> bool {
        self.inner.store.state().can_sync() && self.is_dirty()
    }
}

fn log_background(what: &str, result: SyncResult<SyncReport>) {
    match result {
        Ok(report) => debug!(what, action = %report.action, "Background sync finished"),
        Err(SyncError::CredentialsMissing) => debug!(what, "Sync disabled, skipping"),
        Err(e) if e.is_transient() => warn!(what, error = %e, "Background sync failed, will retry"),
        Err(e) => warn!(what, error = %e, "Background sync failed"),
    }
}
