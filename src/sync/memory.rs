//! In-memory [`RemoteStore`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::remote::{CreatedDocument, Owner, RemoteDocument, RemoteStore, RemoteTarget};
use super::types::{SyncError, SyncResult};

#[derive(Debug, Default)]
pub(crate) struct MemoryRemote {
    docs: Mutex<HashMap<String, HashMap<String, String>>>,
    owner: Mutex<Option<Owner>>,
    next_id: AtomicUsize,
    pub(crate) fetches: AtomicUsize,
    pub(crate) updates: AtomicUsize,
    pub(crate) creates: AtomicUsize,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
}

impl MemoryRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seed a document with one file.
    pub(crate) fn put(&self, id: &str, filename: &str, content: &str) {
        self.docs
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .insert(filename.to_string(), content.to_string());
    }

    pub(crate) fn content(&self, id: &str, filename: &str) -> Option<String> {
        self.docs.lock().unwrap().get(id).and_then(|files| files.get(filename).cloned())
    }

    pub(crate) fn set_owner(&self, login: &str, avatar_url: &str) {
        *self.owner.lock().unwrap() = Some(Owner {
            login: Some(login.to_string()),
            avatar_url: Some(avatar_url.to_string()),
        });
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub(crate) fn pushes(&self) -> usize {
        self.updates.load(Ordering::SeqCst) + self.creates.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) -> SyncResult<()> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::RemoteUnavailable("offline".into()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemote {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, target: &RemoteTarget) -> SyncResult<RemoteDocument> {
        self.round_trip().await?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let docs = self.docs.lock().unwrap();
        let files = docs.get(&target.document_id).ok_or(SyncError::NoRemoteDocument)?;
        Ok(RemoteDocument {
            content: files.get(&target.filename).cloned(),
            owner: self.owner.lock().unwrap().clone(),
        })
    }

    async fn update(&self, target: &RemoteTarget, content: &str) -> SyncResult<()> {
        self.round_trip().await?;
        let mut docs = self.docs.lock().unwrap();
        let files = docs.get_mut(&target.document_id).ok_or(SyncError::NoRemoteDocument)?;
        files.insert(target.filename.clone(), content.to_string());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create(&self, target: &RemoteTarget, content: &str) -> SyncResult<CreatedDocument> {
        self.round_trip().await?;
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.put(&id, &target.filename, content);
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedDocument {
            url: format!("memory://{id}"),
            id,
        })
    }
}
