//! In-memory repository and verifier for local development and tests.
//! Data lives only while the process is running.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{CorrelationId, TaskId, TaskRecord};
use crate::ports::{RepositoryError, TaskRepository, WriteVerifier, kv_key};

/// Activated by `USE_IN_MEMORY_KV=true`. Writes always succeed.
pub struct InMemoryTaskRepository {
    store: Mutex<HashMap<String, TaskRecord>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(
        &self,
        record: &TaskRecord,
        correlation_id: &CorrelationId,
    ) -> Result<bool, RepositoryError> {
        let key = kv_key(&record.id);
        let mut store = self.store.lock().await;
        store.insert(key.clone(), record.clone());
        debug!(cid = %correlation_id, key, size = store.len(), "MEM PUT");
        Ok(true)
    }

    async fn find_by_id(
        &self,
        id: &TaskId,
        correlation_id: &CorrelationId,
    ) -> Result<Option<TaskRecord>, RepositoryError> {
        let key = kv_key(id);
        let store = self.store.lock().await;
        let found = store.get(&key).cloned();
        debug!(cid = %correlation_id, key, hit = found.is_some(), "MEM GET");
        Ok(found)
    }

    async fn delete(
        &self,
        id: &TaskId,
        correlation_id: &CorrelationId,
    ) -> Result<bool, RepositoryError> {
        let key = kv_key(id);
        let mut store = self.store.lock().await;
        store.remove(&key);
        debug!(cid = %correlation_id, key, size = store.len(), "MEM DELETE");
        Ok(true)
    }
}

/// Read-back verifier over the same in-memory store. Pairs with
/// `InMemoryTaskRepository` the way the HTTP verifier pairs with the
/// durable store's read endpoint.
pub struct InMemoryVerifier {
    repo: Arc<InMemoryTaskRepository>,
}

impl InMemoryVerifier {
    pub fn new(repo: Arc<InMemoryTaskRepository>) -> Self {
        Self { repo }
    }

    async fn read(&self, id: &TaskId, cid: &CorrelationId) -> Option<TaskRecord> {
        self.repo.find_by_id(id, cid).await.ok().flatten()
    }
}

#[async_trait]
impl WriteVerifier for InMemoryVerifier {
    async fn confirm_exists(&self, id: &TaskId, cid: &CorrelationId) -> bool {
        self.read(id, cid).await.is_some()
    }

    async fn confirm_fields(&self, id: &TaskId, expected: &TaskRecord, cid: &CorrelationId) -> bool {
        match self.read(id, cid).await {
            Some(found) => found.title == expected.title && found.status == expected.status,
            None => false,
        }
    }

    async fn confirm_absent(&self, id: &TaskId, cid: &CorrelationId) -> bool {
        self.read(id, cid).await.is_none()
    }
}
