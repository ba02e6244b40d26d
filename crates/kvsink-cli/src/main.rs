use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::time::{Duration, sleep};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kvsink_core::app::inbound::{
    CreatedMessage, DeletedMessage, UpdatedMessage, command_from_created, command_from_deleted,
    command_from_updated,
};
use kvsink_core::app::{CommandDispatcher, Dispatch, EventBus, PurgeReactor, RetrySaga};
use kvsink_core::config::Settings;
use kvsink_core::domain::{CorrelationId, TaskId, TaskRecord};
use kvsink_core::impls::{
    HttpCachePurger, HttpWriteVerifier, InMemoryTaskRepository, InMemoryVerifier,
};
use kvsink_core::ports::{CachePurger, RepositoryError, TaskRepository, WriteVerifier};

/// 最初の N 回の save を意図的に落として saga のリトライを見せる
struct FlakyRepository {
    inner: Arc<InMemoryTaskRepository>,
    remaining_failures: AtomicU32,
}

impl FlakyRepository {
    fn new(inner: Arc<InMemoryTaskRepository>, n: u32) -> Self {
        Self {
            inner,
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl TaskRepository for FlakyRepository {
    async fn save(
        &self,
        record: &TaskRecord,
        correlation_id: &CorrelationId,
    ) -> Result<bool, RepositoryError> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(RepositoryError::Transport(format!(
                "intentional failure (left={left})"
            )));
        }
        self.inner.save(record, correlation_id).await
    }

    async fn find_by_id(
        &self,
        id: &TaskId,
        correlation_id: &CorrelationId,
    ) -> Result<Option<TaskRecord>, RepositoryError> {
        self.inner.find_by_id(id, correlation_id).await
    }

    async fn delete(
        &self,
        id: &TaskId,
        correlation_id: &CorrelationId,
    ) -> Result<bool, RepositoryError> {
        self.inner.delete(id, correlation_id).await
    }
}

/// store のエントリ数が期待値になるまでポーリング
async fn wait_for_len(store: &InMemoryTaskRepository, expected: usize) {
    for _ in 0..200 {
        if store.len().await == expected {
            return;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("store never reached {expected} entries");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::from_env();

    // (A) ストアと検証を用意（USE_IN_MEMORY_KV=1 で完全ローカル動作）
    let store = Arc::new(InMemoryTaskRepository::new());
    let repo: Arc<dyn TaskRepository> = Arc::new(FlakyRepository::new(Arc::clone(&store), 2));
    let verifier: Arc<dyn WriteVerifier> = if settings.use_in_memory {
        Arc::new(InMemoryVerifier::new(Arc::clone(&store)))
    } else {
        Arc::new(HttpWriteVerifier::new(&settings).expect("reqwest client"))
    };
    let purger: Arc<dyn CachePurger> =
        Arc::new(HttpCachePurger::new(&settings).expect("reqwest client"));
    info!(
        in_memory = settings.use_in_memory,
        web_cache = settings.with_web_cache,
        "pipeline starting"
    );

    // (B) パイプラインを組み立て：bus → dispatcher → saga / purge reactor
    let bus = EventBus::new();
    let dispatcher = Arc::new(CommandDispatcher::new(repo, verifier, bus.clone()));
    let saga = RetrySaga::spawn(&bus, Arc::clone(&dispatcher) as Arc<dyn Dispatch>);
    let reactor = PurgeReactor::spawn(&bus, purger, settings.with_web_cache);

    // (C) tasks.created を流す（最初の 2 回は save が落ちて saga が拾う）
    let created: CreatedMessage = serde_json::from_value(serde_json::json!({
        "id": "demo-1",
        "title": "Write the demo",
    }))
    .expect("created message");
    dispatcher.dispatch(command_from_created(created)).await;
    wait_for_len(&store, 1).await;
    info!("create confirmed after retries");

    // (D) tasks.updated（部分更新）と tasks.deleted
    let updated: UpdatedMessage = serde_json::from_value(serde_json::json!({
        "id": "demo-1",
        "status": "done",
    }))
    .expect("updated message");
    dispatcher
        .dispatch(command_from_updated(updated).expect("task id present"))
        .await;

    let deleted: DeletedMessage = serde_json::from_value(serde_json::json!({
        "id": "demo-1",
    }))
    .expect("deleted message");
    dispatcher
        .dispatch(command_from_deleted(deleted).expect("task id present"))
        .await;
    wait_for_len(&store, 0).await;
    info!("delete confirmed");

    // (E) graceful shutdown
    saga.shutdown_and_join().await;
    reactor.shutdown_and_join().await;
}
