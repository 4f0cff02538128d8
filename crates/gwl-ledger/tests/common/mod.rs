#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gwl_content::InMemoryContentBackend;
use gwl_ledger::{Ledger, LedgerConfig};
use gwl_store::{InMemoryMetadataStore, Key, MetadataStore, StoreError, StoreResult};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Metadata, Subscriber};

pub type MemLedger = Ledger<Arc<InMemoryMetadataStore>, Arc<InMemoryContentBackend>>;

pub struct Fixture {
    pub store: Arc<InMemoryMetadataStore>,
    pub content: Arc<InMemoryContentBackend>,
    pub ledger: Arc<MemLedger>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(InMemoryContentBackend::new(), LedgerConfig::default())
    }

    pub fn with(content: InMemoryContentBackend, config: LedgerConfig) -> Self {
        let store = Arc::new(InMemoryMetadataStore::new());
        let content = Arc::new(content);
        let ledger = Ledger::new(Arc::clone(&store), Arc::clone(&content), config).unwrap();
        Self {
            store,
            content,
            ledger: Arc::new(ledger),
        }
    }

    /// A second ledger over the same store and backend, with a cold cache.
    pub fn restart(&self) -> MemLedger {
        Ledger::with_defaults(Arc::clone(&self.store), Arc::clone(&self.content)).unwrap()
    }

    pub async fn raw(&self, path: &str) -> Option<Vec<u8>> {
        self.store.get(&Key::new(path)).await.unwrap()
    }
}

/// Store that can be switched into a failing mode and delays every call.
pub struct FlakyStore {
    inner: InMemoryMetadataStore,
    pub failing: AtomicBool,
    pub delay: Option<Duration>,
}

impl FlakyStore {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            inner: InMemoryMetadataStore::new(),
            failing: AtomicBool::new(false),
            delay,
        }
    }

    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    async fn check(&self) -> StoreResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for FlakyStore {
    async fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        self.check().await?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &Key, value: Vec<u8>) -> StoreResult<()> {
        self.check().await?;
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &Key) -> StoreResult<bool> {
        self.check().await?;
        self.inner.delete(key).await
    }

    async fn keys(&self, prefix: &Key) -> StoreResult<Vec<Key>> {
        self.check().await?;
        self.inner.keys(prefix).await
    }
}

/// Log messages recorded on the current thread while the handle is alive.
pub struct Messages {
    seen: Arc<Mutex<Vec<String>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl Messages {
    pub fn contains(&self, message: &str) -> bool {
        self.seen.lock().unwrap().iter().any(|m| m == message)
    }
}

/// Record every event's message on this thread. Use with the
/// current-thread test runtime.
pub fn capture_messages() -> Messages {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Recorder {
        seen: Arc::clone(&seen),
        next_span: AtomicU64::new(1),
    };
    Messages {
        seen,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}

struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
    next_span: AtomicU64,
}

struct MessageField(Option<String>);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl Subscriber for Recorder {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(self.next_span.fetch_add(1, Ordering::Relaxed))
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut message = MessageField(None);
        event.record(&mut message);
        if let Some(message) = message.0 {
            self.seen.lock().unwrap().push(message);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}
