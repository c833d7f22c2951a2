//! Shared fixtures for the unit tests of the operation engines.

use crate::collection::{Document, FindOptions, Update, UpdateResult};
use crate::errors::{ErrorKind, MongishError, MongishResult};
use crate::mongish_config::MongishConfig;
use crate::operation::OperationContext;
use crate::registry::CollectionRegistry;
use crate::store::memory::InMemoryCollection;
use crate::store::{IndexConflict, IndexSpec, StoreCollection, StoreCollectionProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A store collection whose every call fails, counting the calls made.
#[derive(Clone, Default)]
pub(crate) struct FailingCollection {
    pub(crate) calls: Arc<AtomicUsize>,
}

impl FailingCollection {
    fn fail<T>(&self) -> MongishResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MongishError::new("connection reset", ErrorKind::StoreFailure))
    }
}

impl StoreCollectionProvider for FailingCollection {
    fn name(&self) -> String {
        "broken".to_string()
    }

    fn insert(&self, _: Document) -> MongishResult<Document> {
        self.fail()
    }

    fn find_one(&self, _: &Document) -> MongishResult<Option<Document>> {
        self.fail()
    }

    fn find(&self, _: &Document, _: &FindOptions) -> MongishResult<Vec<Document>> {
        self.fail()
    }

    fn update_one(&self, _: &Document, _: &Update) -> MongishResult<UpdateResult> {
        self.fail()
    }

    fn remove(&self, _: &Document) -> MongishResult<u64> {
        self.fail()
    }

    fn count(&self, _: &Document) -> MongishResult<u64> {
        self.fail()
    }

    fn ensure_index(&self, _: &IndexSpec) -> MongishResult<()> {
        self.fail()
    }

    fn drop_indexes(&self) -> MongishResult<()> {
        self.fail()
    }
}

/// A context whose registry holds an empty in-memory collection per name.
pub(crate) fn context_with(names: &[&str]) -> OperationContext {
    let registry = CollectionRegistry::new();
    for name in names {
        registry.register(name, StoreCollection::new(InMemoryCollection::new(name)));
    }
    OperationContext::new(registry, MongishConfig::new())
}

/// A context whose `name` collection always fails.
pub(crate) fn failing_context(name: &str) -> (OperationContext, FailingCollection) {
    let broken = FailingCollection::default();
    let registry = CollectionRegistry::new();
    registry.register(name, StoreCollection::new(broken.clone()));
    (OperationContext::new(registry, MongishConfig::new()), broken)
}

/// Peak number of store reads in flight across the collections sharing it.
#[derive(Clone, Default)]
pub(crate) struct ConcurrencyGauge {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyGauge {
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn measure<T>(&self, op: impl FnOnce() -> T) -> T {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        let result = op();
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// An in-memory collection whose reads linger a few milliseconds under a gauge.
pub(crate) struct ThrottledCollection {
    inner: InMemoryCollection,
    gauge: ConcurrencyGauge,
}

impl ThrottledCollection {
    pub(crate) fn new(name: &str, gauge: &ConcurrencyGauge) -> Self {
        ThrottledCollection {
            inner: InMemoryCollection::new(name),
            gauge: gauge.clone(),
        }
    }
}

impl StoreCollectionProvider for ThrottledCollection {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn insert(&self, document: Document) -> MongishResult<Document> {
        self.inner.insert(document)
    }

    fn find_one(&self, filter: &Document) -> MongishResult<Option<Document>> {
        self.gauge.measure(|| self.inner.find_one(filter))
    }

    fn find(&self, filter: &Document, options: &FindOptions) -> MongishResult<Vec<Document>> {
        self.gauge.measure(|| self.inner.find(filter, options))
    }

    fn update_one(&self, filter: &Document, update: &Update) -> MongishResult<UpdateResult> {
        self.inner.update_one(filter, update)
    }

    fn remove(&self, filter: &Document) -> MongishResult<u64> {
        self.inner.remove(filter)
    }

    fn count(&self, filter: &Document) -> MongishResult<u64> {
        self.gauge.measure(|| self.inner.count(filter))
    }

    fn ensure_index(&self, index: &IndexSpec) -> MongishResult<()> {
        self.inner.ensure_index(index)
    }

    fn drop_indexes(&self) -> MongishResult<()> {
        self.inner.drop_indexes()
    }
}

/// An in-memory collection reporting unique violations by native detail only,
/// without the structured field list.
pub(crate) struct DetailOnlyCollection {
    inner: InMemoryCollection,
}

impl DetailOnlyCollection {
    pub(crate) fn new(name: &str) -> Self {
        DetailOnlyCollection {
            inner: InMemoryCollection::new(name),
        }
    }

    fn strip<T>(result: MongishResult<T>) -> MongishResult<T> {
        result.map_err(|e| {
            let detail = e.conflict().map(|conflict| conflict.detail().to_string());
            match detail {
                Some(detail) => MongishError::write_conflict(IndexConflict::from_detail(&detail)),
                None => e,
            }
        })
    }
}

impl StoreCollectionProvider for DetailOnlyCollection {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn insert(&self, document: Document) -> MongishResult<Document> {
        Self::strip(self.inner.insert(document))
    }

    fn find_one(&self, filter: &Document) -> MongishResult<Option<Document>> {
        self.inner.find_one(filter)
    }

    fn find(&self, filter: &Document, options: &FindOptions) -> MongishResult<Vec<Document>> {
        self.inner.find(filter, options)
    }

    fn update_one(&self, filter: &Document, update: &Update) -> MongishResult<UpdateResult> {
        Self::strip(self.inner.update_one(filter, update))
    }

    fn remove(&self, filter: &Document) -> MongishResult<u64> {
        self.inner.remove(filter)
    }

    fn count(&self, filter: &Document) -> MongishResult<u64> {
        self.inner.count(filter)
    }

    fn ensure_index(&self, index: &IndexSpec) -> MongishResult<()> {
        Self::strip(self.inner.ensure_index(index))
    }

    fn drop_indexes(&self) -> MongishResult<()> {
        self.inner.drop_indexes()
    }
}
