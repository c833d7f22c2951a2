use super::InMemoryCollection;
use crate::errors::{ErrorKind, MongishError, MongishResult};
use crate::store::{DocumentStoreProvider, StoreCollection};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory implementation of a document store.
///
/// Collections live as long as the store and are shared by every handle opened
/// under the same name. Nothing is persisted.
///
/// ```text
/// let store = DocumentStore::new(InMemoryStore::new());
/// let users = store.collection("user")?;
/// users.insert(doc! { username: "bob" })?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

impl DocumentStoreProvider for InMemoryStore {
    fn collection(&self, name: &str) -> MongishResult<StoreCollection> {
        self.inner.collection(name)
    }

    fn close(&self) -> MongishResult<()> {
        self.inner.close()
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    collections: DashMap<String, InMemoryCollection>,
    closed: AtomicBool,
}

impl InMemoryStoreInner {
    fn collection(&self, name: &str) -> MongishResult<StoreCollection> {
        if self.closed.load(Ordering::Acquire) {
            log::error!("Store is already closed");
            return Err(MongishError::new(
                "Store is already closed",
                ErrorKind::StoreFailure,
            ));
        }

        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(MongishError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| InMemoryCollection::new(name))
            .clone();
        Ok(StoreCollection::new(collection))
    }

    fn close(&self) -> MongishResult<()> {
        self.closed.store(true, Ordering::Release);
        for entry in self.collections.iter() {
            entry.value().close();
        }
        self.collections.clear();
        Ok(())
    }
}
