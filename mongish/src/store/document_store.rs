use crate::errors::MongishResult;
use crate::store::StoreCollection;
use std::ops::Deref;
use std::sync::Arc;

/// A connected document store that hands out collections by name.
pub trait DocumentStoreProvider: Send + Sync {
    /// Opens (creating if needed) the collection called `name`.
    fn collection(&self, name: &str) -> MongishResult<StoreCollection>;

    fn close(&self) -> MongishResult<()>;
}

/// A cloneable handle to a [DocumentStoreProvider].
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
