use crate::collection::{Document, FindOptions, Update, UpdateResult};
use crate::errors::MongishResult;
use crate::store::IndexSpec;
use std::ops::Deref;
use std::sync::Arc;

/// Interface of a single collection in the underlying document store.
///
/// Filters are documents of equality terms; an empty filter matches every
/// document. Implementations must report unique index violations as
/// [crate::errors::ErrorKind::WriteConflict] (see
/// [crate::errors::MongishError::write_conflict]) and every other failure as
/// [crate::errors::ErrorKind::StoreFailure].
pub trait StoreCollectionProvider: Send + Sync {
    /// Returns the name of this collection.
    fn name(&self) -> String;

    /// Inserts a document, assigning an `_id` if it has none, and returns the
    /// stored document.
    fn insert(&self, document: Document) -> MongishResult<Document>;

    /// Returns the first document matching `filter`.
    fn find_one(&self, filter: &Document) -> MongishResult<Option<Document>>;

    /// Returns every document matching `filter`, sorted and paginated per `options`.
    fn find(&self, filter: &Document, options: &FindOptions) -> MongishResult<Vec<Document>>;

    /// Applies `update` to the first document matching `filter`.
    fn update_one(&self, filter: &Document, update: &Update) -> MongishResult<UpdateResult>;

    /// Removes every document matching `filter` and returns how many were removed.
    fn remove(&self, filter: &Document) -> MongishResult<u64>;

    /// Counts the documents matching `filter`.
    fn count(&self, filter: &Document) -> MongishResult<u64>;

    /// Creates `index` if it does not exist yet.
    fn ensure_index(&self, index: &IndexSpec) -> MongishResult<()>;

    /// Drops every index except the primary `_id` index.
    fn drop_indexes(&self) -> MongishResult<()>;
}

/// A cloneable, thread-safe handle to a store collection.
#[derive(Clone)]
pub struct StoreCollection {
    inner: Arc<dyn StoreCollectionProvider>,
}

impl StoreCollection {
    pub fn new<T: StoreCollectionProvider + 'static>(inner: T) -> Self {
        StoreCollection {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreCollection {
    type Target = Arc<dyn StoreCollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
