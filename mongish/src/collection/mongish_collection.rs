use crate::collection::{
    CreateOptions, Document, ListOptions, ReadOptions, Update, UpdateOptions, UpdateResult,
};
use crate::errors::MongishResult;
use crate::operation::{read_operations, write_operations, OperationContext};
use crate::store::StoreCollection;
use std::sync::Arc;

/// A registered collection with the mongish write and read semantics.
///
/// `MongishCollection` is a lightweight handle; clones share the underlying
/// store collection and operation context.
///
/// # Examples
///
/// ```rust,ignore
/// use mongish::collection::{CreateOptions, ForceFields};
/// use mongish::doc;
///
/// let users = db.collection("user")?;
/// let bob = users.create(
///     doc! { primaryEmail: "a@x.com", username: "bob" },
///     CreateOptions::new().force(ForceFields::new().field("primaryEmail")),
/// )?;
/// ```
#[derive(Clone)]
pub struct MongishCollection {
    inner: Arc<MongishCollectionInner>,
}

struct MongishCollectionInner {
    name: String,
    collection: StoreCollection,
    context: OperationContext,
}

impl MongishCollection {
    pub(crate) fn new(name: &str, collection: StoreCollection, context: OperationContext) -> Self {
        MongishCollection {
            inner: Arc::new(MongishCollectionInner {
                name: name.to_string(),
                collection,
                context,
            }),
        }
    }

    /// The name the collection was added under.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The raw store collection, for operations this layer does not wrap.
    pub fn store_collection(&self) -> StoreCollection {
        self.inner.collection.clone()
    }

    /// Inserts a document, resolving unique index conflicts on the fields
    /// named in [CreateOptions::force] and inflating the result when asked.
    ///
    /// # Errors
    ///
    /// * [crate::errors::ErrorKind::WriteConflict] if a conflict cannot be resolved
    /// * [crate::errors::ErrorKind::RetryLimitExceeded] if every attempt conflicted
    /// * [crate::errors::ErrorKind::StoreFailure] if the store fails
    pub fn create(&self, document: Document, options: CreateOptions) -> MongishResult<Document> {
        write_operations::create(&self.inner.context, &self.inner.collection, document, &options)
    }

    /// Updates the first document matching `filter`, resolving unique index
    /// conflicts on the first violated field when [UpdateOptions::force] allows.
    pub fn update(
        &self,
        filter: &Document,
        update: Update,
        options: UpdateOptions,
    ) -> MongishResult<UpdateResult> {
        write_operations::update(&self.inner.context, &self.inner.collection, filter, update, &options)
    }

    /// Finds the first document matching `filter`.
    pub fn read(&self, filter: &Document, options: ReadOptions) -> MongishResult<Option<Document>> {
        read_operations::read(&self.inner.context, &self.inner.collection, filter, &options)
    }

    /// Finds every document matching `filter`.
    pub fn list(&self, filter: &Document, options: ListOptions) -> MongishResult<Vec<Document>> {
        read_operations::list(&self.inner.context, &self.inner.collection, filter, &options)
    }

    pub fn delete(&self, filter: &Document) -> MongishResult<u64> {
        read_operations::delete(&self.inner.collection, filter)
    }

    /// Returns `true` if no document matches `filter`.
    pub fn available(&self, filter: &Document) -> MongishResult<bool> {
        read_operations::available(&self.inner.collection, filter)
    }

    pub fn count(&self, filter: &Document) -> MongishResult<u64> {
        read_operations::count(&self.inner.collection, filter)
    }
}
