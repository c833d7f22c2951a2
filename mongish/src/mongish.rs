use crate::collection::{Document, FillOptions, MongishCollection};
use crate::errors::MongishResult;
use crate::mongish_builder::MongishBuilder;
use crate::mongish_config::MongishConfig;
use crate::operation::{fill_many, fill_one, inflate_many, inflate_one, OperationContext};
use crate::reference::ReferenceSpec;
use crate::registry::CollectionRegistry;
use crate::store::{DocumentStore, IndexSpec};
use std::sync::Arc;

/// Declaration of a collection added to a [Mongish] connection.
#[derive(Debug, Clone, Default)]
pub struct CollectionConfig {
    pub indexes: Vec<IndexSpec>,
}

impl CollectionConfig {
    pub fn new() -> Self {
        CollectionConfig::default()
    }

    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }
}

/// A connection to a document store plus the registry of the collections added
/// to it.
///
/// # Examples
///
/// ```rust,ignore
/// use mongish::{CollectionConfig, Mongish};
/// use mongish::store::unique_index;
///
/// let db = Mongish::builder().ensure_indexes(true).open()?;
/// let users = db.add(
///     "user",
///     CollectionConfig::new().index(unique_index("primaryEmail").sparse(true)),
/// )?;
/// // also reachable as "Users"
/// let same = db.collection("Users")?;
/// ```
#[derive(Clone)]
pub struct Mongish {
    inner: Arc<MongishInner>,
}

impl Mongish {
    pub(crate) fn new(store: DocumentStore, config: MongishConfig) -> Self {
        Mongish {
            inner: Arc::new(MongishInner {
                store,
                context: OperationContext::new(CollectionRegistry::new(), config),
            }),
        }
    }

    pub fn builder() -> MongishBuilder {
        MongishBuilder::new()
    }

    /// Opens `name` from the store and registers it under its name and plural
    /// identifier. With `ensure_indexes` configured, every index of the
    /// collection is dropped and the declared ones are created.
    pub fn add(&self, name: &str, config: CollectionConfig) -> MongishResult<MongishCollection> {
        self.inner.add(name, config)
    }

    /// Returns a registered collection by name or plural identifier.
    pub fn collection(&self, name: &str) -> MongishResult<MongishCollection> {
        let store_collection = self.inner.context.registry().get(name)?;
        Ok(MongishCollection::new(name, store_collection, self.inner.context.clone()))
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.inner.context.registry().contains(name)
    }

    /// Names the collections were added under.
    pub fn collection_names(&self) -> Vec<String> {
        self.inner.context.registry().names()
    }

    pub fn config(&self) -> MongishConfig {
        self.inner.context.config().clone()
    }

    pub fn registry(&self) -> CollectionRegistry {
        self.inner.context.registry().clone()
    }

    /// The context the operations of this connection run with.
    pub fn context(&self) -> OperationContext {
        self.inner.context.clone()
    }

    pub fn store(&self) -> DocumentStore {
        self.inner.store.clone()
    }

    pub fn inflate_one(&self, document: Document, spec: &ReferenceSpec) -> MongishResult<Document> {
        inflate_one(&self.inner.context, document, spec)
    }

    pub fn inflate_many(&self, documents: Vec<Document>, spec: &ReferenceSpec) -> MongishResult<Vec<Document>> {
        inflate_many(&self.inner.context, documents, spec)
    }

    pub fn fill_one(
        &self,
        document: Document,
        source: &str,
        key: &str,
        options: FillOptions,
        base_query: Document,
    ) -> MongishResult<Document> {
        fill_one(&self.inner.context, document, source, key, options, base_query)
    }

    pub fn fill_many(
        &self,
        documents: Vec<Document>,
        source: &str,
        key: &str,
        options: FillOptions,
        base_query: Document,
    ) -> MongishResult<Vec<Document>> {
        fill_many(&self.inner.context, documents, source, key, options, base_query)
    }

    pub fn close(&self) -> MongishResult<()> {
        self.inner.store.close()
    }
}

struct MongishInner {
    store: DocumentStore,
    context: OperationContext,
}

impl MongishInner {
    fn add(&self, name: &str, config: CollectionConfig) -> MongishResult<MongishCollection> {
        let store_collection = self.store.collection(name)?;

        if self.context.config().ensure_indexes() {
            log::info!("Ensuring `{}` collection indexes", name);
            store_collection.drop_indexes()?;
            for index in config.indexes.iter() {
                store_collection.ensure_index(index)?;
            }
        }

        self.context.registry().register(name, store_collection.clone());
        Ok(MongishCollection::new(name, store_collection, self.context.clone()))
    }
}
