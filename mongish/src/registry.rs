use crate::common::util::plural_name;
use crate::errors::{ErrorKind, MongishError, MongishResult};
use crate::store::StoreCollection;
use dashmap::DashMap;
use std::sync::Arc;

/// Maps logical collection names to live store collections.
///
/// Every collection is registered under its name and under its plural
/// identifier, so `user` is also reachable as `Users`. The registry is handed
/// to the operations explicitly through an
/// [OperationContext](crate::operation::OperationContext); the operations only
/// ever read from it.
#[derive(Clone, Default)]
pub struct CollectionRegistry {
    inner: Arc<CollectionRegistryInner>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        CollectionRegistry::default()
    }

    /// Registers `collection` under `name` and its plural identifier,
    /// replacing any earlier registration.
    pub fn register(&self, name: &str, collection: StoreCollection) {
        self.inner.register(name, collection)
    }

    pub fn lookup(&self, name: &str) -> Option<StoreCollection> {
        self.inner.lookup(name)
    }

    /// Like [CollectionRegistry::lookup] but reports an unknown name as
    /// [ErrorKind::CollectionNotFound].
    pub fn get(&self, name: &str) -> MongishResult<StoreCollection> {
        match self.inner.lookup(name) {
            Some(collection) => Ok(collection),
            None => {
                log::error!("Collection {} is not registered", name);
                Err(MongishError::new(
                    &format!("Collection {} is not registered", name),
                    ErrorKind::CollectionNotFound,
                ))
            }
        }
    }

    /// Names of the registered collections, without plural aliases, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.names.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.collections.contains_key(name)
    }
}

#[derive(Default)]
struct CollectionRegistryInner {
    collections: DashMap<String, StoreCollection>,
    // registered name -> plural alias
    names: DashMap<String, String>,
}

impl CollectionRegistryInner {
    fn register(&self, name: &str, collection: StoreCollection) {
        let plural = plural_name(name);
        log::debug!("Registering collection {} as {}", name, plural);
        self.collections.insert(plural.clone(), collection.clone());
        self.collections.insert(name.to_string(), collection);
        self.names.insert(name.to_string(), plural);
    }

    fn lookup(&self, name: &str) -> Option<StoreCollection> {
        self.collections.get(name).map(|entry| entry.value().clone())
    }
}
