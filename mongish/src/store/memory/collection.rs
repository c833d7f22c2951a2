use crate::collection::{Document, FindOptions, ObjectId, SortOrder, Update, UpdateResult};
use crate::common::{Value, DOC_ID, DUPLICATE_KEY_CODE, ID_INDEX_NAME};
use crate::errors::{ErrorKind, MongishError, MongishResult};
use crate::store::{IndexConflict, IndexSpec, StoreCollectionProvider};
use indexmap::IndexMap;
use itertools::Itertools;
use parking_lot::RwLock;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A thread-safe in-memory collection.
///
/// Documents are kept in insertion order. Unique indexes are enforced on insert,
/// update and index creation; violations are reported with both the structured
/// [IndexConflict] and the familiar `E11000 ... index: <name> ...` detail.
#[derive(Clone)]
pub struct InMemoryCollection {
    inner: Arc<InMemoryCollectionInner>,
}

impl InMemoryCollection {
    pub fn new(name: &str) -> Self {
        InMemoryCollection {
            inner: Arc::new(InMemoryCollectionInner::new(name)),
        }
    }

    /// Names of the secondary indexes currently defined.
    pub fn index_names(&self) -> Vec<String> {
        self.inner.state.read().indexes.iter().map(|i| i.spec.name()).collect()
    }

    pub(crate) fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
    }
}

impl StoreCollectionProvider for InMemoryCollection {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn insert(&self, document: Document) -> MongishResult<Document> {
        self.inner.insert(document)
    }

    fn find_one(&self, filter: &Document) -> MongishResult<Option<Document>> {
        self.inner.check_opened()?;
        let state = self.inner.state.read();
        Ok(state
            .documents
            .values()
            .find(|doc| matches_filter(doc, filter))
            .cloned())
    }

    fn find(&self, filter: &Document, options: &FindOptions) -> MongishResult<Vec<Document>> {
        self.inner.find(filter, options)
    }

    fn update_one(&self, filter: &Document, update: &Update) -> MongishResult<UpdateResult> {
        self.inner.update_one(filter, update)
    }

    fn remove(&self, filter: &Document) -> MongishResult<u64> {
        self.inner.remove(filter)
    }

    fn count(&self, filter: &Document) -> MongishResult<u64> {
        self.inner.check_opened()?;
        let state = self.inner.state.read();
        Ok(state.documents.values().filter(|doc| matches_filter(doc, filter)).count() as u64)
    }

    fn ensure_index(&self, index: &IndexSpec) -> MongishResult<()> {
        self.inner.ensure_index(index)
    }

    fn drop_indexes(&self) -> MongishResult<()> {
        self.inner.check_opened()?;
        self.inner.state.write().indexes.clear();
        Ok(())
    }
}

struct UniqueEntries {
    spec: IndexSpec,
    // only populated for unique indexes
    keys: HashMap<Vec<Value>, Value>,
}

impl UniqueEntries {
    fn key_of(&self, document: &Document) -> Option<Vec<Value>> {
        let values: Vec<Value> = self.spec.fields().iter().map(|f| document.get(f)).collect();
        if self.spec.is_sparse() && values.iter().all(Value::is_null) {
            None
        } else {
            Some(values)
        }
    }

    fn conflict(&self, collection: &str, key: &[Value]) -> MongishError {
        let dup_key = self
            .spec
            .fields()
            .iter()
            .zip(key)
            .map(|(field, value)| format!("{}: {}", field, value))
            .join(", ");
        let detail = format!(
            "{} duplicate key error collection: {} index: {} dup key: {{ {} }}",
            DUPLICATE_KEY_CODE,
            collection,
            self.spec.name(),
            dup_key
        );
        log::error!("{}", detail);
        MongishError::write_conflict(IndexConflict::new(
            &self.spec.name(),
            self.spec.fields().to_vec(),
            &detail,
        ))
    }
}

#[derive(Default)]
struct CollectionState {
    documents: IndexMap<Value, Document>,
    indexes: Vec<UniqueEntries>,
}

struct InMemoryCollectionInner {
    name: String,
    state: RwLock<CollectionState>,
    closed: AtomicBool,
}

impl InMemoryCollectionInner {
    fn new(name: &str) -> Self {
        InMemoryCollectionInner {
            name: name.to_string(),
            state: RwLock::new(CollectionState::default()),
            closed: AtomicBool::new(false),
        }
    }

    fn check_opened(&self) -> MongishResult<()> {
        if self.closed.load(Ordering::Acquire) {
            log::error!("Collection {} is closed", self.name);
            return Err(MongishError::new(
                &format!("Collection {} is closed", self.name),
                ErrorKind::StoreFailure,
            ));
        }
        Ok(())
    }

    fn insert(&self, mut document: Document) -> MongishResult<Document> {
        self.check_opened()?;
        if !document.has_id() {
            document.put(DOC_ID, ObjectId::new())?;
        }
        let id = document.get(DOC_ID);

        let mut state = self.state.write();
        if state.documents.contains_key(&id) {
            let detail = format!(
                "{} duplicate key error collection: {} index: {} dup key: {{ _id: {} }}",
                DUPLICATE_KEY_CODE, self.name, ID_INDEX_NAME, id
            );
            log::error!("{}", detail);
            return Err(MongishError::write_conflict(IndexConflict::new(
                ID_INDEX_NAME,
                vec![DOC_ID.to_string()],
                &detail,
            )));
        }

        let mut keys = Vec::with_capacity(state.indexes.len());
        for index in state.indexes.iter() {
            let key = if index.spec.is_unique() { index.key_of(&document) } else { None };
            if let Some(key) = &key {
                if index.keys.contains_key(key) {
                    return Err(index.conflict(&self.name, key));
                }
            }
            keys.push(key);
        }

        for (index, key) in state.indexes.iter_mut().zip(keys) {
            if let Some(key) = key {
                index.keys.insert(key, id.clone());
            }
        }
        state.documents.insert(id, document.clone());
        Ok(document)
    }

    fn find(&self, filter: &Document, options: &FindOptions) -> MongishResult<Vec<Document>> {
        self.check_opened()?;
        let state = self.state.read();
        let mut documents: Vec<Document> = state
            .documents
            .values()
            .filter(|doc| matches_filter(doc, filter))
            .cloned()
            .collect();
        drop(state);

        if !options.sort_fields().is_empty() {
            documents.sort_by(|a, b| compare_documents(a, b, options.sort_fields()));
        }

        let skip = options.skip_count().unwrap_or(0) as usize;
        let limit = options.limit_count().map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(documents.into_iter().skip(skip).take(limit).collect())
    }

    fn update_one(&self, filter: &Document, update: &Update) -> MongishResult<UpdateResult> {
        self.check_opened()?;
        if update.set_fields().contains_key(DOC_ID) || update.inc_fields().contains_key(DOC_ID) {
            log::error!("Performing an update on the path '_id' would modify the immutable field '_id'");
            return Err(MongishError::new(
                "Performing an update on the path '_id' would modify the immutable field '_id'",
                ErrorKind::StoreFailure,
            ));
        }

        let mut state = self.state.write();
        let target = state
            .documents
            .iter()
            .find(|(_, doc)| matches_filter(doc, filter))
            .map(|(id, doc)| (id.clone(), doc.clone()));

        let (id, old_doc) = match target {
            Some(found) => found,
            None => return Ok(UpdateResult::default()),
        };

        let new_doc = apply_update(&old_doc, update)?;

        let mut changes = Vec::with_capacity(state.indexes.len());
        for index in state.indexes.iter() {
            if !index.spec.is_unique() {
                changes.push((None, None));
                continue;
            }
            let old_key = index.key_of(&old_doc);
            let new_key = index.key_of(&new_doc);
            if let Some(key) = &new_key {
                match index.keys.get(key) {
                    Some(owner) if *owner != id => return Err(index.conflict(&self.name, key)),
                    _ => {}
                }
            }
            changes.push((old_key, new_key));
        }

        for (index, (old_key, new_key)) in state.indexes.iter_mut().zip(changes) {
            if let Some(key) = old_key {
                index.keys.remove(&key);
            }
            if let Some(key) = new_key {
                index.keys.insert(key, id.clone());
            }
        }

        let modified = (new_doc != old_doc) as u64;
        state.documents.insert(id, new_doc);
        Ok(UpdateResult {
            matched: 1,
            modified,
        })
    }

    fn remove(&self, filter: &Document) -> MongishResult<u64> {
        self.check_opened()?;
        let mut state = self.state.write();
        let removed: Vec<(Value, Document)> = state
            .documents
            .iter()
            .filter(|(_, doc)| matches_filter(doc, filter))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();

        for (id, doc) in removed.iter() {
            for index in state.indexes.iter_mut() {
                if let Some(key) = index.key_of(doc) {
                    if index.keys.get(&key) == Some(id) {
                        index.keys.remove(&key);
                    }
                }
            }
            state.documents.shift_remove(id);
        }
        Ok(removed.len() as u64)
    }

    fn ensure_index(&self, spec: &IndexSpec) -> MongishResult<()> {
        self.check_opened()?;
        if spec.fields().is_empty() {
            log::error!("Index must cover at least one field");
            return Err(MongishError::new(
                "Index must cover at least one field",
                ErrorKind::InvalidOperation,
            ));
        }

        let mut state = self.state.write();
        if state.indexes.iter().any(|i| i.spec.name() == spec.name()) {
            return Ok(());
        }

        let mut entries = UniqueEntries {
            spec: spec.clone(),
            keys: HashMap::new(),
        };
        if spec.is_unique() {
            for (id, doc) in state.documents.iter() {
                if let Some(key) = entries.key_of(doc) {
                    if entries.keys.contains_key(&key) {
                        return Err(entries.conflict(&self.name, &key));
                    }
                    entries.keys.insert(key, id.clone());
                }
            }
        }
        log::debug!("Created index {} on {}", spec.name(), self.name);
        state.indexes.push(entries);
        Ok(())
    }
}

/// Equality match of every filter term; a scalar term also matches arrays
/// containing it.
fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(field, expected)| match document.get(field) {
        Value::Array(items) if !expected.is_array() => items.contains(expected),
        actual => actual == *expected,
    })
}

fn compare_documents(a: &Document, b: &Document, sort_by: &[(String, SortOrder)]) -> CmpOrdering {
    for (field, order) in sort_by {
        let ordering = a.get(field).cmp(&b.get(field));
        let ordering = match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != CmpOrdering::Equal {
            return ordering;
        }
    }
    CmpOrdering::Equal
}

fn apply_update(document: &Document, update: &Update) -> MongishResult<Document> {
    let mut updated = document.clone();
    for (field, value) in update.set_fields().iter() {
        updated.put(field, value.clone())?;
    }

    for (field, amount) in update.inc_fields().iter() {
        let incremented = match (updated.get(field), amount) {
            (Value::Null, amount) if amount.is_number() => amount.clone(),
            (Value::I64(current), Value::I64(amount)) => Value::I64(current.saturating_add(*amount)),
            (current, amount) => match (current.as_number(), amount.as_number()) {
                (Some(current), Some(amount)) => Value::F64(current + amount),
                _ => {
                    log::error!("Cannot apply $inc to non-numeric field {}", field);
                    return Err(MongishError::new(
                        &format!("Cannot apply $inc to non-numeric field {}", field),
                        ErrorKind::StoreFailure,
                    ));
                }
            },
        };
        updated.put(field, incremented)?;
    }
    Ok(updated)
}
