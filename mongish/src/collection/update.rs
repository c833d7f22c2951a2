use crate::collection::Document;
use crate::common::Value;
use crate::errors::MongishResult;

/// An update payload: fields to overwrite (`$set`) and numeric fields to
/// increment (`$inc`).
///
/// ```rust,ignore
/// let update = Update::new().set("username", "carl")?.inc("vcnt", 1)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub(crate) set: Document,
    pub(crate) inc: Document,
}

impl Update {
    pub fn new() -> Self {
        Update::default()
    }

    /// Builds an update that sets every field of `fields`.
    pub fn set_all(fields: Document) -> Self {
        Update {
            set: fields,
            inc: Document::new(),
        }
    }

    pub fn set<T: Into<Value>>(mut self, field: &str, value: T) -> MongishResult<Self> {
        self.set.put(field, value)?;
        Ok(self)
    }

    pub fn inc<T: Into<Value>>(mut self, field: &str, amount: T) -> MongishResult<Self> {
        self.inc.put(field, amount)?;
        Ok(self)
    }

    /// The `$set` part of the update.
    pub fn set_fields(&self) -> &Document {
        &self.set
    }

    pub fn set_fields_mut(&mut self) -> &mut Document {
        &mut self.set
    }

    /// The `$inc` part of the update.
    pub fn inc_fields(&self) -> &Document {
        &self.inc
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty()
    }
}

/// Outcome of an update against a store collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}
