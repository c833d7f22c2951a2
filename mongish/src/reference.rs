//! Reference specifications: which `<field>_id` keys of a document to resolve,
//! against which collection, and how to project the target document.
//!
//! ```rust,ignore
//! use mongish::reference::{Projection, ReferenceSpec};
//!
//! let spec = ReferenceSpec::new()
//!     .reference("friend", Projection::new("user").copy("username"))
//!     .reference("parent", Projection::all("user"))
//!     .reference(
//!         "author",
//!         Projection::new("user").transform("label", |target, _owner| {
//!             Value::from(format!("@{}", target.get("username").to_text()))
//!         }),
//!     );
//! ```

use crate::collection::Document;
use crate::common::{Value, REFERENCE_WILDCARD};
use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Computes a projected value from `(target, owner)`.
pub type Transform = Arc<dyn Fn(&Document, &Document) -> Value + Send + Sync>;

/// How one projected attribute is produced.
#[derive(Clone)]
pub enum FieldRule {
    /// Copy the attribute of the same name from the target document.
    Copy,
    /// Compute the attribute from the target and the owning document.
    Transform(Transform),
}

impl Debug for FieldRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldRule::Copy => write!(f, "Copy"),
            FieldRule::Transform(_) => write!(f, "Transform(..)"),
        }
    }
}

/// Describes how a single reference is resolved.
///
/// The target collection is mandatory, so a projection can never lack one; the
/// name is resolved through the collection registry when inflation runs.
#[derive(Clone, Debug)]
pub struct Projection {
    collection: String,
    embed_all: bool,
    fields: IndexMap<String, FieldRule>,
}

impl Projection {
    /// A projection that yields `{_id}` plus the attributes added later.
    pub fn new(collection: &str) -> Self {
        Projection {
            collection: collection.to_string(),
            embed_all: false,
            fields: IndexMap::new(),
        }
    }

    /// A projection that embeds the entire target document.
    pub fn all(collection: &str) -> Self {
        Projection {
            collection: collection.to_string(),
            embed_all: true,
            fields: IndexMap::new(),
        }
    }

    /// Copies `field` verbatim from the target. Copying `*` embeds the whole target.
    pub fn copy(mut self, field: &str) -> Self {
        if field == REFERENCE_WILDCARD {
            self.embed_all = true;
        } else {
            self.fields.insert(field.to_string(), FieldRule::Copy);
        }
        self
    }

    /// Sets `field` to the result of `transform(target, owner)`.
    pub fn transform<F>(mut self, field: &str, transform: F) -> Self
    where
        F: Fn(&Document, &Document) -> Value + Send + Sync + 'static,
    {
        self.fields
            .insert(field.to_string(), FieldRule::Transform(Arc::new(transform)));
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_wildcard(&self) -> bool {
        self.embed_all
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldRule)> {
        self.fields.iter()
    }
}

/// Maps reference fields to their [Projection]s, in declaration order.
///
/// For a reference field `friend` the raw id is read from `friend_id`.
#[derive(Clone, Debug, Default)]
pub struct ReferenceSpec {
    references: IndexMap<String, Projection>,
}

impl ReferenceSpec {
    pub fn new() -> Self {
        ReferenceSpec::default()
    }

    pub fn reference(mut self, field: &str, projection: Projection) -> Self {
        self.references.insert(field.to_string(), projection);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Projection)> {
        self.references.iter()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
