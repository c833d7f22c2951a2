use crate::common::{INDEX_DIRECTION, INDEX_NAME_SEPARATOR};
use itertools::Itertools;

/// Declares an index over one or more fields.
///
/// The index name is assembled from the fields the way document stores do it:
/// `primaryEmail_1` for a single field, `a_1_b_1` for a compound index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexSpec {
    fields: Vec<String>,
    unique: bool,
    sparse: bool,
}

impl IndexSpec {
    pub fn new(fields: &[&str]) -> Self {
        IndexSpec {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            unique: false,
            sparse: false,
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// A sparse index ignores documents that lack every indexed field.
    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    pub fn name(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{}{}{}", field, INDEX_NAME_SEPARATOR, INDEX_DIRECTION))
            .join(INDEX_NAME_SEPARATOR)
    }
}

/// A unique index on a single field.
pub fn unique_index(field: &str) -> IndexSpec {
    IndexSpec::new(&[field]).unique(true)
}
