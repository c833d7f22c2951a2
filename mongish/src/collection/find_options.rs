/// Sort direction for [FindOptions].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Options for controlling set lookups on a store collection.
///
/// `FindOptions` carries sorting and pagination; they are passed through to the
/// store untouched. It supports method chaining.
///
/// # Examples
///
/// ```rust,ignore
/// use mongish::collection::{FindOptions, SortOrder};
///
/// let options = FindOptions::new()
///     .sort_by("created", SortOrder::Descending)
///     .skip(10)
///     .limit(20);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub(crate) sort_by: Vec<(String, SortOrder)>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates `FindOptions` with sorting by a field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that limits the number of results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Adds a sort key; earlier keys take precedence.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> FindOptions {
        self.sort_by.push((field_name.to_string(), sort_order));
        self
    }

    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    pub fn sort_fields(&self) -> &[(String, SortOrder)] {
        &self.sort_by
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }
}
