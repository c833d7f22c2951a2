use im::OrdMap;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::common::{Value, DOC_ID, DOC_MISSING};
use crate::errors::{ErrorKind, MongishError, MongishResult};
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

const FIELD_SEPARATOR: char = '.';

/// A document: an ordered mapping from field name to [Value].
///
/// Documents are persistent `im::OrdMap`s, so cloning one to hand it to another
/// thread is O(1) and mutations never affect other clones.
///
/// Keys containing `.` address embedded documents, so `doc.get("address.city")`
/// reads the `city` field of the nested `address` document.
///
/// Besides regular fields, the layer maintains a `missing` array on documents
/// whose references could not be resolved; see [Document::add_missing].
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// Embedded keys such as `"user.name"` create intermediate documents as needed.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidFieldName] if the key, or any segment of an
    /// embedded key, is empty.
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("user.name", "Alice")?;
    /// assert_eq!(doc.get("user.name"), Value::String("Alice".to_string()));
    /// ```
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> MongishResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(MongishError::new(
                "Document does not support empty key",
                ErrorKind::InvalidFieldName,
            ));
        }

        let value = value.into();
        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            if splits.iter().any(|s| s.is_empty()) {
                log::error!("Invalid embedded field name {}", key);
                return Err(MongishError::new(
                    &format!("Invalid embedded field name {}", key),
                    ErrorKind::InvalidFieldName,
                ));
            }
            self.deep_put(&splits, value);
        } else {
            self.data.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Returns the value for `key`, or [Value::Null] if there is none.
    pub fn get(&self, key: &str) -> Value {
        match self.data.get(key) {
            Some(value) => value.clone(),
            None if key.contains(FIELD_SEPARATOR) => self.deep_get(key).unwrap_or_default(),
            None => Value::Null,
        }
    }

    /// Borrows the top-level value for `key`.
    pub fn get_ref(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the `_id` of this document, if it has one.
    pub fn id(&self) -> Option<Value> {
        self.data.get(DOC_ID).cloned()
    }

    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// Removes `key` (or an embedded key) from the document.
    pub fn remove(&mut self, key: &str) {
        if self.data.contains_key(key) || !key.contains(FIELD_SEPARATOR) {
            self.data.remove(key);
        } else {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&splits);
        }
    }

    /// Removes a top-level field and returns its value.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Like [Document::contains_key] but also resolves embedded keys.
    pub fn contains_field(&self, field: &str) -> bool {
        self.contains_key(field) || (field.contains(FIELD_SEPARATOR) && self.deep_get(field).is_some())
    }

    /// Returns the top-level field names in key order.
    pub fn fields(&self) -> FieldVec {
        self.data.keys().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Copies every top-level field of `other` into this document.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Records that the reference stored under `field` could not be resolved.
    pub fn add_missing(&mut self, field: &str) {
        match self.data.get_mut(DOC_MISSING).and_then(Value::as_array_mut) {
            Some(missing) => missing.push(Value::from(field)),
            None => {
                self.data
                    .insert(DOC_MISSING.to_string(), Value::Array(vec![Value::from(field)]));
            }
        }
    }

    /// Field names recorded by [Document::add_missing].
    pub fn missing(&self) -> Vec<String> {
        self.data
            .get(DOC_MISSING)
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(|f| f.as_string().cloned()).collect())
            .unwrap_or_default()
    }

    pub fn has_missing(&self) -> bool {
        self.data.contains_key(DOC_MISSING)
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) {
        match splits {
            [] => {}
            [last] => {
                self.data.insert(last.to_string(), value);
            }
            [head, rest @ ..] => {
                let mut nested = match self.data.get(*head) {
                    Some(Value::Document(existing)) => existing.clone(),
                    _ => Document::new(),
                };
                nested.deep_put(rest, value);
                self.data.insert(head.to_string(), Value::Document(nested));
            }
        }
    }

    fn deep_get(&self, key: &str) -> Option<Value> {
        let mut current = Value::Document(self.clone());
        for segment in key.split(FIELD_SEPARATOR) {
            current = match current {
                Value::Document(doc) => doc.data.get(segment)?.clone(),
                Value::Array(items) => {
                    let index = segment.parse::<usize>().ok()?;
                    items.get(index)?.clone()
                }
                _ => return None,
            };
        }
        Some(current)
    }

    fn deep_remove(&mut self, splits: &[&str]) {
        match splits {
            [] => {}
            [last] => {
                self.data.remove(*last);
            }
            [head, rest @ ..] => {
                if let Some(Value::Document(nested)) = self.data.get_mut(*head) {
                    nested.deep_remove(rest);
                }
            }
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = self
            .data
            .iter()
            .map(|(key, value)| format!("\"{}\": {}", key, value.to_json()))
            .join(", ");
        write!(f, "{{{}}}", body)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

/// Builds the `{_id: id}` filter for a point lookup.
pub fn by_id<T: Into<Value>>(id: T) -> Document {
    let mut filter = Document::new();
    filter.data.insert(DOC_ID.to_string(), id.into());
    filter
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a document with JSON-like syntax.
///
/// ```rust
/// use mongish::doc;
///
/// let user = doc! {
///     username: "bob",
///     "primaryEmail": "a@x.com",
///     address: { city: "Oslo" },
///     tags: ["admin", "user"],
///     score: (40 + 2),
/// };
/// assert_eq!(user.get("address.city").as_string().map(|s| s.as_str()), Some("Oslo"));
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
