use crate::common::INDEX_DIRECTION;
use once_cell::sync::Lazy;
use regex::Regex;

static INDEX_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| match Regex::new(r"index: ([^\s]+)") {
    Ok(pattern) => Some(pattern),
    Err(e) => {
        log::error!("Failed to compile index detail pattern: {}", e);
        None
    }
});

/// A unique index violation as reported by a store.
///
/// Stores that know which fields an index covers fill in `fields`; the legacy
/// path only has the native `detail` message, from which the fields are parsed
/// by [parse_conflict_detail].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConflict {
    index_name: String,
    fields: Vec<String>,
    detail: String,
}

impl IndexConflict {
    pub fn new(index_name: &str, fields: Vec<String>, detail: &str) -> Self {
        IndexConflict {
            index_name: index_name.to_string(),
            fields,
            detail: detail.to_string(),
        }
    }

    /// Builds a conflict from nothing but a native error message.
    pub fn from_detail(detail: &str) -> Self {
        let index_name = parse_index_name(detail).unwrap_or_default();
        IndexConflict {
            index_name,
            fields: Vec::new(),
            detail: detail.to_string(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Field names that may have caused the conflict, in index order.
    pub fn candidate_fields(&self) -> Vec<String> {
        if self.fields.is_empty() {
            parse_conflict_detail(&self.detail)
        } else {
            self.fields.clone()
        }
    }
}

/// Extracts the `<token>` of an `"index: <token>"` conflict detail.
pub fn parse_index_name(detail: &str) -> Option<String> {
    INDEX_PATTERN
        .as_ref()?
        .captures(detail)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Recovers candidate field names from a native conflict detail.
///
/// The index token is split on the `1` direction markers and each piece is
/// trimmed of `_`, so `a_1_b_1` yields `["a", "b"]`. Field names that contain
/// a `1` themselves cannot be recovered this way.
pub fn parse_conflict_detail(detail: &str) -> Vec<String> {
    match parse_index_name(detail) {
        Some(token) => token
            .split(INDEX_DIRECTION)
            .map(|piece| piece.trim_matches('_'))
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}
