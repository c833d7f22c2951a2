use crate::errors::{ErrorKind, MongishError, MongishResult};
use crate::ID_GENERATOR;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// Identifier stored in the `_id` field of every document.
///
/// Stores assign a fresh `ObjectId` on insert when a document arrives without
/// one. Ids come from a snowflake generator, so they sort roughly by creation time.
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct ObjectId {
    id_value: u64,
}

impl ObjectId {
    /// Generates a new unique `ObjectId`.
    pub fn new() -> Self {
        ObjectId {
            id_value: ID_GENERATOR.next_id(),
        }
    }

    /// Wraps an existing numeric id.
    pub fn from_u64(id_value: u64) -> Self {
        ObjectId { id_value }
    }

    pub fn id_value(&self) -> u64 {
        self.id_value
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = MongishError;

    fn from_str(s: &str) -> MongishResult<Self> {
        match s.parse::<u64>() {
            Ok(id_value) => Ok(ObjectId { id_value }),
            Err(e) => {
                log::error!("Invalid object id {}: {}", s, e);
                Err(MongishError::new(
                    &format!("Invalid object id {}: {}", s, e),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id_value)
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.id_value)
    }
}
