use crate::errors::{MongishError, MongishResult};
use crate::mongish::Mongish;
use crate::mongish_config::MongishConfig;
use crate::store::memory::InMemoryStore;
use crate::store::DocumentStore;

/// Fluent builder for a [Mongish] connection.
///
/// Invalid settings are remembered and reported by [MongishBuilder::open].
/// Without an explicit store the connection uses an [InMemoryStore].
///
/// ```rust,ignore
/// let db = Mongish::builder()
///     .store(DocumentStore::new(InMemoryStore::new()))
///     .ensure_indexes(true)
///     .parallelism(4)
///     .open()?;
/// ```
#[derive(Default)]
pub struct MongishBuilder {
    error: Option<MongishError>,
    store: Option<DocumentStore>,
    config: MongishConfig,
}

impl MongishBuilder {
    pub fn new() -> Self {
        MongishBuilder {
            error: None,
            store: None,
            config: MongishConfig::new(),
        }
    }

    pub fn store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn ensure_indexes(self, ensure: bool) -> Self {
        self.config.set_ensure_indexes(ensure);
        self
    }

    pub fn max_write_attempts(mut self, attempts: u32) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_max_write_attempts(attempts) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn parallelism(mut self, parallelism: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_parallelism(parallelism) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn view_count_field(mut self, field: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_view_count_field(field) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn open(self) -> MongishResult<Mongish> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let store = self
            .store
            .unwrap_or_else(|| DocumentStore::new(InMemoryStore::new()));
        Ok(Mongish::new(store, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_open_with_defaults() {
        let db = MongishBuilder::new().open().unwrap();
        assert_eq!(db.config().max_write_attempts(), 100);
        assert!(!db.config().ensure_indexes());
    }

    #[test]
    fn test_settings_reach_config() {
        let db = MongishBuilder::new()
            .ensure_indexes(true)
            .max_write_attempts(5)
            .parallelism(2)
            .view_count_field("views")
            .open()
            .unwrap();
        let config = db.config();
        assert!(config.ensure_indexes());
        assert_eq!(config.max_write_attempts(), 5);
        assert_eq!(config.parallelism(), 2);
        assert_eq!(config.view_count_field(), "views");
    }

    #[test]
    fn test_first_error_is_reported_on_open() {
        let result = MongishBuilder::new()
            .parallelism(0)
            .view_count_field("")
            .open();
        let err = result.err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
        assert!(err.message().contains("Parallelism"));
    }
}
