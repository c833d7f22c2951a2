//! Runtime configuration shared by a connection and every operation it runs.

use crate::common::{DEFAULT_MAX_WRITE_ATTEMPTS, DEFAULT_VIEW_COUNT_FIELD};
use crate::errors::{ErrorKind, MongishError, MongishResult};
use crate::get_cpu_count;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// Public interface for mongish configuration.
///
/// Cloning is cheap and every clone observes the same settings.
///
/// # Examples
///
/// ```rust,ignore
/// use mongish::Mongish;
///
/// let db = Mongish::builder()
///     .ensure_indexes(true)
///     .max_write_attempts(10)
///     .open()?;
/// assert_eq!(db.config().max_write_attempts(), 10);
/// ```
#[derive(Clone)]
pub struct MongishConfig {
    inner: Arc<MongishConfigInner>,
}

impl Default for MongishConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MongishConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        MongishConfig {
            inner: Arc::new(MongishConfigInner::new()),
        }
    }

    /// Whether declared indexes are dropped and recreated when a collection is added.
    pub fn ensure_indexes(&self) -> bool {
        self.inner.ensure_indexes.load(Ordering::Relaxed)
    }

    pub fn set_ensure_indexes(&self, ensure: bool) {
        self.inner.ensure_indexes.store(ensure, Ordering::Relaxed)
    }

    /// Upper bound on insert/update attempts of a conflict-resolving write.
    pub fn max_write_attempts(&self) -> u32 {
        self.inner.max_write_attempts.load(Ordering::Relaxed)
    }

    /// Sets the attempt cap.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ConfigurationError] if `attempts` is zero.
    pub fn set_max_write_attempts(&self, attempts: u32) -> MongishResult<()> {
        if attempts == 0 {
            log::error!("Max write attempts must be at least 1");
            return Err(MongishError::new(
                "Max write attempts must be at least 1",
                ErrorKind::ConfigurationError,
            ));
        }
        self.inner.max_write_attempts.store(attempts, Ordering::Relaxed);
        Ok(())
    }

    /// Maximum number of worker threads a single fan-out may use.
    pub fn parallelism(&self) -> usize {
        self.inner.parallelism.load(Ordering::Relaxed)
    }

    /// Sets the fan-out worker bound.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ConfigurationError] if `parallelism` is zero.
    pub fn set_parallelism(&self, parallelism: usize) -> MongishResult<()> {
        if parallelism == 0 {
            log::error!("Parallelism must be at least 1");
            return Err(MongishError::new(
                "Parallelism must be at least 1",
                ErrorKind::ConfigurationError,
            ));
        }
        self.inner.parallelism.store(parallelism, Ordering::Relaxed);
        Ok(())
    }

    /// Field bumped by the `inc` option of read and list.
    pub fn view_count_field(&self) -> String {
        self.inner.view_count_field.read().clone()
    }

    /// Sets the view count field.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ConfigurationError] if `field` is empty.
    pub fn set_view_count_field(&self, field: &str) -> MongishResult<()> {
        if field.is_empty() {
            log::error!("View count field cannot be empty");
            return Err(MongishError::new(
                "View count field cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }
        *self.inner.view_count_field.write() = field.to_string();
        Ok(())
    }
}

struct MongishConfigInner {
    ensure_indexes: AtomicBool,
    max_write_attempts: AtomicU32,
    parallelism: AtomicUsize,
    view_count_field: RwLock<String>,
}

impl MongishConfigInner {
    fn new() -> Self {
        MongishConfigInner {
            ensure_indexes: AtomicBool::from(false),
            max_write_attempts: AtomicU32::from(DEFAULT_MAX_WRITE_ATTEMPTS),
            parallelism: AtomicUsize::from(get_cpu_count().max(1)),
            view_count_field: RwLock::new(DEFAULT_VIEW_COUNT_FIELD.to_string()),
        }
    }
}
