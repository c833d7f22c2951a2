//! The engines behind the collection façade: reference inflation, reverse
//! relation fill, conflict-resolving writes and read/list.
//!
//! Every operation takes an [OperationContext] carrying the registry that
//! reference and fill lookups resolve collection names through, and the
//! configuration bounding fan-out and retries.

mod fill;
mod inflate;
pub(crate) mod read_operations;
pub(crate) mod write_operations;

pub use fill::*;
pub use inflate::*;

use crate::common::util::WorkerBudget;
use crate::mongish_config::MongishConfig;
use crate::registry::CollectionRegistry;

/// Explicit dependencies of an operation.
///
/// Clones share the worker budget, so nested fan-outs of every operation run
/// through one context stay within [MongishConfig::parallelism] workers.
#[derive(Clone, Default)]
pub struct OperationContext {
    registry: CollectionRegistry,
    config: MongishConfig,
    workers: WorkerBudget,
}

impl OperationContext {
    pub fn new(registry: CollectionRegistry, config: MongishConfig) -> Self {
        OperationContext {
            registry,
            config,
            workers: WorkerBudget::new(),
        }
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &MongishConfig {
        &self.config
    }

    pub fn workers(&self) -> &WorkerBudget {
        &self.workers
    }
}
