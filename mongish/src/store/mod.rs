//! The store client interface the core depends on, and an in-memory adapter.
//!
//! The core only ever talks to a [StoreCollection]: a cloneable handle over a
//! [StoreCollectionProvider]. Collections are opened by name through a
//! [DocumentStore]. Unique index violations must be reported as
//! [crate::errors::ErrorKind::WriteConflict] errors carrying an [IndexConflict].

mod conflict;
mod document_store;
mod index;
pub mod memory;
mod store_collection;

pub use conflict::*;
pub use document_store::*;
pub use index::*;
pub use store_collection::*;
