//! Documents, ids, write payloads, caller options and the collection façade.
//!
//! A [Document] is an ordered mapping from field name to [crate::common::Value].
//! Nested fields are addressed with `.`:
//!
//! ```rust,ignore
//! use mongish::collection::Document;
//!
//! let mut doc = Document::new();
//! doc.put("username", "bob")?;
//! doc.put("address.city", "Oslo")?;
//! ```
//!
//! A [MongishCollection] wraps a registered store collection and layers
//! conflict-resolving writes, inflation on read and view counting on top of it.
//!
//! # Reserved Fields
//!
//! - `_id` - Document ID, assigned by the store on insert when absent
//! - `created` / `updated` - timestamps maintained by create and update
//! - `missing` - names of references that could not be resolved

mod document;
mod find_options;
mod mongish_collection;
mod object_id;
mod options;
pub(crate) mod snowflake;
mod update;

pub use document::*;
pub use find_options::*;
pub use mongish_collection::*;
pub use object_id::ObjectId;
pub use options::*;
pub use update::*;
