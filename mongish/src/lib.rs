#![allow(clippy::new_without_default)]
//! # Mongish - a convenience layer over a document store
//!
//! Mongish wraps the collections of a document store and adds three things a
//! raw driver does not do:
//!
//! - **Reference inflation**: `<field>_id` keys are replaced by the referenced
//!   document, a projection of it, or a `missing` marker when it is gone.
//! - **Reverse-relation fill**: a document gets the list of documents pointing
//!   at it, plus their count under `<name>_cnt`.
//! - **Conflict-resolving writes**: a create or update that hits a unique
//!   index can rewrite the offending field with a `-<attempt>` suffix and retry.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mongish::collection::{CreateOptions, FillOptions, ForceFields};
//! use mongish::reference::{Projection, ReferenceSpec};
//! use mongish::store::unique_index;
//! use mongish::{doc, CollectionConfig, Mongish};
//!
//! let db = Mongish::builder().ensure_indexes(true).open()?;
//! let users = db.add("user", CollectionConfig::new().index(unique_index("primaryEmail")))?;
//! let posts = db.add("post", CollectionConfig::new())?;
//!
//! let bob = users.create(
//!     doc! { primaryEmail: "a@x.com", username: "bob" },
//!     CreateOptions::new().force(ForceFields::new().field("primaryEmail")),
//! )?;
//!
//! let spec = ReferenceSpec::new().reference("author", Projection::new("user").copy("username"));
//! posts.create(doc! { title: "hi", author_id: (bob.get("_id")) }, CreateOptions::new().inflate(spec))?;
//!
//! let bob = db.fill_one(bob, "post", "author_id", FillOptions::new(), doc! {})?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, ids, options and the collection façade
//! - [`common`] - Values, constants and utilities
//! - [`errors`] - Error types and result definitions
//! - [`operation`] - Inflation, fill, write and read engines
//! - [`reference`] - Reference specifications
//! - [`registry`] - Name to collection registry
//! - [`store`] - Store client interface and the in-memory adapter
//! - [`mongish`], [`mongish_builder`], [`mongish_config`] - Connection setup

use crate::collection::snowflake::SnowflakeIdGenerator;
use std::sync::LazyLock;
use std::thread::available_parallelism;

pub mod collection;
pub mod common;
pub mod errors;
pub mod mongish;
pub mod mongish_builder;
pub mod mongish_config;
pub mod operation;
pub mod reference;
pub mod registry;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::mongish::{CollectionConfig, Mongish};
pub use crate::mongish_builder::MongishBuilder;

pub(crate) static ID_GENERATOR: LazyLock<SnowflakeIdGenerator> =
    LazyLock::new(SnowflakeIdGenerator::new);

/// Returns the number of available CPU cores, or 1 if it cannot be detected.
///
/// ```rust
/// assert!(mongish::get_cpu_count() > 0);
/// ```
pub fn get_cpu_count() -> usize {
    available_parallelism()
        .map(|p| p.get())
        .unwrap_or_else(|err| {
            log::warn!("Failed to detect available parallelism: {}. Defaulting to single thread.", err);
            1
        })
}
