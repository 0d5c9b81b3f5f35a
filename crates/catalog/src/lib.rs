//! Product catalog domain module.
//!
//! This crate contains the rules for the name → resource-link catalog,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod product;

pub use product::{Catalog, CatalogEntries};
