//! Movie catalog data model types.
//!
//! This crate defines the persistent data model for the collection without
//! any database dependencies. Consumers can use these types directly for
//! serialization, display, or passing to `cinevault-db` for persistence.

pub mod types;

pub use types::*;
