//! Video catalog data model types.
//!
//! This crate defines the persistent data model for the video catalog without
//! any database dependencies. Consumers can use these types directly for
//! display or pass them to `vidshelf-db` for persistence.

pub mod types;

pub use types::*;
