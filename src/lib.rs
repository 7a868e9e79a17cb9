//! Verdant: the local data engine behind a personal plant-collection tracker.
//!
//! The crate owns the SQLite database end to end: bootstrapping it from an
//! optional bundled asset, migrating it through versioned schema steps,
//! serializing writes behind a transactional executor, and paging search
//! results incrementally for the species catalog and the specimen collection.

pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod migrations;
pub mod pager;
pub mod photos;
pub mod schema;
pub mod species;
pub mod specimens;
pub mod splitter;
