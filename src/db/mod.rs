//! Database module: SQLite pool setup and the post repository.
//!
//! `repo` holds SQL-only functions that map rows into the domain types from
//! `crate::model`. External modules should import from `pennquinn::db` — the
//! repository API is re-exported here.

pub mod repo;

pub use repo::*;
