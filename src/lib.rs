//! Content core for the Penn & Quinn family photo blog: a WordPress WXR
//! importer, a slug-uniqueness allocator, and a SQLite-backed post store.
//! The web layer lives elsewhere and talks to `db` only.

pub mod config;
pub mod db;
pub mod importer;
pub mod model;
pub mod sanitize;
pub mod slug;
