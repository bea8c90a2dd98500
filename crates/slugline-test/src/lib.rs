//! Slugline integration test support.
//!
//! Re-exports the workspace crates so integration tests can use
//! `slugline_test::` paths.

pub use slugline_core as core;
pub use slugline_db as db;
pub use slugline_service as service;
