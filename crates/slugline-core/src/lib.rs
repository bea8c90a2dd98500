//! Core types for scoped slug generation: records, table schemas, the
//! entity registry, slug normalization and the ambient configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod params;
pub mod record;
pub mod registry;
pub mod schema;
pub mod util;
