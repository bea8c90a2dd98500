//! Storage layer for the slug engine: the record store contract, an
//! in-memory store and a `PostgreSQL` store on diesel-async.

pub mod db;
pub mod error;
