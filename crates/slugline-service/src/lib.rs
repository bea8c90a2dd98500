//! Slug generation and scope resolution on top of a record store.

pub mod error;
pub mod slug;
