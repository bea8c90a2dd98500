//! The storage contract the slug engine calls into.

use futures::future::BoxFuture;

use slugline_core::record::Record;
use slugline_core::registry::EntityConfig;

use crate::db::query::Query;
use crate::error::DbResult;

/// Persistence backend for slugged records.
///
/// ## Summary
/// Implementations must enforce uniqueness of `(scope column, slug column)`
/// for every registered entity type, treating NULL scope values as equal,
/// and report a violation as [`DbError::SlugConflict`](crate::error::DbError::SlugConflict)
/// so the engine can retry with the next suffix.
pub trait RecordStore: Send + Sync {
    /// Returns the first record matching the query, in query order or
    /// creation order.
    fn first<'a>(
        &'a self,
        config: &'a EntityConfig,
        query: &'a Query,
    ) -> BoxFuture<'a, DbResult<Option<Record>>>;

    /// Counts the records matching the query.
    fn count<'a>(&'a self, config: &'a EntityConfig, query: &'a Query)
    -> BoxFuture<'a, DbResult<u64>>;

    /// Inserts a record without an id (assigning a new UUIDv7) or updates the
    /// record with the given id, returning the stored row.
    fn write<'a>(
        &'a self,
        config: &'a EntityConfig,
        record: &'a Record,
    ) -> BoxFuture<'a, DbResult<Record>>;
}
