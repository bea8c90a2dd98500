//! `PostgreSQL` record store on diesel-async.
//!
//! ## Summary
//! Runs the statements built in [`sql`] through boxed `sql_query`s with typed
//! binds. Slug uniqueness is enforced by one unique index per registered
//! entity type, created by [`PgStore::prepare`]; a violation of that index is
//! reported as [`DbError::SlugConflict`].

pub mod row;
pub mod sql;

use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;
use futures::FutureExt;
use futures::future::BoxFuture;

use slugline_core::record::Record;
use slugline_core::registry::{EntityConfig, SlugRegistry};

use crate::db::DbProvider;
use crate::db::query::Query;
use crate::db::store::RecordStore;
use crate::error::{DbError, DbResult};

use self::sql::{BindValue, SqlStatement};

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    row: String,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

pub struct PgStore<P: DbProvider> {
    provider: P,
}

impl<P: DbProvider> PgStore<P> {
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// ## Summary
    /// Creates the `(scope, slug)` unique index of every registered entity
    /// type if it does not exist yet.
    ///
    /// ## Errors
    /// Returns an error if a connection cannot be obtained or an index cannot
    /// be created (for example on `PostgreSQL` older than 15).
    #[tracing::instrument(skip_all)]
    pub async fn prepare(&self, registry: &SlugRegistry) -> DbResult<()> {
        let mut conn = self.provider.get_connection().await?;
        for config in registry.entities() {
            let statement = sql::create_slug_index(config);
            bind_all(statement).execute(&mut conn).await?;
            tracing::info!(
                entity = %config.entity(),
                index = %config.unique_constraint_name(),
                "Slug unique index ensured"
            );
        }
        Ok(())
    }

    async fn load_rows(&self, statement: SqlStatement) -> DbResult<Vec<JsonRow>> {
        let mut conn = self.provider.get_connection().await?;
        let rows = bind_all(statement).load::<JsonRow>(&mut conn).await?;
        Ok(rows)
    }
}

fn bind_all(statement: SqlStatement) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    let mut query = diesel::sql_query(statement.sql).into_boxed::<Pg>();
    for value in statement.binds {
        query = match value {
            BindValue::Text(text) => query.bind::<diesel::sql_types::Text, _>(text),
            BindValue::Uuid(id) => query.bind::<diesel::sql_types::Uuid, _>(id),
            BindValue::Integer(n) => query.bind::<diesel::sql_types::BigInt, _>(n),
        };
    }
    query
}

fn decode_first(config: &EntityConfig, rows: Vec<JsonRow>) -> DbResult<Option<Record>> {
    rows.into_iter()
        .next()
        .map(|json| row::decode(config, &json.row))
        .transpose()
}

fn count_of(rows: Vec<CountRow>) -> u64 {
    rows.into_iter()
        .next()
        .map_or(0, |r| u64::try_from(r.count).unwrap_or_default())
}

/// Maps a violation of the entity's slug index to `SlugConflict`; every other
/// error, other unique violations included, stays a `DatabaseError`.
fn map_write_error(config: &EntityConfig, record: &Record, err: diesel::result::Error) -> DbError {
    if let diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err
        && info.constraint_name() == Some(config.unique_constraint_name().as_str())
    {
        return DbError::SlugConflict {
            entity: config.entity().clone(),
            slug: record
                .text(config.slug_column())
                .unwrap_or_default()
                .to_string(),
        };
    }
    DbError::DatabaseError(err)
}

impl<P: DbProvider> RecordStore for PgStore<P> {
    fn first<'a>(
        &'a self,
        config: &'a EntityConfig,
        query: &'a Query,
    ) -> BoxFuture<'a, DbResult<Option<Record>>> {
        async move {
            let rows = self.load_rows(sql::select_first(config, query)).await?;
            decode_first(config, rows)
        }
        .boxed()
    }

    fn count<'a>(
        &'a self,
        config: &'a EntityConfig,
        query: &'a Query,
    ) -> BoxFuture<'a, DbResult<u64>> {
        async move {
            let mut conn = self.provider.get_connection().await?;
            let rows = bind_all(sql::count(config, query))
                .load::<CountRow>(&mut conn)
                .await?;
            Ok(count_of(rows))
        }
        .boxed()
    }

    fn write<'a>(
        &'a self,
        config: &'a EntityConfig,
        record: &'a Record,
    ) -> BoxFuture<'a, DbResult<Record>> {
        async move {
            let (id, statement) = match record.id() {
                Some(id) => (id, sql::update(config, id, record)?),
                None => {
                    let id = uuid::Uuid::now_v7();
                    (id, sql::insert(config, id, record)?)
                }
            };

            let mut conn = self.provider.get_connection().await?;
            let rows = bind_all(statement)
                .load::<JsonRow>(&mut conn)
                .await
                .map_err(|err| map_write_error(config, record, err))?;

            decode_first(config, rows)?.ok_or_else(|| DbError::RecordNotFound {
                entity: config.entity().clone(),
                id,
            })
        }
        .boxed()
    }
}
