//! In-memory record store.
//!
//! ## Summary
//! Keeps rows per entity type in creation order behind a `tokio` `RwLock`.
//! The `(scope, slug)` uniqueness check and the write happen under the same
//! write lock, so concurrent writers see the same conflicts a database
//! unique index would raise.

use std::collections::HashMap;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use slugline_core::error::CoreError;
use slugline_core::record::{EntityType, Record};
use slugline_core::registry::EntityConfig;

use crate::db::query::Query;
use crate::db::store::RecordStore;
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<EntityType, Vec<Record>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record of an entity type, in creation order.
    pub async fn records(&self, entity: &str) -> Vec<Record> {
        self.tables
            .read()
            .await
            .get(entity)
            .cloned()
            .unwrap_or_default()
    }
}

fn conflicts(config: &EntityConfig, existing: &Record, candidate: &Record) -> bool {
    let slug_column = config.slug_column();
    existing.id() != candidate.id()
        && existing.get(slug_column) == candidate.get(slug_column)
        && config
            .scope_column()
            .is_none_or(|column| existing.get(column) == candidate.get(column))
}

impl RecordStore for MemoryStore {
    fn first<'a>(
        &'a self,
        config: &'a EntityConfig,
        query: &'a Query,
    ) -> BoxFuture<'a, DbResult<Option<Record>>> {
        async move {
            let tables = self.tables.read().await;
            let Some(rows) = tables.get(config.entity()) else {
                return Ok(None);
            };

            let mut matching = rows.iter().filter(|r| query.is_satisfied_by(r));
            let found = if query.order_by.is_some() {
                matching.min_by(|a, b| query.compare(a, b))
            } else {
                matching.next()
            };
            Ok(found.cloned())
        }
        .boxed()
    }

    fn count<'a>(
        &'a self,
        config: &'a EntityConfig,
        query: &'a Query,
    ) -> BoxFuture<'a, DbResult<u64>> {
        async move {
            let tables = self.tables.read().await;
            let count = tables.get(config.entity()).map_or(0, |rows| {
                rows.iter().filter(|r| query.is_satisfied_by(r)).count()
            });
            Ok(u64::try_from(count).unwrap_or(u64::MAX))
        }
        .boxed()
    }

    fn write<'a>(
        &'a self,
        config: &'a EntityConfig,
        record: &'a Record,
    ) -> BoxFuture<'a, DbResult<Record>> {
        async move {
            if record.entity() != config.entity() {
                return Err(CoreError::InvariantViolation(
                    "record written with the configuration of another entity type",
                )
                .into());
            }

            let mut tables = self.tables.write().await;
            let rows = tables.entry(config.entity().clone()).or_default();

            if rows.iter().any(|existing| conflicts(config, existing, record)) {
                let slug = record.text(config.slug_column()).unwrap_or_default();
                tracing::debug!(entity = %config.entity(), slug, "Slug already taken in scope");
                return Err(DbError::SlugConflict {
                    entity: config.entity().clone(),
                    slug: slug.to_string(),
                });
            }

            match record.id() {
                Some(id) => {
                    let slot = rows
                        .iter_mut()
                        .find(|existing| existing.id() == Some(id))
                        .ok_or_else(|| DbError::RecordNotFound {
                            entity: config.entity().clone(),
                            id,
                        })?;
                    slot.clone_from(record);
                    Ok(record.clone())
                }
                None => {
                    let mut stored = record.clone();
                    stored.set_id(uuid::Uuid::now_v7());
                    rows.push(stored.clone());
                    Ok(stored)
                }
            }
        }
        .boxed()
    }
}
