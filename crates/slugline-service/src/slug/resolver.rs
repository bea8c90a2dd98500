//! Resolution of slug path parameters across a scope chain.
//!
//! ## Summary
//! `find_by_params` resolves parents before children: for a `sub_item`
//! scoped by `item`, the `item` entry of the params is resolved first and the
//! `sub_item` slug is then looked up among that item's children.
//!
//! When the target's own slug is missing, a scoped lookup returns a
//! representative of the scope instead of failing: the parent's default
//! child (first by the `has_many` ordering column) when the parent declares
//! one, otherwise any record in the scope. `to_params` builds the inverse
//! map for link building.

use futures::FutureExt;
use futures::future::BoxFuture;

use slugline_core::error::CoreError;
use slugline_core::params::SlugParams;
use slugline_core::record::{EntityType, Record};
use slugline_core::registry::{EntityConfig, SlugScope};
use slugline_db::db::query::{Condition, Query};

use crate::error::{ServiceError, ServiceResult};

use super::SlugEngine;

impl SlugEngine {
    /// ## Summary
    /// Finds the record of `entity` addressed by the path parameters.
    ///
    /// ## Errors
    /// Returns `NotFound` if no record matches after the fallbacks,
    /// `ConfigurationError` if the scope chain names an unregistered entity
    /// type or loops back on itself, or a database error.
    pub async fn find_by_params(&self, entity: &str, params: &SlugParams) -> ServiceResult<Record> {
        self.resolve(entity, params, Vec::new()).await
    }

    /// ## Summary
    /// Builds the path parameters addressing `record`: its own slug, the
    /// parameters of its parent chain and the value of its scope column.
    ///
    /// A NULL foreign key or scope value contributes no entry.
    ///
    /// ## Errors
    /// Returns `NotFound` if a referenced parent does not exist,
    /// `ConfigurationError` if two levels of the chain produce the same key,
    /// `InvalidInput` if the record has no slug yet, or a database error.
    pub async fn to_params(&self, record: &Record) -> ServiceResult<SlugParams> {
        self.collect_params(record, Vec::new()).await
    }

    fn resolve<'a>(
        &'a self,
        entity: &'a str,
        params: &'a SlugParams,
        mut chain: Vec<&'a str>,
    ) -> BoxFuture<'a, ServiceResult<Record>> {
        async move {
            if chain.contains(&entity) {
                return Err(cyclic_chain(entity, &chain));
            }
            chain.push(entity);

            let config = self.config(entity)?;
            let own_slug = params.get(entity);
            let slug_condition = |slug: &str| Condition::equals(config.slug_column(), slug);

            let found = match config.scope() {
                SlugScope::Unscoped => match own_slug {
                    Some(slug) => {
                        let query = Query::new().filter(slug_condition(slug));
                        self.store.first(config, &query).await?
                    }
                    None => None,
                },
                SlugScope::Association {
                    parent,
                    foreign_key,
                } => {
                    let parent_record = self.resolve(parent.as_str(), params, chain).await?;
                    let parent_id = parent_record.id().ok_or(CoreError::InvariantViolation(
                        "stored parent record has no id",
                    ))?;
                    let in_scope = Condition::equals(foreign_key.as_str(), parent_id);

                    match own_slug {
                        Some(slug) => {
                            let query = Query::new().filter(slug_condition(slug)).filter(in_scope);
                            self.store.first(config, &query).await?
                        }
                        None => self.default_child(config, parent, in_scope).await?,
                    }
                }
                SlugScope::Value { column } => {
                    let in_scope = Condition::equals(column.as_str(), params.get(column));
                    let query = match own_slug {
                        Some(slug) => Query::new().filter(slug_condition(slug)).filter(in_scope),
                        None => {
                            tracing::debug!(entity, "No own slug given, picking any record in scope");
                            Query::new().filter(in_scope)
                        }
                    };
                    self.store.first(config, &query).await?
                }
            };

            found.ok_or_else(|| {
                tracing::debug!(entity, ?params, "No record matches path parameters");
                ServiceError::NotFound(format!("{entity} for params {params:?}"))
            })
        }
        .boxed()
    }

    /// Representative child of a resolved parent when the own slug is absent.
    async fn default_child(
        &self,
        config: &EntityConfig,
        parent: &EntityType,
        in_scope: Condition,
    ) -> ServiceResult<Option<Record>> {
        let parent_config = self.config(parent.as_str())?;
        let mut query = Query::new().filter(in_scope);

        if let Some(assoc) = parent_config.schema().find_has_many(config.entity()) {
            if config.schema().find_column(&assoc.order_by).is_none() {
                return Err(ServiceError::ConfigurationError(format!(
                    "has_many '{}' of '{parent}' orders by unknown column '{}'",
                    config.entity(),
                    assoc.order_by
                )));
            }
            tracing::debug!(
                entity = %config.entity(),
                %parent,
                order_by = %assoc.order_by,
                "No own slug given, using the parent's default child"
            );
            query = query.order_by(assoc.order_by.as_str());
        } else {
            tracing::debug!(
                entity = %config.entity(),
                %parent,
                "No own slug given, picking any child of the parent"
            );
        }

        Ok(self.store.first(config, &query).await?)
    }

    fn collect_params<'a>(
        &'a self,
        record: &'a Record,
        mut chain: Vec<EntityType>,
    ) -> BoxFuture<'a, ServiceResult<SlugParams>> {
        async move {
            let entity = record.entity();
            if chain.contains(entity) {
                let names: Vec<&str> = chain.iter().map(EntityType::as_str).collect();
                return Err(cyclic_chain(entity.as_str(), &names));
            }
            chain.push(entity.clone());

            let config = self.config(entity.as_str())?;
            let slug = record.text(config.slug_column()).ok_or_else(|| {
                CoreError::InvalidInput(format!("{entity} record has no slug yet"))
            })?;

            let mut params = SlugParams::new();
            params.insert(entity.as_str(), slug);

            match config.scope() {
                SlugScope::Unscoped => {}
                SlugScope::Association {
                    parent,
                    foreign_key,
                } => {
                    if let Some(parent_id) = record.get(foreign_key).as_uuid() {
                        let parent_config = self.config(parent.as_str())?;
                        let query = Query::new().filter(Condition::IdEq(parent_id));
                        let parent_record = self
                            .store
                            .first(parent_config, &query)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("{parent} with id {parent_id}"))
                            })?;

                        let parent_params = self.collect_params(&parent_record, chain).await?;
                        for (key, value) in parent_params {
                            insert_unique(&mut params, key, value)?;
                        }
                    }
                }
                SlugScope::Value { column } => {
                    if let Some(value) = record.text(column) {
                        insert_unique(&mut params, column.clone(), value.to_string())?;
                    }
                }
            }

            Ok(params)
        }
        .boxed()
    }
}

fn insert_unique(params: &mut SlugParams, key: String, value: String) -> ServiceResult<()> {
    if params.contains_key(&key) {
        return Err(ServiceError::ConfigurationError(format!(
            "path parameter '{key}' is produced by more than one level of the scope chain"
        )));
    }
    params.insert(key, value);
    Ok(())
}

fn cyclic_chain(entity: &str, chain: &[&str]) -> ServiceError {
    ServiceError::ConfigurationError(format!(
        "scope chain is cyclic: {} -> {entity}",
        chain.join(" -> ")
    ))
}
