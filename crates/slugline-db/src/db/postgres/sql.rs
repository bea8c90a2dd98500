//! SQL statement construction for the `PostgreSQL` store.
//!
//! ## Summary
//! Identifiers come from a validated registry and are double-quoted; every
//! value is a positional bind parameter. NULLs are written as the `NULL`
//! keyword (`IS NULL` in conditions) so no untyped parameter is ever sent.
//! Rows are returned as a single `row_to_json` text column and decoded
//! against the table schema.

use slugline_core::constants::ID_COLUMN;
use slugline_core::error::CoreError;
use slugline_core::record::{FieldValue, Record};
use slugline_core::registry::EntityConfig;

use crate::db::query::{Condition, Query};
use crate::error::DbResult;

/// Typed value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Uuid(uuid::Uuid),
    Integer(i64),
}

/// A statement and its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

const ROW_ALIAS: &str = "t";
const RETURNING_ROW: &str = " RETURNING row_to_json(t)::text AS row";

#[derive(Default)]
struct SqlWriter {
    sql: String,
    binds: Vec<BindValue>,
}

impl SqlWriter {
    fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    fn push_ident(&mut self, ident: &str) -> &mut Self {
        self.sql.push('"');
        self.sql.push_str(&ident.replace('"', "\"\""));
        self.sql.push('"');
        self
    }

    fn push_bind(&mut self, value: BindValue) -> &mut Self {
        self.binds.push(value);
        self.sql.push('$');
        self.sql.push_str(&self.binds.len().to_string());
        self
    }

    fn push_value(&mut self, value: &FieldValue) -> &mut Self {
        match value {
            FieldValue::Null => self.push("NULL"),
            FieldValue::Text(text) => self.push_bind(BindValue::Text(text.clone())),
            FieldValue::Uuid(id) => self.push_bind(BindValue::Uuid(*id)),
            FieldValue::Integer(n) => self.push_bind(BindValue::Integer(*n)),
        }
    }

    fn push_condition(&mut self, condition: &Condition) -> &mut Self {
        match condition {
            Condition::Eq { column, value } if value.is_null() => {
                self.push_ident(column).push(" IS NULL")
            }
            Condition::Eq { column, value } => self.push_ident(column).push(" = ").push_value(value),
            Condition::IsNull { column } => self.push_ident(column).push(" IS NULL"),
            Condition::IdEq(id) => self
                .push_ident(ID_COLUMN)
                .push(" = ")
                .push_bind(BindValue::Uuid(*id)),
            Condition::IdNe(id) => self
                .push_ident(ID_COLUMN)
                .push(" <> ")
                .push_bind(BindValue::Uuid(*id)),
        }
    }

    fn push_where(&mut self, conditions: &[Condition]) -> &mut Self {
        self.push(" WHERE ");
        if conditions.is_empty() {
            return self.push("TRUE");
        }
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.push_condition(condition);
        }
        self
    }

    fn finish(self) -> SqlStatement {
        SqlStatement {
            sql: self.sql,
            binds: self.binds,
        }
    }
}

/// `SELECT` of the first matching row, ordered by the query column and then
/// by id (UUIDv7, so creation order).
#[must_use]
pub fn select_first(config: &EntityConfig, query: &Query) -> SqlStatement {
    let mut w = SqlWriter::default();
    w.push("SELECT row_to_json(t)::text AS row FROM ")
        .push_ident(config.table())
        .push(" AS ")
        .push(ROW_ALIAS)
        .push_where(&query.conditions)
        .push(" ORDER BY ");
    if let Some(column) = &query.order_by {
        w.push_ident(column).push(" ASC, ");
    }
    w.push_ident(ID_COLUMN).push(" ASC LIMIT 1");
    w.finish()
}

#[must_use]
pub fn count(config: &EntityConfig, query: &Query) -> SqlStatement {
    let mut w = SqlWriter::default();
    w.push("SELECT COUNT(*) AS count FROM ")
        .push_ident(config.table())
        .push_where(&query.conditions);
    w.finish()
}

/// ## Summary
/// `INSERT` of a new row with the given id, returning the stored row.
///
/// ## Errors
/// Returns `InvalidInput` if the record carries a column the table does not
/// declare.
pub fn insert(config: &EntityConfig, id: uuid::Uuid, record: &Record) -> DbResult<SqlStatement> {
    let columns = declared_fields(config, record)?;

    let mut w = SqlWriter::default();
    w.push("INSERT INTO ")
        .push_ident(config.table())
        .push(" AS ")
        .push(ROW_ALIAS)
        .push(" (")
        .push_ident(ID_COLUMN);
    for (column, _) in &columns {
        w.push(", ").push_ident(column);
    }
    w.push(") VALUES (").push_bind(BindValue::Uuid(id));
    for (_, value) in &columns {
        w.push(", ").push_value(value);
    }
    w.push(")").push(RETURNING_ROW);
    Ok(w.finish())
}

/// ## Summary
/// `UPDATE` of every column the record carries, returning the stored row.
/// A record without columns degrades to a select by id.
///
/// ## Errors
/// Returns `InvalidInput` if the record carries a column the table does not
/// declare.
pub fn update(config: &EntityConfig, id: uuid::Uuid, record: &Record) -> DbResult<SqlStatement> {
    let columns = declared_fields(config, record)?;
    if columns.is_empty() {
        return Ok(select_first(config, &Query::new().filter(Condition::IdEq(id))));
    }

    let mut w = SqlWriter::default();
    w.push("UPDATE ")
        .push_ident(config.table())
        .push(" AS ")
        .push(ROW_ALIAS)
        .push(" SET ");
    for (i, (column, value)) in columns.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push_ident(column).push(" = ").push_value(value);
    }
    w.push_where(&[Condition::IdEq(id)]).push(RETURNING_ROW);
    Ok(w.finish())
}

/// Unique index backing the `(scope, slug)` invariant. NULL scope values
/// form one partition (`NULLS NOT DISTINCT`, `PostgreSQL` 15+).
#[must_use]
pub fn create_slug_index(config: &EntityConfig) -> SqlStatement {
    let mut w = SqlWriter::default();
    w.push("CREATE UNIQUE INDEX IF NOT EXISTS ")
        .push_ident(&config.unique_constraint_name())
        .push(" ON ")
        .push_ident(config.table())
        .push(" (");
    if let Some(scope) = config.scope_column() {
        w.push_ident(scope).push(", ");
    }
    w.push_ident(config.slug_column())
        .push(") NULLS NOT DISTINCT");
    w.finish()
}

fn declared_fields<'r>(
    config: &EntityConfig,
    record: &'r Record,
) -> DbResult<Vec<(&'r str, &'r FieldValue)>> {
    record
        .fields()
        .map(|(column, value)| {
            if config.schema().find_column(column).is_some() {
                Ok((column, value))
            } else {
                Err(CoreError::InvalidInput(format!(
                    "column '{column}' is not declared on table '{}'",
                    config.table()
                ))
                .into())
            }
        })
        .collect()
}
