//! Decoding of `row_to_json` output into records.

use serde_json::{Map, Value};

use slugline_core::constants::ID_COLUMN;
use slugline_core::record::{FieldValue, Record};
use slugline_core::registry::EntityConfig;
use slugline_core::schema::ColumnKind;

use crate::error::{DbError, DbResult};

/// ## Summary
/// Decodes a JSON row using the column kinds of the table schema. Columns
/// the schema does not declare are ignored.
///
/// ## Errors
/// Returns `DecodeError` if the row is not a JSON object, has no valid `id`,
/// or a declared column holds a value of the wrong kind.
pub fn decode(config: &EntityConfig, row: &str) -> DbResult<Record> {
    let object: Map<String, Value> =
        serde_json::from_str(row).map_err(|err| DbError::DecodeError(err.to_string()))?;

    let id = object
        .get(ID_COLUMN)
        .and_then(Value::as_str)
        .and_then(|id| uuid::Uuid::parse_str(id).ok())
        .ok_or_else(|| {
            DbError::DecodeError(format!("row of table '{}' has no valid id", config.table()))
        })?;

    let mut record = Record::new(config.entity().clone());
    record.set_id(id);

    for column in &config.schema().columns {
        let value = match (object.get(&column.name), column.kind) {
            (None | Some(Value::Null), _) => FieldValue::Null,
            (Some(Value::String(text)), ColumnKind::Text) => FieldValue::Text(text.clone()),
            (Some(Value::String(text)), ColumnKind::Uuid) => uuid::Uuid::parse_str(text)
                .map(FieldValue::Uuid)
                .map_err(|err| mismatch(config, &column.name, &err.to_string()))?,
            (Some(Value::Number(n)), ColumnKind::Integer) => n
                .as_i64()
                .map(FieldValue::Integer)
                .ok_or_else(|| mismatch(config, &column.name, "integer out of range"))?,
            (Some(other), kind) => {
                return Err(mismatch(
                    config,
                    &column.name,
                    &format!("expected {kind:?}, found {other}"),
                ));
            }
        };
        record.set(column.name.clone(), value);
    }

    Ok(record)
}

fn mismatch(config: &EntityConfig, column: &str, detail: &str) -> DbError {
    DbError::DecodeError(format!(
        "column '{column}' of table '{}': {detail}",
        config.table()
    ))
}
