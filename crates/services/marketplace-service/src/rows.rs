//! Narrowing of raw rows into entity records.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use common::{AppError, AppResult, BackendError};
use data_client::Table;

/// Decode one row; a row that does not fit `T` is an invalid response.
pub(crate) fn decode<T: DeserializeOwned>(table: Table, row: Value) -> AppResult<T> {
    serde_json::from_value(row).map_err(|e| {
        BackendError::invalid_response(format!("malformed {} row: {}", table, e)).into()
    })
}

pub(crate) fn decode_all<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> AppResult<Vec<T>> {
    rows.into_iter().map(|row| decode(table, row)).collect()
}

/// First row returned by a write.
pub(crate) fn decode_first<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> AppResult<T> {
    match rows.into_iter().next() {
        Some(row) => decode(table, row),
        None => Err(BackendError::not_found(table.as_str()).into()),
    }
}

/// Encode a write payload as a JSON object.
pub(crate) fn encode<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::validation(format!("could not encode request: {}", e)))
}
