//! In-process data client.
//!
//! Evaluates the same query model as `RestClient` against rows held in
//! memory. Used for offline runs and as the backend of integration tests.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use common::error::CODE_UNIQUE_VIOLATION;
use common::BackendError;
use domain::{COLUMN_CREATED_AT, COLUMN_ID};

use crate::client::{BackendResult, DataClient};
use crate::query::{like_matches, Embed, Filter, Query, Select};
use crate::table::Table;

type Row = Map<String, Value>;

/// Data client backed by in-memory tables.
#[derive(Default)]
pub struct MemoryDataClient {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    failure: RwLock<Option<BackendError>>,
}

impl MemoryDataClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client preloaded with `rows` per table.
    pub fn from_tables(tables: impl IntoIterator<Item = (Table, Vec<Value>)>) -> Self {
        let tables = tables
            .into_iter()
            .map(|(table, rows)| (table, rows.into_iter().filter_map(into_row).collect()))
            .collect();
        Self {
            tables: RwLock::new(tables),
            failure: RwLock::new(None),
        }
    }

    /// Snapshot of every row in `table`
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        let tables = self.tables.read().await;
        tables
            .get(&table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Make every following call fail with `error` until `recover` is called.
    pub async fn fail_with(&self, error: BackendError) {
        *self.failure.write().await = Some(error);
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    async fn check_failure(&self) -> BackendResult<()> {
        match self.failure.read().await.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn into_row(value: Value) -> Option<Row> {
    match value {
        Value::Object(row) => Some(row),
        _ => None,
    }
}

/// Textual form used for equality; null has none.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => row
            .get(column)
            .and_then(text_of)
            .is_some_and(|text| &text == value),
        Filter::ILike { column, pattern } => row
            .get(column)
            .and_then(text_of)
            .is_some_and(|text| like_matches(pattern, &text)),
        Filter::Or(filters) => filters.iter().any(|f| matches(row, f)),
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(row, f))
}

/// Nulls sort after every value.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => text_of(x).cmp(&text_of(y)),
    }
}

fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() {
        return row.clone();
    }
    columns
        .iter()
        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
        .collect()
}

fn resolve_embed(tables: &HashMap<Table, Vec<Row>>, row: &Row, embed: &Embed) -> Value {
    let Some(key) = row.get(&embed.foreign_key).and_then(text_of) else {
        return Value::Null;
    };
    tables
        .get(&embed.table)
        .and_then(|rows| {
            rows.iter()
                .find(|r| r.get(COLUMN_ID).and_then(text_of).as_deref() == Some(key.as_str()))
        })
        .map(|r| Value::Object(project(r, &embed.columns)))
        .unwrap_or(Value::Null)
}

fn shape(tables: &HashMap<Table, Vec<Row>>, row: &Row, select: &Select) -> Value {
    let mut shaped = project(row, &select.columns);
    for embed in &select.embeds {
        shaped.insert(embed.alias.clone(), resolve_embed(tables, row, embed));
    }
    Value::Object(shaped)
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl DataClient for MemoryDataClient {
    async fn query(&self, table: Table, query: Query) -> BackendResult<Vec<Value>> {
        self.check_failure().await?;
        let tables = self.tables.read().await;

        let mut rows: Vec<&Row> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| matches_all(r, &query.filters)).collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        debug!("memory query on {} matched {} rows", table, rows.len());
        Ok(rows
            .into_iter()
            .map(|row| shape(&tables, row, &query.select))
            .collect())
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> BackendResult<Vec<Value>> {
        self.check_failure().await?;
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();

        let mut prepared = Vec::with_capacity(rows.len());
        for value in rows {
            let Some(mut row) = into_row(value) else {
                return Err(BackendError::Rejected {
                    code: "PGRST102".to_string(),
                    message: "inserted rows must be JSON objects".to_string(),
                });
            };
            if row.get(COLUMN_ID).map_or(true, Value::is_null) {
                row.insert(COLUMN_ID.to_string(), Value::String(Uuid::new_v4().to_string()));
            }
            if row.get(COLUMN_CREATED_AT).map_or(true, Value::is_null) {
                row.insert(COLUMN_CREATED_AT.to_string(), Value::String(now_timestamp()));
            }

            let id = row.get(COLUMN_ID).and_then(text_of);
            let duplicate = stored
                .iter()
                .chain(prepared.iter())
                .any(|r: &Row| r.get(COLUMN_ID).and_then(text_of) == id);
            if duplicate {
                return Err(BackendError::constraint(
                    CODE_UNIQUE_VIOLATION,
                    format!("duplicate key value violates unique constraint \"{}_pkey\"", table),
                ));
            }
            prepared.push(row);
        }

        stored.extend(prepared.iter().cloned());
        Ok(prepared.into_iter().map(Value::Object).collect())
    }

    async fn update(
        &self,
        table: Table,
        filters: Vec<Filter>,
        patch: Value,
    ) -> BackendResult<Vec<Value>> {
        self.check_failure().await?;
        let Value::Object(patch) = patch else {
            return Err(BackendError::Rejected {
                code: "PGRST102".to_string(),
                message: "update body must be a JSON object".to_string(),
            });
        };

        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(&table) {
            for row in rows.iter_mut().filter(|r| matches_all(r, &filters)) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(Value::Object(row.clone()));
            }
        }
        Ok(updated)
    }

    async fn remove(&self, table: Table, filters: Vec<Filter>) -> BackendResult<()> {
        self.check_failure().await?;
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|r| !matches_all(r, &filters));
        }
        Ok(())
    }
}
