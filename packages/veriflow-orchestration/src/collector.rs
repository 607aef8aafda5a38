use crate::config::ScriptJobConfig;
use crate::error::{PipelineError, Result};
use crate::record::{CellValue, Record};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::{SqliteColumn, SqliteRow};
use sqlx::{Column, Connection, Row, SqliteConnection, TypeInfo, ValueRef};
use tokio::time::timeout;
use tracing::{info, warn};

/// Fetch the full contents of the configured result table as ordered
/// records. Exactly one query is issued; rows keep result-set order and
/// every record carries the same columns in query order.
pub async fn fetch_results(config: &ScriptJobConfig) -> Result<Vec<Record>> {
    let table = config.result_table.as_str();
    let query = format!("SELECT * FROM {}", quote_identifier(table));

    let options = config.connect_options()?;
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(|cause| PipelineError::Query {
            table: table.to_string(),
            cause,
        })?;

    let outcome = match config.timeout() {
        Some(limit) => match timeout(limit, sqlx::query(&query).fetch_all(&mut conn)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                drop(conn);
                return Err(PipelineError::QueryTimeout {
                    table: table.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                });
            }
        },
        None => sqlx::query(&query).fetch_all(&mut conn).await,
    };

    if let Err(e) = conn.close().await {
        warn!("Failed to close connection for '{}': {}", table, e);
    }

    let rows = outcome.map_err(|cause| PipelineError::Query {
        table: table.to_string(),
        cause,
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let record = materialize_row(row).map_err(|cause| PipelineError::Query {
            table: table.to_string(),
            cause,
        })?;
        records.push(record);
    }

    info!("Collected {} records from '{}'", records.len(), table);
    Ok(records)
}

/// Double-quote an identifier so config-supplied table names cannot
/// smuggle SQL into the query.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn materialize_row(row: &SqliteRow) -> std::result::Result<Record, sqlx::Error> {
    let mut fields = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_cell(row, column, idx)?;
        fields.push((column.name().to_string(), value));
    }
    Ok(Record::from_pairs(fields))
}

/// Map one cell to a `CellValue`. The declared column type wins where
/// the driver understands it (booleans, date/time kinds); everything
/// else follows the value's storage class. SQL NULL always maps to
/// `Null`, whatever the column declares.
fn decode_cell(
    row: &SqliteRow,
    column: &SqliteColumn,
    idx: usize,
) -> std::result::Result<CellValue, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }

    let storage_info = raw.type_info();
    let storage = storage_info.name();
    let declared = column.type_info().name();

    let value = match declared {
        "BOOLEAN" => CellValue::Boolean(row.try_get::<bool, _>(idx)?),
        "DATE" | "TIME" | "DATETIME" => match decode_temporal(row, idx, declared) {
            Ok(ts) => CellValue::Timestamp(ts),
            // SQLite does not enforce declared types; a DATE column can
            // still hold arbitrary values, so fall through to the
            // storage class rather than failing the whole result set
            Err(_) => decode_by_storage(row, idx, storage)?,
        },
        _ => decode_by_storage(row, idx, storage)?,
    };
    Ok(value)
}

/// Decode a temporal cell per its declared kind. `DATE` text carries no
/// time of day and decodes to midnight UTC; `TIME` text carries no date
/// and is anchored on the epoch date.
fn decode_temporal(
    row: &SqliteRow,
    idx: usize,
    declared: &str,
) -> std::result::Result<DateTime<Utc>, sqlx::Error> {
    match declared {
        "DATE" => {
            let date = row.try_get::<NaiveDate, _>(idx)?;
            Ok(date.and_time(NaiveTime::MIN).and_utc())
        }
        "TIME" => {
            let time = row.try_get::<NaiveTime, _>(idx)?;
            Ok(DateTime::UNIX_EPOCH.date_naive().and_time(time).and_utc())
        }
        _ => row.try_get::<DateTime<Utc>, _>(idx),
    }
}

fn decode_by_storage(
    row: &SqliteRow,
    idx: usize,
    storage: &str,
) -> std::result::Result<CellValue, sqlx::Error> {
    let value = match storage {
        "INTEGER" => CellValue::Integer(row.try_get::<i64, _>(idx)?),
        "REAL" => CellValue::Float(row.try_get::<f64, _>(idx)?),
        "BLOB" => CellValue::Binary(row.try_get::<Vec<u8>, _>(idx)?),
        _ => CellValue::Text(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}
