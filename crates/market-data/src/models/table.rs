//! Date-indexed price table.
//!
//! A [`PriceTable`] is what every retrieval operation returns: an ordered
//! list of [`PriceRecord`]s, each identified by its timestamp, with cell
//! values aligned to the table's column list.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::warn;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::query::SortOrder;
use super::quote::Quote;
use crate::errors::MarketDataError;

/// One row of a [`PriceTable`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRecord {
    /// Row identifier
    pub timestamp: DateTime<Utc>,
    /// Cell values, aligned with [`PriceTable::columns`]
    pub values: Vec<Value>,
}

impl PriceRecord {
    /// Whether every cell holds a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| !v.is_null())
    }
}

/// Ordered, timestamp-indexed table of price records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceTable {
    index_name: String,
    columns: Vec<String>,
    records: Vec<PriceRecord>,
}

impl PriceTable {
    /// Create an empty table with the given index name and columns.
    pub fn new(index_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index_name: index_name.into(),
            columns,
            records: Vec::new(),
        }
    }

    /// Build a table from a slice of JSON objects, promoting `index_field`
    /// to the row index.
    ///
    /// The column set is the union of all record keys in first-seen order,
    /// minus `index_field`. Cells for keys a record lacks are `null`.
    /// Record order is preserved.
    pub fn from_json_records(
        records: &[Value],
        index_field: &str,
    ) -> Result<Self, MarketDataError> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let object = record
                .as_object()
                .ok_or_else(|| MarketDataError::ValidationFailed {
                    message: format!("Expected a JSON object record, got: {}", record),
                })?;
            for key in object.keys() {
                if key != index_field && !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Self::new(index_field, columns);
        table.records.reserve(records.len());

        for (row, record) in records.iter().enumerate() {
            // Already checked above.
            let Some(object) = record.as_object() else {
                continue;
            };
            let raw_timestamp =
                object
                    .get(index_field)
                    .ok_or_else(|| MarketDataError::ValidationFailed {
                        message: format!("Record {} has no '{}' field", row, index_field),
                    })?;
            let timestamp =
                parse_timestamp(raw_timestamp).ok_or_else(|| MarketDataError::ValidationFailed {
                    message: format!("Record {} has an invalid timestamp: {}", row, raw_timestamp),
                })?;
            let values = table
                .columns
                .iter()
                .map(|column| object.get(column).cloned().unwrap_or(Value::Null))
                .collect();
            table.records.push(PriceRecord { timestamp, values });
        }

        Ok(table)
    }

    /// Append a row. The number of values must match the column count.
    pub fn push(
        &mut self,
        timestamp: DateTime<Utc>,
        values: Vec<Value>,
    ) -> Result<(), MarketDataError> {
        if values.len() != self.columns.len() {
            return Err(MarketDataError::ValidationFailed {
                message: format!(
                    "Row has {} values but the table has {} columns",
                    values.len(),
                    self.columns.len()
                ),
            });
        }
        self.records.push(PriceRecord { timestamp, values });
        Ok(())
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The row index (timestamps), in row order.
    pub fn index(&self) -> Vec<DateTime<Utc>> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// Position of a column by exact name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, ignoring ASCII case.
    pub fn position_ignore_case(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let pos = self.position(name)?;
        Some(self.records.iter().map(|r| &r.values[pos]).collect())
    }

    /// A single cell.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let pos = self.position(name)?;
        self.records.get(row).map(|r| &r.values[pos])
    }

    /// Keep only the listed columns, renamed, in the listed order.
    ///
    /// Each entry is `(source column position, new name)`.
    pub fn select_columns(self, selection: &[(usize, &str)]) -> Result<Self, MarketDataError> {
        if let Some((pos, _)) = selection.iter().find(|(pos, _)| *pos >= self.columns.len()) {
            return Err(MarketDataError::ValidationFailed {
                message: format!("Column position {} is out of range", pos),
            });
        }

        let columns = selection.iter().map(|(_, name)| name.to_string()).collect();
        let records = self
            .records
            .into_iter()
            .map(|record| PriceRecord {
                timestamp: record.timestamp,
                values: selection
                    .iter()
                    .map(|(pos, _)| record.values[*pos].clone())
                    .collect(),
            })
            .collect();

        Ok(Self {
            index_name: self.index_name,
            columns,
            records,
        })
    }

    /// Remove rows holding any missing value.
    pub fn drop_incomplete(mut self) -> Self {
        self.records.retain(PriceRecord::is_complete);
        self
    }

    /// Whether the index is ordered as requested (ties allowed).
    pub fn is_sorted(&self, order: SortOrder) -> bool {
        self.records.windows(2).all(|pair| match order {
            SortOrder::Asc => pair[0].timestamp <= pair[1].timestamp,
            SortOrder::Desc => pair[0].timestamp >= pair[1].timestamp,
        })
    }

    /// Project the table into typed OHLCV quotes.
    ///
    /// Columns are matched by name, ignoring case. Rows without a readable
    /// close are skipped.
    pub fn quotes(&self, source: &str) -> Vec<Quote> {
        let open = self.position_ignore_case("open");
        let high = self.position_ignore_case("high");
        let low = self.position_ignore_case("low");
        let volume = self.position_ignore_case("volume");
        let Some(close) = self.position_ignore_case("close") else {
            warn!("Table has no close column, no quotes extracted");
            return Vec::new();
        };

        let cell = |record: &PriceRecord, pos: Option<usize>| {
            pos.and_then(|p| record.values.get(p)).and_then(value_to_decimal)
        };

        self.records
            .iter()
            .enumerate()
            .filter_map(|(row, record)| {
                let Some(close_value) = cell(record, Some(close)) else {
                    warn!("Skipping row {}: no readable close price", row);
                    return None;
                };
                let mut quote = Quote::new(record.timestamp, close_value, source.to_string());
                quote.open = cell(record, open);
                quote.high = cell(record, high);
                quote.low = cell(record, low);
                quote.volume = cell(record, volume);
                Some(quote)
            })
            .collect()
    }
}

/// Parse a provider timestamp.
///
/// Accepts RFC 3339, `%Y-%m-%dT%H:%M:%S%z` (Marketstack's `+0000` offsets),
/// naive date-times (taken as UTC), plain `YYYY-MM-DD` dates (midnight UTC)
/// and Unix seconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Read a numeric cell. Numbers and numeric strings are accepted.
pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            // Display is the shortest round-trip form, so 130.28 stays 130.28.
            Decimal::from_str(&n.to_string())
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
