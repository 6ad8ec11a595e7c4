//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `query` - Request parameters (PriceQuery, SortOrder)
//! - `table` - Date-indexed result table (PriceTable, PriceRecord)
//! - `quote` - Typed OHLCV projection of a record (Quote)

mod query;
mod quote;
mod table;

pub use query::{PriceQuery, SortOrder, DATE_FORMAT};
pub use quote::Quote;
pub use table::{parse_timestamp, value_to_decimal, PriceRecord, PriceTable};
