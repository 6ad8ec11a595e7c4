//! Historical price providers.
//!
//! This module contains:
//! - The `HistoryProvider` trait that all providers implement
//! - Concrete provider implementations (Marketstack, EODHD, Yahoo Finance)
//!
//! Providers receive a `PriceQuery`, forward only the parameters it sets,
//! and normalize the upstream payload into a date-indexed `PriceTable`.

mod http;
mod traits;

pub mod eodhd;
pub mod marketstack;
pub mod yahoo;

pub(crate) use http::build_client;
pub use traits::HistoryProvider;
