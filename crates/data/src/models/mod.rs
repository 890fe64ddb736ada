//! Data models for the daily top mover store.
//!
//! Prices use `rust_decimal::Decimal`; stored models derive `sqlx::FromRow`.

pub mod winner;

pub use winner::{quantize, PublicRecord, WinnerRecord, PRICE_SCALE};
