//! Storage for the daily top mover service.
//!
//! This crate provides:
//! - The [`WinnerStore`] contract (get, insert-if-absent, newest-first query)
//! - `PostgreSQL` repository and connection management
//! - An in-process store for tests and local runs
//! - The winner record model and its public projection

pub mod database;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use database::DatabaseClient;
pub use memory::InMemoryWinnerStore;
pub use models::{quantize, PublicRecord, WinnerRecord, PRICE_SCALE};
pub use repositories::WinnerRepository;
pub use store::{PutOutcome, StoreError, WinnerStore};
