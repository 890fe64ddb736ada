//! Database repositories for the daily top mover store.

pub mod winner_repo;

pub use winner_repo::WinnerRepository;
