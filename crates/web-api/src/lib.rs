pub mod handlers;
pub mod projector;
pub mod server;

pub use projector::{ProjectionError, RetrievalProjector};
pub use server::ApiServer;
