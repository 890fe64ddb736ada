use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use top_movers_data::PublicRecord;

use crate::projector::RetrievalProjector;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Generic 500 carrying no detail about the underlying failure.
#[derive(Debug)]
pub struct InternalError;

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error",
            }),
        )
            .into_response()
    }
}

/// Lists the most recent daily winners, newest first.
///
/// # Errors
/// Returns a 500 with a generic body if the store query fails.
pub async fn list_movers(
    State(projector): State<Arc<RetrievalProjector>>,
) -> Result<Json<Vec<PublicRecord>>, InternalError> {
    let records = projector.latest().await.map_err(|_| InternalError)?;
    Ok(Json(records))
}
