use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::CoreError;
use crate::logic::QueryEngine;
use crate::model::PageEnvelope;
use crate::store::traits::RecordStore;

pub type AppState<S> = Arc<QueryEngine<S>>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub resources: Vec<String>,
    pub health: String,
}

pub async fn root<S: RecordStore>(State(engine): State<AppState<S>>) -> Json<RootResponse> {
    let prefix = engine.prefix();
    Json(RootResponse {
        message: "Welcome to Rear Differential API".to_string(),
        resources: engine
            .registry()
            .resource_names()
            .map(|name| format!("{}/{}", prefix, name))
            .collect(),
        health: format!("{}/health", prefix),
    })
}

/// Error body for list endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

/// Body of every mutation response, successful or not
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

fn status_of(err: &CoreError) -> StatusCode {
    StatusCode::from_u16(err.kind().status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// A failed read, rendered as `{"error", "details"}`.
#[derive(Debug)]
pub struct ReadError(pub CoreError);

impl IntoResponse for ReadError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.0.kind().code().to_string(),
            details: self.0.client_message(),
        });
        (status_of(&self.0), body).into_response()
    }
}

/// A failed mutation, rendered as `{"success": false, "error", "message"}`.
#[derive(Debug)]
pub struct MutationError(pub CoreError);

impl IntoResponse for MutationError {
    fn into_response(self) -> Response {
        let body = Json(MutationResponse {
            success: false,
            error: Some(self.0.kind().code().to_string()),
            message: self.0.client_message(),
        });
        (status_of(&self.0), body).into_response()
    }
}

/// `GET /{resource}` with filter, paging and sort parameters
pub async fn list_records<S: RecordStore>(
    State(engine): State<AppState<S>>,
    Path(resource): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<PageEnvelope>, ReadError> {
    engine.list(&resource, &params).await.map(Json).map_err(ReadError)
}

/// `PATCH /{resource}/{id}/{field}` with a JSON body naming the id and new value
pub async fn update_field<S: RecordStore>(
    State(engine): State<AppState<S>>,
    Path((resource, id, field)): Path<(String, String, String)>,
    body: Option<Json<Value>>,
) -> Result<Json<MutationResponse>, MutationError> {
    let body = body.map(|Json(value)| value).unwrap_or(Value::Null);
    let message = engine
        .mutate(&resource, &id, &field, &body)
        .await
        .map_err(MutationError)?;

    Ok(Json(MutationResponse {
        success: true,
        error: None,
        message: message.to_string(),
    }))
}
