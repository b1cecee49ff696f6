//! Scene HTTP Routes
//!
//! Endpoints for scene listing, saving, version history, and publication.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::publish::Publisher;
use crate::scene::{SceneMeta, SceneStore};

// ==================
// Shared State
// ==================

/// State shared across scene handlers
pub struct AppState {
    pub store: Arc<SceneStore>,
    pub publisher: Publisher,
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct SceneResponse {
    pub id: String,
    pub name: String,
    pub version: u32,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&SceneMeta> for SceneResponse {
    fn from(meta: &SceneMeta) -> Self {
        Self {
            id: meta.id.clone(),
            name: meta.name.clone(),
            version: meta.version,
            is_public: meta.is_public,
            created_at: meta.created_at.clone(),
            updated_at: meta.updated_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SceneListResponse {
    pub scenes: Vec<SceneResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateSceneRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveSceneRequest {
    pub data: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct SceneDataResponse {
    pub scene: SceneResponse,
    pub data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    #[serde(default)]
    pub version: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    pub versions: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub bundle_id: String,
    pub url: String,
    pub version: Option<u32>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

// ==================
// Scene Routes
// ==================

/// Create scene routes
pub fn scene_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scenes", get(list_scenes_handler))
        .route("/scenes", post(create_scene_handler))
        .route("/scenes/:id", get(get_scene_handler))
        .route("/scenes/:id/save", post(save_scene_handler))
        .route("/scenes/:id/versions", get(list_versions_handler))
        .route("/scenes/:id/publish", post(publish_scene_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

fn error_response(status: u16, error: impl ToString) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse {
            error: error.to_string(),
            code: status,
        }),
    )
}

// ==================
// Handlers
// ==================

async fn list_scenes_handler(
    State(state): State<Arc<AppState>>,
) -> Json<SceneListResponse> {
    let scenes = state.store.list();
    let response: Vec<SceneResponse> = scenes.iter().map(SceneResponse::from).collect();

    Json(SceneListResponse {
        total: response.len(),
        scenes: response,
    })
}

async fn create_scene_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSceneRequest>,
) -> Result<(StatusCode, Json<SceneResponse>), (StatusCode, Json<ErrorResponse>)> {
    let meta = state
        .store
        .create(&request.name, None)
        .map_err(|e| error_response(e.status_code(), e))?;

    Ok((StatusCode::CREATED, Json(SceneResponse::from(&meta))))
}

async fn get_scene_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<SceneDataResponse>, (StatusCode, Json<ErrorResponse>)> {
    let meta = state
        .store
        .get(&id)
        .map_err(|e| error_response(e.status_code(), e))?;
    let data = state
        .store
        .load_documents(&id, query.version)
        .map_err(|e| error_response(e.status_code(), e))?;

    Ok(Json(SceneDataResponse {
        scene: SceneResponse::from(&meta),
        data,
    }))
}

async fn save_scene_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SaveSceneRequest>,
) -> Result<Json<SceneResponse>, (StatusCode, Json<ErrorResponse>)> {
    let meta = state
        .store
        .save(&id, &request.data)
        .map_err(|e| error_response(e.status_code(), e))?;

    Ok(Json(SceneResponse::from(&meta)))
}

async fn list_versions_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VersionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let versions = state
        .store
        .versions(&id)
        .map_err(|e| error_response(e.status_code(), e))?;

    Ok(Json(VersionsResponse { versions }))
}

async fn publish_scene_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<PublishResponse>, (StatusCode, Json<ErrorResponse>)> {
    let publication = state
        .publisher
        .publish(&id, query.version)
        .map_err(|e| error_response(e.status_code(), e))?;

    Ok(Json(PublishResponse {
        bundle_id: publication.bundle_id,
        url: publication.url,
        version: publication.version,
        warnings: publication.warnings,
    }))
}
