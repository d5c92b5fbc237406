//! HTTP API for the browser app.
//!
//! Every failure is answered as `{"error": <kind>, "message": <text>}` where
//! `message` is safe to show to the user as-is.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, FromRequest, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::error::{AppError, ReviewError, StoreError, TransformError};
use crate::model::{MeasurementSystem, StructuredRecipe, TransformRequest};
use crate::normalizer::Normalizer;
use crate::pipelines::Transformer;
use crate::publisher::MealieClient;
use crate::review::RecipeDraft;
use crate::session::{FileStore, MemoryStore, SessionStore, UserSettings};

// photographed pages arrive inline as base64
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    pub transformer: Transformer,
    pub normalizer: Arc<Normalizer>,
    pub store: Arc<dyn SessionStore>,
    pub publisher_timeout: Duration,
}

impl AppState {
    /// Wire the state from configuration. Session files go to
    /// `server.data_dir` when set, otherwise they live in memory.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let settings = UserSettings::from_config(config);
        let store: Arc<dyn SessionStore> = match &config.server.data_dir {
            Some(dir) => {
                info!("Storing session data in {}", dir);
                Arc::new(FileStore::new(dir, settings))
            }
            None => Arc::new(MemoryStore::new(settings)),
        };

        Ok(Self {
            transformer: Transformer::from_config(config)?,
            normalizer: Arc::new(Normalizer::from_config(config)?),
            store,
            publisher_timeout: Duration::from_secs(config.timeout),
        })
    }
}

/// Build the axum router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/transform", post(transform))
        .route("/api/translate", post(translate))
        .route("/api/convert-units", post(convert_units))
        .route(
            "/api/recipe",
            get(get_recipe).put(put_recipe).delete(delete_recipe),
        )
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/publish", post(publish))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Error answered by every route
#[derive(Debug)]
pub enum ApiError {
    Transform(TransformError),
    Review(ReviewError),
    Store(StoreError),
    NotFound(&'static str),
    BadRequest(String),
}

impl From<TransformError> for ApiError {
    fn from(e: TransformError) -> Self {
        ApiError::Transform(e)
    }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        ApiError::Review(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Transform(e) => {
                let status = match e {
                    TransformError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    TransformError::SourceUnreachable { .. } => StatusCode::BAD_GATEWAY,
                    TransformError::ExtractionEmpty | TransformError::ExtractionFailed(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    TransformError::PublishFailed { .. } => StatusCode::BAD_GATEWAY,
                };
                (status, e.kind(), e.to_string())
            }
            ApiError::Review(e) => {
                let kind = match e {
                    ReviewError::TitleRequired => "title_required",
                    ReviewError::IndexOutOfRange { .. } => "index_out_of_range",
                };
                (StatusCode::BAD_REQUEST, kind, e.to_string())
            }
            ApiError::Store(e) => {
                error!("Session store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage", e.to_string())
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, "not_found", message.to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "invalid_input", message),
        };

        (status, Json(json!({"error": kind, "message": message}))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// `Json` body extractor whose failures use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct ApiJson<T>(T);

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn transform(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TransformRequest>,
) -> ApiResult<StructuredRecipe> {
    let recipe = state.transformer.transform(request).await?;
    state.store.save_recipe(&recipe).await?;
    Ok(Json(recipe))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateBody {
    recipe: StructuredRecipe,
    target_language: String,
}

async fn translate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TranslateBody>,
) -> ApiResult<StructuredRecipe> {
    let recipe = state
        .normalizer
        .translate_recipe(&body.recipe, body.target_language.trim())
        .await?;
    Ok(Json(recipe))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertBody {
    recipe: StructuredRecipe,
    measurement_system: MeasurementSystem,
}

async fn convert_units(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ConvertBody>,
) -> ApiResult<StructuredRecipe> {
    let recipe = state
        .normalizer
        .convert_recipe_units(&body.recipe, body.measurement_system)
        .await?;
    Ok(Json(recipe))
}

async fn get_recipe(State(state): State<AppState>) -> ApiResult<StructuredRecipe> {
    state
        .store
        .load_recipe()
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("No recipe in progress"))
}

async fn put_recipe(
    State(state): State<AppState>,
    ApiJson(recipe): ApiJson<StructuredRecipe>,
) -> ApiResult<StructuredRecipe> {
    state.store.save_recipe(&recipe).await?;
    Ok(Json(recipe))
}

async fn delete_recipe(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.store.clear_recipe().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<UserSettings> {
    Ok(Json(state.store.load_settings().await?))
}

async fn put_settings(
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<UserSettings>,
) -> ApiResult<UserSettings> {
    state.store.save_settings(&settings).await?;
    Ok(Json(settings))
}

#[derive(Debug, Default, Deserialize)]
struct PublishBody {
    recipe: Option<StructuredRecipe>,
}

/// Publish the given recipe, or the one in progress when the body is empty
async fn publish(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<serde_json::Value> {
    let body: PublishBody = if body.iter().all(u8::is_ascii_whitespace) {
        PublishBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid publish request: {}", e)))?
    };

    let recipe = match body.recipe {
        Some(recipe) => recipe,
        None => state
            .store
            .load_recipe()
            .await?
            .ok_or(ApiError::NotFound("No recipe in progress"))?,
    };
    let recipe = RecipeDraft::from(recipe).into_recipe()?;

    let settings = state.store.load_settings().await?;
    let client = MealieClient::new(
        settings.mealie_url,
        settings.mealie_api_token,
        Some(state.publisher_timeout),
    )?;
    let slug = client.publish(&recipe).await.inspect_err(|e| {
        warn!("Publishing '{}' failed: {}", recipe.title, e);
    })?;

    state.store.clear_recipe().await?;
    Ok(Json(json!({"slug": slug})))
}
