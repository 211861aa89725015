use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::SessionId;
use crate::models::{FeedbackLabel, Mood};
use crate::services::Recommendation;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub mood_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub movie_id: i64,
    pub status: FeedbackLabel,
}

#[derive(Debug, Deserialize)]
pub struct CreateMoodRequest {
    pub name: String,
    pub genre_ids: Vec<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Mood> for MoodResponse {
    fn from(mood: &Mood) -> Self {
        Self {
            id: mood.id,
            name: mood.name.clone(),
            description: mood.description.clone(),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Get all moods
pub async fn get_moods(State(state): State<AppState>) -> AppResult<Json<Vec<MoodResponse>>> {
    let moods = state.moods.list().await?;
    Ok(Json(moods.iter().map(MoodResponse::from).collect()))
}

/// Create a new mood
pub async fn create_mood(
    State(state): State<AppState>,
    payload: Result<Json<CreateMoodRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MoodResponse>)> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    if request.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }
    if request.genre_ids.is_empty() {
        return Err(AppError::InvalidInput(
            "genre_ids must contain at least one genre".to_string(),
        ));
    }

    let mood = state
        .moods
        .create(
            request.name.trim(),
            &request.genre_ids,
            request.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MoodResponse::from(&mood))))
}

/// Recommend one movie for the given mood and the caller's session
pub async fn recommend(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Query(params): Query<RecommendParams>,
) -> AppResult<Response> {
    let mood_id = params
        .mood_id
        .ok_or_else(|| AppError::InvalidInput("mood_id is required".to_string()))?;

    match state.recommender.recommend(mood_id, &session).await? {
        Recommendation::Found(movie) => Ok(Json(movie).into_response()),
        Recommendation::Exhausted => Ok(Json(json!({
            "message": "No eligible movies left for this mood"
        }))
        .into_response()),
    }
}

/// Record the caller's sentiment for a movie
pub async fn record_feedback(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    state
        .feedback
        .record(request.movie_id, &session, request.status)
        .await?;

    Ok(StatusCode::CREATED)
}
