use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::Aggregator,
    config::Config,
    menu::{DateKey, Location},
    store::{MealDocument, SharedStore},
};

pub const FETCH_SUCCESS_MESSAGE: &str = "Meal data fetched and stored successfully!";

#[derive(Clone, Debug)]
pub struct AppState {
    client: reqwest::Client,
    config: Arc<Config>,
    store: Arc<SharedStore>,
}

impl AppState {
    pub fn new(client: reqwest::Client, config: Config, store: SharedStore) -> Self {
        Self {
            client,
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/fetch-meal-data",
            on(MethodFilter::GET.or(MethodFilter::POST), fetch_meal_data),
        )
        .route("/get-meal-data", get(get_meal_data))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchResponse {
    pub message: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealDataResponse {
    pub data: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            Self::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

/// Scrapes the coming week for every location and appends the result to the store.
pub async fn fetch_meal_data(
    State(state): State<AppState>,
) -> Result<Json<FetchResponse>, ApiError> {
    let dates = DateKey::upcoming(state.config.days);
    let aggregate = Aggregator::new(&state.client, &state.config)
        .run(&dates, &Location::ALL)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to fetch meal data: {e}")))?;
    // an empty run never replaces the stored document
    if aggregate.is_empty() {
        log::error!("No menus could be fetched, nothing stored");
        return Err(ApiError::Internal(
            "Failed to fetch meal data: no menus could be fetched".to_string(),
        ));
    }
    let data = aggregate
        .to_transport_string()
        .map_err(|e| ApiError::Internal(format!("Failed to serialize meal data: {e}")))?;

    state
        .store
        .append(MealDocument::new(data.clone()))
        .await
        .map_err(|e| {
            log::error!("store write failed: {e}");
            ApiError::Internal(format!("Failed to insert meal data into the store: {e}"))
        })?;
    log::info!("Stored meal data for {} menus", aggregate.len());

    Ok(Json(FetchResponse {
        message: FETCH_SUCCESS_MESSAGE.to_string(),
        data,
    }))
}

/// Returns the `meal_data` of the newest stored document.
pub async fn get_meal_data(
    State(state): State<AppState>,
) -> Result<Json<MealDataResponse>, ApiError> {
    match state.store.latest().await {
        Ok(Some(doc)) => Ok(Json(MealDataResponse {
            data: doc.meal_data,
        })),
        Ok(None) => Err(ApiError::NotFound("No meal data found.".to_string())),
        Err(e) => Err(ApiError::Internal(format!(
            "Failed to retrieve meal data: {e}"
        ))),
    }
}
