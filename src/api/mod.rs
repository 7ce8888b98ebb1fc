//! HTTP API over the price service

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use crate::application::PriceService;
use crate::domain::alert::AlertSubscription;
use crate::domain::price::ChainHourlyPrices;
use crate::shared::errors::ServiceError;

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<PriceService>,
}

/// Body of `POST /prices/alert`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRequest {
    /// Chain name, e.g. ethereum or polygon
    pub chain: String,
    /// Target price in USD
    pub price: Decimal,
    /// Where to send the alert
    pub email: String,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/prices/hourly", get(get_hourly_prices))
        .route("/prices/alert", post(set_alert))
        .with_state(state)
}

async fn get_hourly_prices(State(state): State<ApiState>) -> Json<Vec<ChainHourlyPrices>> {
    Json(state.service.get_hourly_prices().await)
}

async fn set_alert(
    State(state): State<ApiState>,
    body: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AlertSubscription>), (StatusCode, String)> {
    // malformed bodies are invalid input like any other
    let Json(body) = body.map_err(|rejection| (StatusCode::BAD_REQUEST, rejection.body_text()))?;
    match state.service.set_alert(&body.chain, body.price, &body.email).await {
        Ok(saved) => Ok((StatusCode::CREATED, Json(saved))),
        Err(ServiceError::Validation(reason)) => Err((StatusCode::BAD_REQUEST, reason)),
        Err(e @ ServiceError::Repository(_)) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
