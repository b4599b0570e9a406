//! Storefront HTTP surface for coupon evaluation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::{Validate, ValidationErrors};

use crate::domain::aggregates::CartLineItem;
use crate::engine::{CouponEngine, EligibilityResult};
use crate::CouponError;

/// Header carrying the caller id, set by the authentication layer in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyCouponRequest {
    #[validate(required(message = "code and items are required"), length(min = 1, message = "code must not be empty"))]
    pub code: Option<String>,
    #[validate(required(message = "code and items are required"))]
    pub items: Option<Vec<CartLineItem>>,
}

pub fn router(engine: CouponEngine) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-coupons"})) }))
        .route("/api/website/coupons/apply", post(apply_coupon))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

async fn apply_coupon(
    State(engine): State<CouponEngine>,
    headers: HeaderMap,
    payload: Result<Json<ApplyCouponRequest>, JsonRejection>,
) -> Result<Json<EligibilityResult>, ApiError> {
    let Json(request) = payload.map_err(|e| CouponError::Validation(e.body_text()))?;
    request.validate().map_err(|e| CouponError::Validation(first_message(&e)))?;
    let (Some(code), Some(items)) = (request.code, request.items) else {
        return Err(CouponError::Validation("code and items are required".into()).into());
    };

    let user_id = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok());
    let result = engine.evaluate(&code, items, user_id).await?;
    Ok(Json(result))
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// Maps crate errors onto HTTP responses with an `{ "error": ... }` body.
pub struct ApiError(CouponError);

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self { Self(err) }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            CouponError::Validation(_) => StatusCode::BAD_REQUEST,
            CouponError::NotFound => StatusCode::NOT_FOUND,
            CouponError::AuthRequired => StatusCode::UNAUTHORIZED,
            CouponError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "coupon evaluation failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}
