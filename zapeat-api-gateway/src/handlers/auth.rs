use axum::{Router, extract::State, response::Json, routing::post};
use tracing::instrument;
use zapeat_proto::auth_service::{SendVerificationCodePayload, VerifyPhonePayload};

use crate::error::ApiError;
use crate::models::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/send-code", post(send_code))
        .route("/auth/verify", post(verify))
}

#[utoipa::path(
    post,
    path = "/auth/send-code",
    request_body = SendCodeRequest,
    responses(
        (status = 200, description = "Verification code sent", body = SendCodeResponse),
        (status = 422, description = "Invalid mobile number", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn send_code(
    State(state): State<AppState>,
    Json(payload): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>, ApiError> {
    let mut client = state.auth_client.clone();

    let request = tonic::Request::new(SendVerificationCodePayload {
        mobile_number: payload.mobile_number,
    });

    let response = client.send_verification_code(request).await?.into_inner();

    Ok(Json(SendCodeResponse {
        session_token: response.session_token,
        mobile_number: response.mobile_number,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Phone verified, access token issued", body = TokenResponse),
        (status = 422, description = "Invalid or expired code", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut client = state.auth_client.clone();

    let request = tonic::Request::new(VerifyPhonePayload {
        mobile_number: payload.mobile_number,
        security_code: payload.security_code,
        session_token: payload.session_token,
    });

    let token = client.verify_phone(request).await?.into_inner();

    Ok(Json(TokenResponse {
        token_type: token.token_type,
        access_token: token.access_token,
        expires_in: token.expires_in,
        user_id: token.user_id,
    }))
}
