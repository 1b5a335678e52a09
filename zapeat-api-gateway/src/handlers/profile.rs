use axum::{Router, extract::State, http::HeaderMap, response::Json, routing::get};
use tracing::instrument;
use zapeat_proto::auth_service::UpdateProfilePayload;

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, current_user, extract_user_id_from_token};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_profile).patch(update_profile))
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state, headers))]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let user = current_user(&headers, &mut auth_client).await?;

    Ok(Json(user.try_into()?))
}

#[utoipa::path(
    patch,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 422, description = "Invalid profile fields", body = ApiErrorResponse),
        (status = 503, description = "Service unavailable", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[instrument(skip(state, headers))]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let mut auth_client = state.auth_client.clone();
    let user_id = extract_user_id_from_token(&headers, &mut auth_client).await?;

    let request = tonic::Request::new(UpdateProfilePayload {
        id: user_id,
        name: payload.name,
        email: payload.email,
    });

    let user = auth_client.update_profile(request).await?.into_inner();

    Ok(Json(user.try_into()?))
}
