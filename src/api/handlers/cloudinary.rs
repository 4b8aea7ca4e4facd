use crate::api::error::AppError;
use crate::services::quota::{UsageSample, classify};
use crate::services::signer::{SignedUpload, UploadFolder};
use crate::services::usage::UsageError;
use axum::{Json, extract::Query, extract::State};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct SignQuery {
    /// One of "products" or "posts".
    pub folder: String,
}

#[utoipa::path(
    get,
    path = "/api/cloudinary/sign",
    params(SignQuery),
    responses(
        (status = 200, description = "Signed upload authorization", body = SignedUpload),
        (status = 400, description = "Unknown upload folder"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn sign_upload(
    State(state): State<crate::AppState>,
    Query(query): Query<SignQuery>,
) -> Result<Json<SignedUpload>, AppError> {
    let folder = UploadFolder::from_param(&query.folder)
        .ok_or_else(|| AppError::Validation(format!("unknown upload folder: {}", query.folder)))?;

    Ok(Json(state.signer.sign(folder)))
}

#[utoipa::path(
    get,
    path = "/api/cloudinary/usage",
    responses(
        (status = 200, description = "Classified storage utilization", body = UsageSample),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Usage API unavailable or unrecognizable")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn usage(State(state): State<crate::AppState>) -> Result<Json<UsageSample>, AppError> {
    let used_bytes = state
        .usage
        .storage_used_bytes()
        .await
        .map_err(|e| match e {
            UsageError::Upstream(msg) => AppError::Upstream(msg),
            UsageError::Shape(msg) => AppError::Upstream(msg),
        })?;

    Ok(Json(classify(used_bytes, state.quota.capacity_bytes)))
}
