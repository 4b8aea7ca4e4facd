use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::notifier::QuotaNotifier;
use crate::services::quota::{DiskTier, classify};
use crate::services::usage::UsageError;
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub async fn list_notifications(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<notifications::Model>>, AppError> {
    let items = Notifications::find()
        .order_by_desc(notifications::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(items))
}

#[derive(Deserialize, ToSchema)]
pub struct MarkReadRequest {
    pub is_read: bool,
}

pub async fn mark_notification_read(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<Json<notifications::Model>, AppError> {
    let notification = Notifications::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found")))?;

    let mut active = notification.into_active_model();
    active.is_read = Set(payload.is_read);
    let updated = active.update(&state.db).await?;

    Ok(Json(updated))
}

pub async fn mark_all_notifications_read(
    State(state): State<crate::AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = Notifications::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(&state.db)
        .await?;

    Ok(Json(
        serde_json::json!({ "updated": result.rows_affected }),
    ))
}

pub async fn delete_notification(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = Notifications::delete_by_id(&id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Notification {id} not found")));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn delete_all_notifications(
    State(state): State<crate::AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = Notifications::delete_many().exec(&state.db).await?;

    Ok(Json(
        serde_json::json!({ "deleted": result.rows_affected }),
    ))
}

#[derive(Serialize, ToSchema)]
pub struct RefreshResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<DiskTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub notified: bool,
}

/// Runs the usage → classify → notify pipeline once. An unrecognizable usage
/// report degrades to a "no storage info" note instead of failing the call;
/// an unreachable usage API is still a hard error.
#[utoipa::path(
    post,
    path = "/api/notifications/refresh",
    responses(
        (status = 200, description = "Quota check executed", body = RefreshResponse),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Usage API unavailable")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn refresh_notifications(
    State(state): State<crate::AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let used_bytes = match state.usage.storage_used_bytes().await {
        Ok(bytes) => bytes,
        Err(UsageError::Shape(msg)) => {
            tracing::warn!("usage report unusable: {}", msg);
            return Ok(Json(RefreshResponse {
                ok: true,
                pct: None,
                tier: None,
                note: Some("no storage info".to_string()),
                notified: false,
            }));
        }
        Err(UsageError::Upstream(msg)) => return Err(AppError::Upstream(msg)),
    };

    let sample = classify(used_bytes, state.quota.capacity_bytes);
    let created = QuotaNotifier::notify_if_needed(&state.db, &sample, Utc::now().date_naive())
        .await?;

    Ok(Json(RefreshResponse {
        ok: true,
        pct: Some(sample.percent),
        tier: Some(sample.tier),
        note: None,
        notified: created.is_some(),
    }))
}
