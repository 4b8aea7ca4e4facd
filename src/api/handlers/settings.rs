use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use axum::{
    Json,
    extract::{Path, State},
};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde::Deserialize;
use utoipa::ToSchema;

/// The storefront reads e.g. the WhatsApp order message template from here.
pub async fn get_setting(
    State(state): State<crate::AppState>,
    Path(key): Path<String>,
) -> Result<Json<app_settings::Model>, AppError> {
    let setting = AppSettings::find_by_id(&key)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Setting '{key}' not found")))?;

    Ok(Json(setting))
}

#[derive(Deserialize, ToSchema)]
pub struct PutSettingRequest {
    pub value: String,
}

pub async fn put_setting(
    State(state): State<crate::AppState>,
    Path(key): Path<String>,
    Json(payload): Json<PutSettingRequest>,
) -> Result<Json<app_settings::Model>, AppError> {
    let existing = AppSettings::find_by_id(&key).one(&state.db).await?;

    let saved = if let Some(setting) = existing {
        let mut active = setting.into_active_model();
        active.value = Set(payload.value);
        active.update(&state.db).await?
    } else {
        let active = app_settings::ActiveModel {
            key: Set(key),
            value: Set(payload.value),
        };
        active.insert(&state.db).await?
    };

    Ok(Json(saved))
}
