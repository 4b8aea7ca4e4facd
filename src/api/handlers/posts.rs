use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Storefront feed: published posts only, newest first.
pub async fn list_published_posts(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<posts::Model>>, AppError> {
    let items = Posts::find()
        .filter(posts::Column::Published.eq(true))
        .order_by_desc(posts::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(items))
}

/// Admin listing includes drafts.
pub async fn list_all_posts(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<posts::Model>>, AppError> {
    let items = Posts::find()
        .order_by_desc(posts::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(items))
}

pub async fn get_post(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<posts::Model>, AppError> {
    let post = Posts::find_by_id(&id)
        .one(&state.db)
        .await?
        .filter(|p| p.published)
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    Ok(Json(post))
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "Judul wajib diisi"))]
    pub title: String,
    #[validate(length(min = 1, message = "Slug wajib diisi"))]
    pub slug: String,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub cover_url: Option<String>,
    pub cover_public_id: Option<String>,
}

pub async fn create_post(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<posts::Model>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let slug = payload.slug.trim().to_lowercase();
    if slug.is_empty() {
        return Err(AppError::Validation("Slug wajib diisi".to_string()));
    }

    let duplicate = Posts::find()
        .filter(posts::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Validation(format!("Slug '{slug}' sudah dipakai")));
    }

    let model = posts::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        content: Set(payload.content),
        published: Set(payload.published.unwrap_or(false)),
        cover_url: Set(payload.cover_url),
        cover_public_id: Set(payload.cover_public_id),
        created_at: Set(Utc::now()),
    };

    let created = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub cover_url: Option<String>,
    pub cover_public_id: Option<String>,
}

pub async fn update_post(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<posts::Model>, AppError> {
    let post = Posts::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    let mut active = post.into_active_model();
    if let Some(title) = payload.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Judul wajib diisi".to_string()));
        }
        active.title = Set(title);
    }
    if let Some(slug) = payload.slug {
        let slug = slug.trim().to_lowercase();
        if slug.is_empty() {
            return Err(AppError::Validation("Slug wajib diisi".to_string()));
        }
        let duplicate = Posts::find()
            .filter(posts::Column::Slug.eq(&slug))
            .filter(posts::Column::Id.ne(&id))
            .one(&state.db)
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Validation(format!("Slug '{slug}' sudah dipakai")));
        }
        active.slug = Set(slug);
    }
    if let Some(content) = payload.content {
        active.content = Set(Some(content));
    }
    if let Some(published) = payload.published {
        active.published = Set(published);
    }
    if let Some(cover_url) = payload.cover_url {
        active.cover_url = Set(Some(cover_url));
    }
    if let Some(cover_public_id) = payload.cover_public_id {
        active.cover_public_id = Set(Some(cover_public_id));
    }

    let updated = active.update(&state.db).await?;

    Ok(Json(updated))
}

pub async fn delete_post(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = Posts::delete_by_id(&id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Post {id} not found")));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
