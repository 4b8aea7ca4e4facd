use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::analytics::{ClickEvent, top_clicked};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{TimeDelta, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Cap on click rows fetched per ranking query; the window rarely holds more.
const CLICK_FETCH_LIMIT: u64 = 5000;

#[derive(Deserialize, ToSchema)]
pub struct RecordClickRequest {
    pub product_id: String,
    pub offer_id: Option<String>,
}

/// Storefront "order via WhatsApp" click. Public endpoint.
pub async fn record_click(
    State(state): State<crate::AppState>,
    Json(payload): Json<RecordClickRequest>,
) -> Result<StatusCode, AppError> {
    Products::find_by_id(&payload.product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Product {} not found", payload.product_id))
        })?;

    let model = order_clicks::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        product_id: Set(payload.product_id),
        offer_id: Set(payload.offer_id),
        created_at: Set(Utc::now()),
    };
    model.insert(&state.db).await?;

    Ok(StatusCode::CREATED)
}

#[derive(Deserialize, IntoParams)]
pub struct TopClickedQuery {
    /// Window size in days, default 7.
    pub days: Option<i64>,
    /// Ranking size, default 8.
    pub limit: Option<usize>,
}

#[derive(Serialize, ToSchema)]
pub struct TopClickedEntry {
    pub product_id: String,
    pub name: String,
    pub clicks: u64,
}

#[utoipa::path(
    get,
    path = "/api/stats/top-clicked",
    params(TopClickedQuery),
    responses(
        (status = 200, description = "Most clicked products in the window", body = [TopClickedEntry]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn top_clicked_products(
    State(state): State<crate::AppState>,
    Query(query): Query<TopClickedQuery>,
) -> Result<Json<Vec<TopClickedEntry>>, AppError> {
    let days = query.days.unwrap_or(7).max(1);
    let limit = query.limit.unwrap_or(8);
    let since = Utc::now() - TimeDelta::days(days);

    let rows = OrderClicks::find()
        .filter(order_clicks::Column::CreatedAt.gte(since))
        .limit(CLICK_FETCH_LIMIT)
        .all(&state.db)
        .await?;

    let events: Vec<ClickEvent> = rows
        .into_iter()
        .map(|row| ClickEvent {
            product_id: row.product_id,
            occurred_at: row.created_at,
        })
        .collect();

    let ranking = top_clicked(&events, since, limit);
    if ranking.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let ids: Vec<String> = ranking.iter().map(|c| c.product_id.clone()).collect();
    let names: HashMap<String, String> = Products::find()
        .filter(products::Column::Id.is_in(ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let entries = ranking
        .into_iter()
        .map(|c| TopClickedEntry {
            name: names
                .get(&c.product_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            product_id: c.product_id,
            clicks: c.count,
        })
        .collect();

    Ok(Json(entries))
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    pub products: u64,
    pub posts: u64,
    pub order_clicks: u64,
}

#[utoipa::path(
    get,
    path = "/api/stats/summary",
    responses(
        (status = 200, description = "Entity counts for the dashboard", body = SummaryResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn stats_summary(
    State(state): State<crate::AppState>,
) -> Result<Json<SummaryResponse>, AppError> {
    let products = Products::find().count(&state.db).await?;
    let posts = Posts::find().count(&state.db).await?;
    let order_clicks = OrderClicks::find().count(&state.db).await?;

    Ok(Json(SummaryResponse {
        products,
        posts,
        order_clicks,
    }))
}
