use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::analytics::{ALL_CATEGORIES, filter_products};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, IntoParams)]
pub struct ListProductsQuery {
    /// Free-text search over name, type and description.
    pub q: Option<String>,
    /// Category filter; "ALL" or absent means no filter.
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Products, newest first, filtered in memory")
    )
)]
pub async fn list_products(
    State(state): State<crate::AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<products::Model>>, AppError> {
    let items = Products::find()
        .order_by_desc(products::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let q = query.q.unwrap_or_default();
    let category = query
        .category
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());

    Ok(Json(filter_products(&items, &q, &category)))
}

#[derive(Serialize)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: products::Model,
    pub offers: Vec<product_offers::Model>,
}

pub async fn get_product(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetailResponse>, AppError> {
    let product = Products::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    let offers = ProductOffers::find()
        .filter(product_offers::Column::ProductId.eq(&id))
        .order_by_asc(product_offers::Column::Price)
        .all(&state.db)
        .await?;

    Ok(Json(ProductDetailResponse { product, offers }))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub wa_number: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub promo: Option<bool>,
    pub promo_text: Option<String>,
    pub garansi: Option<bool>,
    pub support_device: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Missing name or WhatsApp number"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn create_product(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<products::Model>), AppError> {
    let name = payload.name.trim();
    let wa_number = payload.wa_number.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Nama produk wajib diisi".to_string()));
    }
    if wa_number.is_empty() {
        return Err(AppError::Validation("Nomor WA wajib diisi".to_string()));
    }

    let product_type = payload
        .product_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "SHARING".to_string());

    let model = products::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        category: Set(payload.category),
        product_type: Set(product_type),
        description: Set(payload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())),
        image_url: Set(payload.image_url),
        image_public_id: Set(payload.image_public_id),
        wa_number: Set(wa_number.to_string()),
        promo: Set(payload.promo.unwrap_or(false)),
        promo_text: Set(payload.promo_text),
        garansi: Set(payload.garansi.unwrap_or(false)),
        support_device: Set(payload.support_device),
        created_at: Set(Utc::now()),
    };

    let created = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub wa_number: Option<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub promo: Option<bool>,
    pub promo_text: Option<String>,
    pub garansi: Option<bool>,
    pub support_device: Option<String>,
}

pub async fn update_product(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<products::Model>, AppError> {
    let product = Products::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    let mut active = product.into_active_model();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Nama produk wajib diisi".to_string()));
        }
        active.name = Set(name);
    }
    if let Some(wa_number) = payload.wa_number {
        let wa_number = wa_number.trim().to_string();
        if wa_number.is_empty() {
            return Err(AppError::Validation("Nomor WA wajib diisi".to_string()));
        }
        active.wa_number = Set(wa_number);
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }
    if let Some(product_type) = payload.product_type {
        active.product_type = Set(product_type);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(image_public_id) = payload.image_public_id {
        active.image_public_id = Set(Some(image_public_id));
    }
    if let Some(promo) = payload.promo {
        active.promo = Set(promo);
    }
    if let Some(promo_text) = payload.promo_text {
        active.promo_text = Set(Some(promo_text));
    }
    if let Some(garansi) = payload.garansi {
        active.garansi = Set(garansi);
    }
    if let Some(support_device) = payload.support_device {
        active.support_device = Set(Some(support_device));
    }

    let updated = active.update(&state.db).await?;

    Ok(Json(updated))
}

pub async fn delete_product(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = Products::delete_by_id(&id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Product {id} not found")));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn list_offers(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<product_offers::Model>>, AppError> {
    let offers = ProductOffers::find()
        .filter(product_offers::Column::ProductId.eq(&id))
        .order_by_asc(product_offers::Column::Price)
        .all(&state.db)
        .await?;

    Ok(Json(offers))
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateOfferRequest {
    #[validate(length(min = 1, message = "Label wajib diisi"))]
    pub label: String,
    pub unit: Option<String>,
    #[validate(range(min = 1, message = "Qty minimal 1"))]
    pub qty: i32,
    #[validate(range(min = 0, message = "Harga tidak boleh negatif"))]
    pub price: i64,
}

pub async fn create_offer(
    State(state): State<crate::AppState>,
    Path(product_id): Path<String>,
    Json(payload): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<product_offers::Model>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Products::find_by_id(&product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {product_id} not found")))?;

    let model = product_offers::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        product_id: Set(product_id),
        label: Set(payload.label.trim().to_string()),
        unit: Set(payload.unit.unwrap_or_else(|| "bulan".to_string())),
        qty: Set(payload.qty),
        price: Set(payload.price),
        created_at: Set(Utc::now()),
    };

    let created = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct UpdateOfferRequest {
    #[validate(length(min = 1, message = "Label wajib diisi"))]
    pub label: Option<String>,
    pub unit: Option<String>,
    #[validate(range(min = 1, message = "Qty minimal 1"))]
    pub qty: Option<i32>,
    #[validate(range(min = 0, message = "Harga tidak boleh negatif"))]
    pub price: Option<i64>,
}

pub async fn update_offer(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOfferRequest>,
) -> Result<Json<product_offers::Model>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let offer = ProductOffers::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Offer {id} not found")))?;

    let mut active = offer.into_active_model();
    if let Some(label) = payload.label {
        active.label = Set(label.trim().to_string());
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit);
    }
    if let Some(qty) = payload.qty {
        active.qty = Set(qty);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }

    let updated = active.update(&state.db).await?;

    Ok(Json(updated))
}

pub async fn delete_offer(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = ProductOffers::delete_by_id(&id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Offer {id} not found")));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
