pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::api::handlers;
use crate::config::QuotaConfig;
use crate::services::signer::UploadSigner;
use crate::services::usage::UsageReporter;
use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, patch, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::cloudinary::sign_upload,
        handlers::cloudinary::usage,
        handlers::notifications::refresh_notifications,
        handlers::products::list_products,
        handlers::clicks::top_clicked_products,
        handlers::clicks::stats_summary,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::notifications::RefreshResponse,
            handlers::clicks::TopClickedEntry,
            handlers::clicks::SummaryResponse,
            handlers::products::CreateProductRequest,
            services::signer::SignedUpload,
            services::quota::UsageSample,
            services::quota::DiskTier,
        )
    ),
    tags(
        (name = "cloudinary", description = "Signed uploads and storage usage"),
        (name = "catalog", description = "Products, offers and posts"),
        (name = "notifications", description = "Admin notifications")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub signer: Arc<UploadSigner>,
    pub usage: Arc<dyn UsageReporter>,
    pub quota: QuotaConfig,
}

pub fn create_app(state: AppState) -> Router {
    // Storefront surface, no session required
    let public = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/products", get(handlers::products::list_products))
        .route("/api/products/:id", get(handlers::products::get_product))
        .route(
            "/api/products/:id/offers",
            get(handlers::products::list_offers),
        )
        .route("/api/posts", get(handlers::posts::list_published_posts))
        .route("/api/posts/:id", get(handlers::posts::get_post))
        .route("/api/clicks", post(handlers::clicks::record_click))
        .route("/api/settings/:key", get(handlers::settings::get_setting));

    // Dashboard surface, verified session token required
    let admin = Router::new()
        .route(
            "/api/cloudinary/sign",
            get(handlers::cloudinary::sign_upload),
        )
        .route("/api/cloudinary/usage", get(handlers::cloudinary::usage))
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications)
                .delete(handlers::notifications::delete_all_notifications),
        )
        .route(
            "/api/notifications/refresh",
            post(handlers::notifications::refresh_notifications),
        )
        .route(
            "/api/notifications/read-all",
            patch(handlers::notifications::mark_all_notifications_read),
        )
        .route(
            "/api/notifications/:id/read",
            patch(handlers::notifications::mark_notification_read),
        )
        .route(
            "/api/notifications/:id",
            delete(handlers::notifications::delete_notification),
        )
        .route(
            "/api/stats/top-clicked",
            get(handlers::clicks::top_clicked_products),
        )
        .route("/api/stats/summary", get(handlers::clicks::stats_summary))
        .route("/api/admin/products", post(handlers::products::create_product))
        .route(
            "/api/admin/products/:id",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route(
            "/api/admin/products/:id/offers",
            post(handlers::products::create_offer),
        )
        .route(
            "/api/admin/offers/:id",
            put(handlers::products::update_offer).delete(handlers::products::delete_offer),
        )
        .route(
            "/api/admin/posts",
            get(handlers::posts::list_all_posts).post(handlers::posts::create_post),
        )
        .route(
            "/api/admin/posts/:id",
            put(handlers::posts::update_post).delete(handlers::posts::delete_post),
        )
        .route(
            "/api/admin/settings/:key",
            put(handlers::settings::put_setting),
        )
        .route_layer(from_fn(api::middleware::auth::auth_middleware));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public)
        .merge(admin)
        .with_state(state)
}
