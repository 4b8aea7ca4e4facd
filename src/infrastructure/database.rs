use crate::entities::{app_settings, notifications, order_clicks, posts, product_offers, products};
use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm::{ConnectionTrait, Schema};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Parent tables first so the offer/click foreign keys resolve
    let stmts = vec![
        (
            "products",
            schema
                .create_table_from_entity(products::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "product_offers",
            schema
                .create_table_from_entity(product_offers::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "posts",
            schema
                .create_table_from_entity(posts::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "order_clicks",
            schema
                .create_table_from_entity(order_clicks::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "notifications",
            schema
                .create_table_from_entity(notifications::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "app_settings",
            schema
                .create_table_from_entity(app_settings::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        match db.execute(stmt).await {
            Ok(_) => info!("   - Table '{}' checked/created", name),
            Err(e) => tracing::warn!("   - Failed to create table '{}': {}", name, e),
        }
    }

    info!("🔄 Checking indexes...");

    let index_statements = vec![
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_posts_slug ON posts(slug)",
        "CREATE INDEX IF NOT EXISTS idx_product_offers_product_id ON product_offers(product_id)",
        "CREATE INDEX IF NOT EXISTS idx_order_clicks_product_id ON order_clicks(product_id)",
        "CREATE INDEX IF NOT EXISTS idx_order_clicks_created_at ON order_clicks(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_notifications_created_at ON notifications(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_notifications_is_read ON notifications(is_read)",
    ];

    for query in index_statements {
        match db
            .execute(sea_orm::Statement::from_string(builder, query))
            .await
        {
            Ok(_) => info!("   - Executed: {}", query),
            Err(e) => {
                let msg = e.to_string().to_lowercase();
                if msg.contains("already exists") {
                    info!("   - Index already present (skipped): {}", query);
                } else {
                    tracing::warn!("   - Index statement warning: {} -> {}", query, e);
                }
            }
        }
    }

    Ok(())
}
