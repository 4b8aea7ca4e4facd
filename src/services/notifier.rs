use crate::entities::{prelude::*, *};
use crate::services::quota::{DiskTier, UsageSample, format_bytes};
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

/// Marker shared by every quota notification title; the dedup check matches
/// on it so retitling the alert would break the once-per-day guarantee.
const TITLE_MARKER: &str = "Disk hampir penuh";

const MANAGEMENT_LINK: &str = "/dashboard/static";

/// Writes at-most-one quota notification per severity tier per calendar day.
///
/// The existence check and the insert are two sequential queries, not a
/// transaction. Two overlapping invocations can both pass the check and both
/// insert; sequential invocations are idempotent.
pub struct QuotaNotifier;

impl QuotaNotifier {
    /// Returns the freshly inserted notification, or `None` when the tier is
    /// ok or a matching notification already exists for `today`.
    pub async fn notify_if_needed(
        db: &impl sea_orm::ConnectionTrait,
        sample: &UsageSample,
        today: NaiveDate,
    ) -> Result<Option<notifications::Model>, DbErr> {
        if sample.tier == DiskTier::Ok {
            return Ok(None);
        }

        let day_start = today.and_time(NaiveTime::MIN).and_utc();
        let day_end = (today + Days::new(1)).and_time(NaiveTime::MIN).and_utc();

        let existing = Notifications::find()
            .filter(notifications::Column::Kind.eq(sample.tier.label()))
            .filter(notifications::Column::Title.contains(TITLE_MARKER))
            .filter(notifications::Column::CreatedAt.gte(day_start))
            .filter(notifications::Column::CreatedAt.lt(day_end))
            .limit(1)
            .one(db)
            .await?;

        if existing.is_some() {
            tracing::debug!(
                tier = sample.tier.label(),
                %today,
                "quota notification already exists, skipping"
            );
            return Ok(None);
        }

        let notification = notifications::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(format!("{TITLE_MARKER} ({}%)", sample.percent)),
            body: Set(Some(format!(
                "Storage Cloudinary terpakai {} dari {}. Bersihkan file yang tidak dipakai.",
                format_bytes(sample.used_bytes),
                format_bytes(sample.capacity_bytes),
            ))),
            kind: Set(sample.tier.label().to_string()),
            is_read: Set(false),
            link_path: Set(Some(MANAGEMENT_LINK.to_string())),
            entity_type: Set(None),
            entity_id: Set(None),
            meta: Set(None),
            created_at: Set(Utc::now()),
        };

        let inserted = notification.insert(db).await?;
        tracing::info!(
            tier = sample.tier.label(),
            percent = sample.percent,
            "created quota notification {}",
            inserted.id
        );

        Ok(Some(inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::quota::classify;
    use sea_orm::{Database, DatabaseConnection, PaginatorTrait};

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        crate::infrastructure::database::run_migrations(&db)
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_ok_tier_writes_nothing() {
        let db = test_db().await;
        let sample = classify(100, 1_000_000_000);
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        let result = QuotaNotifier::notify_if_needed(&db, &sample, today)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(Notifications::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_are_idempotent() {
        let db = test_db().await;
        let capacity = 2u64 * 1024 * 1024 * 1024;
        let used = (1.9 * 1024.0 * 1024.0 * 1024.0) as u64;
        let sample = classify(used, capacity);
        // dedup window must cover the wall-clock created_at of the insert
        let today = Utc::now().date_naive();

        let first = QuotaNotifier::notify_if_needed(&db, &sample, today)
            .await
            .unwrap()
            .expect("first call should insert");
        assert!(first.title.contains("95%"));
        assert_eq!(first.kind, "critical");
        assert_eq!(first.link_path.as_deref(), Some("/dashboard/static"));
        assert!(first.body.as_deref().unwrap().contains("1.90 GB"));
        assert!(first.body.as_deref().unwrap().contains("2.00 GB"));

        let second = QuotaNotifier::notify_if_needed(&db, &sample, today)
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(Notifications::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_tiers_are_deduplicated_independently() {
        let db = test_db().await;
        let today = Utc::now().date_naive();

        let warning = classify(870_000_000, 1_000_000_000);
        let critical = classify(980_000_000, 1_000_000_000);
        assert_eq!(warning.tier, DiskTier::Warning);
        assert_eq!(critical.tier, DiskTier::Critical);

        assert!(
            QuotaNotifier::notify_if_needed(&db, &warning, today)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            QuotaNotifier::notify_if_needed(&db, &critical, today)
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(Notifications::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_new_day_gets_a_fresh_notification() {
        let db = test_db().await;
        let sample = classify(900_000_000, 1_000_000_000);

        let today = Utc::now().date_naive();
        let tomorrow = today + Days::new(1);

        assert!(
            QuotaNotifier::notify_if_needed(&db, &sample, today)
                .await
                .unwrap()
                .is_some()
        );
        // today's record sits outside tomorrow's dedup window
        assert!(
            QuotaNotifier::notify_if_needed(&db, &sample, tomorrow)
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(Notifications::find().count(&db).await.unwrap(), 2);
    }
}
