use crate::entities::products;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One order click, already fetched from the database.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub product_id: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickCount {
    pub product_id: String,
    pub count: u64,
}

/// Ranks products by click count within the window. Ties keep first-seen
/// order of the product id, so the ranking is deterministic for a given
/// input order.
pub fn top_clicked(
    events: &[ClickEvent],
    window_start: DateTime<Utc>,
    limit: usize,
) -> Vec<ClickCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ClickCount> = Vec::new();

    for event in events {
        if event.occurred_at < window_start {
            continue;
        }
        match index.get(event.product_id.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(event.product_id.as_str(), counts.len());
                counts.push(ClickCount {
                    product_id: event.product_id.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, preserving first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Category applied to products that have none.
pub const FALLBACK_CATEGORY: &str = "OTHERS";

/// Sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "ALL";

/// Storefront search: category match first (missing category counts as
/// OTHERS), then a case-folded substring match over name, type and
/// description. Input order is preserved.
pub fn filter_products(
    products: &[products::Model],
    query: &str,
    category: &str,
) -> Vec<products::Model> {
    let query = query.trim().to_lowercase();

    products
        .iter()
        .filter(|p| {
            if category != ALL_CATEGORIES {
                let cat = p.category.as_deref().unwrap_or(FALLBACK_CATEGORY);
                if cat != category {
                    return false;
                }
            }
            if query.is_empty() {
                return true;
            }
            let hay = format!(
                "{} {} {}",
                p.name,
                p.product_type,
                p.description.as_deref().unwrap_or("")
            )
            .to_lowercase();
            hay.contains(&query)
        })
        .cloned()
        .collect()
}
