pub mod prelude;

pub mod app_settings;
pub mod notifications;
pub mod order_clicks;
pub mod posts;
pub mod product_offers;
pub mod products;
