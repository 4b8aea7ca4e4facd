pub use super::app_settings::Entity as AppSettings;
pub use super::notifications::Entity as Notifications;
pub use super::order_clicks::Entity as OrderClicks;
pub use super::posts::Entity as Posts;
pub use super::product_offers::Entity as ProductOffers;
pub use super::products::Entity as Products;
