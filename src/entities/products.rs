use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub product_type: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub wa_number: String,
    pub promo: bool,
    pub promo_text: Option<String>,
    pub garansi: bool,
    pub support_device: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_offers::Entity")]
    ProductOffers,
    #[sea_orm(has_many = "super::order_clicks::Entity")]
    OrderClicks,
}

impl Related<super::product_offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductOffers.def()
    }
}

impl Related<super::order_clicks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderClicks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
