use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Business listing ("RedStoreItem") that Red requests are matched against.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "catalog_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company: String,
    pub postal_code: String,
    /// Prefecture + city + street as one free-text string
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub phone: String,
    pub fax: String,
    #[sea_orm(column_type = "Text", unique)]
    pub url: String,
    #[sea_orm(index)]
    pub category: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
