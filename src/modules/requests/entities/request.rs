use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::RequestCategory;

/// One row per request of any category. Variant-only columns stay NULL for
/// the other categories.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub request_id: String,
    #[sea_orm(index)]
    pub user_id: i32,
    pub category: RequestCategory,
    pub project_name: String,
    pub wish_num: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub area_selection: Json,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub work_selection: Option<Json>,
    #[sea_orm(column_type = "Text", nullable)]
    pub area_memo: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub tags: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub detail_condition: Option<String>,
    pub portal_site: Option<String>,
    pub complete_state: i32,
    pub cancel_state: i32,
    pub list_count: Option<i32>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub row_count: Option<i32>,
    pub created_at: DateTime,
    pub request_at: Option<DateTime>,
    pub delivery_at: Option<DateTime>,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::modules::users::entities::user::Entity",
        from = "Column::UserId",
        to = "crate::modules::users::entities::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<crate::modules::users::entities::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
