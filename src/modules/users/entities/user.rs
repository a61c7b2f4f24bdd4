use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const ROLE_REGULAR: i32 = 0;
pub const ROLE_MANAGER: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password: String,
    /// 0 = regular, anything else = manager
    pub role: i32,
    #[sea_orm(index)]
    pub contract_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[serde(skip_deserializing)]
    pub created_at: DateTime,
    #[serde(skip_deserializing)]
    pub updated_at: DateTime,
}

impl Model {
    pub fn is_manager(&self) -> bool {
        self.role != ROLE_REGULAR
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::modules::requests::entities::request::Entity")]
    Requests,
}

impl Related<crate::modules::requests::entities::request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
