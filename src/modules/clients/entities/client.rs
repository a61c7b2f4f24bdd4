use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "clients")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Random 5-character key users sign up against
    #[sea_orm(unique)]
    pub contract_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub memo: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::client_cost::Entity")]
    Cost,
}

impl Related<super::client_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
