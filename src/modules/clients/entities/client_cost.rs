use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unit price per request category for one client.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "client_costs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    #[sea_orm(unique)]
    pub client_id: i32,
    pub green: i32,
    pub blue: i32,
    pub yellow: i32,
    pub pink: i32,
    pub red: i32,
    pub updated_at: DateTime,
}

impl Model {
    pub fn zero(client_id: i32, now: DateTime) -> Self {
        Self {
            id: 0,
            client_id,
            green: 0,
            blue: 0,
            yellow: 0,
            pink: 0,
            red: 0,
            updated_at: now,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
