use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Requests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Requests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Requests::RequestId)
                            .string_len(5)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Requests::UserId).integer().not_null())
                    .col(ColumnDef::new(Requests::Category).string().not_null())
                    .col(ColumnDef::new(Requests::ProjectName).string().not_null())
                    .col(ColumnDef::new(Requests::WishNum).integer().not_null().default(0))
                    .col(ColumnDef::new(Requests::AreaSelection).json_binary().not_null())
                    .col(ColumnDef::new(Requests::WorkSelection).json_binary())
                    .col(ColumnDef::new(Requests::AreaMemo).text())
                    .col(ColumnDef::new(Requests::Tags).text())
                    .col(ColumnDef::new(Requests::DetailCondition).text())
                    .col(ColumnDef::new(Requests::PortalSite).string())
                    .col(
                        ColumnDef::new(Requests::CompleteState)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Requests::CancelState)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Requests::ListCount).integer())
                    .col(ColumnDef::new(Requests::FilePath).string())
                    .col(ColumnDef::new(Requests::FileName).string())
                    .col(ColumnDef::new(Requests::RowCount).integer())
                    .col(
                        ColumnDef::new(Requests::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Requests::RequestAt).timestamp())
                    .col(ColumnDef::new(Requests::DeliveryAt).timestamp())
                    .col(
                        ColumnDef::new(Requests::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_requests_user")
                            .from(Requests::Table, Requests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_requests_user_category")
                    .table(Requests::Table)
                    .col(Requests::UserId)
                    .col(Requests::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Requests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Requests {
    Table,
    Id,
    RequestId,
    UserId,
    Category,
    ProjectName,
    WishNum,
    AreaSelection,
    WorkSelection,
    AreaMemo,
    Tags,
    DetailCondition,
    PortalSite,
    CompleteState,
    CancelState,
    ListCount,
    FilePath,
    FileName,
    RowCount,
    CreatedAt,
    RequestAt,
    DeliveryAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
