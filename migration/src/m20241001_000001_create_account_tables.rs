use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Clients Table
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::Name).string().not_null())
                    .col(
                        ColumnDef::new(Clients::ContractId)
                            .string_len(5)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Clients::Memo).text())
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Client Costs Table (one row per client)
        manager
            .create_table(
                Table::create()
                    .table(ClientCosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientCosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClientCosts::ClientId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ClientCosts::Green).integer().not_null().default(0))
                    .col(ColumnDef::new(ClientCosts::Blue).integer().not_null().default(0))
                    .col(ColumnDef::new(ClientCosts::Yellow).integer().not_null().default(0))
                    .col(ColumnDef::new(ClientCosts::Pink).integer().not_null().default(0))
                    .col(ColumnDef::new(ClientCosts::Red).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(ClientCosts::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_costs_client")
                            .from(ClientCosts::Table, ClientCosts::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Users Table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Role).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::ContractId).string_len(5))
                    .col(ColumnDef::new(Users::PasswordResetToken).text())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_contract_id")
                    .table(Users::Table)
                    .col(Users::ContractId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClientCosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    Role,
    ContractId,
    PasswordResetToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    Name,
    ContractId,
    Memo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClientCosts {
    Table,
    Id,
    ClientId,
    Green,
    Blue,
    Yellow,
    Pink,
    Red,
    UpdatedAt,
}
