use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CatalogItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CatalogItems::Company).string().not_null())
                    .col(
                        ColumnDef::new(CatalogItems::PostalCode)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(CatalogItems::Address).text().not_null())
                    .col(ColumnDef::new(CatalogItems::Phone).string().not_null().default(""))
                    .col(ColumnDef::new(CatalogItems::Fax).string().not_null().default(""))
                    .col(ColumnDef::new(CatalogItems::Url).text().not_null().unique_key())
                    .col(ColumnDef::new(CatalogItems::Category).string().not_null())
                    .col(
                        ColumnDef::new(CatalogItems::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CatalogItems::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Matching always filters by exact category first
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_catalog_items_category")
                    .table(CatalogItems::Table)
                    .col(CatalogItems::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CatalogItems {
    Table,
    Id,
    Company,
    PostalCode,
    Address,
    Phone,
    Fax,
    Url,
    Category,
    CreatedAt,
    UpdatedAt,
}
