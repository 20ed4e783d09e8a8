use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NewsPosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsPosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NewsPosts::Title).string().not_null())
                    .col(ColumnDef::new(NewsPosts::Content).text().not_null())
                    .col(ColumnDef::new(NewsPosts::Image).text())
                    .col(ColumnDef::new(NewsPosts::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NewsPosts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum NewsPosts {
    Table,
    Id,
    Title,
    Content,
    Image,
    CreatedAt,
}
