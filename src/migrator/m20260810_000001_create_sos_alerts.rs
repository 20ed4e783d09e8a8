use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SosAlerts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SosAlerts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SosAlerts::ReporterName).string().not_null())
                    .col(ColumnDef::new(SosAlerts::ReporterAddress).text().not_null())
                    // Coordinates may be missing; the record is still valid,
                    // it just cannot back the Directions action.
                    .col(ColumnDef::new(SosAlerts::Latitude).double())
                    .col(ColumnDef::new(SosAlerts::Longitude).double())
                    .col(ColumnDef::new(SosAlerts::EmergencyType).string().not_null())
                    .col(ColumnDef::new(SosAlerts::Details).text())
                    .col(ColumnDef::new(SosAlerts::Status).string().not_null())
                    .col(ColumnDef::new(SosAlerts::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // The responder feed reads "Active, oldest first" every few seconds.
        manager
            .create_index(
                Index::create()
                    .name("idx_sos_alerts_status_created_at")
                    .table(SosAlerts::Table)
                    .col(SosAlerts::Status)
                    .col(SosAlerts::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SosAlerts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SosAlerts {
    Table,
    Id,
    ReporterName,
    ReporterAddress,
    Latitude,
    Longitude,
    EmergencyType,
    Details,
    Status,
    CreatedAt,
}
