use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Hotlines the app used to ship hard-coded on the Emergency screen.
const SEED_CONTACTS: &[(&str, &str, i32)] = &[
    ("National Emergency", "911", 1),
    ("Barangay Office", "(043)3003713", 2),
    ("Police", "09361856910", 3),
    ("Fire Department", "09275758065", 4),
    ("Mediatrix", "(043)7736800", 5),
    ("Medix", "(043)7562342", 6),
    ("CDRRMO", "(043)7575164", 7),
    ("Batelec II", "(043)7566337", 8),
    ("Water District", "(043)7561611", 9),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmergencyContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmergencyContacts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmergencyContacts::Name).string().not_null())
                    .col(ColumnDef::new(EmergencyContacts::Phone).string().not_null())
                    .col(
                        ColumnDef::new(EmergencyContacts::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EmergencyContacts::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        let mut insert = Query::insert()
            .into_table(EmergencyContacts::Table)
            .columns([
                EmergencyContacts::Name,
                EmergencyContacts::Phone,
                EmergencyContacts::Priority,
            ])
            .to_owned();
        for (name, phone, priority) in SEED_CONTACTS {
            let row: [SimpleExpr; 3] = [(*name).into(), (*phone).into(), (*priority).into()];
            insert.values_panic(row);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmergencyContacts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EmergencyContacts {
    Table,
    Id,
    Name,
    Phone,
    Priority,
    CreatedAt,
}
