use sea_orm_migration::prelude::*;

mod m20260810_000001_create_sos_alerts;
mod m20260810_000002_create_news_posts;
mod m20260812_000001_create_emergency_contacts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_create_sos_alerts::Migration),
            Box::new(m20260810_000002_create_news_posts::Migration),
            Box::new(m20260812_000001_create_emergency_contacts::Migration),
        ]
    }
}
