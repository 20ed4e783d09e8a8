pub mod agent;
pub mod alert;
pub mod api;
pub mod entities;
pub mod metrics;
pub mod migrator;
pub mod store;
pub mod telemetry;

pub use sea_orm;
