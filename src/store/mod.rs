//! The Alert Store: the one shared mutable collection in the system.
//!
//! Every process talks to it through the [`AlertStore`] trait so the SOS
//! flow and the responder feed stay transport-agnostic: the server mounts
//! the Postgres-backed [`DbAlertStore`], field devices reach it over HTTP
//! via [`HttpAlertStore`], and tests use [`MemoryAlertStore`].

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::alert::{SosAlert, SosAlertDraft};

pub mod db;
pub mod http;
pub mod memory;

pub use db::DbAlertStore;
pub use http::HttpAlertStore;
pub use memory::MemoryAlertStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("alert not found")]
    NotFound,
    #[error("alert store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persists a new alert. The store assigns `id` and `created_at`, sets
    /// the status to Active and returns the full record. An existing id is
    /// never overwritten.
    async fn append(&self, draft: SosAlertDraft) -> Result<SosAlert, StoreError>;

    /// All Active alerts, oldest first. Stable across repeated calls when
    /// nothing has been appended or resolved in between.
    async fn list_active(&self) -> Result<Vec<SosAlert>, StoreError>;

    /// Marks the alert Resolved. Resolving an already-Resolved alert is a
    /// successful no-op; an unknown id is [`StoreError::NotFound`].
    async fn resolve(&self, id: Uuid) -> Result<(), StoreError>;
}
