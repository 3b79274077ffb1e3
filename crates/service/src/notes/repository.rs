use crate::errors::ServiceError;
use async_trait::async_trait;

use super::model::{Note, NoteDraft, NotePatch};

/// Trait abstraction for note storage (CRUD over the whole collection).
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes in insertion order.
    async fn list(&self) -> Result<Vec<Note>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Note, ServiceError>;
    async fn create(&self, draft: NoteDraft) -> Result<Note, ServiceError>;
    async fn update(&self, id: &str, patch: NotePatch) -> Result<Note, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}
