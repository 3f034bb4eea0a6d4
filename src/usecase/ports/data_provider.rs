use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::entity::EntityKind;
use crate::domain::entities::list_query::{ListQuery, PagedResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Source of paged entity records, normally the REST backend.
#[async_trait]
pub trait PagedDataProvider<T>: Send + Sync {
    async fn fetch(&self, entity: EntityKind, query: &ListQuery)
        -> Result<PagedResult<T>, ProviderError>;
}
