//! Repository pattern for database operations

use crate::db::models::{TransformerColumn, TransformerEntity, TransformerRecord};
use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

/// Repository for metadata access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// All transformer rows matching a code, oldest first.
    ///
    /// The code is matched exactly; an unknown code yields an empty list,
    /// not an error.
    pub async fn transformers_by_code(&self, code: &str) -> Result<Vec<TransformerRecord>> {
        TransformerEntity::find()
            .filter(TransformerColumn::Code.eq(code))
            .order_by_asc(TransformerColumn::CreatedAt)
            .all(self.pool.conn())
            .await
            .map_err(Into::into)
    }
}
