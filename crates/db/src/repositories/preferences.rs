use std::collections::BTreeSet;

use sqlx::Row;

use super::{PreferenceRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPreferenceRepository {
    pool: DbPool,
}

impl SqlPreferenceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PreferenceRepository for SqlPreferenceRepository {
    async fn preferences_for_user(
        &self,
        user_id: &str,
    ) -> Result<BTreeSet<String>, RepositoryError> {
        let rows = sqlx::query("SELECT tag FROM dietary_preference WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| Ok(row.try_get::<String, _>("tag")?)).collect()
    }
}
