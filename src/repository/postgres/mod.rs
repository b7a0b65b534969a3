use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    domain::content::ContentRecord,
    repository::errors::RepositoryError,
    usecase::contracts::ContentRepository,
};

/// Eligibility query. Start/end dates live in the free-text metadata bag;
/// an absent row or empty value leaves that bound open. The `::date` casts
/// sit inside `CASE` arms (plain `AND` operand order is not guaranteed), so
/// a value that is not `YYYY-MM-DD` is never cast and reads as an open
/// bound instead of failing the query.
const NOTIFIABLE_QUERY: &str = r#"
    SELECT p.id, p.title, p.body, p.excerpt, p.permalink,
           p.published_at, p.modified_at,
           COALESCE(
               jsonb_object_agg(m.meta_key, m.meta_value)
                   FILTER (WHERE m.meta_key IS NOT NULL),
               '{}'::jsonb
           ) AS meta
    FROM posts p
    JOIN post_categories pc ON pc.post_id = p.id
    JOIN post_meta nm ON nm.post_id = p.id AND nm.meta_key = 'notify_users'
    LEFT JOIN post_meta m ON m.post_id = p.id
    WHERE p.status = 'publish'
      AND p.content_type = 'post'
      AND pc.category_id = $1
      AND nm.meta_value IN ('1', 'true', 'yes', 'on')
      AND NOT EXISTS (
          SELECT 1 FROM post_meta sd
          WHERE sd.post_id = p.id
            AND sd.meta_key = 'start_date'
            AND CASE WHEN sd.meta_value ~ '^\d{4}-\d{2}-\d{2}$'
                     THEN sd.meta_value::date > $2
                     ELSE FALSE END
      )
      AND NOT EXISTS (
          SELECT 1 FROM post_meta ed
          WHERE ed.post_id = p.id
            AND ed.meta_key = 'end_date'
            AND CASE WHEN ed.meta_value ~ '^\d{4}-\d{2}-\d{2}$'
                     THEN ed.meta_value::date < $2
                     ELSE FALSE END
      )
    GROUP BY p.id
    ORDER BY p.published_at DESC
    LIMIT $3
"#;

pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ContentRepository for PostgresContentRepository {
    #[tracing::instrument(skip(self), fields(%slug))]
    async fn resolve_category(&self, slug: &str) -> Result<Option<i64>, RepositoryError> {
        tracing::debug!("resolving category slug");

        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(id,)| id))
    }

    #[tracing::instrument(skip(self), fields(%category_id, %today, %limit))]
    async fn find_notifiable(
        &self,
        category_id: i64,
        today: NaiveDate,
        limit: i64,
    ) -> Result<Vec<ContentRecord>, RepositoryError> {
        tracing::debug!("querying notifiable records");

        let records = sqlx::query_as::<_, ContentRecord>(NOTIFIABLE_QUERY)
            .bind(category_id)
            .bind(today)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(count = records.len(), "found notifiable records");
        Ok(records)
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
