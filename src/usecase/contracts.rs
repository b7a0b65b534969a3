use chrono::NaiveDate;

use crate::{domain::content::ContentRecord, repository::errors::RepositoryError};

/// Read-only view of the content store.
///
/// `find_notifiable` returns published articles in the given category whose
/// `notify_users` metadata is truthy and whose optional start/end dates
/// admit `today` (both bounds inclusive, open-ended when absent), newest
/// first, at most `limit` rows.
#[cfg_attr(test, mockall::automock)]
pub trait ContentRepository: Send + Sync {
    async fn resolve_category(&self, slug: &str) -> Result<Option<i64>, RepositoryError>;
    async fn find_notifiable(
        &self,
        category_id: i64,
        today: NaiveDate,
        limit: i64,
    ) -> Result<Vec<ContentRecord>, RepositoryError>;
}
