use anyhow::Error;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::content::ContentRecord;
use crate::domain::notification::{NotificationItem, Priority};
use crate::usecase::contracts::ContentRepository;
use crate::usecase::text;

/// Hard cap on returned items. Truncation past this point is silent; there
/// is no pagination.
pub const MAX_ITEMS: i64 = 10;

/// Number of body words kept when falling back to the article body for the
/// notification message.
const MESSAGE_WORD_LIMIT: usize = 40;

pub struct NotificationFeed {
    pub items: Vec<NotificationItem>,
    /// Most recent modification timestamp among the source records, absent
    /// when the feed is empty.
    pub last_modified: Option<DateTime<Utc>>,
}

pub struct NotificationsUseCase<C>
where
    C: ContentRepository,
{
    content_repository: C,
}

impl<C> NotificationsUseCase<C>
where
    C: ContentRepository,
{
    pub fn new(content_repository: C) -> Self {
        Self { content_repository }
    }

    /// Returns the active notifications for a category slug, evaluated
    /// against the supplied calendar date.
    ///
    /// A slug that does not resolve to a known category yields an empty
    /// feed, never an error.
    #[tracing::instrument(skip(self), fields(%category_slug, %today))]
    pub async fn active_notifications(
        &self,
        category_slug: &str,
        today: NaiveDate,
    ) -> Result<NotificationFeed, Error> {
        tracing::debug!("querying active notifications");

        let slug = text::sanitize_slug(category_slug);
        let Some(category_id) = self.content_repository.resolve_category(&slug).await? else {
            tracing::debug!(%slug, "category did not resolve, returning empty feed");
            return Ok(NotificationFeed { items: vec![], last_modified: None });
        };

        let records = self
            .content_repository
            .find_notifiable(category_id, today, MAX_ITEMS)
            .await?;

        let last_modified = records.iter().map(|r| r.modified_at).max();
        let items = records.iter().map(project_record).collect::<Vec<_>>();

        tracing::debug!(category_id, count = items.len(), "retrieved active notifications");
        Ok(NotificationFeed { items, last_modified })
    }
}

/// Maps a content record onto the client-facing notification shape.
fn project_record(record: &ContentRecord) -> NotificationItem {
    let message = match record.meta_text("notification_text") {
        Some(explicit) => explicit.to_string(),
        None if !record.excerpt.trim().is_empty() => text::strip_markup(&record.excerpt),
        None => text::trim_words(&text::strip_markup(&record.body), MESSAGE_WORD_LIMIT),
    };

    let link = record
        .meta_text("notification_link")
        .unwrap_or(&record.permalink)
        .to_string();

    NotificationItem {
        id: format!("post-{}", record.id),
        record_id: record.id,
        title: text::decode_entities(&record.title),
        message,
        link,
        start_date: parse_meta_date(record, "start_date"),
        end_date: parse_meta_date(record, "end_date"),
        priority: Priority::parse(record.meta_value("priority").unwrap_or_default()),
        published_date: record.published_at,
    }
}

fn parse_meta_date(record: &ContentRecord, key: &str) -> Option<NaiveDate> {
    record
        .meta_text(key)
        .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::MockContentRepository;
    use mockall::predicate::eq;

    fn make_record(id: i64, meta: serde_json::Value) -> ContentRecord {
        ContentRecord {
            id,
            title: "Scheduled maintenance".to_string(),
            body: "The portal will be unavailable on Saturday.".to_string(),
            excerpt: "".to_string(),
            permalink: format!("https://example.com/?p={id}"),
            published_at: Utc::now(),
            modified_at: Utc::now(),
            meta,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[tokio::test]
    async fn test_unresolved_category_yields_empty_feed() {
        let mut mock_repo = MockContentRepository::new();
        mock_repo
            .expect_resolve_category()
            .with(eq("missing"))
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_find_notifiable().times(0);

        let usecase = NotificationsUseCase::new(mock_repo);
        let feed = usecase.active_notifications("missing", today()).await.unwrap();

        assert!(feed.items.is_empty());
        assert!(feed.last_modified.is_none());
    }

    #[tokio::test]
    async fn test_slug_is_sanitized_before_lookup() {
        let mut mock_repo = MockContentRepository::new();
        mock_repo
            .expect_resolve_category()
            .with(eq("news"))
            .times(1)
            .returning(|_| Ok(None));

        let usecase = NotificationsUseCase::new(mock_repo);
        usecase.active_notifications("  News?! ", today()).await.unwrap();
    }

    #[tokio::test]
    async fn test_records_are_projected_and_capped_request_passes_limit() {
        let mut mock_repo = MockContentRepository::new();
        mock_repo
            .expect_resolve_category()
            .with(eq("news"))
            .times(1)
            .returning(|_| Ok(Some(3)));
        mock_repo
            .expect_find_notifiable()
            .with(eq(3), eq(today()), eq(MAX_ITEMS))
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![make_record(
                    42,
                    serde_json::json!({
                        "notify_users": "1",
                        "notification_text": "Heads up!",
                        "notification_link": "https://example.com/maintenance",
                        "priority": "high",
                        "start_date": "2026-08-30",
                        "end_date": "2099-01-01"
                    }),
                )])
            });

        let usecase = NotificationsUseCase::new(mock_repo);
        let feed = usecase.active_notifications("news", today()).await.unwrap();

        assert_eq!(feed.items.len(), 1);
        let item = &feed.items[0];
        assert_eq!(item.id, "post-42");
        assert_eq!(item.record_id, 42);
        assert_eq!(item.message, "Heads up!");
        assert_eq!(item.link, "https://example.com/maintenance");
        assert_eq!(item.priority, Priority::High);
        assert_eq!(item.start_date, Some(today()));
        assert_eq!(item.end_date, NaiveDate::from_ymd_opt(2099, 1, 1));
        assert!(feed.last_modified.is_some());
    }

    #[tokio::test]
    async fn test_last_modified_is_max_over_records() {
        let older = Utc::now() - chrono::Duration::days(3);
        let newer = Utc::now();

        let mut first = make_record(1, serde_json::json!({"notify_users": "1"}));
        first.modified_at = newer;
        let mut second = make_record(2, serde_json::json!({"notify_users": "1"}));
        second.modified_at = older;

        let mut mock_repo = MockContentRepository::new();
        mock_repo.expect_resolve_category().returning(|_| Ok(Some(1)));
        mock_repo
            .expect_find_notifiable()
            .returning(move |_, _, _| Ok(vec![first.clone(), second.clone()]));

        let usecase = NotificationsUseCase::new(mock_repo);
        let feed = usecase.active_notifications("news", today()).await.unwrap();

        assert_eq!(feed.last_modified, Some(newer));
    }

    #[test]
    fn test_message_falls_back_to_stripped_excerpt() {
        let mut record = make_record(5, serde_json::json!({"notification_text": ""}));
        record.excerpt = "<p>Hello world</p>".to_string();

        let item = project_record(&record);
        assert_eq!(item.message, "Hello world");
    }

    #[test]
    fn test_message_falls_back_to_trimmed_body() {
        let mut record = make_record(5, serde_json::json!({}));
        record.excerpt = "".to_string();
        record.body = (0..50).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");

        let item = project_record(&record);
        assert!(item.message.ends_with('…'));
        assert_eq!(item.message.split_whitespace().count(), 40);
    }

    #[test]
    fn test_link_falls_back_to_permalink() {
        let record = make_record(5, serde_json::json!({"notification_link": ""}));

        let item = project_record(&record);
        assert_eq!(item.link, "https://example.com/?p=5");
    }

    #[test]
    fn test_title_entities_are_decoded() {
        let mut record = make_record(5, serde_json::json!({}));
        record.title = "Fish &amp; Chips".to_string();

        let item = project_record(&record);
        assert_eq!(item.title, "Fish & Chips");
    }

    #[test]
    fn test_missing_priority_and_dates_default() {
        let mut record = make_record(9, serde_json::json!({"priority": "", "start_date": ""}));
        record.excerpt = "Hello world".to_string();

        let item = project_record(&record);
        assert_eq!(item.priority, Priority::Normal);
        assert_eq!(item.start_date, None);
        assert_eq!(item.end_date, None);
        assert_eq!(item.message, "Hello world");
    }

    #[test]
    fn test_unparseable_meta_date_reads_as_open_bound() {
        let record = make_record(9, serde_json::json!({"start_date": "soon"}));

        let item = project_record(&record);
        assert_eq!(item.start_date, None);
    }
}
