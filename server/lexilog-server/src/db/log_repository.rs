use super::{DbResult, LogRepository};
use crate::models::{Log, LogFilter, NewLog};
use async_trait::async_trait;
use parking_lot::Mutex;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::atomic::{AtomicI64, Ordering};

const LOG_COLUMNS: &str = "id, user_id, language, date, duration, activity, notes";

pub struct PostgresLogRepository {
    pool: PgPool,
}

impl PostgresLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogRepository for PostgresLogRepository {
    async fn create(&self, log: NewLog) -> DbResult<Log> {
        let query = format!(
            "INSERT INTO logs (user_id, language, date, duration, activity, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {LOG_COLUMNS}"
        );

        sqlx::query_as::<_, Log>(&query)
            .bind(log.user_id)
            .bind(log.language)
            .bind(log.date)
            .bind(log.duration)
            .bind(log.activity)
            .bind(&log.notes)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Log>> {
        let query = format!("SELECT {LOG_COLUMNS} FROM logs WHERE id = $1 AND deleted = FALSE");

        sqlx::query_as::<_, Log>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list(&self, filter: &LogFilter) -> DbResult<Vec<Log>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE deleted = FALSE"
        ));

        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(language) = filter.language {
            builder.push(" AND language = ").push_bind(language);
        }
        if let Some(date) = filter.date {
            builder.push(" AND date = ").push_bind(date);
        }
        if let Some(from) = filter.from {
            builder.push(" AND date >= ").push_bind(from);
        }
        if let Some(until) = filter.until {
            builder.push(" AND date <= ").push_bind(until);
        }

        builder
            .push(" ORDER BY date DESC, id DESC LIMIT ")
            .push_bind(LogFilter::PAGE_SIZE)
            .push(" OFFSET ")
            .push_bind(filter.offset());

        builder
            .build_query_as::<Log>()
            .fetch_all(&self.pool)
            .await
    }

    async fn update(&self, log: &Log) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE logs SET language = $1, date = $2, duration = $3, activity = $4, notes = $5 \
             WHERE id = $6 AND deleted = FALSE",
        )
        .bind(log.language)
        .bind(log.date)
        .bind(log.duration)
        .bind(log.activity)
        .bind(&log.notes)
        .bind(log.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("UPDATE logs SET deleted = TRUE WHERE id = $1 AND deleted = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

struct StoredLog {
    log: Log,
    deleted: bool,
}

/// In-memory log store for tests and development.
pub struct InMemoryLogRepository {
    logs: Mutex<Vec<StoredLog>>,
    next_id: AtomicI64,
}

impl Default for InMemoryLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLogRepository {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    async fn create(&self, log: NewLog) -> DbResult<Log> {
        let log = Log {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: log.user_id,
            language: log.language,
            date: log.date,
            duration: log.duration,
            activity: log.activity,
            notes: log.notes,
        };

        self.logs.lock().push(StoredLog {
            log: log.clone(),
            deleted: false,
        });
        Ok(log)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Log>> {
        Ok(self
            .logs
            .lock()
            .iter()
            .find(|s| s.log.id == id && !s.deleted)
            .map(|s| s.log.clone()))
    }

    async fn list(&self, filter: &LogFilter) -> DbResult<Vec<Log>> {
        let logs = self.logs.lock();

        let mut matched: Vec<Log> = logs
            .iter()
            .filter(|s| !s.deleted)
            .map(|s| &s.log)
            .filter(|log| filter.user_id.map_or(true, |id| log.user_id == id))
            .filter(|log| filter.language.map_or(true, |l| log.language == l))
            .filter(|log| filter.date.map_or(true, |d| log.date == d))
            .filter(|log| filter.from.map_or(true, |d| log.date >= d))
            .filter(|log| filter.until.map_or(true, |d| log.date <= d))
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        Ok(matched
            .into_iter()
            .skip(filter.offset() as usize)
            .take(LogFilter::PAGE_SIZE as usize)
            .collect())
    }

    async fn update(&self, log: &Log) -> DbResult<bool> {
        let mut logs = self.logs.lock();
        let Some(stored) = logs.iter_mut().find(|s| s.log.id == log.id && !s.deleted) else {
            return Ok(false);
        };

        stored.log.language = log.language;
        stored.log.date = log.date;
        stored.log.duration = log.duration;
        stored.log.activity = log.activity;
        stored.log.notes = log.notes.clone();
        Ok(true)
    }

    async fn delete(&self, id: i64) -> DbResult<bool> {
        let mut logs = self.logs.lock();
        let Some(stored) = logs.iter_mut().find(|s| s.log.id == id && !s.deleted) else {
            return Ok(false);
        };

        stored.deleted = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_session::Language;
    use crate::models::Activity;
    use chrono::NaiveDate;

    fn new_log(user_id: i64, language: Language, date: &str) -> NewLog {
        NewLog {
            user_id,
            language,
            date: date.parse::<NaiveDate>().unwrap(),
            duration: 25,
            activity: Activity::Reading,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn soft_delete_hides_the_row() {
        let repo = InMemoryLogRepository::new();
        let log = repo.create(new_log(1, Language::Japanese, "2026-08-01")).await.unwrap();

        assert!(repo.delete(log.id).await.unwrap());
        assert!(repo.find_by_id(log.id).await.unwrap().is_none());
        // A second delete finds nothing.
        assert!(!repo.delete(log.id).await.unwrap());
    }

    #[tokio::test]
    async fn filters_are_conjunctive() {
        let repo = InMemoryLogRepository::new();
        repo.create(new_log(1, Language::Japanese, "2026-08-01")).await.unwrap();
        repo.create(new_log(1, Language::Korean, "2026-08-02")).await.unwrap();
        repo.create(new_log(2, Language::Japanese, "2026-08-03")).await.unwrap();

        let filter = LogFilter {
            user_id: Some(1),
            language: Some(Language::Japanese),
            ..LogFilter::default()
        };
        let logs = repo.list(&filter).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, 1);
        assert_eq!(logs[0].language, Language::Japanese);
    }

    #[tokio::test]
    async fn date_range_and_ordering() {
        let repo = InMemoryLogRepository::new();
        for day in ["2026-08-01", "2026-08-02", "2026-08-03", "2026-08-04"] {
            repo.create(new_log(1, Language::German, day)).await.unwrap();
        }

        let filter = LogFilter {
            from: Some("2026-08-02".parse().unwrap()),
            until: Some("2026-08-03".parse().unwrap()),
            ..LogFilter::default()
        };
        let logs = repo.list(&filter).await.unwrap();

        let dates: Vec<String> = logs.iter().map(|l| l.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-08-03", "2026-08-02"]);
    }

    #[tokio::test]
    async fn pagination_is_thirty_per_page() {
        let repo = InMemoryLogRepository::new();
        for _ in 0..35 {
            repo.create(new_log(1, Language::Chinese, "2026-08-01")).await.unwrap();
        }

        let mut filter = LogFilter::default();
        assert_eq!(repo.list(&filter).await.unwrap().len(), 30);

        filter.page = 2;
        assert_eq!(repo.list(&filter).await.unwrap().len(), 5);

        filter.page = 3;
        assert!(repo.list(&filter).await.unwrap().is_empty());
    }
}
