//! Study-log domain model.

use auth_session::Language;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the user was doing during a logged session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "activity", rename_all = "UPPERCASE")]
pub enum Activity {
    Flashcards,
    Textbook,
    Reading,
    Listening,
    Translation,
    Grammar,
    Other,
}

/// One study-log entry. Soft-deleted rows keep their data but drop out of
/// every query.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Log {
    pub id: i64,
    pub user_id: i64,
    pub language: Language,
    pub date: NaiveDate,
    /// Minutes spent.
    pub duration: i64,
    pub activity: Activity,
    #[serde(default)]
    pub notes: String,
}

/// Fields required to insert a log row.
#[derive(Debug, Clone)]
pub struct NewLog {
    pub user_id: i64,
    pub language: Language,
    pub date: NaiveDate,
    pub duration: i64,
    pub activity: Activity,
    pub notes: String,
}

/// Listing filter. Every predicate is optional and conjunctive; results are
/// newest-first and paged.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub user_id: Option<i64>,
    pub language: Option<Language>,
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub page: u32,
}

impl LogFilter {
    pub const PAGE_SIZE: i64 = 30;

    /// Row offset for the 1-based page number; page 0 reads as page 1.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * Self::PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Activity::Flashcards).unwrap(),
            "\"FLASHCARDS\""
        );
        assert_eq!(
            serde_json::from_str::<Activity>("\"OTHER\"").unwrap(),
            Activity::Other
        );
    }

    #[test]
    fn page_offsets() {
        let mut filter = LogFilter::default();
        assert_eq!(filter.offset(), 0);

        filter.page = 1;
        assert_eq!(filter.offset(), 0);

        filter.page = 3;
        assert_eq!(filter.offset(), 60);
    }
}
