use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::store::{Record, Value};

/// A normalized news article, as stored in the `articles` table.
///
/// `id` and `created_at` are assigned by the store on first insert and stay
/// `None` on in-memory records. `wordcount` is only set once the body has
/// been cleaned.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
    pub id: Option<i32>,
    pub source: String,
    pub handle: String,
    pub section: String,
    pub authors: String,
    pub headline: String,
    pub body: String,
    pub source_url: String,
    pub wordcount: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Two articles are the same record when their surrogate ids match, or,
/// before persistence, when the provider handle matches.
impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            _ => self.handle == other.handle,
        }
    }
}

impl Eq for Article {}

impl Record for Article {
    const TABLE: &'static str = "articles";

    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS articles (
            id         SERIAL PRIMARY KEY,
            source     TEXT NOT NULL,
            handle     TEXT NOT NULL UNIQUE,
            section    TEXT NOT NULL,
            authors    TEXT NOT NULL,
            headline   TEXT NOT NULL,
            body       TEXT NOT NULL,
            source_url TEXT NOT NULL,
            wordcount  INTEGER,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#;

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "source",
            "handle",
            "section",
            "authors",
            "headline",
            "body",
            "source_url",
            "wordcount",
            "created_at",
        ]
    }

    fn insert_columns() -> &'static [&'static str] {
        // id and created_at are store-assigned
        &[
            "source",
            "handle",
            "section",
            "authors",
            "headline",
            "body",
            "source_url",
            "wordcount",
        ]
    }

    fn value(&self, column: &str) -> Option<Value> {
        let value = match column {
            "id" => Value::Int(self.id),
            "source" => Value::text(&self.source),
            "handle" => Value::text(&self.handle),
            "section" => Value::text(&self.section),
            "authors" => Value::text(&self.authors),
            "headline" => Value::text(&self.headline),
            "body" => Value::text(&self.body),
            "source_url" => Value::text(&self.source_url),
            "wordcount" => Value::Int(self.wordcount),
            "created_at" => Value::Timestamp(self.created_at),
            _ => return None,
        };
        Some(value)
    }
}
