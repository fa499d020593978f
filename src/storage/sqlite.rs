//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use serde::Serialize;
use crate::{Result, Error};
use crate::article::Article;
use crate::message::{ChatMessage, MessageKind};
use crate::profile::{PROFILE_ID, UserProfile};
use super::schema;

const ARTICLE_COLUMNS: &str = "url, title, description, image_url, published_at, source, content, author";
const MESSAGE_COLUMNS: &str = "id, content, timestamp, from_user, kind, image_uri, audio_uri";

/// SQLite-backed storage for articles, chat messages and the user profile
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Article Operations ==========

    /// Insert or replace a batch of articles in one transaction
    pub fn upsert_articles(&mut self, articles: &[Article]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO articles (url, title, description, image_url, published_at, source, content, author)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for article in articles {
                stmt.execute(params![
                    article.url,
                    article.title,
                    article.description,
                    article.image_url,
                    article.published_at,
                    article.source,
                    article.content,
                    article.author,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Get an article by URL
    pub fn get_article(&self, url: &str) -> Result<Option<Article>> {
        self.conn
            .query_row(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = ?1"),
                [url],
                Self::row_to_article,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All cached articles, newest first
    pub fn all_articles(&self) -> Result<Vec<Article>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY published_at DESC"
        ))?;

        let articles = stmt
            .query_map([], Self::row_to_article)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(articles)
    }

    /// Cached articles whose title or description contains `query`, newest first
    ///
    /// `%` and `_` in the query are matched literally.
    pub fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles
             WHERE title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\'
             ORDER BY published_at DESC"
        ))?;

        let articles = stmt
            .query_map([pattern], Self::row_to_article)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(articles)
    }

    /// Delete all cached articles
    pub fn clear_articles(&self) -> Result<()> {
        self.conn.execute("DELETE FROM articles", [])?;
        Ok(())
    }

    /// Count cached articles
    pub fn count_articles(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_article(row: &rusqlite::Row) -> rusqlite::Result<Article> {
        Ok(Article {
            url: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            image_url: row.get(3)?,
            published_at: row.get(4)?,
            source: row.get(5)?,
            content: row.get(6)?,
            author: row.get(7)?,
        })
    }

    // ========== Message Operations ==========

    /// Append a message to the log
    ///
    /// Messages are immutable: inserting an existing id fails.
    pub fn insert_message(&self, message: &ChatMessage) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO messages (id, content, timestamp, from_user, kind, image_uri, audio_uri)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                message.id,
                message.content,
                message.timestamp,
                message.from_user,
                message.kind.as_str(),
                message.image_uri,
                message.audio_uri,
            ],
        )?;
        Ok(())
    }

    /// All messages, oldest first; equal timestamps keep insertion order
    pub fn all_messages(&self) -> Result<Vec<ChatMessage>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY timestamp ASC, rowid ASC"
        ))?;

        let messages = stmt
            .query_map([], Self::row_to_message)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(messages)
    }

    /// Delete every message
    pub fn clear_messages(&self) -> Result<()> {
        self.conn.execute("DELETE FROM messages", [])?;
        Ok(())
    }

    /// Count messages
    pub fn count_messages(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<ChatMessage> {
        let kind_str: String = row.get(4)?;
        let kind: MessageKind = kind_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(ChatMessage {
            id: row.get(0)?,
            content: row.get(1)?,
            timestamp: row.get(2)?,
            from_user: row.get(3)?,
            kind,
            image_uri: row.get(5)?,
            audio_uri: row.get(6)?,
        })
    }

    // ========== Profile Operations ==========

    /// The profile record, if one was ever written
    pub fn get_profile(&self) -> Result<Option<UserProfile>> {
        self.conn
            .query_row(
                "SELECT name, image_uri, location, latitude, longitude FROM user_profile WHERE id = ?1",
                [PROFILE_ID],
                |row| {
                    Ok(UserProfile {
                        name: row.get(0)?,
                        image_uri: row.get(1)?,
                        location: row.get(2)?,
                        latitude: row.get(3)?,
                        longitude: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Replace the profile record as a whole
    pub fn upsert_profile(&self, profile: &UserProfile) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO user_profile (id, name, image_uri, location, latitude, longitude)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                PROFILE_ID,
                profile.name,
                profile.image_uri,
                profile.location,
                profile.latitude,
                profile.longitude,
            ],
        )?;
        Ok(())
    }

    /// Remove the profile record
    pub fn clear_profile(&self) -> Result<()> {
        self.conn.execute("DELETE FROM user_profile", [])?;
        Ok(())
    }

    // ========== Bulk Operations ==========

    /// Delete all data
    pub fn clear_all(&self) -> Result<()> {
        self.clear_articles()?;
        self.clear_messages()?;
        self.clear_profile()?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            articles: self.count_articles()?,
            messages: self.count_messages()?,
            has_profile: self.get_profile()?.is_some(),
        })
    }
}

/// Escape LIKE wildcards so the query matches as a plain substring
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub articles: usize,
    pub messages: usize,
    pub has_profile: bool,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Articles: {}", self.articles)?;
        writeln!(f, "  Messages: {}", self.messages)?;
        writeln!(f, "  Profile: {}", if self.has_profile { "yes" } else { "no" })
    }
}
