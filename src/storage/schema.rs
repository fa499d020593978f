//! Database schema definitions

/// SQL to create the articles table
pub const CREATE_ARTICLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    url TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    image_url TEXT,
    published_at TEXT NOT NULL,
    source TEXT NOT NULL,
    content TEXT,
    author TEXT
)
"#;

/// SQL to create the messages table
pub const CREATE_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    from_user INTEGER NOT NULL,
    kind TEXT NOT NULL DEFAULT 'text',
    image_uri TEXT,
    audio_uri TEXT
)
"#;

/// SQL to create the user_profile table
/// Holds a single row with id = 1
pub const CREATE_USER_PROFILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user_profile (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    image_uri TEXT,
    location TEXT,
    latitude REAL,
    longitude REAL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published_at)",
    "CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_ARTICLES_TABLE,
        CREATE_MESSAGES_TABLE,
        CREATE_USER_PROFILE_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
