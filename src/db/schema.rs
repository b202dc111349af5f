//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `users` table (one account per row, `role` stored as a JSON array of tags)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Users
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    email TEXT NOT NULL,
    name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT '[]' -- JSON array of strings
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
"#;
