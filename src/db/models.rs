use sqlx::{FromRow, types::Json};

/// An account record. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub role: Vec<String>,
}

/// A user that has not been stored yet, so it has no identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub role: Vec<String>,
}

/// Row shape of the `users` table.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub role: Json<Vec<String>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            last_name: row.last_name,
            role: row.role.0,
        }
    }
}
