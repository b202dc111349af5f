use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json};
use tracing::debug;

use super::models::{NewUser, User, UserRow};
use crate::error::StoreError;

const SELECT_USERS: &str = "SELECT id, email, name, last_name, role FROM users";

/// Persistence gateway for user records.
///
/// `update` and `delete` do not check that the row exists; touching zero rows is success.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// One window of users in store order.
    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<User>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<User, StoreError>;

    /// Stores a new user and returns the identifier the store assigned.
    async fn insert(&self, user: &NewUser) -> Result<i64, StoreError>;

    /// Replaces every mutable field of the row with `user.id`.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<User>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_USERS);
        qb.push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(offset));

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::query("select"))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        // Two rows are enough to tell "exactly one" from "more than one".
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_USERS);
        qb.push(" WHERE id = ").push_bind(id).push(" LIMIT 2");

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::query("select_by_id"))?;

        exactly_one(id, rows)
    }

    async fn insert(&self, user: &NewUser) -> Result<i64, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO users (email, name, last_name, role) ");
        qb.push("VALUES (");
        qb.separated(", ")
            .push_bind(user.email.clone())
            .push_bind(user.name.clone())
            .push_bind(user.last_name.clone())
            .push_bind(Json(user.role.clone()));
        qb.push(") RETURNING id");

        let id = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::query("insert"))?;

        debug!(id, "user inserted");
        Ok(id)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
        qb.push("email = ")
            .push_bind(user.email.clone())
            .push(", name = ")
            .push_bind(user.name.clone())
            .push(", last_name = ")
            .push_bind(user.last_name.clone())
            .push(", role = ")
            .push_bind(Json(user.role.clone()))
            .push(" WHERE id = ")
            .push_bind(user.id);

        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(StoreError::query("update"))?;

        debug!(id = user.id, affected = res.rows_affected(), "user update applied");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM users WHERE id = ");
        qb.push_bind(id);

        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(StoreError::query("delete"))?;

        debug!(id, affected = res.rows_affected(), "user delete applied");
        Ok(())
    }
}

fn exactly_one<T: Into<User>>(id: i64, rows: Vec<T>) -> Result<User, StoreError> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (None, _) => Err(StoreError::NotFound { id }),
        (Some(row), 1) => Ok(row.into()),
        (Some(_), rows) => Err(StoreError::Integrity { id, rows }),
    }
}
