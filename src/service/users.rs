use async_trait::async_trait;

use crate::db::{NewUser, User, UserStore};
use crate::error::StoreError;

/// User operations as seen by the HTTP handlers.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_users(&self, offset: u32, limit: u32) -> Result<Vec<User>, StoreError>;

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError>;

    async fn save_user(&self, user: NewUser) -> Result<i64, StoreError>;

    async fn update_user(&self, user: User) -> Result<(), StoreError>;

    async fn delete_user(&self, id: i64) -> Result<(), StoreError>;
}

/// Forwards every call to a [`UserStore`] unchanged.
pub struct UserManager<S> {
    store: S,
}

impl<S: UserStore> UserManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: UserStore> UserService for UserManager<S> {
    async fn get_users(&self, offset: u32, limit: u32) -> Result<Vec<User>, StoreError> {
        self.store.list(offset, limit).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        self.store.get_by_id(id).await
    }

    async fn save_user(&self, user: NewUser) -> Result<i64, StoreError> {
        self.store.insert(&user).await
    }

    async fn update_user(&self, user: User) -> Result<(), StoreError> {
        self.store.update(&user).await
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        self.store.delete(id).await
    }
}
