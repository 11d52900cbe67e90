//! UserRepository: typed CRUD against the `user` table.

mod memory;
mod postgres;
pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;

use crate::error::StorageError;
use crate::model::{NewUser, Role, Status, User, UserId};
use crate::pagination::{Page, PageRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Store-backed user operations. "Not found" is `None`/`false`, never an error.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert one row and return it with its assigned id.
    async fn create(&self, new_user: NewUser) -> Result<User, StorageError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// All rows, ordered by id.
    async fn list(&self) -> Result<Vec<User>, StorageError>;

    /// Set the role of an existing row. Returns `None` without writing when the id is unknown.
    async fn update_role(&self, id: UserId, role: Role) -> Result<Option<User>, StorageError>;

    /// Remove a row. Returns `false` when the id is unknown.
    async fn delete(&self, id: UserId) -> Result<bool, StorageError>;

    /// One page of rows ordered by id, with the total row count.
    async fn page(&self, request: PageRequest) -> Result<Page<User>, StorageError>;

    async fn stats(&self) -> Result<UserStats, StorageError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), StorageError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: u64,
}

/// Aggregate counts over the table. Groups without rows are omitted; groups are ordered by enum value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub by_status: Vec<StatusCount>,
    pub by_role: Vec<RoleCount>,
}
