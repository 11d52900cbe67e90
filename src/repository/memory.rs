//! In-process UserRepository. Ids are assigned from a counter and never reused.

use super::{RoleCount, StatusCount, UserRepository, UserStats};
use crate::error::StorageError;
use crate::model::{NewUser, Role, Status, User, UserId, NAME_MAX_CHARS};
use crate::pagination::{Page, PageRequest};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_id: UserId,
    rows: BTreeMap<UserId, User>,
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<Table>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, StorageError> {
        // Same width the `name` column enforces.
        if new_user.name().chars().count() > NAME_MAX_CHARS {
            return Err(StorageError::Constraint(format!(
                "name exceeds {} characters",
                NAME_MAX_CHARS
            )));
        }
        let mut table = self.table.write().await;
        table.last_id += 1;
        let user = User {
            id: table.last_id,
            name: new_user.name().to_string(),
            status: new_user.status,
            role: new_user.role,
        };
        table.rows.insert(user.id, user.clone());
        tracing::debug!(id = user.id, "memory insert");
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StorageError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update_role(&self, id: UserId, role: Role) -> Result<Option<User>, StorageError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StorageError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn page(&self, request: PageRequest) -> Result<Page<User>, StorageError> {
        let table = self.table.read().await;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = table.rows.values().skip(skip).take(take).cloned().collect();
        Ok(Page::new(items, table.rows.len() as u64, request))
    }

    async fn stats(&self) -> Result<UserStats, StorageError> {
        let table = self.table.read().await;
        let mut by_status: BTreeMap<Status, u64> = BTreeMap::new();
        let mut by_role: BTreeMap<Role, u64> = BTreeMap::new();
        for user in table.rows.values() {
            *by_status.entry(user.status).or_default() += 1;
            *by_role.entry(user.role).or_default() += 1;
        }
        Ok(UserStats {
            total: table.rows.len() as u64,
            by_status: by_status
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            by_role: by_role.into_iter().map(|(role, count)| RoleCount { role, count }).collect(),
        })
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
