//! UserRepository over PostgreSQL. Enum columns are encoded and decoded here only.

use super::{RoleCount, StatusCount, UserRepository, UserStats};
use crate::error::StorageError;
use crate::migration::USER_TABLE;
use crate::model::{NewUser, Role, Status, User, UserId, ValidationError};
use crate::pagination::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::PgPool;

const COLUMNS: &str = "id, name, status, role";

/// Raw row as stored: status as SMALLINT, role as VARCHAR.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    status: i16,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |source: ValidationError| StorageError::CorruptRow { id, source };
        let status = Status::try_from(row.status).map_err(corrupt)?;
        let role = row.role.parse::<Role>().map_err(corrupt)?;
        User::new(id, row.name, status, role).map_err(corrupt)
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        PgUserRepository { pool }
    }
}

fn to_offset(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn to_count(v: i64) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, StorageError> {
        let sql = format!(
            "INSERT INTO {} (name, status, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_TABLE, COLUMNS
        );
        tracing::debug!(sql = %sql, name = %new_user.name(), "query");
        let row: UserRow = sqlx::query_as(&sql)
            .bind(new_user.name())
            .bind(new_user.status.code())
            .bind(new_user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, USER_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<UserRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, StorageError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", COLUMNS, USER_TABLE);
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_role(&self, id: UserId, role: Role) -> Result<Option<User>, StorageError> {
        let sql = format!(
            "UPDATE {} SET role = $2 WHERE id = $1 RETURNING {}",
            USER_TABLE, COLUMNS
        );
        tracing::debug!(sql = %sql, id, role = %role, "query");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, StorageError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", USER_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn page(&self, request: PageRequest) -> Result<Page<User>, StorageError> {
        // Count and slice on the same connection; it returns to the pool on drop.
        let mut conn = self.pool.acquire().await?;
        let count_sql = format!("SELECT COUNT(*) FROM {}", USER_TABLE);
        let (total,): (i64,) = sqlx::query_as(&count_sql).fetch_one(&mut *conn).await?;

        let sql = format!(
            "SELECT {} FROM {} ORDER BY id LIMIT $1 OFFSET $2",
            COLUMNS, USER_TABLE
        );
        tracing::debug!(sql = %sql, page = request.page(), page_size = request.page_size(), "query");
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(to_offset(request.limit()))
            .bind(to_offset(request.offset()))
            .fetch_all(&mut *conn)
            .await?;
        let items = rows.into_iter().map(User::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, to_count(total), request))
    }

    async fn stats(&self) -> Result<UserStats, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let status_sql = format!(
            "SELECT status, COUNT(*) FROM {} GROUP BY status ORDER BY status",
            USER_TABLE
        );
        tracing::debug!(sql = %status_sql, "query");
        let status_rows: Vec<(i16, i64)> = sqlx::query_as(&status_sql).fetch_all(&mut *conn).await?;
        let role_sql = format!("SELECT role, COUNT(*) FROM {} GROUP BY role", USER_TABLE);
        tracing::debug!(sql = %role_sql, "query");
        let role_rows: Vec<(String, i64)> = sqlx::query_as(&role_sql).fetch_all(&mut *conn).await?;

        let mut stats = UserStats::default();
        for (code, count) in status_rows {
            let status = Status::try_from(code).map_err(|source| StorageError::CorruptAggregate {
                column: "status",
                source,
            })?;
            stats.total += to_count(count);
            stats.by_status.push(StatusCount {
                status,
                count: to_count(count),
            });
        }
        for (name, count) in role_rows {
            let role = name
                .parse::<Role>()
                .map_err(|source| StorageError::CorruptAggregate { column: "role", source })?;
            stats.by_role.push(RoleCount {
                role,
                count: to_count(count),
            });
        }
        stats.by_role.sort_by_key(|c| c.role);
        Ok(stats)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
