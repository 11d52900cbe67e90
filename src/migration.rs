//! Idempotent DDL for the `user` table.

use crate::error::StorageError;
use crate::model::{role_comment, status_comment, Role, Status, NAME_MAX_CHARS};
use sqlx::PgPool;

/// `user` is reserved in PostgreSQL, so the name is always quoted.
pub const USER_TABLE: &str = "\"user\"";

pub fn user_table_ddl() -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id SERIAL PRIMARY KEY,
            name VARCHAR({}) NOT NULL,
            status SMALLINT NOT NULL DEFAULT {},
            role VARCHAR(20) NOT NULL DEFAULT '{}'
        )
        "#,
        USER_TABLE,
        NAME_MAX_CHARS,
        Status::default().code(),
        Role::default().as_str()
    )
}

fn column_comment(column: &str, comment: &str) -> String {
    format!(
        "COMMENT ON COLUMN {}.{} IS '{}'",
        USER_TABLE,
        column,
        comment.replace('\'', "''")
    )
}

/// Create the `user` table if it does not exist and (re)write the enum column comments.
pub async fn ensure_user_table(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query(&user_table_ddl()).execute(pool).await?;
    let comments = [
        column_comment("status", &format!("user status {}", status_comment())),
        column_comment("role", &format!("user role {}", role_comment())),
    ];
    for sql in comments {
        if let Err(e) = sqlx::query(&sql).execute(pool).await {
            tracing::warn!(error = %e, "could not set column comment");
        }
    }
    tracing::info!("user table ready");
    Ok(())
}
