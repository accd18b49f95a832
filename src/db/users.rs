//! User account persistence
//!
//! Direct Postgres access for the users table. Roles are stored as their
//! SCREAMING_SNAKE_CASE string form; unknown values fall back to USER.

use crate::error::AppError;
use crate::rbac::Role;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;

/// User record from database
#[derive(Clone, Debug)]
pub struct DbUser {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbUser {
    fn from_row(row: &Row) -> Self {
        let role: String = row.get("role");
        Self {
            id: row.get("id"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            name: row.get("name"),
            role: role.parse().unwrap_or_default(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at, updated_at";

/// User service for database operations
pub struct UserService {
    pool: Pool,
}

impl UserService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> Result<DbUser, AppError> {
        let client = self.pool.get().await?;
        let now = Utc::now();

        let row = client
            .query_one(
                &format!(
                    "INSERT INTO users (email, password_hash, name, role, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     RETURNING {USER_COLUMNS}"
                ),
                &[&email, &password_hash, &name, &role.as_str(), &now, &now],
            )
            .await
            .map_err(|e| {
                if e.to_string().contains("unique constraint")
                    || e.to_string().contains("duplicate key")
                {
                    AppError::Conflict("Email already registered".to_string())
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(DbUser::from_row(&row))
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"),
                &[&email],
            )
            .await?;
        Ok(row.as_ref().map(DbUser::from_row))
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<DbUser>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"),
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(DbUser::from_row))
    }

    /// List all users, newest first
    pub async fn list(&self) -> Result<Vec<DbUser>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"),
                &[],
            )
            .await?;
        Ok(rows.iter().map(DbUser::from_row).collect())
    }

    /// Update a user's role
    pub async fn update_role(&self, id: i64, role: Role) -> Result<DbUser, AppError> {
        let client = self.pool.get().await?;
        let now = Utc::now();
        let row = client
            .query_opt(
                &format!(
                    "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1
                     RETURNING {USER_COLUMNS}"
                ),
                &[&id, &role.as_str(), &now],
            )
            .await?;
        row.as_ref()
            .map(DbUser::from_row)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Delete a user
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM users WHERE id = $1", &[&id]).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
