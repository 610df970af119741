use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tourbook_core::repository::UserRepository;
use tourbook_core::{CoreError, CoreResult, NewUser, Role, User, UserRecord};

use crate::database::db_err;

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: Option<String>,
    email: String,
    password_hash: String,
    role: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| CoreError::Internal(format!("User {} has unknown role {}", row.id, row.role)))?;

        Ok(UserRecord {
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                role,
                phone: row.phone,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

const SELECT_USER: &str = "SELECT id, name, email, password_hash, role, phone, created_at FROM users";

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, phone, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match db_err(e) {
            CoreError::Conflict(_) => CoreError::Conflict("Email is already registered".to_string()),
            other => other,
        })?;

        Ok(UserRecord::try_from(row)?.user)
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE LOWER(email) = LOWER($1)", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(UserRecord::try_from).transpose()?.map(|r| r.user))
    }

    async fn list_users(&self, role: Option<Role>) -> CoreResult<Vec<User>> {
        let rows = match role {
            Some(role) => {
                sqlx::query_as::<_, UserRow>(&format!("{} WHERE role = $1 ORDER BY created_at DESC", SELECT_USER))
                    .bind(role.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY created_at DESC", SELECT_USER))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.into_iter()
            .map(|row| UserRecord::try_from(row).map(|r| r.user))
            .collect()
    }

    async fn update_role(&self, id: Uuid, role: Role) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2
            RETURNING id, name, email, password_hash, role, phone, created_at
            "#,
        )
        .bind(role.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| CoreError::NotFound(format!("User {} not found", id)))?;

        Ok(UserRecord::try_from(row)?.user)
    }
}
