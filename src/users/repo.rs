use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::{NewUser, ProfileUpdate, UniqueField, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {0:?}")]
    Conflict(UniqueField),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                match db.constraint() {
                    Some("users_email_key") => return StoreError::Conflict(UniqueField::Email),
                    Some("users_handle_key") => return StoreError::Conflict(UniqueField::Handle),
                    _ => {}
                }
            }
        }
        StoreError::Other(e.into())
    }
}

/// Persistence for [`User`] records.
///
/// Implementations must enforce uniqueness of `email` and `handle` themselves
/// and report violations as [`StoreError::Conflict`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, StoreError>;
    async fn set_image(&self, id: Uuid, url: &str) -> Result<(), StoreError>;
    async fn set_qr_code(&self, id: Uuid, qr_code: &str) -> Result<(), StoreError>;
    /// Atomically bumps `visits` and returns the updated record.
    async fn record_visit(&self, handle: &str) -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, handle, name, email, password_hash, description, image,
                   links, qr_code, visits, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, handle, name, email, password_hash, description, image,
                   links, qr_code, visits, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, handle, name, email, password_hash, description, image,
                   links, qr_code, visits, created_at
            FROM users
            WHERE handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, handle, name, email, password_hash, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, handle, name, email, password_hash, description, image,
                      links, qr_code, visits, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.handle)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.description)
        .fetch_one(&self.db)
        .await?;
        debug!(user_id = %user.id, handle = %user.handle, "user inserted");
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET handle = $2,
                   description = COALESCE($3, description),
                   links = COALESCE($4, links)
             WHERE id = $1
            RETURNING id, handle, name, email, password_hash, description, image,
                      links, qr_code, visits, created_at
            "#,
        )
        .bind(id)
        .bind(&update.handle)
        .bind(update.description.as_deref())
        .bind(update.links.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn set_image(&self, id: Uuid, url: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn set_qr_code(&self, id: Uuid, qr_code: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET qr_code = $2 WHERE id = $1")
            .bind(id)
            .bind(qr_code)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn record_visit(&self, handle: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET visits = visits + 1
             WHERE handle = $1
            RETURNING id, handle, name, email, password_hash, description, image,
                      links, qr_code, visits, created_at
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
