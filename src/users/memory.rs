use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::{StoreError, UserStore};
use super::repo_types::{NewUser, ProfileUpdate, UniqueField, User};

/// In-process [`UserStore`] with the same uniqueness and increment semantics
/// as the Postgres table.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(id: Uuid) -> StoreError {
    StoreError::Other(anyhow::anyhow!("user {} not found", id))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.handle == handle).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        if users.iter().any(|u| u.handle == new.handle) {
            return Err(StoreError::Conflict(UniqueField::Handle));
        }
        let user = User {
            id: Uuid::new_v4(),
            handle: new.handle,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            description: new.description,
            image: String::new(),
            links: "[]".into(),
            qr_code: String::new(),
            visits: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id != id && u.handle == update.handle) {
            return Err(StoreError::Conflict(UniqueField::Handle));
        }
        let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| missing(id))?;
        user.handle = update.handle;
        if let Some(description) = update.description {
            user.description = description;
        }
        if let Some(links) = update.links {
            user.links = links;
        }
        Ok(user.clone())
    }

    async fn set_image(&self, id: Uuid, url: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| missing(id))?;
        user.image = url.to_string();
        Ok(())
    }

    async fn set_qr_code(&self, id: Uuid, qr_code: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| missing(id))?;
        user.qr_code = qr_code.to_string();
        Ok(())
    }

    async fn record_visit(&self, handle: &str) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.handle == handle).map(|u| {
            u.visits += 1;
            u.clone()
        }))
    }
}

/// Wraps a store whose email/handle lookups always miss, so conflicts only
/// surface from `create`/`update_profile`, as when a concurrent writer wins.
pub struct BlindLookupStore(pub MemoryUserStore);

#[async_trait]
impl UserStore for BlindLookupStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.0.find_by_id(id).await
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Ok(None)
    }

    async fn find_by_handle(&self, _handle: &str) -> Result<Option<User>, StoreError> {
        Ok(None)
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        self.0.create(new).await
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, StoreError> {
        self.0.update_profile(id, update).await
    }

    async fn set_image(&self, id: Uuid, url: &str) -> Result<(), StoreError> {
        self.0.set_image(id, url).await
    }

    async fn set_qr_code(&self, id: Uuid, qr_code: &str) -> Result<(), StoreError> {
        self.0.set_qr_code(id, qr_code).await
    }

    async fn record_visit(&self, handle: &str) -> Result<Option<User>, StoreError> {
        self.0.record_visit(handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, handle: &str) -> NewUser {
        NewUser {
            handle: handle.into(),
            name: "Test".into(),
            email: email.into(),
            password_hash: "hash".into(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@x.com", "alice")).await.unwrap();

        let err = store.create(new_user("a@x.com", "other")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Email)));

        let err = store.create(new_user("b@x.com", "alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Handle)));
    }

    #[tokio::test]
    async fn record_visit_increments() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@x.com", "alice")).await.unwrap();
        store.record_visit("alice").await.unwrap();
        let user = store.record_visit("alice").await.unwrap().unwrap();
        assert_eq!(user.visits, 2);
        assert!(store.record_visit("nobody").await.unwrap().is_none());
    }
}
