use async_graphql::dataloader::{DataLoader, Loader};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::IdentityService;

/// DataLoader for batching role lookups
#[derive(Clone)]
pub struct UserRolesLoader {
    identity_service: IdentityService,
}

impl UserRolesLoader {
    pub fn new(identity_service: IdentityService) -> Self {
        Self { identity_service }
    }
}

impl Loader<Uuid> for UserRolesLoader {
    type Value = Vec<String>;
    type Error = String;

    /// Batch load role names for multiple users
    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let roles_map = self
            .identity_service
            .user_roles_batch(keys)
            .await
            .map_err(|e| format!("Failed to load roles: {}", e))?;

        Ok(roles_map)
    }
}

/// DataLoader context for GraphQL resolvers
#[derive(Clone)]
pub struct DataLoaderContext {
    pub user_roles_loader: Arc<DataLoader<UserRolesLoader>>,
}

impl DataLoaderContext {
    pub fn new(identity_service: IdentityService) -> Self {
        Self {
            user_roles_loader: Arc::new(
                DataLoader::new(UserRolesLoader::new(identity_service), tokio::spawn)
                    .max_batch_size(100), // Batch up to 100 role lookups
            ),
        }
    }

    /// Load role names for a single user (with caching)
    pub async fn load_user_roles(&self, user_id: Uuid) -> Result<Vec<String>, String> {
        Ok(self
            .user_roles_loader
            .load_one(user_id)
            .await?
            .unwrap_or_default())
    }

    /// Clear cached memberships after a mutation changes them
    pub fn clear_all(&self) {
        self.user_roles_loader.clear();
    }
}
