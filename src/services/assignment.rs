use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{permission, prelude::*, role, role_permission};
use crate::error::{ServiceError, ServiceResult};
use crate::services::{CatalogService, IdentityService};

/// Owns the role-permission assignment store. Writes are full replacements:
/// the caller always sends the complete set a role should end up with.
#[derive(Clone)]
pub struct AssignmentService {
    db: DatabaseConnection,
    identity: IdentityService,
    catalog: CatalogService,
}

impl AssignmentService {
    pub fn new(db: DatabaseConnection, identity: IdentityService, catalog: CatalogService) -> Self {
        Self {
            db,
            identity,
            catalog,
        }
    }

    /// Replace a role's assignments with exactly the given permission set.
    /// Duplicate ids collapse, unknown ids reject the whole request, and an
    /// empty list revokes everything. The old and new sets never mix: one
    /// transaction deletes the old rows and inserts the new ones.
    pub async fn replace_role_assignments(
        &self,
        role_id: Uuid,
        permission_ids: Vec<i32>,
    ) -> ServiceResult<(role::Model, Vec<permission::Model>)> {
        let role = self
            .identity
            .find_role_by_id(role_id)
            .await?
            .ok_or(ServiceError::not_found("role"))?;

        let mut seen = HashSet::new();
        let wanted: Vec<i32> = permission_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let tx = self.db.begin().await?;

        let found: HashMap<i32, permission::Model> = self
            .catalog
            .find_permissions_by_ids(&tx, &wanted)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let missing: Vec<String> = wanted
            .iter()
            .filter(|id| !found.contains_key(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::Validation(vec![format!(
                "Unknown permission ids: {}",
                missing.join(", ")
            )]));
        }

        RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(&tx)
            .await?;

        for permission_id in &wanted {
            let assignment = role_permission::ActiveModel {
                id: Set(Uuid::new_v4()),
                role_id: Set(role_id),
                permission_id: Set(*permission_id),
                assigned_at: Set(Utc::now().into()),
            };
            assignment.insert(&tx).await?;
        }

        tx.commit().await?;

        let mut permissions: Vec<permission::Model> = found.into_values().collect();
        permissions.sort_by_key(|p| p.id);

        Ok((role, permissions))
    }

    /// Delete a role along with its assignments. Refused while any user
    /// still holds the role, so no member is silently stripped of access.
    pub async fn delete_role(&self, role_id: Uuid) -> ServiceResult<()> {
        let tx = self.db.begin().await?;

        if self.identity.any_user_in_role(&tx, role_id).await? {
            return Err(ServiceError::RoleInUse);
        }

        RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(&tx)
            .await?;

        self.identity.remove_role(&tx, role_id).await?;

        tx.commit().await?;
        Ok(())
    }
}
