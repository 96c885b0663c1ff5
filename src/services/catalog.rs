use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{module, permission, prelude::*, role_permission};
use crate::error::ServiceResult;

/// Read side of the permission catalog. The catalog itself is maintained
/// through migrations, not through the API.
#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active modules in display order, each carrying its permissions.
    /// Modules sort by `sort_order` then id, permissions by id.
    pub async fn active_modules_with_permissions(
        &self,
    ) -> ServiceResult<Vec<(module::Model, Vec<permission::Model>)>> {
        let modules = Module::find()
            .filter(module::Column::IsActive.eq(true))
            .order_by_asc(module::Column::SortOrder)
            .order_by_asc(module::Column::Id)
            .all(&self.db)
            .await?;

        let module_ids: Vec<i32> = modules.iter().map(|m| m.id).collect();
        let permissions = Permission::find()
            .filter(permission::Column::ModuleId.is_in(module_ids))
            .order_by_asc(permission::Column::Id)
            .all(&self.db)
            .await?;

        let mut grouped: Vec<(module::Model, Vec<permission::Model>)> =
            modules.into_iter().map(|m| (m, Vec::new())).collect();
        for permission in permissions {
            if let Some((_, bucket)) = grouped
                .iter_mut()
                .find(|(m, _)| m.id == permission.module_id)
            {
                bucket.push(permission);
            }
        }

        Ok(grouped)
    }

    pub async fn find_module(&self, module_id: i32) -> ServiceResult<Option<module::Model>> {
        let module = Module::find_by_id(module_id).one(&self.db).await?;
        Ok(module)
    }

    /// Permissions currently assigned to a role, in catalog order.
    pub async fn permissions_for_role(
        &self,
        role_id: Uuid,
    ) -> ServiceResult<Vec<permission::Model>> {
        let permissions = Permission::find()
            .inner_join(RolePermission)
            .filter(role_permission::Column::RoleId.eq(role_id))
            .order_by_asc(permission::Column::Id)
            .all(&self.db)
            .await?;
        Ok(permissions)
    }

    /// Resolve a batch of permission ids. Missing ids are simply absent
    /// from the result; the caller decides whether that is an error.
    pub async fn find_permissions_by_ids(
        &self,
        conn: &impl ConnectionTrait,
        ids: &[i32],
    ) -> ServiceResult<Vec<permission::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let permissions = Permission::find()
            .filter(permission::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(permissions)
    }
}
