use async_graphql::*;
use chrono::{DateTime, Utc};
use sea_orm::{sea_query::StringLen, DeriveActiveEnum};
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use uuid::Uuid;

// Type-safe enums with GraphQL introspection
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, DeriveActiveEnum, Serialize, Deserialize, EnumIter)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[graphql(name = "AuditAction")]
pub enum AuditAction {
    #[graphql(name = "CREATED")]
    #[sea_orm(string_value = "created")]
    Created,
    #[graphql(name = "UPDATED")]
    #[sea_orm(string_value = "updated")]
    Updated,
    #[graphql(name = "STATUS_CHANGED")]
    #[sea_orm(string_value = "status_changed")]
    StatusChanged,
}

/// Peer address captured by the HTTP layer, carried into audit entries.
#[derive(Clone)]
pub struct ClientIp(pub String);

// Identity types
#[derive(SimpleObject)]
#[graphql(complex)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub last_access_at: Option<DateTime<Utc>>,
}

impl From<crate::entities::user::Model> for User {
    fn from(user: crate::entities::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            document_number: user.document_number,
            phone: user.phone,
            is_active: user.is_active,
            notes: user.notes,
            registered_at: user.registered_at.into(),
            last_access_at: user.last_access_at.map(|dt| dt.into()),
        }
    }
}

#[ComplexObject]
impl User {
    async fn roles(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let dataloader = ctx.data::<crate::graphql::DataLoaderContext>()?;

        dataloader
            .load_user_roles(self.id)
            .await
            .map_err(|e| Error::new(format!("Failed to fetch roles: {}", e)))
    }
}

#[derive(SimpleObject)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entities::role::Model> for Role {
    fn from(role: crate::entities::role::Model) -> Self {
        Self {
            id: role.id,
            name: role.name,
            created_at: role.created_at.into(),
            updated_at: role.updated_at.into(),
        }
    }
}

#[derive(SimpleObject)]
#[graphql(complex)]
pub struct RoleWithPermissions {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entities::role::Model> for RoleWithPermissions {
    fn from(role: crate::entities::role::Model) -> Self {
        Self {
            id: role.id,
            name: role.name,
            created_at: role.created_at.into(),
            updated_at: role.updated_at.into(),
        }
    }
}

#[ComplexObject]
impl RoleWithPermissions {
    async fn permissions(&self, ctx: &Context<'_>) -> Result<Vec<Permission>> {
        let catalog_service = ctx.data::<crate::services::CatalogService>()?;

        let permissions = catalog_service
            .permissions_for_role(self.id)
            .await
            .map_err(|e| e.extend())?;

        Ok(permissions.into_iter().map(|p| p.into()).collect())
    }

    async fn user_count(&self, ctx: &Context<'_>) -> Result<u64> {
        let identity_service = ctx.data::<crate::services::IdentityService>()?;

        let count = identity_service
            .role_member_count(self.id)
            .await
            .map_err(|e| e.extend())?;

        Ok(count)
    }
}

// Permission catalog types
#[derive(SimpleObject)]
pub struct Module {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entities::module::Model> for Module {
    fn from(module: crate::entities::module::Model) -> Self {
        Self {
            id: module.id,
            name: module.name,
            description: module.description,
            icon: module.icon,
            sort_order: module.sort_order,
            is_active: module.is_active,
            created_at: module.created_at.into(),
        }
    }
}

#[derive(SimpleObject)]
#[graphql(complex)]
pub struct Permission {
    pub id: i32,
    pub module_id: i32,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entities::permission::Model> for Permission {
    fn from(permission: crate::entities::permission::Model) -> Self {
        Self {
            id: permission.id,
            module_id: permission.module_id,
            name: permission.name,
            code: permission.code,
            description: permission.description,
            created_at: permission.created_at.into(),
        }
    }
}

#[ComplexObject]
impl Permission {
    async fn module(&self, ctx: &Context<'_>) -> Result<Option<Module>> {
        let catalog_service = ctx.data::<crate::services::CatalogService>()?;

        let module = catalog_service
            .find_module(self.module_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(module.map(|m| m.into()))
    }

    async fn module_name(&self, ctx: &Context<'_>) -> Result<String> {
        let catalog_service = ctx.data::<crate::services::CatalogService>()?;

        let module = catalog_service
            .find_module(self.module_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| Error::new("Module not found"))?;

        Ok(module.name)
    }
}

/// One catalog module with its permissions, shaped for the assignment screen.
#[derive(SimpleObject)]
pub struct ModuleWithPermissions {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub permissions: Vec<Permission>,
}

impl
    From<(
        crate::entities::module::Model,
        Vec<crate::entities::permission::Model>,
    )> for ModuleWithPermissions
{
    fn from(
        (module, permissions): (
            crate::entities::module::Model,
            Vec<crate::entities::permission::Model>,
        ),
    ) -> Self {
        Self {
            id: module.id,
            name: module.name,
            description: module.description,
            icon: module.icon,
            sort_order: module.sort_order,
            permissions: permissions.into_iter().map(|p| p.into()).collect(),
        }
    }
}

// Audit trail types
#[derive(SimpleObject)]
pub struct AuditEntry {
    pub id: i32,
    pub user_id: Uuid,
    pub action: AuditAction,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entities::user_audit::Model> for AuditEntry {
    fn from(entry: crate::entities::user_audit::Model) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            description: entry.description,
            ip_address: entry.ip_address,
            created_at: entry.created_at.into(),
        }
    }
}

#[derive(InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    pub user: User,
    pub access_token: String,
}

#[derive(SimpleObject)]
pub struct MessageResponse {
    pub message: String,
}

// Role administration input types
#[derive(InputObject)]
pub struct CreateRoleInput {
    pub name: String,
}

#[derive(InputObject)]
pub struct RenameRoleInput {
    pub role_id: Uuid,
    pub name: String,
}

#[derive(InputObject)]
pub struct AssignRolePermissionsInput {
    pub role_id: Uuid,
    pub permission_ids: Vec<i32>,
}

// User administration input types
#[derive(InputObject)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub role_name: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateUserInput {
    pub user_id: Uuid,
    pub full_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub role_name: Option<String>,
}
