use async_graphql::*;

use crate::auth::{require_admin, require_auth};
use crate::error::ServiceError;
use crate::graphql::types::{AuditEntry, ModuleWithPermissions, RoleWithPermissions, User};
use crate::services::{AuditService, CatalogService, IdentityService};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let authenticated_user = require_auth(ctx)?;
        let identity_service = ctx.data::<IdentityService>()?;

        let user = identity_service
            .find_user_by_id(authenticated_user.id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ServiceError::not_found("user").extend())?;

        Ok(user.into())
    }

    async fn health(&self) -> &str {
        "OK"
    }

    // Role administration queries
    async fn roles(&self, ctx: &Context<'_>) -> Result<Vec<RoleWithPermissions>> {
        require_admin(ctx).await?;

        let identity_service = ctx.data::<IdentityService>()?;

        let roles = identity_service.list_roles().await.map_err(|e| e.extend())?;

        Ok(roles.into_iter().map(|role| role.into()).collect())
    }

    async fn role(&self, ctx: &Context<'_>, role_id: uuid::Uuid) -> Result<RoleWithPermissions> {
        require_admin(ctx).await?;

        let identity_service = ctx.data::<IdentityService>()?;

        let role = identity_service
            .find_role_by_id(role_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ServiceError::not_found("role").extend())?;

        Ok(role.into())
    }

    /// The assignable permission catalog: active modules in display order,
    /// each with its permissions.
    async fn permission_modules(&self, ctx: &Context<'_>) -> Result<Vec<ModuleWithPermissions>> {
        require_admin(ctx).await?;

        let catalog_service = ctx.data::<CatalogService>()?;

        let modules = catalog_service
            .active_modules_with_permissions()
            .await
            .map_err(|e| e.extend())?;

        Ok(modules.into_iter().map(|entry| entry.into()).collect())
    }

    // User administration queries
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        require_admin(ctx).await?;

        let identity_service = ctx.data::<IdentityService>()?;

        let users = identity_service.list_users().await.map_err(|e| e.extend())?;

        Ok(users.into_iter().map(|user| user.into()).collect())
    }

    async fn user(&self, ctx: &Context<'_>, user_id: uuid::Uuid) -> Result<User> {
        require_admin(ctx).await?;

        let identity_service = ctx.data::<IdentityService>()?;

        let user = identity_service
            .find_user_by_id(user_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ServiceError::not_found("user").extend())?;

        Ok(user.into())
    }

    async fn user_audit(&self, ctx: &Context<'_>, user_id: uuid::Uuid) -> Result<Vec<AuditEntry>> {
        require_admin(ctx).await?;

        let identity_service = ctx.data::<IdentityService>()?;
        let audit_service = ctx.data::<AuditService>()?;

        identity_service
            .find_user_by_id(user_id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ServiceError::not_found("user").extend())?;

        let entries = audit_service
            .entries_for_user(user_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(entries.into_iter().map(|entry| entry.into()).collect())
    }
}
