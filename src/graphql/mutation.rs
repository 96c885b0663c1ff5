use async_graphql::*;

use crate::auth::require_admin;
use crate::graphql::types::{
    AssignRolePermissionsInput, AuthPayload, ClientIp, CreateRoleInput, CreateUserInput,
    LoginInput, MessageResponse, RenameRoleInput, Role, RoleWithPermissions, UpdateUserInput, User,
};
use crate::graphql::DataLoaderContext;
use crate::services::{
    AssignmentService, IdentityService, NewUserAccount, UserAccountChanges, UserAdminService,
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let identity_service = ctx.data::<IdentityService>()?;

        let (user, access_token) = identity_service
            .authenticate(&input.email, &input.password)
            .await
            .map_err(|e| e.extend())?;

        Ok(AuthPayload {
            user: user.into(),
            access_token,
        })
    }

    // Role administration
    async fn create_role(&self, ctx: &Context<'_>, input: CreateRoleInput) -> Result<Role> {
        require_admin(ctx).await?;

        let identity_service = ctx.data::<IdentityService>()?;

        let role = identity_service
            .create_role(&input.name)
            .await
            .map_err(|e| e.extend())?;

        Ok(role.into())
    }

    async fn rename_role(&self, ctx: &Context<'_>, input: RenameRoleInput) -> Result<Role> {
        require_admin(ctx).await?;

        let identity_service = ctx.data::<IdentityService>()?;

        let role = identity_service
            .rename_role(input.role_id, &input.name)
            .await
            .map_err(|e| e.extend())?;

        Ok(role.into())
    }

    async fn delete_role(&self, ctx: &Context<'_>, role_id: uuid::Uuid) -> Result<MessageResponse> {
        require_admin(ctx).await?;

        let assignment_service = ctx.data::<AssignmentService>()?;

        assignment_service
            .delete_role(role_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse {
            message: "Role deleted successfully".to_string(),
        })
    }

    /// Replace a role's permission set with exactly the submitted ids.
    async fn assign_role_permissions(
        &self,
        ctx: &Context<'_>,
        input: AssignRolePermissionsInput,
    ) -> Result<RoleWithPermissions> {
        require_admin(ctx).await?;

        let assignment_service = ctx.data::<AssignmentService>()?;

        let (role, _) = assignment_service
            .replace_role_assignments(input.role_id, input.permission_ids)
            .await
            .map_err(|e| e.extend())?;

        Ok(role.into())
    }

    // User administration
    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> Result<User> {
        require_admin(ctx).await?;

        let user_admin_service = ctx.data::<UserAdminService>()?;
        let dataloader = ctx.data::<DataLoaderContext>()?;
        let client_ip = ctx.data_opt::<ClientIp>().map(|ip| ip.0.clone());

        let user = user_admin_service
            .create_user(
                NewUserAccount {
                    email: input.email,
                    password: input.password,
                    full_name: input.full_name,
                    document_number: input.document_number,
                    phone: input.phone,
                    notes: input.notes,
                    role_name: input.role_name,
                },
                client_ip,
            )
            .await
            .map_err(|e| e.extend())?;

        dataloader.clear_all();

        Ok(user.into())
    }

    async fn update_user(&self, ctx: &Context<'_>, input: UpdateUserInput) -> Result<User> {
        require_admin(ctx).await?;

        let user_admin_service = ctx.data::<UserAdminService>()?;
        let dataloader = ctx.data::<DataLoaderContext>()?;
        let client_ip = ctx.data_opt::<ClientIp>().map(|ip| ip.0.clone());

        let user = user_admin_service
            .update_user(
                input.user_id,
                UserAccountChanges {
                    full_name: input.full_name,
                    document_number: input.document_number,
                    phone: input.phone,
                    is_active: input.is_active,
                    notes: input.notes,
                    role_name: input.role_name,
                },
                client_ip,
            )
            .await
            .map_err(|e| e.extend())?;

        dataloader.clear_all();

        Ok(user.into())
    }

    async fn toggle_user_status(&self, ctx: &Context<'_>, user_id: uuid::Uuid) -> Result<User> {
        require_admin(ctx).await?;

        let user_admin_service = ctx.data::<UserAdminService>()?;
        let client_ip = ctx.data_opt::<ClientIp>().map(|ip| ip.0.clone());

        let user = user_admin_service
            .toggle_user_status(user_id, client_ip)
            .await
            .map_err(|e| e.extend())?;

        Ok(user.into())
    }
}
