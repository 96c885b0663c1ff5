use async_graphql::{Context, Error, ErrorExtensions, Result};

use crate::auth::AuthenticatedUser;
use crate::services::{IdentityService, ADMIN_ROLE};

/// Authorization guard for checking if user is authenticated
pub fn require_auth<'ctx>(ctx: &'ctx Context<'_>) -> Result<&'ctx AuthenticatedUser> {
    ctx.data::<AuthenticatedUser>()
        .map_err(|_| Error::new("Authentication required"))
}

/// Authorization guard for checking role membership
pub async fn require_role<'ctx>(
    ctx: &'ctx Context<'_>,
    role_name: &str,
) -> Result<&'ctx AuthenticatedUser> {
    let user = require_auth(ctx)?;
    let identity_service = ctx.data::<IdentityService>()?;

    let is_member = identity_service
        .is_in_role(user.id, role_name)
        .await
        .map_err(|e| e.extend())?;

    if !is_member {
        return Err(Error::new(format!(
            "Insufficient permissions: {} role required",
            role_name
        )));
    }

    Ok(user)
}

/// Authorization guard for the administration surface
pub async fn require_admin<'ctx>(ctx: &'ctx Context<'_>) -> Result<&'ctx AuthenticatedUser> {
    require_role(ctx, ADMIN_ROLE).await
}
