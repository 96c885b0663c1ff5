use async_graphql::{EmptySubscription, Schema};

use crate::graphql::{DataLoaderContext, MutationRoot, QueryRoot};
use crate::services::{
    AssignmentService, AuditService, CatalogService, IdentityService, UserAdminService,
};

pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the process-wide services attached. Per-request
/// data (authenticated user, client address) is injected by the handler.
pub fn create_schema(
    identity_service: IdentityService,
    catalog_service: CatalogService,
    assignment_service: AssignmentService,
    user_admin_service: UserAdminService,
    audit_service: AuditService,
    dataloader_context: DataLoaderContext,
) -> ApiSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(identity_service)
        .data(catalog_service)
        .data(assignment_service)
        .data(user_admin_service)
        .data(audit_service)
        .data(dataloader_context)
        .finish()
}
