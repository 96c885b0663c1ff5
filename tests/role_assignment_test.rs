//! Integration tests for the role-permission assignment store using
//! in-memory SQLite.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;
use warden::auth::JwtService;
use warden::entities::prelude::RolePermission;
use warden::entities::{module, permission, role_permission};
use warden::error::ServiceError;
use warden::services::{AssignmentService, CatalogService, IdentityService};

/// Helper: spin up an in-memory database with the schema applied. A single
/// pooled connection keeps every statement on the same SQLite handle.
async fn setup() -> (
    DatabaseConnection,
    IdentityService,
    CatalogService,
    AssignmentService,
) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, Some(3)).await.unwrap();

    let identity = IdentityService::new(db.clone(), JwtService::new("test-secret", 24));
    let catalog = CatalogService::new(db.clone());
    let assignments = AssignmentService::new(db.clone(), identity.clone(), catalog.clone());

    (db, identity, catalog, assignments)
}

/// Insert an "Inventory" module with view/create/edit permissions and
/// return the permission ids in that order.
async fn seed_catalog(db: &DatabaseConnection) -> Vec<i32> {
    let inventory = module::ActiveModel {
        name: Set("Inventory".to_string()),
        description: Set(None),
        icon: Set(None),
        sort_order: Set(Some(1)),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let mut ids = Vec::new();
    for (name, code) in [
        ("View inventory", "inventory.view"),
        ("Create items", "inventory.create"),
        ("Edit items", "inventory.edit"),
    ] {
        let row = permission::ActiveModel {
            module_id: Set(inventory.id),
            name: Set(name.to_string()),
            code: Set(code.to_string()),
            description: Set(None),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        ids.push(row.id);
    }

    ids
}

async fn stored_assignment_count(db: &DatabaseConnection, role_id: Uuid) -> u64 {
    RolePermission::find()
        .filter(role_permission::Column::RoleId.eq(role_id))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn replace_sets_exactly_the_submitted_permissions() {
    let (db, identity, catalog, assignments) = setup().await;
    let perms = seed_catalog(&db).await;
    let role = identity.create_role("clerk").await.unwrap();

    let (_, granted) = assignments
        .replace_role_assignments(role.id, vec![perms[0], perms[1]])
        .await
        .unwrap();

    let codes: Vec<&str> = granted.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["inventory.view", "inventory.create"]);

    // A second replace swaps the whole set, not just the difference.
    let (_, granted) = assignments
        .replace_role_assignments(role.id, vec![perms[2]])
        .await
        .unwrap();
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].code, "inventory.edit");

    let stored = catalog.permissions_for_role(role.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].code, "inventory.edit");
}

#[tokio::test]
async fn duplicate_ids_collapse_to_one_assignment() {
    let (db, identity, _catalog, assignments) = setup().await;
    let perms = seed_catalog(&db).await;
    let role = identity.create_role("clerk").await.unwrap();

    let (_, granted) = assignments
        .replace_role_assignments(role.id, vec![perms[0], perms[0], perms[1], perms[0]])
        .await
        .unwrap();

    assert_eq!(granted.len(), 2);
    assert_eq!(stored_assignment_count(&db, role.id).await, 2);
}

#[tokio::test]
async fn empty_set_revokes_every_assignment() {
    let (db, identity, _catalog, assignments) = setup().await;
    let perms = seed_catalog(&db).await;
    let role = identity.create_role("clerk").await.unwrap();

    assignments
        .replace_role_assignments(role.id, perms.clone())
        .await
        .unwrap();
    assert_eq!(stored_assignment_count(&db, role.id).await, 3);

    let (_, granted) = assignments
        .replace_role_assignments(role.id, vec![])
        .await
        .unwrap();

    assert!(granted.is_empty());
    assert_eq!(stored_assignment_count(&db, role.id).await, 0);
}

#[tokio::test]
async fn unknown_ids_reject_the_whole_request() {
    let (db, identity, catalog, assignments) = setup().await;
    let perms = seed_catalog(&db).await;
    let role = identity.create_role("clerk").await.unwrap();

    assignments
        .replace_role_assignments(role.id, vec![perms[0]])
        .await
        .unwrap();

    let err = assignments
        .replace_role_assignments(role.id, vec![perms[1], 9999])
        .await
        .unwrap_err();

    match &err {
        ServiceError::Validation(messages) => {
            assert_eq!(messages.len(), 1);
            assert!(
                messages[0].contains("9999"),
                "expected the unknown id in: {messages:?}"
            );
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    // The previous set survives untouched.
    let stored = catalog.permissions_for_role(role.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, perms[0]);
}

#[tokio::test]
async fn replace_for_missing_role_is_not_found() {
    let (db, _identity, _catalog, assignments) = setup().await;
    let perms = seed_catalog(&db).await;

    let err = assignments
        .replace_role_assignments(Uuid::new_v4(), vec![perms[0]])
        .await
        .unwrap_err();

    assert!(
        matches!(err, ServiceError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn replace_leaves_other_roles_untouched() {
    let (db, identity, catalog, assignments) = setup().await;
    let perms = seed_catalog(&db).await;
    let clerk = identity.create_role("clerk").await.unwrap();
    let auditor = identity.create_role("auditor").await.unwrap();

    assignments
        .replace_role_assignments(clerk.id, vec![perms[0], perms[1]])
        .await
        .unwrap();
    assignments
        .replace_role_assignments(auditor.id, vec![perms[2]])
        .await
        .unwrap();

    assignments
        .replace_role_assignments(clerk.id, vec![])
        .await
        .unwrap();

    assert_eq!(stored_assignment_count(&db, clerk.id).await, 0);
    let stored = catalog.permissions_for_role(auditor.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].code, "inventory.edit");
}
