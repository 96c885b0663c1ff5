//! Integration tests for the permission catalog read side using
//! in-memory SQLite.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use warden::auth::JwtService;
use warden::entities::{module, permission};
use warden::services::{AssignmentService, CatalogService, IdentityService};

/// Helper: in-memory database with the schema applied. The catalog has no
/// write API, so fixtures go straight through the entities.
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

async fn insert_module(db: &DatabaseConnection, name: &str, sort_order: i32, is_active: bool) -> i32 {
    let row = module::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        icon: Set(None),
        sort_order: Set(Some(sort_order)),
        is_active: Set(is_active),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    row.id
}

async fn insert_permission(db: &DatabaseConnection, module_id: i32, name: &str, code: &str) -> i32 {
    let row = permission::ActiveModel {
        module_id: Set(module_id),
        name: Set(name.to_string()),
        code: Set(code.to_string()),
        description: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    row.id
}

#[tokio::test]
async fn modules_come_back_in_display_order() {
    let (db, _identity, catalog, _assignments) = setup().await;

    // Inserted out of display order on purpose; "Archive" shares its sort
    // position with "Reports" and has the higher id.
    insert_module(&db, "Reports", 2, true).await;
    insert_module(&db, "Users", 1, true).await;
    insert_module(&db, "Archive", 2, true).await;

    let listed = catalog.active_modules_with_permissions().await.unwrap();
    let names: Vec<&str> = listed.iter().map(|(m, _)| m.name.as_str()).collect();
    assert_eq!(names, vec!["Users", "Reports", "Archive"]);
}

#[tokio::test]
async fn permissions_grouped_under_their_module() {
    let (db, _identity, catalog, _assignments) = setup().await;

    let users = insert_module(&db, "Users", 1, true).await;
    let reports = insert_module(&db, "Reports", 2, true).await;

    // Interleaved inserts; each bucket must still come back in id order.
    insert_permission(&db, users, "View users", "users.view").await;
    insert_permission(&db, reports, "View reports", "reports.view").await;
    insert_permission(&db, users, "Edit users", "users.edit").await;

    let listed = catalog.active_modules_with_permissions().await.unwrap();
    assert_eq!(listed.len(), 2);

    let (first, first_perms) = &listed[0];
    assert_eq!(first.name, "Users");
    let codes: Vec<&str> = first_perms.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["users.view", "users.edit"]);

    let (second, second_perms) = &listed[1];
    assert_eq!(second.name, "Reports");
    assert_eq!(second_perms.len(), 1);
    assert_eq!(second_perms[0].code, "reports.view");
}

#[tokio::test]
async fn inactive_modules_are_hidden() {
    let (db, _identity, catalog, _assignments) = setup().await;

    insert_module(&db, "Users", 1, true).await;
    let legacy = insert_module(&db, "Legacy", 2, false).await;
    insert_permission(&db, legacy, "Old stuff", "legacy.view").await;

    let listed = catalog.active_modules_with_permissions().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0.name, "Users");
}

#[tokio::test]
async fn permissions_of_inactive_modules_remain_assignable() {
    let (db, identity, catalog, assignments) = setup().await;

    // Deactivating a module hides it from the picker without invalidating
    // assignments that reference its permissions.
    let legacy = insert_module(&db, "Legacy", 1, false).await;
    let perm = insert_permission(&db, legacy, "Old stuff", "legacy.view").await;

    let role = identity.create_role("archivist").await.unwrap();
    let (_, granted) = assignments
        .replace_role_assignments(role.id, vec![perm])
        .await
        .unwrap();
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].code, "legacy.view");

    assert!(catalog.active_modules_with_permissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_catalog_lists_nothing() {
    let (_db, _identity, catalog, _assignments) = setup().await;

    let listed = catalog.active_modules_with_permissions().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn duplicate_permission_code_rejected() {
    let (db, _identity, _catalog, _assignments) = setup().await;

    let users = insert_module(&db, "Users", 1, true).await;
    insert_permission(&db, users, "View users", "users.view").await;

    let result = permission::ActiveModel {
        module_id: Set(users),
        name: Set("View again".to_string()),
        code: Set("users.view".to_string()),
        description: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&db)
    .await;

    assert!(result.is_err(), "duplicate code should be rejected");
}
