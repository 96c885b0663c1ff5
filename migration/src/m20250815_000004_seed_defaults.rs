use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, QueryFilter, Set,
};
use sea_orm_migration::prelude::*;
use std::env;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        println!("🌱 Seeding default roles and permission catalog...");

        // Create default roles
        let admin_role_id = Uuid::new_v4();
        let admin_role = warden::entities::role::ActiveModel {
            id: Set(admin_role_id),
            name: Set("admin".to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };
        admin_role.insert(db).await?;
        println!("✅ Created role: admin");

        for name in ["user", "customer"] {
            let role = warden::entities::role::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                created_at: Set(Utc::now().into()),
                updated_at: Set(Utc::now().into()),
            };
            role.insert(db).await?;
            println!("✅ Created role: {}", name);
        }

        // Default permission catalog
        let mut permission_ids = Vec::new();

        let users_module = warden::entities::module::ActiveModel {
            id: NotSet,
            name: Set("Users".to_string()),
            description: Set(Some("User account administration".to_string())),
            icon: Set(Some("bi-people".to_string())),
            sort_order: Set(Some(1)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        let users_module = users_module.insert(db).await?;
        println!("✅ Created module: Users");

        let user_permissions = vec![
            ("View users", "users.view", "See the user list and user details"),
            ("Create users", "users.create", "Register new user accounts"),
            ("Edit users", "users.edit", "Update user profiles and role"),
            (
                "Toggle user status",
                "users.toggle_status",
                "Activate and deactivate accounts",
            ),
            (
                "View user history",
                "users.audit",
                "Consult the user audit trail",
            ),
        ];
        for (name, code, description) in user_permissions {
            let id = insert_permission(db, users_module.id, name, code, description).await?;
            permission_ids.push(id);
        }

        let roles_module = warden::entities::module::ActiveModel {
            id: NotSet,
            name: Set("Roles".to_string()),
            description: Set(Some("Role and permission administration".to_string())),
            icon: Set(Some("bi-shield-lock".to_string())),
            sort_order: Set(Some(2)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        let roles_module = roles_module.insert(db).await?;
        println!("✅ Created module: Roles");

        let role_permissions = vec![
            ("View roles", "roles.view", "See roles and their permissions"),
            (
                "Manage roles",
                "roles.manage",
                "Create, rename and delete roles",
            ),
            (
                "Assign permissions",
                "roles.assign_permissions",
                "Replace the permission set of a role",
            ),
        ];
        for (name, code, description) in role_permissions {
            let id = insert_permission(db, roles_module.id, name, code, description).await?;
            permission_ids.push(id);
        }

        // The admin role starts with the full catalog
        for permission_id in &permission_ids {
            let assignment = warden::entities::role_permission::ActiveModel {
                id: Set(Uuid::new_v4()),
                role_id: Set(admin_role_id),
                permission_id: Set(*permission_id),
                assigned_at: Set(Utc::now().into()),
            };
            assignment.insert(db).await?;
        }
        println!("✅ Granted the full catalog to the admin role");

        // Seed admin user
        seed_admin_user(db, admin_role_id).await?;

        println!("🎉 Default data seeded successfully!");

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Remove the admin user; its membership rows cascade with it
        if let Ok(admin_email) = env::var("ADMIN_EMAIL") {
            let result = warden::entities::user::Entity::delete_many()
                .filter(warden::entities::user::Column::Email.eq(&admin_email))
                .exec(db)
                .await?;

            if result.rows_affected > 0 {
                println!("🗑️  Admin user removed: {}", admin_email);
            }
        }

        // Delete memberships before roles, assignments before the catalog
        warden::entities::user_role::Entity::delete_many()
            .exec(db)
            .await?;
        warden::entities::role_permission::Entity::delete_many()
            .exec(db)
            .await?;
        warden::entities::permission::Entity::delete_many()
            .exec(db)
            .await?;
        warden::entities::module::Entity::delete_many()
            .exec(db)
            .await?;
        warden::entities::role::Entity::delete_many()
            .exec(db)
            .await?;

        println!("🗑️  Seed data removed");

        Ok(())
    }
}

async fn insert_permission(
    db: &impl ConnectionTrait,
    module_id: i32,
    name: &str,
    code: &str,
    description: &str,
) -> Result<i32, DbErr> {
    let permission = warden::entities::permission::ActiveModel {
        id: NotSet,
        module_id: Set(module_id),
        name: Set(name.to_string()),
        code: Set(code.to_string()),
        description: Set(Some(description.to_string())),
        created_at: Set(Utc::now().into()),
    };
    let permission = permission.insert(db).await?;
    println!("✅ Created permission: {}", code);
    Ok(permission.id)
}

async fn seed_admin_user(db: &impl ConnectionTrait, admin_role_id: Uuid) -> Result<(), DbErr> {
    // Only seed the admin account if environment variables are set
    let admin_email = match env::var("ADMIN_EMAIL") {
        Ok(email) => email,
        Err(_) => {
            println!("⚠️  ADMIN_EMAIL not set, skipping admin user creation");
            return Ok(());
        }
    };

    let admin_password = match env::var("ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            println!("⚠️  ADMIN_PASSWORD not set, skipping admin user creation");
            return Ok(());
        }
    };

    let admin_full_name =
        env::var("ADMIN_FULL_NAME").unwrap_or_else(|_| "System Administrator".to_string());

    println!("🌱 Seeding admin user: {}", admin_email);

    let existing_user = warden::entities::user::Entity::find()
        .filter(warden::entities::user::Column::Email.eq(&admin_email))
        .one(db)
        .await?;

    if existing_user.is_some() {
        println!("✅ Admin user already exists, skipping creation");
        return Ok(());
    }

    let password_hash = hash(&admin_password, DEFAULT_COST)
        .map_err(|e| DbErr::Custom(format!("Failed to hash password: {}", e)))?;

    let admin_user_id = Uuid::new_v4();
    let admin_user = warden::entities::user::ActiveModel {
        id: Set(admin_user_id),
        email: Set(admin_email.clone()),
        password_hash: Set(password_hash),
        full_name: Set(admin_full_name),
        document_number: Set(None),
        phone: Set(None),
        is_active: Set(true),
        notes: Set(None),
        registered_at: Set(Utc::now().into()),
        last_access_at: Set(None),
    };
    admin_user.insert(db).await?;

    let membership = warden::entities::user_role::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(admin_user_id),
        role_id: Set(admin_role_id),
        created_at: Set(Utc::now().into()),
    };
    membership.insert(db).await?;

    println!("✅ Admin user created with the admin role: {}", admin_email);

    Ok(())
}
