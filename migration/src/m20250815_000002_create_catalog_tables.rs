use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create modules table
        manager
            .create_table(
                Table::create()
                    .table(Module::Table)
                    .if_not_exists()
                    .col(pk_auto(Module::Id))
                    .col(string(Module::Name))
                    .col(string_null(Module::Description))
                    .col(string_null(Module::Icon))
                    .col(integer_null(Module::SortOrder))
                    .col(boolean(Module::IsActive).default(true))
                    .col(timestamp_with_time_zone(Module::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create permissions table
        manager
            .create_table(
                Table::create()
                    .table(Permission::Table)
                    .if_not_exists()
                    .col(pk_auto(Permission::Id))
                    .col(integer(Permission::ModuleId))
                    .col(string(Permission::Name))
                    .col(string_uniq(Permission::Code)) // e.g. "users.create"
                    .col(string_null(Permission::Description))
                    .col(timestamp_with_time_zone(Permission::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-permission-module")
                            .from(Permission::Table, Permission::ModuleId)
                            .to(Module::Table, Module::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create role_permissions junction table
        manager
            .create_table(
                Table::create()
                    .table(RolePermission::Table)
                    .if_not_exists()
                    .col(pk_uuid(RolePermission::Id))
                    .col(uuid(RolePermission::RoleId))
                    .col(integer(RolePermission::PermissionId))
                    .col(timestamp_with_time_zone(RolePermission::AssignedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-role-permission-role")
                            .from(RolePermission::Table, RolePermission::RoleId)
                            .to(Role::Table, Role::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-role-permission-permission")
                            .from(RolePermission::Table, RolePermission::PermissionId)
                            .to(Permission::Table, Permission::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-role-permission-unique")
                    .table(RolePermission::Table)
                    .col(RolePermission::RoleId)
                    .col(RolePermission::PermissionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(RolePermission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Permission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Module::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Module {
    Table,
    Id,
    Name,
    Description,
    Icon,
    SortOrder,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Permission {
    Table,
    Id,
    ModuleId,
    Name,
    Code,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RolePermission {
    Table,
    Id,
    RoleId,
    PermissionId,
    AssignedAt,
}

#[derive(DeriveIden)]
enum Role {
    Table,
    Id,
}
