use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create user_audits table. The user_id column is a plain value,
        // not a foreign key: the trail outlives the account it describes.
        manager
            .create_table(
                Table::create()
                    .table(UserAudit::Table)
                    .if_not_exists()
                    .col(pk_auto(UserAudit::Id))
                    .col(uuid(UserAudit::UserId))
                    .col(string_len(UserAudit::Action, 32))
                    .col(string_null(UserAudit::Description))
                    .col(string_null(UserAudit::IpAddress))
                    .col(timestamp_with_time_zone(UserAudit::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user-audit-user")
                    .table(UserAudit::Table)
                    .col(UserAudit::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAudit::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserAudit {
    Table,
    Id,
    UserId,
    Action,
    Description,
    IpAddress,
    CreatedAt,
}
