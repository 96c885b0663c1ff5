use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{prelude::*, user_audit};
use crate::error::ServiceResult;
use crate::graphql::types::AuditAction;

/// Append-only trail of user lifecycle events. Entries are never updated
/// or deleted, and they survive the user they describe.
#[derive(Clone)]
pub struct AuditService {
    db: DatabaseConnection,
}

impl AuditService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record one event. Runs on the caller's connection so the entry
    /// commits or rolls back together with the change it describes.
    pub async fn append(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
        action: AuditAction,
        description: String,
        ip_address: Option<String>,
    ) -> ServiceResult<user_audit::Model> {
        let entry = user_audit::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            action: Set(action),
            description: Set(Some(description)),
            ip_address: Set(ip_address),
            created_at: Set(chrono::Utc::now().into()),
        };

        let entry = entry.insert(conn).await?;
        Ok(entry)
    }

    /// History for one user, newest first.
    pub async fn entries_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<user_audit::Model>> {
        let entries = UserAudit::find()
            .filter(user_audit::Column::UserId.eq(user_id))
            .order_by_desc(user_audit::Column::CreatedAt)
            .order_by_desc(user_audit::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }
}
