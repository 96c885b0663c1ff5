use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::entities::user;
use crate::error::{ServiceError, ServiceResult};
use crate::graphql::types::AuditAction;
use crate::services::{AuditService, IdentityService, NewPrincipal, PrincipalChanges};

/// A new account as the administrator submitted it, before validation.
#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub role_name: Option<String>,
}

/// Full replacement state for an account edit. Absent optional fields
/// clear the stored value rather than keeping it.
#[derive(Debug, Clone)]
pub struct UserAccountChanges {
    pub full_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub role_name: Option<String>,
}

/// User lifecycle operations. Every mutation here writes the account
/// change, the role membership and the audit entry in one transaction,
/// so the trail never disagrees with the accounts table.
#[derive(Clone)]
pub struct UserAdminService {
    db: DatabaseConnection,
    identity: IdentityService,
    audit: AuditService,
}

impl UserAdminService {
    pub fn new(db: DatabaseConnection, identity: IdentityService, audit: AuditService) -> Self {
        Self {
            db,
            identity,
            audit,
        }
    }

    /// Register an account. Validation problems are collected and reported
    /// together; nothing is written unless every check passes.
    pub async fn create_user(
        &self,
        account: NewUserAccount,
        ip_address: Option<String>,
    ) -> ServiceResult<user::Model> {
        let email = account.email.trim().to_string();
        let full_name = account.full_name.trim().to_string();

        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push("Email is required".to_string());
        } else if !email.contains('@') {
            errors.push("Email address is not valid".to_string());
        }
        if full_name.is_empty() {
            errors.push("Full name is required".to_string());
        }
        errors.extend(self.identity.validate_password(&account.password));

        if !email.is_empty() && self.identity.find_user_by_email(&email).await?.is_some() {
            errors.push(format!("A user with email '{}' already exists", email));
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let password_hash = self.identity.hash_password(&account.password)?;

        let tx = self.db.begin().await?;

        let user = self
            .identity
            .create_principal(
                &tx,
                NewPrincipal {
                    email,
                    password_hash,
                    full_name,
                    document_number: account.document_number,
                    phone: account.phone,
                    notes: account.notes,
                },
            )
            .await?;

        self.identity
            .replace_user_roles(&tx, user.id, account.role_name.as_deref())
            .await?;

        self.audit
            .append(
                &tx,
                user.id,
                AuditAction::Created,
                format!("User {} created", user.email),
                ip_address,
            )
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Overwrite the editable profile fields and the role membership.
    /// The email is the account's identity and never changes here.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserAccountChanges,
        ip_address: Option<String>,
    ) -> ServiceResult<user::Model> {
        let full_name = changes.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(ServiceError::Validation(vec![
                "Full name is required".to_string(),
            ]));
        }

        let tx = self.db.begin().await?;

        let user = self
            .identity
            .update_principal(
                &tx,
                user_id,
                PrincipalChanges {
                    full_name,
                    document_number: changes.document_number,
                    phone: changes.phone,
                    is_active: changes.is_active,
                    notes: changes.notes,
                },
            )
            .await?;

        self.identity
            .replace_user_roles(&tx, user.id, changes.role_name.as_deref())
            .await?;

        self.audit
            .append(
                &tx,
                user.id,
                AuditAction::Updated,
                format!("User {} updated", user.email),
                ip_address,
            )
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Flip an account between active and inactive and record which way
    /// it went.
    pub async fn toggle_user_status(
        &self,
        user_id: Uuid,
        ip_address: Option<String>,
    ) -> ServiceResult<user::Model> {
        let tx = self.db.begin().await?;

        let user = self.identity.toggle_active(&tx, user_id).await?;

        let state = if user.is_active {
            "activated"
        } else {
            "deactivated"
        };
        self.audit
            .append(
                &tx,
                user.id,
                AuditAction::StatusChanged,
                format!("User {} {}", user.email, state),
                ip_address,
            )
            .await?;

        tx.commit().await?;
        Ok(user)
    }
}
