use std::collections::HashMap;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::auth::JwtService;
use crate::entities::{prelude::*, role, user, user_role};
use crate::error::{ServiceError, ServiceResult};

/// Role that unlocks the administration surface.
pub const ADMIN_ROLE: &str = "admin";

/// New principal data, already validated and hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Profile fields an administrator may overwrite. Everything listed here is
/// written as-is; the email and credentials are not touched.
#[derive(Debug, Clone)]
pub struct PrincipalChanges {
    pub full_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
}

/// Owns the user, role and membership tables. Other services go through
/// this capability set instead of querying those tables themselves.
#[derive(Clone)]
pub struct IdentityService {
    db: DatabaseConnection,
    jwt_service: JwtService,
}

impl IdentityService {
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { db, jwt_service }
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Verify credentials, stamp the access time and issue a token.
    /// Unknown emails, wrong passwords and deactivated accounts all fail
    /// the same way.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> ServiceResult<(user::Model, String)> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify(password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(ServiceError::InvalidCredentials);
        }

        let mut user_active: user::ActiveModel = user.into();
        user_active.last_access_at = Set(Some(Utc::now().into()));
        let user = user_active.update(&self.db).await?;

        let token = self.jwt_service.generate_token(user.id, &user.email)?;

        Ok((user, token))
    }

    pub async fn find_user_by_id(&self, user_id: Uuid) -> ServiceResult<Option<user::Model>> {
        let user = User::find_by_id(user_id).one(&self.db).await?;
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<user::Model>> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<user::Model>> {
        let users = User::find()
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub fn hash_password(&self, password: &str) -> ServiceResult<String> {
        Ok(hash(password, DEFAULT_COST)?)
    }

    /// Password policy check. Returns every violated rule so the caller can
    /// report them all at once.
    pub fn validate_password(&self, password: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if password.len() < 6 {
            errors.push("Password must be at least 6 characters long".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one digit".to_string());
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if password.chars().all(|c| c.is_alphanumeric()) {
            errors.push("Password must contain at least one non-alphanumeric character".to_string());
        }

        errors
    }

    pub async fn create_principal(
        &self,
        conn: &impl ConnectionTrait,
        principal: NewPrincipal,
    ) -> ServiceResult<user::Model> {
        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(principal.email),
            password_hash: Set(principal.password_hash),
            full_name: Set(principal.full_name),
            document_number: Set(principal.document_number),
            phone: Set(principal.phone),
            is_active: Set(true),
            notes: Set(principal.notes),
            registered_at: Set(Utc::now().into()),
            last_access_at: Set(None),
        };

        let user = new_user.insert(conn).await?;
        Ok(user)
    }

    /// Overwrite the editable profile fields of an existing principal.
    pub async fn update_principal(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
        changes: PrincipalChanges,
    ) -> ServiceResult<user::Model> {
        let user = User::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or(ServiceError::not_found("user"))?;

        let mut user_active: user::ActiveModel = user.into();
        user_active.full_name = Set(changes.full_name);
        user_active.document_number = Set(changes.document_number);
        user_active.phone = Set(changes.phone);
        user_active.is_active = Set(changes.is_active);
        user_active.notes = Set(changes.notes);

        match user_active.update(conn).await {
            Ok(user) => Ok(user),
            Err(e) => Err(self.remap_user_update_err(conn, user_id, e).await),
        }
    }

    /// Flip the active flag and return the resulting state.
    pub async fn toggle_active(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
    ) -> ServiceResult<user::Model> {
        let user = User::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or(ServiceError::not_found("user"))?;

        let is_active = user.is_active;
        let mut user_active: user::ActiveModel = user.into();
        user_active.is_active = Set(!is_active);

        match user_active.update(conn).await {
            Ok(user) => Ok(user),
            Err(e) => Err(self.remap_user_update_err(conn, user_id, e).await),
        }
    }

    /// A zero-row update means the row changed underneath us. Tell a vanished
    /// row apart from a stale one before reporting.
    async fn remap_user_update_err(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
        err: DbErr,
    ) -> ServiceError {
        match err {
            DbErr::RecordNotUpdated => match User::find_by_id(user_id).one(conn).await {
                Ok(None) => ServiceError::not_found("user"),
                Ok(Some(_)) => ServiceError::Conflict,
                Err(e) => ServiceError::Database(e),
            },
            e => ServiceError::Database(e),
        }
    }

    pub async fn list_roles(&self) -> ServiceResult<Vec<role::Model>> {
        let roles = Role::find()
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?;
        Ok(roles)
    }

    pub async fn find_role_by_id(&self, role_id: Uuid) -> ServiceResult<Option<role::Model>> {
        let role = Role::find_by_id(role_id).one(&self.db).await?;
        Ok(role)
    }

    pub async fn find_role_by_name(&self, name: &str) -> ServiceResult<Option<role::Model>> {
        let role = Role::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(role)
    }

    pub async fn create_role(&self, name: &str) -> ServiceResult<role::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(vec![
                "Role name is required".to_string(),
            ]));
        }

        if self.find_role_by_name(name).await?.is_some() {
            return Err(ServiceError::Validation(vec![format!(
                "A role named '{}' already exists",
                name
            )]));
        }

        let new_role = role::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        let role = new_role.insert(&self.db).await?;
        Ok(role)
    }

    pub async fn rename_role(&self, role_id: Uuid, name: &str) -> ServiceResult<role::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(vec![
                "Role name is required".to_string(),
            ]));
        }

        let role = Role::find_by_id(role_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::not_found("role"))?;

        if Role::find()
            .filter(role::Column::Name.eq(name))
            .filter(role::Column::Id.ne(role_id))
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(vec![format!(
                "A role named '{}' already exists",
                name
            )]));
        }

        let mut role_active: role::ActiveModel = role.into();
        role_active.name = Set(name.to_string());
        role_active.updated_at = Set(Utc::now().into());

        match role_active.update(&self.db).await {
            Ok(role) => Ok(role),
            Err(DbErr::RecordNotUpdated) => Err(ServiceError::not_found("role")),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the role row itself. Assignment cleanup is the caller's job.
    pub async fn remove_role(
        &self,
        conn: &impl ConnectionTrait,
        role_id: Uuid,
    ) -> ServiceResult<()> {
        let result = Role::delete_by_id(role_id).exec(conn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("role"));
        }
        Ok(())
    }

    /// Role names for a batch of users in one query. Every requested id is
    /// present in the result, role-less users with an empty list.
    pub async fn user_roles_batch(
        &self,
        user_ids: &[Uuid],
    ) -> ServiceResult<HashMap<Uuid, Vec<String>>> {
        let mut map: HashMap<Uuid, Vec<String>> =
            user_ids.iter().map(|id| (*id, Vec::new())).collect();
        if user_ids.is_empty() {
            return Ok(map);
        }

        let rows = UserRole::find()
            .find_also_related(Role)
            .filter(user_role::Column::UserId.is_in(user_ids.iter().copied()))
            .all(&self.db)
            .await?;

        for (membership, role) in rows {
            if let (Some(names), Some(role)) = (map.get_mut(&membership.user_id), role) {
                names.push(role.name);
            }
        }
        for names in map.values_mut() {
            names.sort();
        }

        Ok(map)
    }

    pub async fn is_in_role(&self, user_id: Uuid, role_name: &str) -> ServiceResult<bool> {
        let count = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .inner_join(Role)
            .filter(role::Column::Name.eq(role_name))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn any_user_in_role(
        &self,
        conn: &impl ConnectionTrait,
        role_id: Uuid,
    ) -> ServiceResult<bool> {
        let count = UserRole::find()
            .filter(user_role::Column::RoleId.eq(role_id))
            .count(conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn role_member_count(&self, role_id: Uuid) -> ServiceResult<u64> {
        let count = UserRole::find()
            .filter(user_role::Column::RoleId.eq(role_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Drop every membership the user holds, then grant at most one role.
    /// Users hold a single role at a time; the relation stays many-to-many
    /// so the store does not have to change if that policy ever does.
    /// A blank role name counts as no selection.
    pub async fn replace_user_roles(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Uuid,
        role_name: Option<&str>,
    ) -> ServiceResult<()> {
        let role_name = role_name.map(str::trim).filter(|name| !name.is_empty());

        UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;

        if let Some(role_name) = role_name {
            let role = Role::find()
                .filter(role::Column::Name.eq(role_name))
                .one(conn)
                .await?
                .ok_or(ServiceError::not_found("role"))?;

            let membership = user_role::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                role_id: Set(role.id),
                created_at: Set(Utc::now().into()),
            };
            membership.insert(conn).await?;
        }

        Ok(())
    }
}
