pub use super::module::Entity as Module;
pub use super::permission::Entity as Permission;
pub use super::role::Entity as Role;
pub use super::role_permission::Entity as RolePermission;
pub use super::user::Entity as User;
pub use super::user_audit::Entity as UserAudit;
pub use super::user_role::Entity as UserRole;
