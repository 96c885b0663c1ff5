pub mod assignment;
pub mod audit;
pub mod catalog;
pub mod identity;
pub mod user_admin;

pub use assignment::*;
pub use audit::*;
pub use catalog::*;
pub use identity::*;
pub use user_admin::*;
