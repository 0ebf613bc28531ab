pub mod supply_service;
pub mod user_service;

pub use supply_service::{SupplyError, SupplyService, TreeEntry};
pub use user_service::{NewAccount, RegisterForm, UserError, UserService};
