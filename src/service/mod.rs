pub mod users;

pub use users::{UserManager, UserService};
