pub mod account;
pub mod session;

pub use account::{password_patch, update_patch, user_delete};
pub use session::whoami;
