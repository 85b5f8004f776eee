pub mod audit;
pub mod folder;
pub mod plan;
pub mod project;
pub mod user;

pub use audit::AuditEntry;
pub use folder::{Folder, FolderListing};
pub use plan::Plan;
pub use project::Project;
pub use user::{User, UserProfile};
