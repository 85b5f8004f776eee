pub mod access;
pub mod auth_service;
pub mod error;
pub mod folder_service;
pub mod history_service;
pub mod plan_service;
pub mod project_service;
pub mod search_service;

pub use access::Actor;
pub use auth_service::AuthService;
pub use error::{ServiceError, ServiceResult};
pub use folder_service::FolderService;
pub use history_service::HistoryService;
pub use plan_service::PlanService;
pub use project_service::ProjectService;
pub use search_service::SearchService;
