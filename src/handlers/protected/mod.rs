// handlers/protected/mod.rs - Endpoints behind the access guard
//
// Every handler here receives `Extension<AuthUser>` with the verified user id.
// Ownership checks happen in the services.
pub mod auth;
pub mod folders;
pub mod history;
pub mod search;
