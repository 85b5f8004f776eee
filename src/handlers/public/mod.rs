// handlers/public/mod.rs - Endpoints reachable without an access token
pub mod auth;
pub mod health;
