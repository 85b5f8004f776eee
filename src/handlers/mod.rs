// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (access guard). The router in `routes.rs`
// applies the guard to the protected tier only.
pub mod protected;
pub mod public;
