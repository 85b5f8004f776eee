// handlers/public/auth/mod.rs - Token acquisition without authentication
//
// Login hands out the access token in the body and the refresh token as an
// httpOnly cookie. Refresh reads that cookie; logout clears it.
pub mod login;
pub mod logout;
pub mod refresh;
pub mod signup;

pub use login::login_post;
pub use logout::logout_post;
pub use refresh::refresh_post;
pub use signup::signup_post;
