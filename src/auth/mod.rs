//! Authentication and authorization module
//!
//! JWT token lifecycle (issue/verify/refresh), cookie and header transport,
//! and the per-request authorization middleware.

mod identity;
mod middleware;
mod password;
mod tokens;
mod transport;

pub use identity::{Identity, X_USER_EMAIL, X_USER_ID, X_USER_ROLE};
pub use middleware::{authorize, AuthState, RouteGroup, RouteTable};
pub use password::{hash_password, verify_password};
pub use tokens::{
    TokenPair, TokenPayload, TokenService, ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS,
};
pub use transport::{
    attach_access_token, attach_tokens, clear_tokens, extract_access_token, extract_refresh_token,
    ACCESS_TOKEN_COOKIE, REFRESH_COOKIE_PATH, REFRESH_TOKEN_COOKIE,
};
