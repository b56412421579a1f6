//! Authentication module
//!
//! OAuth token lifecycle: an exchange token obtained from the web app is
//! traded for an access/refresh pair, and the refresh token is used once
//! whenever the API answers 401.

mod authenticator;
mod types;

pub use authenticator::{Authenticator, OAuthTokenExchange, TokenExchange, TOKEN_PATH};
pub use types::{GrantType, Tokens};

#[cfg(test)]
mod tests;
