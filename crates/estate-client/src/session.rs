//! # Session
//!
//! The signed-in operator: who they are, what role they hold, and the bearer
//! token sent with every request. A session is created from the login
//! response (or the environment, for the CLI) and passed explicitly to the
//! REST client and the workflow controller.
//!
//! ```text
//!   login ──► Session::from_login ──► RestClient (Authorization header)
//!                                 └─► BookingController (Role::can)
//!   logout ─► Session::clear ──────► token emptied, requests refused
//! ```

use estate_core::{Capability, Role};
use std::fmt;

use crate::error::{ClientError, ClientResult};
use crate::wire::AuthResponse;

/// An authenticated operator.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    token: String,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        token: impl Into<String>,
    ) -> Self {
        Session {
            user_id: user_id.into(),
            email: email.into(),
            name: None,
            role,
            token: token.into(),
        }
    }

    /// Builds a session from the auth service's login response.
    pub fn from_login(response: AuthResponse) -> ClientResult<Self> {
        let role = response
            .user
            .role
            .parse::<Role>()
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        if response.token.trim().is_empty() {
            return Err(ClientError::MissingSession);
        }

        Ok(Session {
            user_id: response.user.id,
            email: response.user.email,
            name: response.user.name,
            role,
            token: response.token,
        })
    }

    /// Reads `ESTATE_TOKEN`, `ESTATE_ROLE`, `ESTATE_USER_ID` and `ESTATE_EMAIL`.
    pub fn from_env() -> ClientResult<Self> {
        let token = std::env::var("ESTATE_TOKEN").map_err(|_| ClientError::MissingSession)?;
        let role = std::env::var("ESTATE_ROLE")
            .map_err(|_| ClientError::InvalidConfig("ESTATE_ROLE is not set".into()))?
            .parse::<Role>()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        let user_id = std::env::var("ESTATE_USER_ID").unwrap_or_default();
        let email = std::env::var("ESTATE_EMAIL").unwrap_or_default();

        if token.trim().is_empty() {
            return Err(ClientError::MissingSession);
        }

        Ok(Session::new(user_id, email, role, token))
    }

    /// Returns the token for the `Authorization` header.
    pub fn bearer(&self) -> ClientResult<&str> {
        if self.token.is_empty() {
            return Err(ClientError::MissingSession);
        }
        Ok(&self.token)
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_empty()
    }

    /// Logs out: the token is dropped and later requests are refused.
    pub fn clear(&mut self) {
        self.token.clear();
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }

    /// Name to show in the shell, falling back to the email.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("token", &if self.token.is_empty() { "<none>" } else { "<redacted>" })
            .finish()
    }
}
