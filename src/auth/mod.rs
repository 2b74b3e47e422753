/// Sign-in through an external identity provider.
///
/// The provider owns the OAuth handshake and token verification; this module only
/// drives the redirect flow and keeps the verified identity in an encrypted
/// session cookie.
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub mod extract;
pub mod google;
pub mod session;

pub use extract::CurrentUser;
pub use google::GoogleIdentity;
pub use session::{Session, SessionSettings};

/// Claims of a user whose identity token has been verified by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiedIdentity {
    /// Provider's stable subject identifier
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub given_name: Option<String>,
}

/// Identity provider driving the authorization-code flow
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to send the browser to; `state` must come back unchanged on the callback
    fn authorization_url(&self, state: &str) -> AppResult<String>;

    /// Exchanges the authorization code and verifies the returned identity token
    async fn authenticate(&self, code: &str) -> AppResult<VerifiedIdentity>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
