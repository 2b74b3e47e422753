/// Google sign-in (OAuth 2.0 authorization code flow with OpenID Connect)
///
/// Flow:
/// 1. Redirect to the authorization endpoint with `openid email profile` scopes
/// 2. Exchange the returned code at the token endpoint for an ID token
/// 3. Verify the ID token with Google's `tokeninfo` endpoint and check its audience and issuer
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    auth::{IdentityProvider, VerifiedIdentity},
    error::{AppError, AppResult},
};

const SCOPES: &str = "openid email profile";
const ACCEPTED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Endpoints and credentials for the Google OAuth client
#[derive(Debug, Clone)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub tokeninfo_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    id_token: Option<String>,
}

/// Claims returned by the `tokeninfo` endpoint
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: String,
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleIdentity {
    http_client: HttpClient,
    settings: GoogleSettings,
}

impl GoogleIdentity {
    pub fn new(http_client: HttpClient, settings: GoogleSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(&self.settings.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Token endpoint returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Invalid token response: {}", e)))?;

        token
            .id_token
            .ok_or_else(|| AppError::ExternalApi("Token response has no id_token".to_string()))
    }

    async fn verify_id_token(&self, id_token: &str) -> AppResult<VerifiedIdentity> {
        let response = self
            .http_client
            .get(&self.settings.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "ID token rejected with status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let info: TokenInfo = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Invalid tokeninfo response: {}", e)))?;

        self.check_claims(info)
    }

    fn check_claims(&self, info: TokenInfo) -> AppResult<VerifiedIdentity> {
        if info.aud != self.settings.client_id {
            return Err(AppError::Unauthorized(
                "ID token was issued for another client".to_string(),
            ));
        }

        if !ACCEPTED_ISSUERS.contains(&info.iss.as_str()) {
            return Err(AppError::Unauthorized(format!(
                "Unexpected ID token issuer '{}'",
                info.iss
            )));
        }

        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::Unauthorized("ID token carries no email".to_string()))?;

        Ok(VerifiedIdentity {
            subject: info.sub,
            email,
            name: info.name,
            given_name: info.given_name,
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoogleIdentity {
    fn authorization_url(&self, state: &str) -> AppResult<String> {
        let url = url::Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("access_type", "online"),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| AppError::Internal(format!("Invalid authorization URL: {}", e)))?;

        Ok(url.into())
    }

    async fn authenticate(&self, code: &str) -> AppResult<VerifiedIdentity> {
        let id_token = self.exchange_code(code).await?;
        let identity = self.verify_id_token(&id_token).await?;

        tracing::info!(
            provider = self.name(),
            email = %identity.email,
            "Identity verified"
        );

        Ok(identity)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
