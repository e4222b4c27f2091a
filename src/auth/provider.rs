//! REST client for the managed auth platform.
//!
//! Sign-in, refresh, account creation and password recovery are all
//! delegated to the provider; this service never stores or hashes
//! credentials itself.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider answered with a non-success status
    #[error("identity provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// User record as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Session tokens as returned by password or refresh grants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<i64>,
    pub user: ProviderUser,
}

pub struct AuthProvider {
    http: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

static PROVIDER: Lazy<AuthProvider> = Lazy::new(|| {
    let cfg = &config::config().provider;
    AuthProvider::new(&cfg.base_url, &cfg.service_role_key)
});

impl AuthProvider {
    pub fn new(base_url: &str, service_role_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
        }
    }

    /// Process-wide provider client built from config
    pub fn global() -> &'static AuthProvider {
        &PROVIDER
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        Url::parse(&format!("{}/auth/v1{}", self.base_url, path)).map_err(|_| {
            ProviderError::Rejected {
                status: 500,
                message: "invalid provider base URL".to_string(),
            }
        })
    }

    /// Exchange email + password for a session
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let mut url = self.endpoint("/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .http
            .post(url)
            .header("apikey", &self.service_role_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Exchange a refresh token for a fresh session
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let mut url = self.endpoint("/token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        let response = self
            .http
            .post(url)
            .header("apikey", &self.service_role_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Create a confirmed user account (service-role operation)
    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<ProviderUser, ProviderError> {
        let url = self.endpoint("/admin/users")?;

        let response = self
            .http
            .post(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "user_metadata": metadata,
            }))
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Delete a user account (register rollback path)
    pub async fn admin_delete_user(&self, user_id: Uuid) -> Result<(), ProviderError> {
        let url = self.endpoint(&format!("/admin/users/{}", user_id))?;

        let response = self
            .http
            .delete(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;

        Self::check(response).await
    }

    /// Ask the provider to send a password recovery email
    pub async fn send_recovery_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        let mut url = self.endpoint("/recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.service_role_key)
            .json(&json!({ "email": email }))
            .send()
            .await?;

        Self::check(response).await
    }

    /// Set a new password for the user owning the access token
    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint("/user")?;

        let response = self
            .http
            .put(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await?;

        Self::check(response).await
    }

    /// Revoke the session behind an access token
    pub async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let url = self.endpoint("/logout")?;

        let response = self
            .http
            .post(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::check(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::rejection(status.as_u16(), response).await)
        }
    }

    async fn check(response: reqwest::Response) -> Result<(), ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::rejection(status.as_u16(), response).await)
        }
    }

    async fn rejection(status: u16, response: reqwest::Response) -> ProviderError {
        // Provider error bodies vary between {"msg": ...} and
        // {"error_description": ...} depending on the endpoint
        let message = match response.json::<Value>().await {
            Ok(body) => body
                .get("msg")
                .or_else(|| body.get("error_description"))
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("request rejected")
                .to_string(),
            Err(_) => "request rejected".to_string(),
        };
        ProviderError::Rejected { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_auth_path() {
        let provider = AuthProvider::new("http://127.0.0.1:54321/", "key");
        let url = provider.endpoint("/token").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:54321/auth/v1/token");
    }

    #[test]
    fn rejected_error_carries_status() {
        let err = ProviderError::Rejected { status: 401, message: "bad login".into() };
        assert!(err.to_string().contains("401"));
    }
}
