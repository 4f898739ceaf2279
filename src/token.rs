use crate::error::{OcrError, Result};
use crate::store::CredentialStore;
use crate::transport::OcrTransport;
use serde_json::Value;
use std::sync::Arc;

const TOKEN_PATH: &str = "/oauth/2.0/token";

/// Exchanges the stored key pair for a bearer token. No caching: every call
/// reads the store and hits the token endpoint once.
pub struct AccessTokenProvider<T: ?Sized, S: ?Sized> {
    api_base: String,
    transport: Arc<T>,
    store: Arc<S>,
}

impl<T, S> AccessTokenProvider<T, S>
where
    T: OcrTransport + ?Sized,
    S: CredentialStore + ?Sized,
{
    pub fn new(api_base: impl Into<String>, transport: Arc<T>, store: Arc<S>) -> Self {
        Self {
            api_base: api_base.into(),
            transport,
            store,
        }
    }

    pub fn access_token(&self) -> Result<String> {
        let credentials = self
            .store
            .get()
            .map_err(|e| OcrError::Auth(format!("could not read settings: {}", e)))?
            .filter(|c| c.is_complete())
            .ok_or_else(|| OcrError::Auth("set the API Key and Secret Key first".to_string()))?;

        let url = format!("{}{}", self.api_base, TOKEN_PATH);
        let response = self
            .transport
            .post_form(
                &url,
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", credentials.api_key.trim()),
                    ("client_secret", credentials.secret_key.trim()),
                ],
                &[],
            )
            .map_err(|e| OcrError::Auth(e.to_string()))?;

        match response.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                log::debug!("[auth] Obtained access token");
                Ok(token.to_string())
            }
            _ => {
                let reason = response
                    .get("error_description")
                    .or_else(|| response.get("error"))
                    .and_then(Value::as_str)
                    .unwrap_or("no access_token in response");
                log::warn!("[auth] Token exchange failed: {}", reason);
                Err(OcrError::Auth(reason.to_string()))
            }
        }
    }
}
