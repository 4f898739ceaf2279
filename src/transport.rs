use crate::error::TransportError;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

/// The one HTTP shape the OCR service needs: a form POST answered with JSON.
pub trait OcrTransport: Send + Sync {
    fn post_form(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Value, TransportError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl OcrTransport for HttpTransport {
    fn post_form(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .query(query)
            .header("Accept", "application/json")
            .form(form)
            .send()
            .map_err(|e| {
                TransportError(
                    if e.is_connect() || e.is_timeout() {
                        "Check your internet connection and try again."
                    } else {
                        "Network error."
                    }
                    .to_string(),
                )
            })?;

        // The service reports most failures as JSON with a non-2xx status, so
        // the body is parsed regardless of status.
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TransportError(format!("Could not read response ({}): {}", status, e)))?;
        serde_json::from_str(&body).map_err(|_| {
            TransportError(format!(
                "Unexpected response ({}): {}",
                status,
                if body.is_empty() { "empty body" } else { body.as_str() }
            ))
        })
    }
}
