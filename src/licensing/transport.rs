use crate::licensing::config::ClientConfig;
use crate::licensing::params::RequestParams;
use crate::licensing::types::LicenseError;
use std::time::Duration;

/// Sends one form-encoded POST and returns the raw response body.
///
/// Implementations own their timeout policy. Retries are left to the caller.
pub trait Transport: Send + Sync {
    fn post_form(&self, url: &str, params: &RequestParams) -> Result<String, LicenseError>;
}

/// Blocking HTTP transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, LicenseError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LicenseError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &str, params: &RequestParams) -> Result<String, LicenseError> {
        let response = self
            .client
            .post(url)
            .form(params.as_map())
            .send()
            .map_err(|e| LicenseError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| LicenseError::Network(format!("Failed to read response: {}", e)))?;

        // The server reports business errors as JSON on non-2xx statuses too
        if !status.is_success() && serde_json::from_str::<serde_json::Value>(&body).is_err() {
            return Err(LicenseError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
