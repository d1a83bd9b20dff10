use crate::licensing::types::LicenseError;
use url::Url;

/// License server URL
pub const LICENSE_SERVER_URL: &str = "https://app.cryptolens.io";

/// Path prefix every remote method lives under
pub const API_PATH: &str = "/api/";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Floating machine codes are stored as `floating:<machine code>`
pub const FLOATING_PREFIX: &str = "floating:";

/// Overdraft slots are stored as `floating:overdraft:<machine code>`
pub const OVERDRAFT_PREFIX: &str = "floating:overdraft:";

/// Offset of the machine code inside a primary floating slot
pub const FLOATING_OFFSET: usize = FLOATING_PREFIX.len();

/// Offset of the machine code inside an overdraft floating slot
pub const OVERDRAFT_OFFSET: usize = OVERDRAFT_PREFIX.len();

/// Number of feature flags carried by a license key
pub const FEATURE_COUNT: u8 = 8;

/// Environment variable overriding the license server URL
pub const ENV_API_URL: &str = "LICENSE_API_URL";

/// Environment variable overriding the request timeout
pub const ENV_TIMEOUT_SECS: &str = "LICENSE_API_TIMEOUT_SECS";

/// Connection settings for the license server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `https://app.cryptolens.io`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: LICENSE_SERVER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the environment.
    ///
    /// Variables:
    /// - `LICENSE_API_URL` (default: `https://app.cryptolens.io`)
    /// - `LICENSE_API_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, LicenseError> {
        let base_url =
            std::env::var(ENV_API_URL).unwrap_or_else(|_| LICENSE_SERVER_URL.to_string());
        let timeout_secs = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            timeout_secs,
            ..Self::default()
        }
        .with_base_url(&base_url)
    }

    /// Point the client at another server (staging, local mock).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, LicenseError> {
        Url::parse(base_url)
            .map_err(|e| LicenseError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Full URL of a remote method, e.g. `Key/Activate`.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            API_PATH,
            method.trim_start_matches('/')
        )
    }
}

fn default_user_agent() -> String {
    format!("license-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Remote method names
pub mod methods {
    pub const ACTIVATE: &str = "key/Activate";
    pub const DEACTIVATE: &str = "key/Deactivate";
    pub const GET_KEY: &str = "key/GetKey";
}
