use crate::licensing::config::{methods, ClientConfig};
use crate::licensing::device::cached_machine_code;
use crate::licensing::params::{marshal, RequestParams, ToParams};
use crate::licensing::transport::{HttpTransport, Transport};
use crate::licensing::types::{LicenseError, LicenseKey};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error, warn};

// ============================================================================
// Common Response Types (Server uses consistent format)
// ============================================================================

/// Fields every server response carries
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BasicResult {
    /// 0 on success, 1 on failure
    pub result: i32,
    #[serde(default)]
    pub message: Option<String>,
    /// Raw response body, kept for diagnostics and signature checks by the host
    #[serde(skip)]
    pub raw_response: String,
}

impl BasicResult {
    pub fn is_success(&self) -> bool {
        self.result == 0
    }
}

/// A decoded server response.
///
/// `is_success() == false` is a business failure reported by the server,
/// not a transport or decode error.
pub trait ApiResult: DeserializeOwned {
    fn basic(&self) -> &BasicResult;

    fn basic_mut(&mut self) -> &mut BasicResult;

    fn is_success(&self) -> bool {
        self.basic().is_success()
    }

    /// Error message, present only on failure
    fn message(&self) -> Option<&str> {
        self.basic()
            .message
            .as_deref()
            .filter(|_| !self.is_success())
    }

    fn raw_response(&self) -> &str {
        &self.basic().raw_response
    }

    fn set_raw_response(&mut self, raw: String) {
        self.basic_mut().raw_response = raw;
    }
}

impl ApiResult for BasicResult {
    fn basic(&self) -> &BasicResult {
        self
    }

    fn basic_mut(&mut self) -> &mut BasicResult {
        self
    }
}

/// Response carrying a license key
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct KeyResult {
    #[serde(flatten)]
    pub basic: BasicResult,
    #[serde(rename = "licenseKey", default)]
    pub license_key: Option<LicenseKey>,
}

impl ApiResult for KeyResult {
    fn basic(&self) -> &BasicResult {
        &self.basic
    }

    fn basic_mut(&mut self) -> &mut BasicResult {
        &mut self.basic
    }
}

// ============================================================================
// Request Models
// ============================================================================

/// Fields shared by every key request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyRequest {
    pub product_id: Option<i64>,
    pub key: Option<String>,
}

impl KeyRequest {
    pub fn new(product_id: i64, key: impl Into<String>) -> Self {
        Self {
            product_id: Some(product_id),
            key: Some(key.into()),
        }
    }
}

impl ToParams for KeyRequest {
    fn write_params(&self, params: &mut RequestParams) {
        params.insert_opt("ProductId", self.product_id);
        params.insert_opt("Key", self.key.as_deref());
    }
}

/// Request to activate a license on a machine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivateModel {
    pub key_request: KeyRequest,
    pub machine_code: Option<String>,
    pub fields_to_return: Option<i32>,
    pub metadata: Option<bool>,
    /// Seconds a floating activation stays valid; enables floating licensing
    pub floating_time_interval: Option<u32>,
    /// Extra floating slots beyond the machine limit
    pub max_overdraft: Option<u32>,
}

impl ActivateModel {
    pub fn new(product_id: i64, key: impl Into<String>, machine_code: impl Into<String>) -> Self {
        Self {
            key_request: KeyRequest::new(product_id, key),
            machine_code: Some(machine_code.into()),
            ..Default::default()
        }
    }

    /// Activation bound to the current machine's code
    pub fn for_this_machine(product_id: i64, key: impl Into<String>) -> Self {
        Self::new(product_id, key, cached_machine_code())
    }

    pub fn floating(mut self, interval_secs: u32) -> Self {
        self.floating_time_interval = Some(interval_secs);
        self
    }

    pub fn with_overdraft(mut self, max_overdraft: u32) -> Self {
        self.max_overdraft = Some(max_overdraft);
        self
    }
}

impl ToParams for ActivateModel {
    fn write_params(&self, params: &mut RequestParams) {
        self.key_request.write_params(params);
        params.insert_opt("MachineCode", self.machine_code.as_deref());
        params.insert_opt("FieldsToReturn", self.fields_to_return);
        params.insert_opt("Metadata", self.metadata);
        params.insert_opt("FloatingTimeInterval", self.floating_time_interval);
        params.insert_opt("MaxOverdraft", self.max_overdraft);
    }
}

/// Request to release a machine from a license
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeactivateModel {
    pub key_request: KeyRequest,
    pub machine_code: Option<String>,
    pub floating: Option<bool>,
}

impl DeactivateModel {
    pub fn new(product_id: i64, key: impl Into<String>, machine_code: impl Into<String>) -> Self {
        Self {
            key_request: KeyRequest::new(product_id, key),
            machine_code: Some(machine_code.into()),
            floating: None,
        }
    }
}

impl ToParams for DeactivateModel {
    fn write_params(&self, params: &mut RequestParams) {
        self.key_request.write_params(params);
        params.insert_opt("MachineCode", self.machine_code.as_deref());
        params.insert_opt("Floating", self.floating);
    }
}

/// Request to fetch a license without activating it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetKeyModel {
    pub key_request: KeyRequest,
    pub fields_to_return: Option<i32>,
    pub metadata: Option<bool>,
}

impl GetKeyModel {
    pub fn new(product_id: i64, key: impl Into<String>) -> Self {
        Self {
            key_request: KeyRequest::new(product_id, key),
            ..Default::default()
        }
    }
}

impl ToParams for GetKeyModel {
    fn write_params(&self, params: &mut RequestParams) {
        self.key_request.write_params(params);
        params.insert_opt("FieldsToReturn", self.fields_to_return);
        params.insert_opt("Metadata", self.metadata);
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the license server API
pub struct LicenseApiClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl LicenseApiClient<HttpTransport> {
    /// Client for the default license server
    pub fn new() -> Result<Self, LicenseError> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, LicenseError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> LicenseApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `model` to a remote method and decode the response as `R`.
    ///
    /// `extra_params` override same-named model fields. A server-reported
    /// failure comes back as `Ok` with `is_success() == false`.
    pub fn send<M, R>(
        &self,
        method: &str,
        model: &M,
        extra_params: Option<&HashMap<String, String>>,
    ) -> Result<R, LicenseError>
    where
        M: ToParams + ?Sized,
        R: ApiResult,
    {
        let params = marshal(model, extra_params);
        let url = self.config.method_url(method);
        debug!(method, url = %url, params = params.len(), "sending license API request");

        let raw = self.transport.post_form(&url, &params).map_err(|e| {
            warn!(method, error = %e, "license API request failed");
            e
        })?;

        let mut result: R = serde_json::from_str(&raw).map_err(|e| {
            error!(method, error = %e, "failed to decode license API response");
            LicenseError::Decode(e)
        })?;
        result.set_raw_response(raw);

        if !result.is_success() {
            debug!(
                method,
                server_message = result.message().unwrap_or_default(),
                "license API reported failure"
            );
        }

        Ok(result)
    }

    /// Like [`send`](Self::send), but any transport or decode error is
    /// logged and reduced to `None`.
    pub fn send_or_none<M, R>(
        &self,
        method: &str,
        model: &M,
        extra_params: Option<&HashMap<String, String>>,
    ) -> Option<R>
    where
        M: ToParams + ?Sized,
        R: ApiResult,
    {
        self.send(method, model, extra_params).ok()
    }

    /// Activate a license on the machine named in `model`
    pub fn activate(&self, token: &str, model: &ActivateModel) -> Result<KeyResult, LicenseError> {
        self.send(methods::ACTIVATE, model, Some(&token_params(token)))
    }

    /// Release a machine from a license
    pub fn deactivate(
        &self,
        token: &str,
        model: &DeactivateModel,
    ) -> Result<BasicResult, LicenseError> {
        self.send(methods::DEACTIVATE, model, Some(&token_params(token)))
    }

    /// Fetch a license without activating it
    pub fn get_key(&self, token: &str, model: &GetKeyModel) -> Result<KeyResult, LicenseError> {
        self.send(methods::GET_KEY, model, Some(&token_params(token)))
    }
}

fn token_params(token: &str) -> HashMap<String, String> {
    HashMap::from([("token".to_string(), token.to_string())])
}
