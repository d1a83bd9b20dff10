use crate::licensing::config::FEATURE_COUNT;
use crate::licensing::datetime::local_datetime;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// A license key as returned by the license server
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct LicenseKey {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(rename = "ID", default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
    /// Creation time, seconds since the Unix epoch
    #[serde(default)]
    pub created: Option<i64>,
    /// Expiry time, seconds since the Unix epoch
    #[serde(default)]
    pub expires: i64,
    #[serde(default)]
    pub period: Option<i64>,
    #[serde(rename = "F1", default)]
    pub f1: bool,
    #[serde(rename = "F2", default)]
    pub f2: bool,
    #[serde(rename = "F3", default)]
    pub f3: bool,
    #[serde(rename = "F4", default)]
    pub f4: bool,
    #[serde(rename = "F5", default)]
    pub f5: bool,
    #[serde(rename = "F6", default)]
    pub f6: bool,
    #[serde(rename = "F7", default)]
    pub f7: bool,
    #[serde(rename = "F8", default)]
    pub f8: bool,
    #[serde(default)]
    pub block: bool,
    #[serde(default)]
    pub trial_activation: bool,
    #[serde(default)]
    pub max_no_of_machines: Option<u32>,
    #[serde(default)]
    pub allowed_machines: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// `None` when the server did not return the machine list
    #[serde(default)]
    pub activated_machines: Option<Vec<ActivatedMachine>>,
}

impl LicenseKey {
    /// All feature flags, F1 first
    pub fn features(&self) -> [bool; FEATURE_COUNT as usize] {
        [
            self.f1, self.f2, self.f3, self.f4, self.f5, self.f6, self.f7, self.f8,
        ]
    }

    /// Feature flag by number (1-8). Out-of-range numbers are never set.
    pub fn feature(&self, feature: u8) -> bool {
        if !(1..=FEATURE_COUNT).contains(&feature) {
            return false;
        }
        self.features()[usize::from(feature - 1)]
    }
}

/// A machine the license has been activated on
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
pub struct ActivatedMachine {
    /// Machine code, or a `floating:` slot for floating licenses.
    /// Empty when the server sent none; an empty `mid` matches no machine.
    #[serde(rename = "Mid", default, deserialize_with = "null_as_empty")]
    pub mid: String,
    #[serde(rename = "IP", default)]
    pub ip: Option<String>,
    /// Activation time in server-local time
    #[serde(
        rename = "Time",
        default,
        with = "local_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<NaiveDateTime>,
}

impl ActivatedMachine {
    pub fn new(mid: impl Into<String>) -> Self {
        Self {
            mid: mid.into(),
            ..Default::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error types for licensing operations
#[derive(thiserror::Error, Debug)]
pub enum LicenseError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Serialize for LicenseError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
