//! Client-side license key validation.
//!
//! Two independent pieces:
//! - [`LicenseApiClient`] flattens a request model into form parameters,
//!   POSTs it to the license server and decodes the JSON response;
//! - the evaluator functions ([`is_on_right_machine`], [`has_expired`],
//!   [`has_feature`], ...) check a fetched [`LicenseKey`] offline.
//!
//! ```no_run
//! use license_client::{has_feature, is_on_right_machine, ActivateModel, LicenseApiClient};
//!
//! let client = LicenseApiClient::new()?;
//! let model = ActivateModel::for_this_machine(3349, "ICVLD-VVSZR-ZTICT-YKGXL");
//! let result = client.activate("access-token", &model)?;
//!
//! if let Some(license) = result.license_key.as_ref() {
//!     assert!(is_on_right_machine(Some(license), false, false));
//!     println!("feature 1: {}", has_feature(Some(license), 1));
//! }
//! # Ok::<(), license_client::LicenseError>(())
//! ```

pub mod licensing;

pub use licensing::*;
