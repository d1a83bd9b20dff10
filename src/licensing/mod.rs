// Licensing module
// Remote API marshalling and offline license checks

pub mod api;
pub mod config;
pub mod datetime;
pub mod device;
pub mod evaluator;
pub mod params;
pub mod transport;
pub mod types;

pub use api::*;
pub use config::ClientConfig;
pub use datetime::local_datetime;
pub use device::{cached_machine_code, compute_machine_code, machine_code_from, HostSystemInfo, SystemInfo};
pub use evaluator::*;
pub use params::{marshal, RequestParams, ToParams};
pub use transport::{HttpTransport, Transport};
pub use types::*;
