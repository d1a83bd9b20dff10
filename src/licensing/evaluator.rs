//! Offline checks against a license key already fetched from the server.
//!
//! None of these functions touch the network. A missing license (`None`)
//! never raises; each check has a fixed answer for it.

use crate::licensing::config::{FLOATING_OFFSET, OVERDRAFT_OFFSET};
use crate::licensing::device::compute_machine_code;
use crate::licensing::types::{ActivatedMachine, LicenseKey};
use chrono::Utc;

/// Is the license activated on this machine?
///
/// Set `is_floating` for licenses activated with a floating time interval,
/// and `allow_overdraft` when overdraft slots should count as well.
pub fn is_on_right_machine(
    license: Option<&LicenseKey>,
    is_floating: bool,
    allow_overdraft: bool,
) -> bool {
    matches_machine_code(license, &compute_machine_code(), is_floating, allow_overdraft)
}

/// Same as [`is_on_right_machine`] for an explicit machine code.
pub fn matches_machine_code(
    license: Option<&LicenseKey>,
    machine_code: &str,
    is_floating: bool,
    allow_overdraft: bool,
) -> bool {
    let Some(machines) = license.and_then(|l| l.activated_machines.as_deref()) else {
        return false;
    };

    if is_floating {
        // Floating licenses track a single slot on the client
        match machines {
            [machine] => {
                floating_slot(machine, FLOATING_OFFSET) == Some(machine_code)
                    || (allow_overdraft
                        && floating_slot(machine, OVERDRAFT_OFFSET) == Some(machine_code))
            }
            _ => false,
        }
    } else {
        machines
            .iter()
            .any(|m| !m.mid.is_empty() && m.mid == machine_code)
    }
}

/// Machine code stored after `offset`, or `None` if the `Mid` is too short
fn floating_slot(machine: &ActivatedMachine, offset: usize) -> Option<&str> {
    machine.mid.get(offset..)
}

/// Has the license expired? `None` is never expired.
pub fn has_expired(license: Option<&LicenseKey>) -> bool {
    has_expired_at(license, Utc::now().timestamp())
}

/// Expiry check against `now` in seconds since the Unix epoch
pub fn has_expired_at(license: Option<&LicenseKey>, now: i64) -> bool {
    license.is_some_and(|l| l.expires < now)
}

/// Negation of [`has_expired`].
///
/// Note that this makes `has_not_expired(None)` true; callers that need a
/// license to be present must check for it themselves.
pub fn has_not_expired(license: Option<&LicenseKey>) -> bool {
    !has_expired(license)
}

/// Is feature `feature` (1-8) enabled? Other numbers are never enabled.
pub fn has_feature(license: Option<&LicenseKey>, feature: i32) -> bool {
    match (license, u8::try_from(feature)) {
        (Some(license), Ok(feature)) => license.feature(feature),
        _ => false,
    }
}
