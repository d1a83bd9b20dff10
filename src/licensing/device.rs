use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use tracing::debug;

/// Hardware and platform identifiers that make up the machine code.
///
/// Implementations return an empty string for anything they cannot read.
pub trait SystemInfo {
    /// Operating system vendor, e.g. "GNU/Linux", "Apple", "Microsoft"
    fn os_vendor(&self) -> String;
    /// System (chassis/board) serial number
    fn serial_number(&self) -> String;
    /// Processor identifier, e.g. "GenuineIntel Family 6 Model 158 Stepping 10"
    fn processor_identifier(&self) -> String;
    fn logical_processor_count(&self) -> usize;
}

/// Reads identifiers from the running machine. Some of them need root.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystemInfo;

impl SystemInfo for HostSystemInfo {
    fn os_vendor(&self) -> String {
        get_os_vendor().to_string()
    }

    fn serial_number(&self) -> String {
        get_serial_number().unwrap_or_else(|| {
            debug!("system serial number unavailable");
            String::new()
        })
    }

    fn processor_identifier(&self) -> String {
        get_processor_identifier().unwrap_or_else(|| {
            debug!("processor identifier unavailable");
            String::new()
        })
    }

    fn logical_processor_count(&self) -> usize {
        get_logical_processor_count().unwrap_or_else(|| {
            debug!("hardware processor count unavailable, using available parallelism");
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Machine code of the current device: lowercase hex SHA-256 of its identifiers
pub fn compute_machine_code() -> String {
    machine_code_from(&HostSystemInfo)
}

/// Machine code computed once per process.
///
/// Hardware identifiers are assumed not to change while the process runs.
pub fn cached_machine_code() -> String {
    static MACHINE_CODE: OnceLock<String> = OnceLock::new();
    MACHINE_CODE.get_or_init(compute_machine_code).clone()
}

/// Machine code for the identifiers reported by `info`
pub fn machine_code_from(info: &impl SystemInfo) -> String {
    let raw = raw_device_id(info);
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

/// Identifiers concatenated without delimiter: vendor, serial, processor, count
fn raw_device_id(info: &impl SystemInfo) -> String {
    format!(
        "{}{}{}{}",
        info.os_vendor(),
        info.serial_number(),
        info.processor_identifier(),
        info.logical_processor_count()
    )
}

fn get_os_vendor() -> &'static str {
    #[cfg(target_os = "linux")]
    return "GNU/Linux";

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    return "Apple";

    #[cfg(target_os = "windows")]
    return "Microsoft";

    #[cfg(target_os = "freebsd")]
    return "FreeBSD";

    #[cfg(not(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "ios",
        target_os = "windows",
        target_os = "freebsd"
    )))]
    return "";
}

fn get_serial_number() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        ["/sys/class/dmi/id/product_serial", "/sys/class/dmi/id/board_serial"]
            .iter()
            .filter_map(|path| std::fs::read_to_string(path).ok())
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformSerialNumber"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("wmic")
            .args(["bios", "get", "serialnumber"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .skip(1)
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map(String::from)
            })
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        None
    }
}

fn get_processor_identifier() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let cpuinfo = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        Some(processor_identifier_from_cpuinfo(&cpuinfo))
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("sysctl")
            .args(["-n", "machdep.cpu.brand_string"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("PROCESSOR_IDENTIFIER").ok()
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        None
    }
}

/// Logical processors the hardware has, independent of affinity masks and cgroup quotas
fn get_logical_processor_count() -> Option<usize> {
    #[cfg(target_os = "linux")]
    {
        let cpuinfo = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        logical_processor_count_from_cpuinfo(&cpuinfo)
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("sysctl")
            .args(["-n", "hw.logicalcpu"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("NUMBER_OF_PROCESSORS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        None
    }
}

/// Number of `processor` entries, `None` if there are none
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn logical_processor_count_from_cpuinfo(cpuinfo: &str) -> Option<usize> {
    let count = cpuinfo
        .lines()
        .filter_map(|l| l.split_once(':'))
        .filter(|(k, _)| k.trim() == "processor")
        .count();
    (count > 0).then_some(count)
}

/// "<vendor> Family <family> Model <model> Stepping <stepping>" from the first CPU entry
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn processor_identifier_from_cpuinfo(cpuinfo: &str) -> String {
    let field = |name: &str| {
        cpuinfo
            .lines()
            .take_while(|l| !l.trim().is_empty())
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.trim() == name)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    };

    format!(
        "{} Family {} Model {} Stepping {}",
        field("vendor_id"),
        field("cpu family"),
        field("model"),
        field("stepping")
    )
}
