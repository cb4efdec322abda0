//! Platform detection and identification
//!
//! Captures the platform identity once; error construction and startup
//! logging read it from here instead of re-querying the environment.

use std::sync::OnceLock;

/// Platform identity
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    /// Operating system name, as the toolchain reports it
    pub os: &'static str,
    /// Processor architecture
    pub arch: &'static str,
}

impl PlatformInfo {
    /// A human-readable platform description
    pub fn description(&self) -> String {
        format!("{} ({})", self.os, self.arch)
    }
}

/// The platform identity, captured on first use
pub fn current() -> &'static PlatformInfo {
    static INFO: OnceLock<PlatformInfo> = OnceLock::new();
    INFO.get_or_init(|| PlatformInfo {
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
    })
}
