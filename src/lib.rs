//! gateway-finder: Cross-platform default-gateway discovery
//!
//! This library answers two questions about the current host: which IPv4
//! address is the default network gateway, and which local interface
//! address is used to reach it. Each platform exposes its kernel route
//! table in its own way (a pseudo-file on Linux, `netstat` output on the
//! BSD family, a binary syscall result on Windows) and each gets its own
//! reader and parser behind a common trait.
//!
//! # Architecture
//!
//! Every discovery call runs the same pipeline: read the raw route table,
//! decode it into ordered rows, and select the first row whose destination
//! is the any-network sentinel with the route-up and gateway-valid flags
//! set. Calls are one-shot and synchronous; nothing is cached between
//! them.
//!
//! # Modules
//!
//! - `route`: route-row data model and default-route selection
//! - `platform`: platform-specific route-table sources and dispatch
//! - `error`: error types and handling
//!
//! # Example
//!
//! ```no_run
//! let gateway = gateway_finder::discover_gateway()?;
//! let interface = gateway_finder::discover_interface()?;
//! println!("default gateway {gateway} via {interface}");
//! # Ok::<(), gateway_finder::GatewayError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod platform;
pub mod route;

// Re-export commonly used types
pub use error::{GatewayError, Result};
pub use route::{InterfaceRef, RawRouteTable, RouteRow};

use std::net::Ipv4Addr;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Discover the IPv4 address of the host's default gateway.
///
/// Performs a fresh read of the kernel route table on every call. Fails
/// with [`GatewayError::NoGateway`] when the table holds no default
/// route, and with [`GatewayError::NotImplemented`] on unported
/// platforms.
pub fn discover_gateway() -> Result<Ipv4Addr> {
    platform::discover_gateway()
}

/// Discover the local IPv4 address of the interface the default route is
/// bound to.
///
/// Selects the same route row as [`discover_gateway`] and resolves its
/// interface binding to a configured address.
pub fn discover_interface() -> Result<Ipv4Addr> {
    platform::discover_interface()
}
