//! Platform-specific route-table sources
//!
//! Each supported OS exposes its routing table differently: Linux through
//! the `/proc/net/route` pseudo-file, the BSD family through `netstat`
//! output, Windows through the IP Helper forward-table call. Each platform
//! module implements [`RouteSource`]; [`route_source`] selects one at
//! compile time.

use std::net::Ipv4Addr;

use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::route::{self, RawRouteTable, RouteRow};

pub mod detection;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(any(
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub mod bsd;

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub(crate) mod unix;

/// A platform strategy for obtaining and decoding the kernel route table
pub trait RouteSource {
    /// Obtain the complete raw route table, or fail.
    ///
    /// A read either yields the whole table or an error; a truncated
    /// table is never silently treated as complete.
    fn read(&self) -> Result<RawRouteTable>;

    /// Decode the raw table into route rows, preserving source order
    fn parse(&self, raw: &RawRouteTable) -> Result<Vec<RouteRow>>;

    /// Resolve a route row's interface binding to a configured IPv4 address
    fn resolve_interface(&self, row: &RouteRow) -> Result<Ipv4Addr>;
}

/// Get the route-table source for the current OS
pub fn route_source() -> Result<Box<dyn RouteSource>> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxRouteSource::new()))
    }

    #[cfg(any(
        target_os = "macos",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        Ok(Box::new(bsd::BsdRouteSource::new()))
    }

    #[cfg(windows)]
    {
        Ok(Box::new(windows::WindowsRouteSource::new()))
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly",
        windows
    )))]
    {
        Err(GatewayError::NotImplemented {
            os: detection::current().os,
        })
    }
}

/// Discover the default gateway address via the platform pipeline
pub fn discover_gateway() -> Result<Ipv4Addr> {
    let source = route_source()?;
    gateway_from(source.as_ref())
}

/// Discover the local address of the interface bound to the default route
pub fn discover_interface() -> Result<Ipv4Addr> {
    let source = route_source()?;
    interface_from(source.as_ref())
}

pub(crate) fn gateway_from(source: &dyn RouteSource) -> Result<Ipv4Addr> {
    let raw = source.read()?;
    let rows = source.parse(&raw)?;
    debug!("parsed {} route rows", rows.len());

    match route::default_route(&rows) {
        Some(row) => Ok(row.gateway),
        None => Err(GatewayError::NoGateway {
            route_table: raw.into_bytes(),
        }),
    }
}

pub(crate) fn interface_from(source: &dyn RouteSource) -> Result<Ipv4Addr> {
    let raw = source.read()?;
    let rows = source.parse(&raw)?;
    debug!("parsed {} route rows", rows.len());

    match route::default_route(&rows) {
        Some(row) => source.resolve_interface(row),
        None => Err(GatewayError::NoGateway {
            route_table: raw.into_bytes(),
        }),
    }
}
