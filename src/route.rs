//! Route-table data model and default-route selection
//!
//! Parsed route rows are ephemeral: they exist only for the duration of a
//! single discovery call and are never cached between calls.

use std::borrow::Cow;
use std::net::Ipv4Addr;

/// Route flag bits shared by all platform parsers
pub mod flags {
    /// Route is up
    pub const RTF_UP: u32 = 0x0001;
    /// Route is to a gateway
    pub const RTF_GATEWAY: u32 = 0x0002;
}

/// Raw route-table bytes as read from the OS source.
///
/// Owned by the pipeline for one discovery call: the parser borrows it,
/// and a failed selection consumes it so the error carries the table
/// verbatim.
#[derive(Debug, Clone)]
pub struct RawRouteTable {
    bytes: Vec<u8>,
}

impl RawRouteTable {
    /// Wrap a completed table read
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw table bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The table as text, with invalid UTF-8 replaced
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Consume the table, yielding the bytes unchanged
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A route row's interface binding, which platforms express differently
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceRef {
    /// Interface name (Linux `/proc/net/route`, BSD netstat `Netif`)
    Name(String),
    /// Interface index (Windows forward-table rows)
    Index(u32),
}

/// One entry from a routing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRow {
    /// Destination network; 0.0.0.0 denotes the catch-all route
    pub destination: Ipv4Addr,
    /// Next-hop address; unspecified for directly connected routes
    pub gateway: Ipv4Addr,
    /// Interface the route is bound to
    pub interface: InterfaceRef,
    /// Route state ([`flags`] bits)
    pub flags: u32,
}

impl RouteRow {
    /// Whether this row is an active default route through a gateway
    pub fn is_default(&self) -> bool {
        const WANTED: u32 = flags::RTF_UP | flags::RTF_GATEWAY;
        self.destination.is_unspecified() && self.flags & WANTED == WANTED
    }
}

/// Select the default route from a parsed table.
///
/// The first row in table order whose destination is the any-network
/// sentinel and whose flags mark it up and gateway-valid wins; table
/// order is the kernel's own preference order for duplicates.
pub fn default_route(rows: &[RouteRow]) -> Option<&RouteRow> {
    rows.iter().find(|row| row.is_default())
}
