//! macOS and BSD route-table source
//!
//! The BSD family exposes no stable pseudo-file, so the table comes from
//! `netstat -rn -f inet`. Column sets differ across BSDs (macOS prints
//! Destination/Gateway/Flags/Netif/Expire, FreeBSD inserts Refs/Use), so
//! the parser derives field positions from the header row instead of
//! assuming them.

use std::net::Ipv4Addr;
use std::process::Command;

use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::platform::{unix, RouteSource};
use crate::route::{flags, InterfaceRef, RawRouteTable, RouteRow};

/// Utility that prints the kernel route table
const NETSTAT: &str = "netstat";

/// Section header opening the IPv4 portion of the dump
const INET_SECTION: &str = "Internet:";

/// BSD-family route-table source backed by `netstat -rn`
pub struct BsdRouteSource;

impl BsdRouteSource {
    /// Create a source invoking the system `netstat`
    pub fn new() -> Self {
        Self
    }
}

impl Default for BsdRouteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSource for BsdRouteSource {
    fn read(&self) -> Result<RawRouteTable> {
        debug!("running {} -rn -f inet", NETSTAT);

        let output = Command::new(NETSTAT).args(["-rn", "-f", "inet"]).output()?;
        if !output.status.success() {
            return Err(GatewayError::Command {
                program: NETSTAT.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(RawRouteTable::new(output.stdout))
    }

    fn parse(&self, raw: &RawRouteTable) -> Result<Vec<RouteRow>> {
        let text = raw.to_text();
        let mut lines = text.lines();

        // Skip ahead to the IPv4 section
        if !lines.any(|line| line.trim() == INET_SECTION) {
            return Err(cant_parse(raw));
        }

        let header = lines.next().ok_or_else(|| cant_parse(raw))?;
        let schema = Schema::from_header(header).ok_or_else(|| cant_parse(raw))?;

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                // End of the Internet: section
                break;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < schema.min_fields() {
                return Err(GatewayError::InvalidRouteRow {
                    row: line.to_string(),
                    expected: schema.min_fields(),
                });
            }

            let destination =
                parse_destination(fields[schema.destination]).ok_or_else(|| cant_parse(raw))?;
            let mut row_flags = parse_flags(fields[schema.flags]);
            let gateway = match fields[schema.gateway].parse::<Ipv4Addr>() {
                Ok(ip) => ip,
                // link#N and MAC gateways mean directly connected
                Err(_) => {
                    row_flags &= !flags::RTF_GATEWAY;
                    Ipv4Addr::UNSPECIFIED
                }
            };

            rows.push(RouteRow {
                destination,
                gateway,
                interface: InterfaceRef::Name(fields[schema.netif].to_string()),
                flags: row_flags,
            });
        }

        Ok(rows)
    }

    fn resolve_interface(&self, row: &RouteRow) -> Result<Ipv4Addr> {
        unix::interface_address(row)
    }
}

fn cant_parse(raw: &RawRouteTable) -> GatewayError {
    GatewayError::CantParse {
        route_table: raw.as_bytes().to_vec(),
    }
}

/// Column positions derived from the netstat header row
struct Schema {
    destination: usize,
    gateway: usize,
    flags: usize,
    netif: usize,
}

impl Schema {
    fn from_header(header: &str) -> Option<Self> {
        let columns: Vec<&str> = header.split_whitespace().collect();
        let find = |name: &str| columns.iter().position(|column| *column == name);

        Some(Self {
            destination: find("Destination")?,
            gateway: find("Gateway")?,
            flags: find("Flags")?,
            netif: find("Netif")?,
        })
    }

    /// Fields a data row must have to cover every derived column
    fn min_fields(&self) -> usize {
        self.destination
            .max(self.gateway)
            .max(self.flags)
            .max(self.netif)
            + 1
    }
}

/// Decode a netstat destination cell.
///
/// `default` is the catch-all sentinel; dotted quads may be truncated
/// ("169.254") and may carry a prefix-length suffix ("224.0.0/4").
fn parse_destination(cell: &str) -> Option<Ipv4Addr> {
    if cell == "default" {
        return Some(Ipv4Addr::UNSPECIFIED);
    }

    let cell = cell.split('/').next()?;
    let mut octets = [0u8; 4];
    for (i, part) in cell.split('.').enumerate() {
        if i >= octets.len() {
            return None;
        }
        octets[i] = part.parse().ok()?;
    }

    Some(Ipv4Addr::from(octets))
}

/// Map netstat letter flags onto the shared flag bits
fn parse_flags(cell: &str) -> u32 {
    let mut bits = 0;
    if cell.contains('U') {
        bits |= flags::RTF_UP;
    }
    if cell.contains('G') {
        bits |= flags::RTF_GATEWAY;
    }
    bits
}
