//! Linux route-table source
//!
//! Reads the `/proc/net/route` pseudo-file. Each data row names its
//! interface and carries destination/gateway/mask as 8-digit hex strings
//! in reversed byte order; every row must have exactly 11 fields.

use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::platform::{unix, RouteSource};
use crate::route::{InterfaceRef, RawRouteTable, RouteRow};

/// Path of the kernel-exposed route table
const PROC_NET_ROUTE: &str = "/proc/net/route";

/// Field count of every `/proc/net/route` data row
const FIELD_COUNT: usize = 11;

/// Linux route-table source backed by `/proc/net/route`
pub struct LinuxRouteSource {
    path: PathBuf,
}

impl LinuxRouteSource {
    /// Create a source reading the kernel route table
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(PROC_NET_ROUTE),
        }
    }

    #[cfg(test)]
    fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for LinuxRouteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSource for LinuxRouteSource {
    fn read(&self) -> Result<RawRouteTable> {
        debug!("reading route table from {}", self.path.display());
        let bytes = fs::read(&self.path)?;
        Ok(RawRouteTable::new(bytes))
    }

    fn parse(&self, raw: &RawRouteTable) -> Result<Vec<RouteRow>> {
        let text = raw.to_text();
        let mut lines = text.lines();

        // First line is the column header
        if lines.next().is_none() {
            return Err(cant_parse(raw));
        }

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != FIELD_COUNT {
                return Err(GatewayError::InvalidRouteRow {
                    row: line.to_string(),
                    expected: FIELD_COUNT,
                });
            }

            let destination = decode_hex_addr(fields[1]).ok_or_else(|| cant_parse(raw))?;
            let gateway = decode_hex_addr(fields[2]).ok_or_else(|| cant_parse(raw))?;
            let flags =
                u32::from_str_radix(fields[3], 16).map_err(|_| cant_parse(raw))?;

            rows.push(RouteRow {
                destination,
                gateway,
                interface: InterfaceRef::Name(fields[0].to_string()),
                flags,
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

/// Decode an 8-digit hex address field.
///
/// The kernel writes the four address bytes in reversed order; decode the
/// hex and reverse exactly once to obtain the conventional presentation.
fn decode_hex_addr(field: &str) -> Option<Ipv4Addr> {
    if field.len() != 8 {
        return None;
    }

    let mut octets = [0u8; 4];
    for (i, chunk) in field.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).ok()?;
        octets[i] = u8::from_str_radix(pair, 16).ok()?;
    }
    octets.reverse();

    Some(Ipv4Addr::from(octets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{gateway_from, interface_from};
    use crate::route::{default_route, flags};
    use proptest::prelude::*;
    use std::io::Write;

    const HEADER: &str =
        "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT\n";

    const SAMPLE: &str = "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT\n\
eth0\t00000000\t0100100A\t0003\t0\t0\t0\t00000000\t0\t0\t0\n\
eth0\t0000100A\t00000000\t0001\t0\t0\t0\t00F0FFFF\t0\t0\t0\n";

    fn parse_str(text: &str) -> Result<Vec<RouteRow>> {
        LinuxRouteSource::new().parse(&RawRouteTable::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn parses_sample_table_in_order() {
        let rows = parse_str(SAMPLE).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].interface, InterfaceRef::Name("eth0".to_string()));
        assert_eq!(rows[0].flags, flags::RTF_UP | flags::RTF_GATEWAY);
        assert_eq!(rows[1].destination, Ipv4Addr::new(10, 16, 0, 0));
        assert_eq!(rows[1].flags, flags::RTF_UP);
    }

    #[test]
    fn hex_decode_reverses_byte_order_exactly_once() {
        assert_eq!(
            decode_hex_addr("0100100A"),
            Some(Ipv4Addr::new(10, 16, 0, 1))
        );
        assert_eq!(decode_hex_addr("00000000"), Some(Ipv4Addr::UNSPECIFIED));
        assert_eq!(decode_hex_addr("zzzzzzzz"), None);
        assert_eq!(decode_hex_addr("0100"), None);
    }

    #[test]
    fn selects_gateway_of_the_default_row() {
        let rows = parse_str(SAMPLE).unwrap();
        let row = default_route(&rows).unwrap();

        assert_eq!(row.gateway, Ipv4Addr::new(10, 16, 0, 1));
        assert_eq!(row.interface, InterfaceRef::Name("eth0".to_string()));
    }

    #[test]
    fn wrong_field_count_is_reported_even_after_a_valid_default() {
        let table = format!("{SAMPLE}eth1\t00000000\t0100A8C0\t0003\t0\t0\n");

        match parse_str(&table).unwrap_err() {
            GatewayError::InvalidRouteRow { row, expected } => {
                assert!(row.starts_with("eth1"));
                assert_eq!(expected, FIELD_COUNT);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_hex_field_fails_as_cant_parse() {
        let table =
            format!("{HEADER}eth0\t00000000\tnotahex!\t0003\t0\t0\t0\t00000000\t0\t0\t0\n");

        match parse_str(&table).unwrap_err() {
            GatewayError::CantParse { route_table } => {
                assert_eq!(route_table, table.as_bytes());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_table_fails_as_cant_parse() {
        assert!(matches!(
            parse_str("").unwrap_err(),
            GatewayError::CantParse { .. }
        ));
    }

    #[test]
    fn missing_default_route_payload_is_verbatim() {
        let table =
            format!("{HEADER}eth0\t0000100A\t00000000\t0001\t0\t0\t0\t00F0FFFF\t0\t0\t0\n");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(table.as_bytes()).unwrap();
        let source = LinuxRouteSource::with_path(file.path());

        match gateway_from(&source).unwrap_err() {
            GatewayError::NoGateway { route_table } => {
                assert_eq!(route_table, table.as_bytes());
            }
            other => panic!("unexpected error: {other}"),
        }

        match interface_from(&source).unwrap_err() {
            GatewayError::NoGateway { route_table } => {
                assert_eq!(route_table, table.as_bytes());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn full_pipeline_reads_gateway_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let source = LinuxRouteSource::with_path(file.path());

        assert_eq!(
            gateway_from(&source).unwrap(),
            Ipv4Addr::new(10, 16, 0, 1)
        );
    }

    #[test]
    fn missing_file_propagates_io_error() {
        let source = LinuxRouteSource::with_path("/proc/net/route-does-not-exist");

        assert!(matches!(source.read(), Err(GatewayError::Io(_))));
    }

    proptest! {
        // Encoding a gateway into the kernel's reversed hex form and
        // parsing it back must be lossless.
        #[test]
        fn encoded_gateway_survives_parsing(octets in any::<[u8; 4]>()) {
            let gateway = Ipv4Addr::from(octets);
            let mut reversed = octets;
            reversed.reverse();
            let hex: String = reversed.iter().map(|b| format!("{b:02X}")).collect();
            let table = format!(
                "{HEADER}eth0\t00000000\t{hex}\t0003\t0\t0\t0\t00000000\t0\t0\t0\n"
            );

            let rows = parse_str(&table).unwrap();
            prop_assert_eq!(rows[0].gateway, gateway);
        }
    }
}
