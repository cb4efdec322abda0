//! Windows route-table source
//!
//! The table comes from the IP Helper `GetIpForwardTable` call as a
//! binary `MIB_IPFORWARDTABLE`; interface resolution uses
//! `GetIpAddrTable`. Both calls are sized by the kernel and retried while
//! it reports a short buffer. Address DWORDs are stored in network byte
//! order, so the in-memory bytes are already the presentation octets.

use std::io;
use std::net::Ipv4Addr;
use std::ptr;

use tracing::debug;

use windows_sys::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, ERROR_NO_DATA, NO_ERROR};
use windows_sys::Win32::NetworkManagement::IpHelper::{GetIpAddrTable, GetIpForwardTable};

use crate::error::{GatewayError, Result};
use crate::platform::RouteSource;
use crate::route::{flags, InterfaceRef, RawRouteTable, RouteRow};

/// Byte offset of the first row behind the entry-count DWORD
const TABLE_HEADER_LEN: usize = 4;

/// Byte length of one MIB_IPFORWARDROW (14 DWORD fields)
const FORWARD_ROW_LEN: usize = 56;

/// Byte length of one MIB_IPADDRROW
const ADDR_ROW_LEN: usize = 24;

/// dwForwardType value for routes through a remote next hop
const ROUTE_TYPE_INDIRECT: u32 = 4;

/// Windows route-table source backed by the IP Helper forward table
pub struct WindowsRouteSource;

impl WindowsRouteSource {
    /// Create a source querying the IP Helper API
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsRouteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSource for WindowsRouteSource {
    fn read(&self) -> Result<RawRouteTable> {
        let mut size: u32 = 0;
        let mut status = unsafe { GetIpForwardTable(ptr::null_mut(), &mut size, 0) };

        // The kernel reports the size it needs; the table can grow between
        // the probe and the fetch, so keep resizing until it fits.
        let mut buf: Vec<u8> = Vec::new();
        while status == ERROR_INSUFFICIENT_BUFFER {
            buf.resize(size as usize, 0);
            status = unsafe { GetIpForwardTable(buf.as_mut_ptr().cast(), &mut size, 0) };
        }

        if status == ERROR_NO_DATA {
            return Ok(RawRouteTable::new(Vec::new()));
        }
        if status != NO_ERROR {
            return Err(io::Error::from_raw_os_error(status as i32).into());
        }

        buf.truncate(size as usize);
        debug!("read {} bytes of forward table", buf.len());
        Ok(RawRouteTable::new(buf))
    }

    fn parse(&self, raw: &RawRouteTable) -> Result<Vec<RouteRow>> {
        parse_forward_table(raw)
    }

    fn resolve_interface(&self, row: &RouteRow) -> Result<Ipv4Addr> {
        let index = match row.interface {
            InterfaceRef::Index(index) => index,
            InterfaceRef::Name(ref name) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("expected an interface index, got name {name:?}"),
                )
                .into());
            }
        };

        interface_address_by_index(index)
    }
}

fn cant_parse(raw: &RawRouteTable) -> GatewayError {
    GatewayError::CantParse {
        route_table: raw.as_bytes().to_vec(),
    }
}

/// Decode the fixed-offset MIB_IPFORWARDTABLE layout
fn parse_forward_table(raw: &RawRouteTable) -> Result<Vec<RouteRow>> {
    let bytes = raw.as_bytes();
    if bytes.is_empty() {
        // ERROR_NO_DATA read: a structurally empty table
        return Ok(Vec::new());
    }

    let count = dword(bytes, 0).ok_or_else(|| cant_parse(raw))? as usize;
    if bytes.len() < TABLE_HEADER_LEN + count * FORWARD_ROW_LEN {
        return Err(cant_parse(raw));
    }

    let mut rows = Vec::with_capacity(count);
    for i in 0..count {
        let base = TABLE_HEADER_LEN + i * FORWARD_ROW_LEN;

        let destination = addr(bytes, base).ok_or_else(|| cant_parse(raw))?;
        let gateway = addr(bytes, base + 12).ok_or_else(|| cant_parse(raw))?;
        let if_index = dword(bytes, base + 16).ok_or_else(|| cant_parse(raw))?;
        let route_type = dword(bytes, base + 20).ok_or_else(|| cant_parse(raw))?;

        let mut row_flags = flags::RTF_UP;
        if route_type == ROUTE_TYPE_INDIRECT {
            row_flags |= flags::RTF_GATEWAY;
        }

        rows.push(RouteRow {
            destination,
            gateway,
            interface: InterfaceRef::Index(if_index),
            flags: row_flags,
        });
    }

    Ok(rows)
}

/// First IPv4 address bound to the interface with the given index
fn interface_address_by_index(index: u32) -> Result<Ipv4Addr> {
    let mut size: u32 = 0;
    let mut status = unsafe { GetIpAddrTable(ptr::null_mut(), &mut size, 0) };

    let mut buf: Vec<u8> = Vec::new();
    while status == ERROR_INSUFFICIENT_BUFFER {
        buf.resize(size as usize, 0);
        status = unsafe { GetIpAddrTable(buf.as_mut_ptr().cast(), &mut size, 0) };
    }
    if status != NO_ERROR {
        return Err(io::Error::from_raw_os_error(status as i32).into());
    }

    let bytes = &buf[..buf.len().min(size as usize)];
    let count = dword(bytes, 0).unwrap_or(0) as usize;
    for i in 0..count {
        let base = TABLE_HEADER_LEN + i * ADDR_ROW_LEN;
        match (dword(bytes, base + 4), addr(bytes, base)) {
            (Some(row_index), Some(ip)) if row_index == index => return Ok(ip),
            (None, _) | (_, None) => break,
            _ => {}
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no IPv4 address for interface index {index}"),
    )
    .into())
}

fn dword(bytes: &[u8], offset: usize) -> Option<u32> {
    let chunk = bytes.get(offset..offset + 4)?;
    Some(u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

fn addr(bytes: &[u8], offset: usize) -> Option<Ipv4Addr> {
    let chunk = bytes.get(offset..offset + 4)?;
    Some(Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]))
}
