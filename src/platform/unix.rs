//! Shared Unix helpers
//!
//! Route rows on Linux and the BSDs name their interface; the configured
//! IPv4 address comes from walking `getifaddrs`.

use std::ffi::CStr;
use std::io;
use std::net::Ipv4Addr;

use crate::error::{GatewayError, Result};
use crate::route::{InterfaceRef, RouteRow};

/// Resolve a route row's named interface to its configured IPv4 address
pub(crate) fn interface_address(row: &RouteRow) -> Result<Ipv4Addr> {
    let name = match &row.interface {
        InterfaceRef::Name(name) => name.as_str(),
        InterfaceRef::Index(index) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("expected an interface name, got index {index}"),
            )
            .into());
        }
    };

    interface_address_by_name(name)
}

/// First AF_INET address configured on the named interface
fn interface_address_by_name(name: &str) -> Result<Ipv4Addr> {
    let mut found = None;

    unsafe {
        let mut ifaddrs: *mut libc::ifaddrs = std::ptr::null_mut();
        if libc::getifaddrs(&mut ifaddrs) != 0 {
            return Err(io::Error::last_os_error().into());
        }

        let mut current = ifaddrs;
        while !current.is_null() {
            let ifa = &*current;
            current = ifa.ifa_next;

            if ifa.ifa_addr.is_null() {
                continue;
            }
            if (*ifa.ifa_addr).sa_family as i32 != libc::AF_INET {
                continue;
            }
            if CStr::from_ptr(ifa.ifa_name).to_str() != Ok(name) {
                continue;
            }

            let addr = ifa.ifa_addr as *const libc::sockaddr_in;
            let octets = (*addr).sin_addr.s_addr.to_ne_bytes();
            found = Some(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]));
            break;
        }

        libc::freeifaddrs(ifaddrs);
    }

    found.ok_or_else(|| {
        GatewayError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no IPv4 address configured on interface {name:?}"),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::flags;

    #[cfg(target_os = "linux")]
    const LOOPBACK: &str = "lo";
    #[cfg(not(target_os = "linux"))]
    const LOOPBACK: &str = "lo0";

    #[test]
    fn resolves_the_loopback_interface() {
        let addr = interface_address_by_name(LOOPBACK).unwrap();
        assert!(addr.is_loopback());
    }

    #[test]
    fn unknown_interface_is_not_found() {
        let err = interface_address_by_name("does-not-exist0").unwrap_err();
        assert!(matches!(err, GatewayError::Io(_)));
    }

    #[test]
    fn index_bindings_are_rejected_on_unix() {
        let row = RouteRow {
            destination: Ipv4Addr::UNSPECIFIED,
            gateway: Ipv4Addr::new(10, 0, 0, 1),
            interface: InterfaceRef::Index(7),
            flags: flags::RTF_UP | flags::RTF_GATEWAY,
        };

        assert!(interface_address(&row).is_err());
    }
}
