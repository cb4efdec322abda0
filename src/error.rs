//! Error types for gateway-finder
//!
//! This module defines the error types used throughout the crate.
//! We use `thiserror` for ergonomic error definitions and `anyhow` for
//! error propagation in the demo binary.

use thiserror::Error;

/// Main error type for gateway discovery operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The route table parsed cleanly but contained no default route
    #[error("no gateway found in route table:\n{}", String::from_utf8_lossy(.route_table))]
    NoGateway {
        /// The raw table bytes, verbatim, kept for postmortem inspection
        route_table: Vec<u8>,
    },

    /// The route table could not be decoded at all
    #[error("can't parse route table:\n{}", String::from_utf8_lossy(.route_table))]
    CantParse {
        /// The raw table bytes that defeated the parser
        route_table: Vec<u8>,
    },

    /// A route-table row did not match the platform's field schema
    #[error("invalid row {row:?} in route table: doesn't have {expected} fields")]
    InvalidRouteRow {
        /// The offending row text
        row: String,
        /// The field count the platform schema requires
        expected: usize,
    },

    /// The current operating system has no route-table strategy
    #[error("not implemented for OS: {os}")]
    NotImplemented {
        /// OS identifier of the unported platform
        os: &'static str,
    },

    /// I/O errors from the route-table reader
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A route-table utility ran but exited non-zero
    #[error("command `{program}` failed: {stderr}")]
    Command {
        /// The program that was invoked
        program: String,
        /// Captured standard error output
        stderr: String,
    },
}

/// Result type alias using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;
