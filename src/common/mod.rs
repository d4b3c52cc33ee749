//! Common utilities shared by the harness and its helper binaries

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

/// Parse a "listening at:" address from a server's startup line.
/// Handles IPv6 format [::]:PORT by converting to 127.0.0.1:PORT
pub fn parse_listen_address(line: &str) -> Option<String> {
    let addr_start = line.find("listening at:")?;
    let addr = line[addr_start + "listening at:".len()..].trim();
    if addr.is_empty() {
        return None;
    }
    Some(match addr.strip_prefix("[::]:") {
        Some(port) => format!("127.0.0.1:{}", port),
        None => addr.to_string(),
    })
}
