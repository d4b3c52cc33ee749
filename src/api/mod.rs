//! HTTP client adapter for the ML platform API
//!
//! Requests and responses are plain values; [`Transport`] is the seam that
//! actually puts them on the wire.

pub mod protocol;
pub mod transport;

pub use transport::{
    empty_payload, ApiRequest, ApiResponse, FilePart, HttpTransport, Method, RequestBody,
    Transport,
};
