//! HTTP module
//!
//! Rate-limited verb-level requests over a pluggable transport.
//!
//! # Features
//!
//! - **Admission Gate**: at most five requests inside their cooldown window
//! - **Adjustable Ceiling**: requests-per-second can change at runtime
//! - **Typed Errors**: non-2xx statuses become `Error::Remote`
//! - **Pluggable Transport and Codec**: reqwest and serde_json by default

mod client;
mod codec;
mod multipart;
mod rate_limit;
mod transport;

pub use client::Requestor;
pub use codec::{Codec, JsonCodec};
pub use multipart::FileUpload;
pub use rate_limit::{AdmissionGate, BATCH_THRESHOLD};
pub use transport::{
    ReqwestTransport, RequestBody, Transport, TransportRequest, TransportResponse,
};
