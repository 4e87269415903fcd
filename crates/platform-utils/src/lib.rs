//! Platform utilities shared by the lightning tools crates.
//!
//! Currently this is the HTTP transport: a small [`HttpClient`] trait that the
//! protocol code is written against, and a native implementation backed by
//! bitreq.

mod error;
pub mod http;

pub use error::HttpError;
pub use http::{
    BitreqHttpClient, DefaultHttpClient, HttpClient, HttpResponse, REQUEST_TIMEOUT,
    create_http_client,
};
