//! REST client for Framework.
//!
//! This crate sends HTTP requests built from a small set of modes:
//!
//! - **Body modes**: URL-encoded forms, JSON, XML, multipart and raw bytes
//! - **Accept modes**: negotiate JSON or XML responses
//! - **Typed responses**: deserialize payloads with serde or a type's own decoder
//! - **Progress**: chunked transfers reported through a [`framework_core::Signal`]
//! - **TLS**: client certificates and extra trust roots
//!
//! # Quick Start
//!
//! ```ignore
//! use framework_rest::{RequestBuilder, RestClient};
//!
//! let client = RestClient::new();
//!
//! let request = RequestBuilder::new("https://example.com/search?q=rust")?
//!     .query("page", "2");
//! let response = client.get(request);
//!
//! if response.is_success() {
//!     println!("{}", response.content());
//! } else {
//!     eprintln!("{}: {:?}", response.status_code, response.error_message);
//! }
//! ```
//!
//! # Forms and Uploads
//!
//! ```ignore
//! use framework_rest::http::{BodyMode, FileParameter};
//!
//! let request = RequestBuilder::new("https://example.com/login")?
//!     .add_body("user", "ada")?
//!     .add_body("password", "secret")?;
//! client.post(request);
//!
//! let request = RequestBuilder::new("https://example.com/upload")?
//!     .body_mode(BodyMode::Multipart)
//!     .add_body("title", "Holiday")?
//!     .add_file(FileParameter::from_path("photo", "beach.jpg")?);
//! client.post(request);
//! ```
//!
//! # Async
//!
//! Every verb has an `_async` twin for use inside a tokio runtime. The
//! blocking variants drive the same code on [`http::runtime`] and panic when
//! called from async code.

pub mod http;
pub mod tls;

mod error;

pub use error::{RestError, Result};

// Re-export commonly used types at the crate root
pub use http::{
    AcceptMode, BodyMode, Cookie, Credentials, FileParameter, Method, RequestBuilder, Response,
    ResponseStatus, RestClient, RestClientBuilder, RestRequest, TransferProgress, TypedResponse,
};
