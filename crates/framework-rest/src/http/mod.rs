//! REST client for Framework.
//!
//! Requests are assembled with a [`RequestBuilder`], which routes headers,
//! encodes the body according to its [`BodyMode`] and finalizes into an
//! immutable [`RestRequest`]. A [`RestClient`] sends it and always hands
//! back a [`Response`]; failures live in its `status` and `error` fields.
//!
//! # Example
//!
//! ```ignore
//! use framework_rest::http::{AcceptMode, BodyMode, RequestBuilder, RestClient};
//!
//! #[derive(serde::Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = RestClient::new();
//!
//! // Blocking call with a typed payload
//! let request = RequestBuilder::with_modes("https://api.example.com/users/1", BodyMode::None, AcceptMode::Json)?;
//! let user = client.get_as::<User>(request);
//! if let Some(user) = user.data() {
//!     println!("{} is user {}", user.name, user.id);
//! }
//!
//! // Async call with a JSON body
//! let request = RequestBuilder::with_modes("https://api.example.com/users", BodyMode::Json, AcceptMode::Json)?
//!     .add_body_serialized(&serde_json::json!({"name": "Ada"}))?;
//! let response = client.post_async(request).await;
//! println!("{} {}", response.status_code, response.content());
//! ```
//!
//! # Progress
//!
//! Request and response bodies move in chunks of
//! [`RestClientConfig::chunk_size`] bytes. Each chunk emits a
//! [`TransferProgress`] on [`RestClient::progress_changed`]. The signal is
//! shared by every request of a client; events carry the
//! [`RestRequest::id`] they belong to.
//!
//! ```ignore
//! client.progress_changed().connect(|p| {
//!     if let Some(percent) = p.percent() {
//!         println!("#{} {:?} {percent}%", p.request_id, p.direction);
//!     }
//! });
//! ```

mod client;
mod cookie;
mod modes;
mod multipart;
mod parser;
mod progress;
mod request;
mod response;
mod serializer;
mod transport;

pub use client::{DEFAULT_CHUNK_SIZE, RestClient, RestClientBuilder, RestClientConfig};
pub use cookie::Cookie;
pub use modes::{AcceptMode, BOUNDARY, BodyMode, Method, ResponseMode, ResponseStatus};
pub use multipart::FileParameter;
pub use parser::ResponseParser;
pub use progress::{TransferDirection, TransferProgress};
pub use request::{Credentials, ProxySettings, RequestBuilder, RestRequest};
pub use response::{Response, TypedResponse};
pub use serializer::{JsonSerializer, SelfDeserialize, SelfSerialize, Serializer, XmlSerializer};
pub use transport::runtime;
