//! Core utilities for Framework.
//!
//! This crate provides the building blocks shared by the REST client:
//!
//! - **Signal/Slot System**: Type-safe notifications with scoped connections
//! - **Dynamic Values**: An ordered, explicitly accessed property tree
//! - **Dispose Guards**: Release-once ownership of resources
//! - **MIME Lookup**: File extension to content type
//! - **Query Strings**: Ordered, duplicate-preserving URL query parameters
//! - **Logging**: Tracing targets and timing spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use framework_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Dynamic Value Example
//!
//! ```
//! use framework_core::Value;
//!
//! let mut config = Value::object().with("retries", 3);
//! *config.vivify("proxy").unwrap() = Value::from("http://proxy:8080");
//!
//! assert_eq!(config.get("retries").and_then(Value::as_i64), Some(3));
//! assert_eq!(config.to_string(), r#"{"retries":3,"proxy":"http://proxy:8080"}"#);
//! ```

pub mod dispose;
mod error;
pub mod logging;
pub mod mime;
pub mod query;
pub mod signal;
pub mod value;

pub use dispose::{Dispose, Disposer};
pub use error::{CoreError, Result};
pub use logging::PerfSpan;
pub use query::{QueryString, split_resource};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use value::{Properties, Value};
