//! Fetch a URL and print the response.
//!
//! ```text
//! cargo run -p framework-rest --example fetch -- https://httpbin.org/json
//! cargo run -p framework-rest --example fetch -- https://httpbin.org/post name=Ada lang=rust
//! ```
//!
//! With `key=value` arguments the request becomes a URL-encoded POST. Set
//! `RUST_LOG` to change the log filter.

use framework_rest::http::{AcceptMode, BodyMode, Method, RequestBuilder, RestClient};
use tracing_subscriber::EnvFilter;

fn main() -> framework_rest::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("framework_rest=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "https://httpbin.org/json".to_string());
    let fields: Vec<(String, String)> = args
        .filter_map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect();

    let client = RestClient::new();
    client.progress_changed().connect(|p| {
        println!(
            "{:?}: {} of {} bytes",
            p.direction,
            p.bytes_transferred,
            p.total_bytes.map_or_else(|| "?".to_string(), |t| t.to_string())
        );
    });

    let mut request = RequestBuilder::with_modes(&url, BodyMode::UrlEncoded, AcceptMode::Json)?;
    if !fields.is_empty() {
        request = request.method(Method::Post);
        for (key, value) in &fields {
            request = request.add_body(key, value)?;
        }
    }

    let response = client.execute(request);
    println!("{} {}", response.status_code, response.status_description);
    for (name, value) in &response.headers {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!();
    println!("{}", response.content());

    if let Some(error) = &response.error {
        eprintln!("request failed: {error}");
    }
    Ok(())
}
