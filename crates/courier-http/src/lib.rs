//! Pre-configured HTTP client and server defaults.
//!
//! Every request helper returns a [`Response`] that carries the body, the
//! response metadata and an optional error. Nothing fails at call time;
//! errors surface when the caller reads the response.
//!
//! ```no_run
//! use courier_http::{Client, HttpError};
//!
//! async fn example() -> Result<(), HttpError> {
//!     let client = Client::new()?;
//!     let response = client.get("http://127.0.0.1:8806/get?v=1").await;
//!     let (body, meta, error) = response.string();
//!     if let Some(error) = error {
//!         eprintln!("{} (status {:?})", error, meta.map(|m| m.status()));
//!     }
//!     println!("{}", body);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use client::{
    build_client, default_client, get, post, post_form, post_json_bytes, post_json_object, Client,
    ClientConfig,
};
pub use error::HttpError;
pub use request::content_types;
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Body, StatusCode};
pub use response::{Response, ResponseMeta};
pub use server::{serve, ServerConfig};
