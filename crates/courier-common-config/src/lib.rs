//! Configuration for courier.
//!
//! Settings live in an optional `courier.yaml`. Every field has a default,
//! so a partial file or no file at all yields a usable configuration.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
