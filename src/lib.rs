//! A single pre-configured HTTP client for talking to a Rover server.
//!
//! Build one [`ApiClient`] at start-up and hand it to whatever needs it, or
//! call [`get_client`] for the lazily built process-wide instance.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::AppError;
pub use http::builder::RequestOptions;
pub use http::client::{ApiClient, get_client};
pub use http::executor::{ApiResponse, ResponseBody, execute};
