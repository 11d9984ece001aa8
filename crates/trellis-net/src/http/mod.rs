//! HTTP transport for Trellis list views.
//!
//! # Example
//!
//! ```ignore
//! use trellis_net::http::{DeliveryMode, HttpClient, HttpNetworkClient};
//!
//! let client = HttpClient::builder()
//!     .timeout(std::time::Duration::from_secs(15))
//!     .bearer_token(token)
//!     .build()?;
//! let network = HttpNetworkClient::from_client(client)?.with_delivery(DeliveryMode::Queued);
//! ```

mod async_client;
mod client;
mod page;

pub use async_client::{DeliveryMode, HttpNetworkClient, RequestHandle, RequestId, runtime};
pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
