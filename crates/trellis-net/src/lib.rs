//! Networking module for Trellis.
//!
//! This crate provides the network collaborator of a paginated list view:
//!
//! - **Fetch contract**: [`NetworkClient`], [`Cancelable`] and [`FetchResult`],
//!   the narrow interface the pagination controller talks to
//! - **HTTP client**: a reqwest-backed [`HttpNetworkClient`] that decodes JSON
//!   pages and hands completions back to the UI thread
//!
//! # Example
//!
//! ```ignore
//! use trellis_net::{FetchResult, HttpNetworkClient, NetworkClient, QueryParams};
//!
//! let network = HttpNetworkClient::new()?;
//!
//! let mut params = QueryParams::new();
//! params.insert("count".into(), "20".into());
//!
//! let handle = network.get(
//!     "https://api.example.com/posts",
//!     params,
//!     Box::new(|result: FetchResult| {
//!         if let Some(cursor) = result.cursor("cursor") {
//!             println!("next page after {}", cursor);
//!         }
//!     }),
//! );
//!
//! // Later, from the UI event loop:
//! network.dispatch_pending();
//! ```

mod error;
pub mod fetch;
pub mod http;

pub use error::{NetworkError, Result};
pub use fetch::{Cancelable, FetchCompletion, FetchResult, NetworkClient, QueryParams};
pub use self::http::{DeliveryMode, HttpClient, HttpClientBuilder, HttpNetworkClient, RequestHandle};
