//! Core systems for Trellis.
//!
//! This crate provides the pieces shared by every Trellis crate:
//!
//! - **Signal/Slot System**: Type-safe change notifications from models and
//!   controllers to the host toolkit
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! let model_reset = Signal::<()>::new();
//!
//! let conn_id = model_reset.connect(|_| {
//!     println!("reload the whole table");
//! });
//!
//! model_reset.emit(());
//! model_reset.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
