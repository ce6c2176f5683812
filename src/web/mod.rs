//! HTTP transport
//!
//! Parses JSON request bodies, calls a backend, and maps backend errors to
//! status codes. The store itself never sees HTTP or JSON.

mod handlers;
mod server;

pub use handlers::{PutRequest, SharedBackend};
pub use server::{router, run_web_server};
