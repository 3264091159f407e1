//! HTTP handlers for different API endpoints.

pub mod health;
pub mod remote_read;
pub mod remote_write;

// Re-export handlers for easier access
pub use health::{healthz, metrics};
pub use remote_read::remote_read;
pub use remote_write::remote_write;
