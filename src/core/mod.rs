// Public modules
pub mod api;
pub mod check;
pub mod checksum;
pub mod defaults;
pub mod deploy;
pub mod error;
pub mod fly;
pub mod request;
pub mod session;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
