//! Generic utility primitives with zero domain knowledge.
//!
//! - `sanitize` - Secret redaction for logs and error details
//! - `shell` - Shell quoting for displayed command lines

pub mod sanitize;
pub mod shell;
