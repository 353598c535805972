//! Core components for signing STS GetCallerIdentity requests.
//!
//! This crate provides the shared building blocks used by the service
//! crates: hashing and time helpers, secret redaction, the request
//! descriptor handed to transports, and the [`Context`] that bundles the
//! side-effecting components (HTTP sending and environment access).
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting utilities
//! - [`utils`]: Secret redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod error;
pub use error::{Error, ErrorKind, Result};

mod request;
pub use request::{HeaderList, RequestDescriptor};
