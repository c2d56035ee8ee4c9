//! Remote filesystem contracts: DTOs, errors, the service trait, and its HTTP and in-memory
//! implementations.

pub mod disposition;
pub mod error;
pub mod http;
pub mod memory;
pub mod service;
pub mod types;
pub mod upload_source;

pub use error::{ErrorKind, RemoteFsError, RemoteFsResult};
