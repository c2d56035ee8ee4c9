//! Browser implementations of the remote filesystem seams.

pub mod download;
pub mod transport;
pub mod upload;
