//! Cluster membership and the short-lived challenge values issued during
//! verification.

mod challenger;
mod registry;

pub use challenger::Challenger;
pub use registry::ClusterRegistry;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("id is not a registered cluster member")]
    NotAMember,
}
