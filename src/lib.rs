//! Desired-state schema of the `FlinkCluster` custom resource.
//!
//! The types here are what a reconciler reads from the API server and
//! compares to decide whether anything has to change: if the observed and the
//! desired [`FlinkClusterSpec`] are equal the reconciliation is a no-op.

pub mod config;
pub mod crd;
pub mod drift;
pub mod manifest;

pub use crd::v1alpha2::{FlinkCluster, FlinkClusterSpec};
pub use crd::{Cpus, FlinkClusterEnvVar};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] serde_yaml::Error),
    #[error("malformed manifest: {0}")]
    MalformedInput(#[from] serde_json::Error),
    #[error("unsupported api version: {0}")]
    UnsupportedVersion(String),
    #[error("unsupported kind: {0}")]
    UnsupportedKind(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("crd error: {0}")]
    CrdError(#[from] kube::core::crd::MergeError),
}
