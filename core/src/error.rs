// core/src/error.rs
use thiserror::Error;

/// Failures that end a submission.
///
/// Per-cluster rejections and connection failures are not errors at this
/// level: the federated submitter reports them and moves on to the next
/// cluster.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Bad input, detected before anything is sent.
    #[error("{0}")]
    Validation(String),

    /// The request was sent but no reply arrived in time.
    #[error("Encountered read timeout with {cluster} ({url}). Your submission may have completed.")]
    AmbiguousTimeout { cluster: String, url: String },

    /// The reply broke off after the request reached the cluster.
    #[error("Lost the reply from {cluster} ({url}) after sending the submission. Your submission may have completed.")]
    InterruptedReply { cluster: String, url: String },

    #[error("Job submission failed on all of your configured clusters ({}).", .clusters.join(", "))]
    AllClustersExhausted { clusters: Vec<String> },
}

impl SubmitError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SubmitError::Validation(msg.into())
    }

    /// True when the batch may exist on a cluster even though no
    /// confirmation came back.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, SubmitError::AmbiguousTimeout { .. } | SubmitError::InterruptedReply { .. })
    }
}

pub type Result<T> = std::result::Result<T, SubmitError>;
