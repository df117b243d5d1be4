// core/src/submit/mod.rs
pub mod federated;
pub mod response;

pub use federated::{FederatedSubmitter, Submission};
pub use response::Attempt;

/// How a console message should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Info,
    Success,
    Failure,
    Warning,
}

/// Human-facing progress output. Nothing in the submission flow depends on
/// what a reporter does with the messages.
pub trait Reporter {
    fn report(&self, kind: Kind, message: &str);
}
