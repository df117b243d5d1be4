// core/src/lib.rs
//! Job assembly and federated submission for Cook scheduler clusters.
//!
//! [`job::JobAssembler`] builds a [`job::Batch`] from submit options and
//! stdin; [`submit::FederatedSubmitter`] posts it to the first cluster that
//! accepts it.
pub mod error;
pub mod job;
pub mod rpc;
pub mod submit;
pub mod utils;

pub use error::SubmitError;
