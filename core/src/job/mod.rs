// core/src/job/mod.rs
pub mod assemble;
pub mod command;

pub use assemble::{Batch, JobAssembler};
pub use command::{CommandSource, Resolved};
