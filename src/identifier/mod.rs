//! Job identifiers and their resolution.
//!
//! [`JobId`] validates user tokens. [`Resolver`] turns the command line into
//! the concrete list of jobs to report, expanding job array parents into
//! their tasks and filtering tasks by index range.

pub mod job_id;
pub mod resolver;

pub use job_id::JobId;
pub use resolver::{filter_by_range, AmbientJob, IndexRange, Resolver};
