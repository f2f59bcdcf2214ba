//! Job records and their correlation.
//!
//! - [`Field`]: one attribute with a typed "not available" state
//! - [`JobRecord`]: every attribute of a job, filled through explicit
//!   name-to-slot tables, one per source
//! - [`StepSet`]: the job's accounting rows as ordered steps
//! - [`Correlator`]: runs the sources for one job id and merges them into a
//!   [`Job`], accounting values winning over live state

pub mod correlator;
pub mod field;
pub mod job;
pub mod step;

pub use correlator::Correlator;
pub use field::{Field, FieldSource};
pub use job::{Job, JobRecord};
pub use step::{Step, StepSet};
